use clap::{Args, Subcommand};
use sanisidro::users::{Credentials, RegistrationForm};
use sanisidro_app::api::ApiError;

use super::{Runtime, output};

const INACTIVE_ACCOUNT: &str =
    "Tu cuenta ha sido desactivada. Contacta con el administrador para más información.";

#[derive(Debug, Args)]
pub(crate) struct AccountCommand {
    #[command(subcommand)]
    command: AccountSubcommand,
}

#[derive(Debug, Subcommand)]
enum AccountSubcommand {
    /// Create a customer account
    Register(RegisterArgs),

    /// Sign in
    Login(LoginArgs),

    /// Sign out
    Logout,

    /// Show the signed-in customer
    Whoami,

    /// List the signed-in customer's orders
    Orders,

    /// List the signed-in customer's reservations
    Reservations,
}

#[derive(Debug, Args)]
struct RegisterArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// Email
    #[arg(long)]
    email: String,

    /// Phone number
    #[arg(long)]
    phone: String,

    /// Password
    #[arg(long, env = "SANISIDRO_PASSWORD", hide_env_values = true)]
    password: String,

    /// Password again
    #[arg(long)]
    confirm_password: String,
}

#[derive(Debug, Args)]
struct LoginArgs {
    /// Email
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long, env = "SANISIDRO_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(command: AccountCommand, runtime: &Runtime) -> Result<(), String> {
    match command.command {
        AccountSubcommand::Register(args) => register(args, runtime).await,
        AccountSubcommand::Login(args) => login(args, runtime).await,
        AccountSubcommand::Logout => {
            runtime
                .session()
                .sign_out()
                .map_err(|error| error.to_string())?;

            println!("sesión cerrada");

            Ok(())
        }
        AccountSubcommand::Whoami => whoami(runtime),
        AccountSubcommand::Orders => orders(runtime).await,
        AccountSubcommand::Reservations => reservations(runtime).await,
    }
}

async fn register(args: RegisterArgs, runtime: &Runtime) -> Result<(), String> {
    let new_user = RegistrationForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        password: args.password,
        confirm_password: args.confirm_password,
    }
    .validate()
    .map_err(|errors| errors.to_string())?;

    let user = runtime
        .context()
        .users
        .register(new_user)
        .await
        .map_err(|error| format!("failed to register: {error}"))?;

    println!("cuenta creada para {} ({})", user.name, user.email);
    println!("ya puedes iniciar sesión");

    Ok(())
}

async fn login(args: LoginArgs, runtime: &Runtime) -> Result<(), String> {
    let credentials =
        Credentials::validate(&args.email, &args.password).map_err(|errors| errors.to_string())?;

    let user = match runtime.context().users.login(credentials).await {
        Ok(user) => user,
        Err(ApiError::Unauthorized(message)) => return Err(message),
        Err(error) => return Err(format!("failed to sign in: {error}")),
    };

    if !user.is_active() {
        return Err(INACTIVE_ACCOUNT.to_string());
    }

    let mut session = runtime.session();
    let user = session.sign_in(user).map_err(|error| error.to_string())?;

    println!("bienvenido, {}", user.name);

    Ok(())
}

fn whoami(runtime: &Runtime) -> Result<(), String> {
    let session = runtime.session();
    let user = session.require_user().map_err(|error| error.to_string())?;

    println!("id: {}", user.id);
    println!("nombre: {}", user.name);
    println!("email: {}", user.email);
    println!("teléfono: {}", user.phone.as_deref().unwrap_or("-"));
    println!("pedidos: {}", user.order_count.unwrap_or_default());

    if user.is_admin() {
        println!("rol: administrador");
    }

    Ok(())
}

async fn orders(runtime: &Runtime) -> Result<(), String> {
    let session = runtime.session();
    let user = session.require_user().map_err(|error| error.to_string())?;

    let orders = runtime
        .context()
        .orders
        .list_for_user(&user.email)
        .await
        .map_err(|error| format!("failed to load orders: {error}"))?;

    if orders.is_empty() {
        println!("todavía no tienes pedidos");
        return Ok(());
    }

    println!("{}", output::orders_table(&orders));

    Ok(())
}

async fn reservations(runtime: &Runtime) -> Result<(), String> {
    let session = runtime.session();
    let user = session.require_user().map_err(|error| error.to_string())?;

    let reservations = runtime
        .context()
        .reservations
        .list_for_user(&user.email)
        .await
        .map_err(|error| format!("failed to load reservations: {error}"))?;

    if reservations.is_empty() {
        println!("no tienes reservas");
        return Ok(());
    }

    println!("{}", output::reservations_table(&reservations));

    Ok(())
}

use clap::{Args, Subcommand};
use sanisidro::reservations::{Dni, ReservationForm, ReservationId};
use sanisidro_app::domain::reservations::cancel_reservation;

use super::{Runtime, output};

const RESERVATION_FAILED: &str = "Error al crear la reserva. Por favor intenta nuevamente.";
const NO_IDENTITY: &str =
    "No se encontraron datos para este DNI. Por favor ingrese el nombre manualmente.";

#[derive(Debug, Args)]
pub(crate) struct ReservationCommand {
    #[command(subcommand)]
    command: ReservationSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReservationSubcommand {
    /// Book a table
    Create(CreateArgs),

    /// List the reservations made with an email
    List {
        /// Email the reservations were made with; defaults to the signed-in customer
        #[arg(long)]
        email: Option<String>,
    },

    /// Cancel one of the signed-in customer's reservations
    Cancel {
        /// Reservation ID
        id: i64,
    },

    /// Look up the registered name for a DNI
    Dni {
        /// Eight-digit national ID number
        dni: String,
    },
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Name the table is booked under; defaults to the signed-in customer
    #[arg(long)]
    name: Option<String>,

    /// Look the name up from a DNI instead
    #[arg(long, conflicts_with = "name")]
    dni: Option<String>,

    /// Contact email; defaults to the signed-in customer
    #[arg(long)]
    email: Option<String>,

    /// Contact phone; defaults to the signed-in customer
    #[arg(long)]
    phone: Option<String>,

    /// Day, YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// Time, HH:MM
    #[arg(long)]
    time: String,

    /// Number of guests
    #[arg(long, default_value = "2")]
    people: String,

    /// Notes for the restaurant
    #[arg(long, default_value = "")]
    notes: String,
}

pub(crate) async fn run(command: ReservationCommand, runtime: &Runtime) -> Result<(), String> {
    match command.command {
        ReservationSubcommand::Create(args) => create(args, runtime).await,
        ReservationSubcommand::List { email } => list(email, runtime).await,
        ReservationSubcommand::Cancel { id } => cancel(ReservationId(id), runtime).await,
        ReservationSubcommand::Dni { dni } => {
            let name = lookup_name(&dni, runtime).await?;

            println!("{name}");

            Ok(())
        }
    }
}

async fn lookup_name(dni: &str, runtime: &Runtime) -> Result<String, String> {
    let dni = Dni::parse(dni).map_err(|error| error.to_string())?;

    runtime
        .context()
        .identity
        .lookup(&dni)
        .await
        .map_err(|error| format!("failed to look up DNI: {error}"))?
        .and_then(|record| record.name())
        .ok_or_else(|| NO_IDENTITY.to_string())
}

async fn create(args: CreateArgs, runtime: &Runtime) -> Result<(), String> {
    let session = runtime.session();
    let user = session.user();

    let name = match (args.name, args.dni) {
        (Some(name), _) => name,
        (None, Some(dni)) => lookup_name(&dni, runtime).await?,
        (None, None) => user.map(|user| user.name.clone()).unwrap_or_default(),
    };

    let form = ReservationForm {
        name,
        email: args
            .email
            .or_else(|| user.map(|user| user.email.clone()))
            .unwrap_or_default(),
        phone: args
            .phone
            .or_else(|| user.and_then(|user| user.phone.clone()))
            .unwrap_or_default(),
        date: args.date,
        time: args.time,
        party_size: args.people,
        notes: args.notes,
    };

    let reservation = form
        .validate(&runtime.config().now())
        .map_err(|errors| errors.to_string())?;

    let created = runtime
        .context()
        .reservations
        .create_reservation(reservation)
        .await
        .map_err(|error| {
            tracing::error!(%error, "failed to create reservation");

            RESERVATION_FAILED.to_string()
        })?;

    println!(
        "reserva registrada para {} el {} a las {} ({} personas)",
        created.name,
        created.date.strftime("%d/%m/%Y"),
        created.time.strftime("%H:%M"),
        created.party_size
    );
    println!("estado: {}", created.status);

    Ok(())
}

async fn list(email: Option<String>, runtime: &Runtime) -> Result<(), String> {
    let email = match email {
        Some(email) => email,
        None => runtime
            .session()
            .require_user()
            .map(|user| user.email.clone())
            .map_err(|error| error.to_string())?,
    };

    let reservations = runtime
        .context()
        .reservations
        .list_for_user(&email)
        .await
        .map_err(|error| format!("failed to load reservations: {error}"))?;

    if reservations.is_empty() {
        println!("no hay reservas para {email}");
        return Ok(());
    }

    println!("{}", output::reservations_table(&reservations));

    Ok(())
}

async fn cancel(id: ReservationId, runtime: &Runtime) -> Result<(), String> {
    let session = runtime.session();
    let user = session.require_user().map_err(|error| error.to_string())?;

    let cancelled =
        cancel_reservation(runtime.context().reservations.as_ref(), id, &user.email)
            .await
            .map_err(|error| error.to_string())?;

    println!("reserva {id}: {}", cancelled.status);

    Ok(())
}

use clap::{Parser, Subcommand};
use sanisidro::cart::CartStore;
use sanisidro_app::{
    admin::AdminService,
    checkout::CheckoutService,
    config::AppConfig,
    context::AppContext,
    observability,
    session::SessionStore,
    storage::FileStorage,
};

mod account;
mod admin;
mod cart;
mod checkout;
mod menu;
mod output;
mod promo;
mod reservation;

#[derive(Debug, Parser)]
#[command(name = "sanisidro", about = "San Isidro restaurant client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the menu
    Menu(menu::MenuArgs),

    /// Inspect and edit the cart
    Cart(cart::CartCommand),

    /// Browse and preview promotion codes
    Promo(promo::PromoCommand),

    /// Pay for the cart and place the order
    Checkout(checkout::CheckoutArgs),

    /// Register, sign in and review past orders
    Account(account::AccountCommand),

    /// Book a table
    Reservation(reservation::ReservationCommand),

    /// Back-office operations
    Admin(admin::AdminCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.config.logging).map_err(|error| error.to_string())?;

        let runtime = Runtime::new(self.config)?;

        match self.command {
            Commands::Menu(args) => menu::run(args, &runtime).await,
            Commands::Cart(command) => cart::run(command, &runtime).await,
            Commands::Promo(command) => promo::run(command, &runtime).await,
            Commands::Checkout(args) => checkout::run(args, &runtime).await,
            Commands::Account(command) => account::run(command, &runtime).await,
            Commands::Reservation(command) => reservation::run(command, &runtime).await,
            Commands::Admin(command) => admin::run(command, &runtime).await,
        }
    }
}

/// Everything a command needs: configuration, remote services and local state.
pub(crate) struct Runtime {
    config: AppConfig,
    context: AppContext,
}

impl Runtime {
    fn new(config: AppConfig) -> Result<Self, String> {
        let context = AppContext::from_api_config(&config.api)
            .map_err(|error| format!("{error}: {}", config.api.api_url))?;

        Ok(Self { config, context })
    }

    pub(crate) fn config(&self) -> &AppConfig {
        &self.config
    }

    pub(crate) fn context(&self) -> &AppContext {
        &self.context
    }

    fn storage(&self) -> FileStorage {
        FileStorage::new(&self.config.storage.storage_dir)
    }

    pub(crate) fn cart(&self) -> CartStore<FileStorage> {
        CartStore::load(self.storage())
    }

    pub(crate) fn session(&self) -> SessionStore<FileStorage> {
        SessionStore::load(self.storage())
    }

    pub(crate) fn admin(&self) -> AdminService {
        AdminService::new(&self.context)
    }

    pub(crate) fn checkout(&self) -> CheckoutService<FileStorage> {
        CheckoutService::new(
            self.cart(),
            self.context.promotions.clone(),
            self.context.orders.clone(),
            self.context.users.clone(),
        )
    }
}

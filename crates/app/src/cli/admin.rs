use clap::{Args, Subcommand};
use jiff::civil::Date;
use rust_decimal::Decimal;
use sanisidro::{
    orders::{OrderId, OrderStatus},
    products::{Category, ProductDraft, ProductId},
    promotions::{ApplicableProducts, PromotionId, PromotionRecord},
    reservations::{ReservationId, ReservationStatus},
    users::UserId,
};
use sanisidro_app::admin::{ProductChanges, PromotionChanges};

use super::{Runtime, output};

const ADMIN_ONLY: &str = "Acceso restringido a administradores";

#[derive(Debug, Args)]
pub(crate) struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Debug, Subcommand)]
enum AdminSubcommand {
    /// List orders
    Orders {
        /// Only orders in this status (pendiente, preparando, listo, entregado, cancelado)
        #[arg(long)]
        status: Option<OrderStatus>,
    },

    /// Show one order with its lines
    Order {
        /// Order ID
        id: i64,
    },

    /// Move an order to another status
    OrderStatus {
        /// Order ID
        id: i64,

        /// New status
        status: OrderStatus,
    },

    /// Delete an order
    OrderDelete {
        /// Order ID
        id: i64,
    },

    /// Manage the menu
    Products(ProductsCommand),

    /// Manage promotions
    Promotions(PromotionsCommand),

    /// Manage customer accounts
    Users(UsersCommand),

    /// List reservations
    Reservations {
        /// Only reservations on this day (YYYY-MM-DD)
        #[arg(long, conflicts_with = "status")]
        date: Option<Date>,

        /// Only reservations in this status (pendiente, confirmada, cancelada)
        #[arg(long)]
        status: Option<ReservationStatus>,
    },

    /// Move a reservation to another status
    ReservationStatus {
        /// Reservation ID
        id: i64,

        /// New status
        status: ReservationStatus,
    },

    /// Delete a reservation
    ReservationDelete {
        /// Reservation ID
        id: i64,
    },
}

#[derive(Debug, Args)]
struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductsSubcommand {
    /// List every product, available or not
    List,

    /// Add a product
    Create(CreateProductArgs),

    /// Change some fields of a product
    Update {
        /// Product ID
        id: i64,

        #[command(flatten)]
        changes: ProductChangesArgs,
    },

    /// Switch a product between available and unavailable
    Toggle {
        /// Product ID
        id: i64,
    },

    /// Remove a product
    Delete {
        /// Product ID
        id: i64,
    },
}

#[derive(Debug, Args)]
struct CreateProductArgs {
    /// Name
    #[arg(long)]
    name: String,

    /// Description
    #[arg(long)]
    description: Option<String>,

    /// Price in soles
    #[arg(long)]
    price: Decimal,

    /// Category (platos, entradas, bebidas, adicionales, cremas, postres)
    #[arg(long)]
    category: String,

    /// Image reference
    #[arg(long)]
    image: Option<String>,

    /// Create it as unavailable
    #[arg(long)]
    unavailable: bool,
}

impl From<CreateProductArgs> for ProductDraft {
    fn from(args: CreateProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            category: Category::from(args.category),
            available: !args.unavailable,
            image: args.image,
        }
    }
}

#[derive(Debug, Args)]
struct ProductChangesArgs {
    /// New name
    #[arg(long)]
    name: Option<String>,

    /// New description
    #[arg(long)]
    description: Option<String>,

    /// New price in soles
    #[arg(long)]
    price: Option<Decimal>,

    /// New category
    #[arg(long)]
    category: Option<String>,

    /// New image reference
    #[arg(long)]
    image: Option<String>,

    /// Set availability (true or false)
    #[arg(long)]
    available: Option<bool>,
}

impl From<ProductChangesArgs> for ProductChanges {
    fn from(args: ProductChangesArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            category: args.category.map(Category::from),
            available: args.available,
            image: args.image,
        }
    }
}

#[derive(Debug, Args)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Debug, Subcommand)]
enum UsersSubcommand {
    /// List every account
    List,

    /// Activate or deactivate an account; flips it when no state is given
    Toggle {
        /// User ID
        id: i64,

        /// Set this state instead of flipping (true or false)
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete an account
    Delete {
        /// User ID
        id: i64,
    },
}

#[derive(Debug, Args)]
struct PromotionsCommand {
    #[command(subcommand)]
    command: PromotionsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromotionsSubcommand {
    /// List every promotion, current or not
    List,

    /// Create a promotion
    Create(CreatePromotionArgs),

    /// Change some fields of a promotion
    Update {
        /// Promotion ID
        id: i64,

        #[command(flatten)]
        changes: PromotionChangesArgs,
    },

    /// Switch a promotion on or off
    Toggle {
        /// Promotion ID
        id: i64,
    },

    /// Delete a promotion
    Delete {
        /// Promotion ID
        id: i64,
    },
}

#[derive(Debug, Args)]
struct PromotionChangesArgs {
    /// New headline
    #[arg(long)]
    title: Option<String>,

    /// New description
    #[arg(long)]
    description: Option<String>,

    /// New percent points, or soles for monto_fijo promotions
    #[arg(long)]
    discount: Option<Decimal>,

    /// New kind (general, producto, monto_fijo)
    #[arg(long)]
    kind: Option<String>,

    /// New comma-separated product IDs
    #[arg(long)]
    products: Option<String>,

    /// New minimum subtotal in soles
    #[arg(long)]
    min_amount: Option<Decimal>,

    /// New minimum number of units
    #[arg(long)]
    min_quantity: Option<i64>,

    /// New first valid day (YYYY-MM-DD)
    #[arg(long)]
    starts_on: Option<Date>,

    /// New last valid day (YYYY-MM-DD)
    #[arg(long)]
    ends_on: Option<Date>,

    /// Switch on or off (true or false)
    #[arg(long)]
    active: Option<bool>,
}

impl From<PromotionChangesArgs> for PromotionChanges {
    fn from(args: PromotionChangesArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            discount: args.discount,
            kind: args.kind,
            products: args.products,
            min_amount: args.min_amount,
            min_quantity: args.min_quantity,
            starts_on: args.starts_on,
            ends_on: args.ends_on,
            active: args.active,
        }
    }
}

#[derive(Debug, Args)]
struct CreatePromotionArgs {
    /// Redeemable code
    #[arg(long)]
    code: String,

    /// Headline
    #[arg(long)]
    title: String,

    /// Description
    #[arg(long, default_value = "")]
    description: String,

    /// Percent points, or soles for monto_fijo promotions
    #[arg(long)]
    discount: Decimal,

    /// Promotion kind (general, producto, monto_fijo)
    #[arg(long, default_value = "general")]
    kind: String,

    /// Comma-separated product IDs for producto promotions
    #[arg(long)]
    products: Option<String>,

    /// Minimum subtotal in soles
    #[arg(long)]
    min_amount: Option<Decimal>,

    /// Minimum number of units
    #[arg(long)]
    min_quantity: Option<i64>,

    /// First valid day (YYYY-MM-DD)
    #[arg(long)]
    starts_on: Option<Date>,

    /// Last valid day (YYYY-MM-DD)
    #[arg(long)]
    ends_on: Option<Date>,

    /// Create it switched off
    #[arg(long)]
    inactive: bool,
}

impl From<CreatePromotionArgs> for PromotionRecord {
    fn from(args: CreatePromotionArgs) -> Self {
        Self {
            id: None,
            code: args.code,
            title: args.title,
            description: args.description,
            discount: args.discount,
            kind: Some(args.kind),
            applicable_products: args.products.map(ApplicableProducts::Csv),
            min_amount: args.min_amount,
            min_quantity: args.min_quantity,
            starts_on: args.starts_on,
            ends_on: args.ends_on,
            active: Some(!args.inactive),
            image: None,
        }
    }
}

pub(crate) async fn run(command: AdminCommand, runtime: &Runtime) -> Result<(), String> {
    let session = runtime.session();
    let admin = session.require_user().map_err(|error| error.to_string())?;

    if !admin.is_admin() {
        return Err(ADMIN_ONLY.to_string());
    }

    match command.command {
        AdminSubcommand::Orders { status } => orders(status, runtime).await,
        AdminSubcommand::Order { id } => order(OrderId(id), runtime).await,
        AdminSubcommand::OrderStatus { id, status } => {
            let order = runtime
                .admin()
                .set_order_status(OrderId(id), status)
                .await
                .map_err(|error| format!("failed to update order {id}: {error}"))?;

            println!("pedido {} ({}): {}", id, order.invoice_number, order.status);

            Ok(())
        }
        AdminSubcommand::OrderDelete { id } => {
            runtime
                .admin()
                .delete_order(OrderId(id))
                .await
                .map_err(|error| format!("failed to delete order {id}: {error}"))?;

            println!("pedido {id} eliminado");

            Ok(())
        }
        AdminSubcommand::Products(ProductsCommand { command }) => products(command, runtime).await,
        AdminSubcommand::Promotions(PromotionsCommand { command }) => {
            promotions(command, runtime).await
        }
        AdminSubcommand::Users(UsersCommand { command }) => users(command, runtime).await,
        AdminSubcommand::Reservations { date, status } => {
            reservations(date, status, runtime).await
        }
        AdminSubcommand::ReservationStatus { id, status } => {
            let id = ReservationId(id);

            let updated = runtime
                .admin()
                .set_reservation_status(id, status)
                .await
                .map_err(|error| format!("failed to update reservation {id}: {error}"))?;

            println!("reserva {id}: {}", updated.status);

            Ok(())
        }
        AdminSubcommand::ReservationDelete { id } => {
            runtime
                .admin()
                .delete_reservation(ReservationId(id))
                .await
                .map_err(|error| format!("failed to delete reservation {id}: {error}"))?;

            println!("reserva {id} eliminada");

            Ok(())
        }
    }
}

async fn orders(status: Option<OrderStatus>, runtime: &Runtime) -> Result<(), String> {
    let service = runtime.context().orders.as_ref();

    let orders = match status {
        Some(status) => service.list_by_status(status).await,
        None => service.list_orders().await,
    }
    .map_err(|error| format!("failed to load orders: {error}"))?;

    if orders.is_empty() {
        println!("no hay pedidos");
        return Ok(());
    }

    println!("{}", output::orders_table(&orders));

    Ok(())
}

async fn order(id: OrderId, runtime: &Runtime) -> Result<(), String> {
    let order = runtime
        .admin()
        .order(id)
        .await
        .map_err(|error| format!("failed to load order {id}: {error}"))?;

    println!("{}", output::orders_table(std::slice::from_ref(&order)));

    for line in &order.items {
        println!("{} x {}", line.quantity, line.name);
    }

    match &order.details {
        Some(details) if order.items.is_empty() => println!("{details}"),
        _ => {}
    }

    Ok(())
}

async fn products(command: ProductsSubcommand, runtime: &Runtime) -> Result<(), String> {
    let admin = runtime.admin();

    match command {
        ProductsSubcommand::List => {
            let products = runtime
                .context()
                .products
                .list_products()
                .await
                .map_err(|error| format!("failed to load products: {error}"))?;

            println!("{}", output::products_table(&products));
        }
        ProductsSubcommand::Create(args) => {
            let created = admin
                .create_product(ProductDraft::from(args))
                .await
                .map_err(|error| format!("failed to create product: {error}"))?;

            println!("producto {} creado: {}", created.id, created.name);
        }
        ProductsSubcommand::Update { id, changes } => {
            let updated = admin
                .update_product(ProductId(id), ProductChanges::from(changes))
                .await
                .map_err(|error| format!("failed to update product {id}: {error}"))?;

            println!("{}", output::products_table(&[updated]));
        }
        ProductsSubcommand::Toggle { id } => {
            let updated = admin
                .toggle_product(ProductId(id))
                .await
                .map_err(|error| format!("failed to update product {id}: {error}"))?;

            let state = if updated.available { "disponible" } else { "no disponible" };

            println!("{}: {state}", updated.name);
        }
        ProductsSubcommand::Delete { id } => {
            admin
                .delete_product(ProductId(id))
                .await
                .map_err(|error| format!("failed to delete product {id}: {error}"))?;

            println!("producto {id} eliminado");
        }
    }

    Ok(())
}

async fn users(command: UsersSubcommand, runtime: &Runtime) -> Result<(), String> {
    let admin = runtime.admin();

    match command {
        UsersSubcommand::List => {
            let users = admin
                .users()
                .await
                .map_err(|error| format!("failed to load users: {error}"))?;

            println!("{}", output::users_table(&users));
        }
        UsersSubcommand::Toggle { id, active } => {
            let updated = admin
                .set_user_active(UserId(id), active)
                .await
                .map_err(|error| format!("failed to update user {id}: {error}"))?;

            let state = if updated.is_active() { "activo" } else { "inactivo" };

            println!("{}: {state}", updated.email);
        }
        UsersSubcommand::Delete { id } => {
            admin
                .delete_user(UserId(id))
                .await
                .map_err(|error| format!("failed to delete user {id}: {error}"))?;

            println!("usuario {id} eliminado");
        }
    }

    Ok(())
}

async fn promotions(command: PromotionsSubcommand, runtime: &Runtime) -> Result<(), String> {
    match command {
        PromotionsSubcommand::List => {
            let promotions = runtime
                .context()
                .promotions
                .list_promotions()
                .await
                .map_err(|error| format!("failed to load promotions: {error}"))?;

            println!("{}", output::promotions_table(&promotions));
        }
        PromotionsSubcommand::Create(args) => {
            let created = runtime
                .admin()
                .create_promotion(PromotionRecord::from(args))
                .await
                .map_err(|error| format!("failed to create promotion: {error}"))?;

            println!(
                "promoción {} creada: {}",
                created.code,
                output::describe_promotion(&created)
            );
        }
        PromotionsSubcommand::Update { id, changes } => {
            let updated = runtime
                .admin()
                .update_promotion(PromotionId(id), PromotionChanges::from(changes))
                .await
                .map_err(|error| format!("failed to update promotion {id}: {error}"))?;

            println!("{}", output::promotions_table(&[updated]));
        }
        PromotionsSubcommand::Toggle { id } => {
            let updated = runtime
                .admin()
                .toggle_promotion(PromotionId(id))
                .await
                .map_err(|error| format!("failed to update promotion {id}: {error}"))?;

            let state = if updated.active { "activa" } else { "inactiva" };

            println!("promoción {}: {state}", updated.code);
        }
        PromotionsSubcommand::Delete { id } => {
            runtime
                .admin()
                .delete_promotion(PromotionId(id))
                .await
                .map_err(|error| format!("failed to delete promotion {id}: {error}"))?;

            println!("promoción {id} eliminada");
        }
    }

    Ok(())
}

async fn reservations(
    date: Option<Date>,
    status: Option<ReservationStatus>,
    runtime: &Runtime,
) -> Result<(), String> {
    let service = runtime.context().reservations.as_ref();

    let reservations = match (date, status) {
        (Some(date), _) => service.list_by_date(date).await,
        (None, Some(status)) => service.list_by_status(status).await,
        (None, None) => service.list_reservations().await,
    }
    .map_err(|error| format!("failed to load reservations: {error}"))?;

    if reservations.is_empty() {
        println!("no hay reservas");
        return Ok(());
    }

    println!("{}", output::reservations_table(&reservations));

    Ok(())
}

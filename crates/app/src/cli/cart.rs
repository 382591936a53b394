use clap::{Args, Subcommand};
use sanisidro::products::ProductId;

use super::{Runtime, output};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and its total
    Show,

    /// Add one unit of a product
    Add {
        /// Product ID
        product: i64,
    },

    /// Set the number of units of a line; zero or less removes it
    Qty {
        /// Product ID
        product: i64,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a line
    Remove {
        /// Product ID
        product: i64,
    },

    /// Set the note for the kitchen on a line
    Comment {
        /// Product ID
        product: i64,

        /// Note text
        text: String,
    },

    /// Empty the cart
    Clear,
}

pub(crate) async fn run(command: CartCommand, runtime: &Runtime) -> Result<(), String> {
    let mut store = runtime.cart();

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product } => {
            let product = runtime
                .context()
                .products
                .get_product(ProductId(product))
                .await
                .map_err(|error| format!("failed to load product {product}: {error}"))?;

            if !product.available {
                return Err(format!("{} no está disponible", product.name));
            }

            store
                .add_item(&product)
                .map_err(|error| format!("failed to update cart: {error}"))?;

            println!("agregado: {}", product.name);
        }
        CartSubcommand::Qty { product, quantity } => store
            .update_quantity(ProductId(product), quantity)
            .map_err(|error| format!("failed to update cart: {error}"))?,
        CartSubcommand::Remove { product } => store
            .remove_item(ProductId(product))
            .map_err(|error| format!("failed to update cart: {error}"))?,
        CartSubcommand::Comment { product, text } => store
            .update_comment(ProductId(product), text)
            .map_err(|error| format!("failed to update cart: {error}"))?,
        CartSubcommand::Clear => store
            .clear()
            .map_err(|error| format!("failed to update cart: {error}"))?,
    }

    let cart = store.cart();

    if cart.is_empty() {
        println!("tu carrito está vacío");
        return Ok(());
    }

    let subtotal = cart
        .total()
        .map_err(|error| format!("failed to price cart: {error}"))?;

    println!("{}", output::cart_table(cart));
    println!("Productos: {}", cart.item_count());
    println!("Subtotal: {}", sanisidro::receipt::format_soles(&subtotal));

    Ok(())
}

use clap::Args;
use sanisidro::products::Category;

use super::{Runtime, output};

#[derive(Debug, Args)]
pub(crate) struct MenuArgs {
    /// Only show one category (platos, entradas, bebidas, adicionales, cremas, postres)
    #[arg(long)]
    category: Option<String>,
}

pub(crate) async fn run(args: MenuArgs, runtime: &Runtime) -> Result<(), String> {
    let products = runtime.context().products.as_ref();

    let products = match args.category {
        Some(category) => products.list_by_category(Category::from(category)).await,
        None => products.list_products().await,
    }
    .map_err(|error| format!("failed to load menu: {error}"))?;

    if products.is_empty() {
        println!("no hay productos para mostrar");
        return Ok(());
    }

    println!("{}", output::products_table(&products));

    Ok(())
}

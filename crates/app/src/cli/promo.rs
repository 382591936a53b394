use clap::{Args, Subcommand};
use sanisidro::promotions::Promotion;

use super::{Runtime, output};

#[derive(Debug, Args)]
pub(crate) struct PromoCommand {
    #[command(subcommand)]
    command: PromoSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromoSubcommand {
    /// List the promotions currently on offer
    List,

    /// Preview what a code would take off the current cart
    Check {
        /// Promotion code
        code: String,
    },
}

pub(crate) async fn run(command: PromoCommand, runtime: &Runtime) -> Result<(), String> {
    match command.command {
        PromoSubcommand::List => list(runtime).await,
        PromoSubcommand::Check { code } => check(&code, runtime).await,
    }
}

async fn list(runtime: &Runtime) -> Result<(), String> {
    let today = runtime.config().now().date();

    let promotions: Vec<Promotion> = runtime
        .context()
        .promotions
        .list_promotions()
        .await
        .map_err(|error| format!("failed to load promotions: {error}"))?
        .into_iter()
        .filter(|promotion| promotion.is_current(today))
        .collect();

    if promotions.is_empty() {
        println!("no hay promociones vigentes");
        return Ok(());
    }

    println!("{}", output::promotions_table(&promotions));

    Ok(())
}

async fn check(code: &str, runtime: &Runtime) -> Result<(), String> {
    let mut checkout = runtime.checkout();
    let today = runtime.config().now().date();

    let promotion = checkout
        .apply_code(code, today)
        .await
        .map_err(|error| error.to_string())?;

    println!("{}: {}", promotion.code, output::describe_promotion(promotion));

    let code = promotion.code.to_string();
    let totals = checkout.totals().map_err(|error| error.to_string())?;

    for line in output::totals_lines(&totals, Some(&code)) {
        println!("{line}");
    }

    Ok(())
}

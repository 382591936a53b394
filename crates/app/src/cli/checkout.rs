use std::io;

use clap::Args;
use sanisidro::payments::{PaymentForm, PaymentMethod};

use super::Runtime;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Payment method (card, yape)
    #[arg(long)]
    method: PaymentMethod,

    /// Card number
    #[arg(long, default_value = "")]
    card_number: String,

    /// Name on the card
    #[arg(long, default_value = "")]
    card_holder: String,

    /// Card expiry, MM/YY
    #[arg(long, default_value = "")]
    card_expiry: String,

    /// Card security code
    #[arg(long, default_value = "")]
    card_cvv: String,

    /// Yape phone number
    #[arg(long, default_value = "")]
    yape_phone: String,

    /// Name on the Yape account
    #[arg(long, default_value = "")]
    yape_holder: String,

    /// Yape approval code
    #[arg(long, default_value = "")]
    yape_code: String,

    /// Promotion code to redeem
    #[arg(long)]
    code: Option<String>,
}

impl From<CheckoutArgs> for PaymentForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            method: Some(args.method),
            card_number: args.card_number,
            card_holder: args.card_holder,
            card_expiry: args.card_expiry,
            card_cvv: args.card_cvv,
            yape_phone: args.yape_phone,
            yape_holder: args.yape_holder,
            yape_code: args.yape_code,
        }
    }
}

pub(crate) async fn run(mut args: CheckoutArgs, runtime: &Runtime) -> Result<(), String> {
    let session = runtime.session();
    let mut checkout = runtime.checkout();
    let now = runtime.config().now();

    if let Some(code) = args.code.take() {
        checkout
            .apply_code(&code, now.date())
            .await
            .map_err(|error| error.to_string())?;
    }

    let payment = PaymentForm::from(args);

    let placed = checkout
        .place_order(&payment, session.user(), &now)
        .await
        .map_err(|error| error.to_string())?;

    println!("Pedido realizado exitosamente\n");

    placed
        .invoice
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to print invoice: {error}"))?;

    if let Some(counter) = placed.counter {
        let _counted = counter.await;
    }

    Ok(())
}

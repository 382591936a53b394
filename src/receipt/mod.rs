//! Receipt
//!
//! The invoice shown to the customer once an order has been accepted.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    orders::{InvoiceNumber, Order},
    payments::PaymentMethod,
    pricing::{PricingError, Soles, from_decimal, line_total, to_decimal},
};

/// Errors that can occur when building or printing an invoice.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// An amount on the order could not be converted to money.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One priced line on the invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    /// Product name
    pub name: String,

    /// Units
    pub quantity: u32,

    /// Unit price
    pub unit_price: Soles,

    /// Unit price times units
    pub total: Soles,
}

/// Display-ready invoice for an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    /// Invoice number
    pub number: InvoiceNumber,

    /// Day, `dd/mm/yyyy`
    pub date: String,

    /// Time, `HH:MM`
    pub time: String,

    /// Payment method label
    pub payment_method: String,

    /// Customer name
    pub customer_name: String,

    /// Customer phone
    pub customer_phone: Option<String>,

    /// Ordered lines
    pub lines: Vec<InvoiceLine>,

    /// Sum of line totals
    pub subtotal: Soles,

    /// Promotion discount
    pub discount: Soles,

    /// Redeemed promotion code
    pub promo_code: Option<String>,

    /// Amount payable
    pub total: Soles,
}

impl Invoice {
    /// Build the invoice for an assembled or stored order.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Pricing`] if an amount on the order is negative or unrepresentable.
    pub fn from_order(order: &Order) -> Result<Self, ReceiptError> {
        let lines = order
            .items
            .iter()
            .map(|item| {
                let unit_price = from_decimal(item.unit_price)?;

                Ok(InvoiceLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price,
                    total: line_total(&unit_price, item.quantity)?,
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        let payment_method = order.payment_method.as_deref().map_or_else(String::new, |raw| {
            raw.parse::<PaymentMethod>()
                .map_or_else(|_err| raw.to_string(), |method| method.label().to_string())
        });

        Ok(Self {
            number: order.invoice_number.clone(),
            date: order.date.strftime("%d/%m/%Y").to_string(),
            time: order.time.strftime("%H:%M").to_string(),
            payment_method,
            customer_name: order.customer.clone(),
            customer_phone: order.phone.clone(),
            lines,
            subtotal: from_decimal(order.subtotal)?,
            discount: from_decimal(order.discount)?,
            promo_code: order.promo_code.clone(),
            total: from_decimal(order.total)?,
        })
    }

    /// Prints the invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        write_invoice_header(&mut out, self)?;
        write_invoice_table(&mut out, self)?;
        write_invoice_summary(&mut out, self)
    }
}

/// Format an amount as `S/ 12.50`.
pub fn format_soles(amount: &Soles) -> String {
    format!("S/ {}", to_decimal(amount))
}

fn write_invoice_header(out: &mut impl io::Write, invoice: &Invoice) -> Result<(), ReceiptError> {
    writeln!(out, "Factura N° {}", invoice.number).map_err(|_err| ReceiptError::IO)?;
    writeln!(out, "Fecha: {}  Hora: {}", invoice.date, invoice.time)
        .map_err(|_err| ReceiptError::IO)?;
    writeln!(out, "Cliente: {}", invoice.customer_name).map_err(|_err| ReceiptError::IO)?;

    if let Some(phone) = &invoice.customer_phone {
        writeln!(out, "Teléfono: {phone}").map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out, "Método de pago: {}", invoice.payment_method).map_err(|_err| ReceiptError::IO)
}

fn write_invoice_table(out: &mut impl io::Write, invoice: &Invoice) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Producto", "Cant.", "P. Unit.", "Subtotal"]);

    for line in &invoice.lines {
        builder.push_record([
            line.name.clone(),
            line.quantity.to_string(),
            format_soles(&line.unit_price),
            format_soles(&line.total),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Columns::new(1..4), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_invoice_summary(out: &mut impl io::Write, invoice: &Invoice) -> Result<(), ReceiptError> {
    let discount_label = invoice
        .promo_code
        .as_ref()
        .map_or_else(|| "Descuento:".to_string(), |code| format!("Descuento ({code}):"));

    let rows = [
        ("Subtotal:".to_string(), format_soles(&invoice.subtotal)),
        (discount_label, format!("-{}", format_soles(&invoice.discount))),
        ("Total:".to_string(), format_soles(&invoice.total)),
    ];

    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or_default();
    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

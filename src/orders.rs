//! Orders
//!
//! Assembling the order a checkout submits. Everything on the order is a snapshot: line names
//! and prices come from the cart as it was when each product was added, and the totals are
//! fixed at assembly time.

use std::{fmt, str::FromStr};

use jiff::{
    Zoned,
    civil::{Date, Time, time},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    dates::{deserialize_date, deserialize_time},
    discounts::{DiscountError, Totals},
    payments::PaymentDetails,
    pricing::to_decimal,
    promotions::AppliedPromotion,
    users::User,
    wire::null_as_default,
};

/// Name recorded for customers who are not signed in and gave no holder name.
pub const GUEST_NAME: &str = "Cliente Invitado";

/// Errors raised while assembling an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart or discount could not be priced.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The cart snapshot could not be serialized.
    #[error("cart snapshot could not be serialized")]
    Snapshot(#[from] serde_json::Error),
}

/// Order identifier assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Human-readable invoice number, `YYYYMMDD-HHMMSS` in restaurant local time.
///
/// Two orders placed in the same second share a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Number for an order placed at `now`.
    pub fn at(now: &Zoned) -> Self {
        Self(now.strftime("%Y%m%d-%H%M%S").to_string())
    }

    /// The number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an order is in the kitchen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Received, not started
    #[default]
    #[serde(rename = "pendiente")]
    Pending,

    /// Being cooked
    #[serde(rename = "preparando")]
    Preparing,

    /// Ready for pickup
    #[serde(rename = "listo")]
    Ready,

    /// Handed over
    #[serde(rename = "entregado")]
    Delivered,

    /// Cancelled
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in kitchen order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Preparing,
        Self::Ready,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Preparing => "preparando",
            Self::Ready => "listo",
            Self::Delivered => "entregado",
            Self::Cancelled => "cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown order status.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or(UnknownOrderStatus(wanted))
    }
}

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Name on the order
    pub name: String,

    /// Contact phone
    pub phone: Option<String>,

    /// Email of the signed-in user
    pub email: Option<String>,
}

impl Customer {
    /// Resolve the customer from the payment form first, then the signed-in user, then fall
    /// back to a guest.
    pub fn resolve(payment: &PaymentDetails, user: Option<&User>) -> Self {
        let holder = payment.holder_name.trim();

        let name = if holder.is_empty() {
            user.map_or_else(|| GUEST_NAME.to_string(), |user| user.name.clone())
        } else {
            holder.to_string()
        };

        let phone = payment
            .phone
            .clone()
            .filter(|phone| !phone.trim().is_empty())
            .or_else(|| user.and_then(|user| user.phone.clone()));

        Self {
            name,
            phone,
            email: user.map(|user| user.email.clone()),
        }
    }
}

/// A line as recorded on the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product name
    #[serde(rename = "nombre")]
    pub name: String,

    /// Units ordered
    #[serde(rename = "cantidad")]
    pub quantity: u32,

    /// Unit price
    #[serde(rename = "precio")]
    pub unit_price: Decimal,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// An order, as submitted to and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Identifier, absent until stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,

    /// Customer name
    #[serde(rename = "cliente")]
    pub customer: String,

    /// Customer name, duplicated for the back office
    #[serde(rename = "nombreCliente", default)]
    pub customer_name: Option<String>,

    /// Customer email
    #[serde(default)]
    pub email: Option<String>,

    /// Customer phone
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,

    /// Invoice number
    #[serde(rename = "numeroFactura")]
    pub invoice_number: InvoiceNumber,

    /// Day the order was placed
    #[serde(rename = "fecha", deserialize_with = "deserialize_date")]
    pub date: Date,

    /// Time the order was placed
    #[serde(rename = "hora", deserialize_with = "deserialize_time")]
    pub time: Time,

    /// Sum of line totals
    pub subtotal: Decimal,

    /// Promotion discount
    #[serde(rename = "descuento", default, deserialize_with = "null_as_default")]
    pub discount: Decimal,

    /// Redeemed promotion code
    #[serde(rename = "codigoPromo", default)]
    pub promo_code: Option<String>,

    /// Amount payable
    pub total: Decimal,

    /// Kitchen status
    #[serde(rename = "estado", default, deserialize_with = "null_as_default")]
    pub status: OrderStatus,

    /// Payment method wire name
    #[serde(rename = "metodoPago", default)]
    pub payment_method: Option<String>,

    /// JSON snapshot of the cart lines
    #[serde(rename = "detalles", default)]
    pub details: Option<String>,

    /// Ordered lines; the API only fills these when it can parse `detalles`
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderLine>,
}

/// Assemble the order for `cart`.
///
/// The promotion bound in `applied`, if any, is priced in; the invoice number, date and time
/// come from `now`.
///
/// # Errors
///
/// - [`OrderError::EmptyCart`]: the cart has no lines.
/// - [`OrderError::Discount`]: the cart or its discount could not be priced.
/// - [`OrderError::Snapshot`]: the cart could not be serialized into the order.
pub fn build_order(
    cart: &Cart,
    applied: &AppliedPromotion,
    payment: &PaymentDetails,
    customer: &Customer,
    now: &Zoned,
) -> Result<Order, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let promotion = applied.promotion();
    let totals = Totals::for_cart(cart, promotion)?;

    Ok(Order {
        id: None,
        customer: customer.name.clone(),
        customer_name: Some(customer.name.clone()),
        email: customer.email.clone(),
        phone: customer.phone.clone(),
        invoice_number: InvoiceNumber::at(now),
        date: now.date(),
        time: time(now.hour(), now.minute(), now.second(), 0),
        subtotal: to_decimal(&totals.subtotal),
        discount: to_decimal(&totals.discount),
        promo_code: promotion.map(|promotion| promotion.code.to_string()),
        total: to_decimal(&totals.total),
        status: OrderStatus::Pending,
        payment_method: Some(payment.method.to_string()),
        details: Some(serde_json::to_string(cart)?),
        items: cart.lines().iter().map(OrderLine::from).collect(),
    })
}

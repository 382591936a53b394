//! Pricing
//!
//! Every amount the restaurant deals with is quoted in Peruvian soles. Prices arrive from the
//! API as decimals and are converted to [`Money`] in minor units (céntimos) so that subtotals,
//! discounts and totals never accumulate floating point error.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;

/// Currency used for every price, discount and total.
pub const CURRENCY: &Currency = iso::PEN;

/// Number of decimal places in a sol.
const MINOR_SCALE: u32 = 2;

/// An amount of money in soles.
pub type Soles = Money<'static, Currency>;

/// Errors that can occur while converting or summing amounts.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The amount cannot be represented as a whole number of céntimos.
    #[error("amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),

    /// A negative amount was supplied where only non-negative amounts make sense.
    #[error("amount {0} is negative")]
    Negative(Decimal),

    /// Multiplying a price by a quantity overflowed.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Build an amount from a number of céntimos.
pub fn soles(minor: i64) -> Soles {
    Money::from_minor(minor, CURRENCY)
}

/// Zero soles.
pub fn zero() -> Soles {
    soles(0)
}

/// Convert a decimal amount of soles to céntimos, rounding half away from zero.
///
/// # Errors
///
/// - [`PricingError::Negative`]: the amount is below zero.
/// - [`PricingError::Unrepresentable`]: the amount does not fit in an `i64` of céntimos.
pub fn to_minor(amount: Decimal) -> Result<i64, PricingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::Negative(amount));
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(PricingError::Unrepresentable(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::Unrepresentable(amount))
}

/// Convert a decimal amount of soles to [`Soles`].
///
/// # Errors
///
/// See [`to_minor`].
pub fn from_decimal(amount: Decimal) -> Result<Soles, PricingError> {
    Ok(soles(to_minor(amount)?))
}

/// Convert an amount back to a two-decimal [`Decimal`] for the wire.
pub fn to_decimal(amount: &Soles) -> Decimal {
    Decimal::new(amount.to_minor_units(), MINOR_SCALE)
}

/// Price of `quantity` units at `unit_price` each.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in an `i64`.
pub fn line_total(unit_price: &Soles, quantity: u32) -> Result<Soles, PricingError> {
    unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(soles)
        .ok_or(PricingError::Overflow)
}

/// Sum a sequence of amounts. An empty sequence sums to zero.
///
/// # Errors
///
/// Returns [`PricingError::Money`] on money arithmetic failure.
pub fn total_price(amounts: impl IntoIterator<Item = Soles>) -> Result<Soles, PricingError> {
    let total = amounts
        .into_iter()
        .try_fold(zero(), |acc, amount| acc.add(amount))?;

    Ok(total)
}

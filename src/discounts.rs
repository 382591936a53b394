//! Discounts
//!
//! Discount amounts for an applied promotion, and the subtotal/discount/total breakdown a cart
//! is checked out with.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::MoneyError;
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{PricingError, Soles, soles, zero},
    promotions::{Promotion, PromotionKind},
};

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate `percent` of an amount in minor units, rounding half away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result cannot be represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Discount the applied promotion takes off `cart`.
///
/// - No promotion: zero.
/// - [`PromotionKind::PercentageGeneral`]: the rate applied to the cart subtotal.
/// - [`PromotionKind::PercentageProduct`]: the rate applied to the matching lines only.
/// - [`PromotionKind::FixedAmount`]: the amount, capped at the subtotal.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the cart cannot be priced or the rate overflows.
pub fn compute_discount(
    promotion: Option<&Promotion>,
    cart: &Cart,
) -> Result<Soles, DiscountError> {
    let Some(promotion) = promotion else {
        return Ok(zero());
    };

    let subtotal = cart.total()?.to_minor_units();

    let discount = match &promotion.kind {
        PromotionKind::PercentageGeneral(percent) => percent_of_minor(percent, subtotal)?,
        PromotionKind::PercentageProduct { percent, products } => {
            percent_of_minor(percent, cart.total_for(products)?.to_minor_units())?
        }
        PromotionKind::FixedAmount(amount) => amount.to_minor_units(),
    };

    Ok(soles(discount.clamp(0, subtotal)))
}

/// Subtotal, discount and total of a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of line totals
    pub subtotal: Soles,

    /// Amount taken off by the promotion
    pub discount: Soles,

    /// Amount payable
    pub total: Soles,
}

impl Totals {
    /// Work out the totals for `cart` with an optional promotion.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if pricing or discount calculation fails.
    pub fn for_cart(cart: &Cart, promotion: Option<&Promotion>) -> Result<Self, DiscountError> {
        let subtotal = cart.total()?;
        let discount = compute_discount(promotion, cart)?;
        let total = subtotal.sub(discount)?;

        Ok(Self {
            subtotal,
            discount,
            total,
        })
    }
}

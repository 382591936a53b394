//! Promotion eligibility

use jiff::civil::Date;
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{PricingError, Soles, to_decimal},
    promotions::Promotion,
};

/// Reasons a promotion code cannot be applied to a cart.
///
/// The display text is the message shown to the customer; [`EligibilityError::code`] is a
/// stable identifier for programmatic use.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EligibilityError {
    /// No code was entered.
    #[error("Por favor ingresa un código")]
    EmptyCode,

    /// No promotion exists for the code.
    #[error("Código inválido")]
    CodeNotFound(String),

    /// The promotion has been switched off.
    #[error("Esta promoción no está activa")]
    PromotionInactive,

    /// The promotion's first day is after today.
    #[error("Esta promoción aún no ha comenzado")]
    NotStarted {
        /// First valid day
        starts_on: Date,
    },

    /// The promotion's last day is before today.
    #[error("Esta promoción ha expirado")]
    Expired {
        /// Last valid day
        ended_on: Date,
    },

    /// The cart subtotal is below the promotion's minimum.
    #[error("Monto mínimo requerido: S/ {}", to_decimal(.required))]
    BelowMinAmount {
        /// Required subtotal
        required: Soles,

        /// Actual subtotal
        subtotal: Soles,
    },

    /// The cart has fewer units than the promotion requires.
    #[error("Cantidad mínima requerida: {required} productos")]
    BelowMinQuantity {
        /// Required number of units
        required: u32,

        /// Units in the cart
        count: u64,
    },

    /// None of the promotion's products are in the cart.
    #[error("Esta promoción no aplica a los productos en tu carrito")]
    NotApplicableToCart,

    /// The cart could not be priced.
    #[error("No se pudo calcular el total del carrito: {0}")]
    InvalidCart(String),
}

impl From<PricingError> for EligibilityError {
    fn from(error: PricingError) -> Self {
        Self::InvalidCart(error.to_string())
    }
}

impl EligibilityError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCode => "EMPTY_CODE",
            Self::CodeNotFound(_) => "CODE_NOT_FOUND",
            Self::PromotionInactive => "PROMOTION_INACTIVE",
            Self::NotStarted { .. } => "NOT_STARTED",
            Self::Expired { .. } => "EXPIRED",
            Self::BelowMinAmount { .. } => "BELOW_MIN_AMOUNT",
            Self::BelowMinQuantity { .. } => "BELOW_MIN_QUANTITY",
            Self::NotApplicableToCart => "NOT_APPLICABLE_TO_CART",
            Self::InvalidCart(_) => "INVALID_CART",
        }
    }
}

/// Check whether `promotion` can be redeemed against `cart` on `today`.
///
/// Checks run in a fixed order and stop at the first failure: active flag, start date, end
/// date, minimum amount, minimum quantity, then product scope. Date bounds are inclusive and a
/// missing bound never fails.
///
/// # Errors
///
/// Returns the first [`EligibilityError`] that applies.
pub fn check_eligibility(
    promotion: &Promotion,
    cart: &Cart,
    today: Date,
) -> Result<(), EligibilityError> {
    if !promotion.active {
        return Err(EligibilityError::PromotionInactive);
    }

    if let Some(starts_on) = promotion.starts_on.filter(|start| *start > today) {
        return Err(EligibilityError::NotStarted { starts_on });
    }

    if let Some(ended_on) = promotion.ends_on.filter(|end| *end < today) {
        return Err(EligibilityError::Expired { ended_on });
    }

    let required = promotion.min_amount;

    if required.to_minor_units() > 0 {
        let subtotal = cart.total()?;

        if subtotal.to_minor_units() < required.to_minor_units() {
            return Err(EligibilityError::BelowMinAmount { required, subtotal });
        }
    }

    let count = cart.item_count();

    if promotion.min_quantity > 0 && count < u64::from(promotion.min_quantity) {
        return Err(EligibilityError::BelowMinQuantity {
            required: promotion.min_quantity,
            count,
        });
    }

    if promotion
        .kind
        .products()
        .is_some_and(|products| !cart.contains_any(products))
    {
        return Err(EligibilityError::NotApplicableToCart);
    }

    Ok(())
}

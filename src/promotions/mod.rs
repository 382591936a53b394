//! Promotions
//!
//! Promotion codes customers can redeem against their cart. A [`Promotion`] is the validated
//! form of the API's [`PromotionRecord`]; the conversion happens once at the client boundary so
//! that eligibility checks and discount maths only ever see well-formed values.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{cart::Cart, pricing::Soles, products::ProductId};

pub mod eligibility;
pub mod records;

pub use eligibility::{EligibilityError, check_eligibility};
pub use records::{ApplicableProducts, PromotionRecord, PromotionRecordError};

/// Promotion identifier assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromotionId(pub i64);

impl fmt::Display for PromotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A redeemable code, trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromotionCode(String);

impl PromotionCode {
    /// Normalize user input into a code.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError::EmptyCode`] if the input is empty or only whitespace.
    pub fn parse(raw: &str) -> Result<Self, EligibilityError> {
        let code = raw.trim();

        if code.is_empty() {
            return Err(EligibilityError::EmptyCode);
        }

        Ok(Self(code.to_uppercase()))
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromotionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a promotion takes off and which lines it applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionKind {
    /// A percentage off the whole cart subtotal.
    PercentageGeneral(Percentage),

    /// A percentage off the lines for the listed products only.
    PercentageProduct {
        /// Discount rate
        percent: Percentage,

        /// Products the rate applies to
        products: SmallVec<[ProductId; 4]>,
    },

    /// A fixed amount off the subtotal, never more than the subtotal itself.
    FixedAmount(Soles),
}

impl PromotionKind {
    /// Products a product-scoped promotion is restricted to.
    pub fn products(&self) -> Option<&[ProductId]> {
        match self {
            Self::PercentageProduct { products, .. } => Some(products),
            Self::PercentageGeneral(_) | Self::FixedAmount(_) => None,
        }
    }
}

/// A validated promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    /// Identifier, absent until the API has stored it
    pub id: Option<PromotionId>,

    /// Redeemable code
    pub code: PromotionCode,

    /// Headline shown to customers
    pub title: String,

    /// Longer description
    pub description: String,

    /// Discount rule
    pub kind: PromotionKind,

    /// Minimum cart subtotal, zero for none
    pub min_amount: Soles,

    /// Minimum number of units in the cart, zero for none
    pub min_quantity: u32,

    /// Whether the promotion can currently be redeemed
    pub active: bool,

    /// First day the promotion is valid, inclusive
    pub starts_on: Option<Date>,

    /// Last day the promotion is valid, inclusive
    pub ends_on: Option<Date>,

    /// Banner image reference
    pub image: Option<String>,
}

impl Promotion {
    /// Check whether this promotion can be redeemed against `cart` on `today`.
    ///
    /// # Errors
    ///
    /// See [`check_eligibility`].
    pub fn check(&self, cart: &Cart, today: Date) -> Result<(), EligibilityError> {
        check_eligibility(self, cart, today)
    }

    /// Returns `true` if the promotion is active and `today` falls inside its date window.
    pub fn is_current(&self, today: Date) -> bool {
        self.active
            && self.starts_on.is_none_or(|start| start <= today)
            && self.ends_on.is_none_or(|end| end >= today)
    }
}

/// Convert a fractional rate back to percent points (`0.1` becomes `10`).
pub fn percent_points(percent: Percentage) -> Decimal {
    (percent * Decimal::ONE_HUNDRED).normalize()
}

/// The promotion currently bound to a cart session, and the last rejection message.
///
/// At most one promotion is bound at a time. A successful application replaces the previous
/// one; a rejected one leaves it in place and records the error.
#[derive(Debug, Default)]
pub struct AppliedPromotion {
    promotion: Option<Promotion>,
    error: Option<EligibilityError>,
}

impl AppliedPromotion {
    /// A session with nothing applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound promotion, if any.
    pub fn promotion(&self) -> Option<&Promotion> {
        self.promotion.as_ref()
    }

    /// The error from the last failed application, if any.
    pub fn error(&self) -> Option<&EligibilityError> {
        self.error.as_ref()
    }

    /// Validate `promotion` against `cart` and bind it on success.
    ///
    /// # Errors
    ///
    /// Returns the [`EligibilityError`] from [`check_eligibility`]; it is also kept in
    /// [`AppliedPromotion::error`].
    pub fn apply(
        &mut self,
        promotion: Promotion,
        cart: &Cart,
        today: Date,
    ) -> Result<&Promotion, EligibilityError> {
        if let Err(error) = promotion.check(cart, today) {
            self.reject(error.clone());

            return Err(error);
        }

        self.error = None;

        Ok(self.promotion.insert(promotion))
    }

    /// Record a failure that happened before a promotion could be checked.
    pub fn reject(&mut self, error: EligibilityError) {
        self.error = Some(error);
    }

    /// Drop the bound promotion and any pending error.
    pub fn clear(&mut self) {
        self.promotion = None;
        self.error = None;
    }
}

//! Promotion wire records

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    dates::deserialize_optional_date,
    pricing::{PricingError, from_decimal, to_decimal},
    products::ProductId,
    promotions::{
        Promotion, PromotionCode, PromotionId, PromotionKind, percent_points,
    },
};

const KIND_GENERAL: &str = "general";
const KIND_PRODUCT: &str = "producto";
const KIND_FIXED_AMOUNT: &str = "monto_fijo";

/// Errors raised while validating a promotion record.
#[derive(Debug, Error, PartialEq)]
pub enum PromotionRecordError {
    /// The record has no code.
    #[error("promotion has no code")]
    MissingCode,

    /// `tipoPromocion` is not a known kind.
    #[error("unknown promotion kind: {0}")]
    UnknownKind(String),

    /// A percentage discount is outside 0 to 100.
    #[error("discount percentage {0} is outside 0 to 100")]
    PercentOutOfRange(Decimal),

    /// `productosAplicables` contains something that is not a product id.
    #[error("invalid applicable product id: {0:?}")]
    InvalidProductId(String),

    /// An amount could not be converted to money.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Products a promotion applies to, as either a comma-separated string or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicableProducts {
    /// `"1,2,3"`
    Csv(String),

    /// `[1, 2, 3]`
    Ids(Vec<i64>),
}

impl ApplicableProducts {
    /// Parse into product ids, skipping empty entries.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionRecordError::InvalidProductId`] for an entry that is not an integer.
    pub fn product_ids(&self) -> Result<SmallVec<[ProductId; 4]>, PromotionRecordError> {
        match self {
            Self::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(|entry| {
                    entry
                        .parse::<i64>()
                        .map(ProductId)
                        .map_err(|_err| PromotionRecordError::InvalidProductId(entry.to_string()))
                })
                .collect(),
            Self::Ids(ids) => Ok(ids.iter().copied().map(ProductId).collect()),
        }
    }
}

impl From<&[ProductId]> for ApplicableProducts {
    fn from(products: &[ProductId]) -> Self {
        Self::Csv(
            products
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// A promotion as the API sends and receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    /// Identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PromotionId>,

    /// Redeemable code
    #[serde(rename = "codigo")]
    pub code: String,

    /// Headline
    #[serde(rename = "titulo", default)]
    pub title: String,

    /// Description
    #[serde(rename = "descripcion", default)]
    pub description: String,

    /// Percent points, or an amount in soles for fixed-amount promotions
    #[serde(rename = "descuento")]
    pub discount: Decimal,

    /// `general`, `producto` or `monto_fijo`; absent means `general`
    #[serde(rename = "tipoPromocion", default)]
    pub kind: Option<String>,

    /// Products a `producto` promotion applies to
    #[serde(rename = "productosAplicables", default)]
    pub applicable_products: Option<ApplicableProducts>,

    /// Minimum subtotal
    #[serde(rename = "montoMinimo", default)]
    pub min_amount: Option<Decimal>,

    /// Minimum number of units
    #[serde(rename = "cantidadMinima", default)]
    pub min_quantity: Option<i64>,

    /// First valid day
    #[serde(
        rename = "fechaInicio",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub starts_on: Option<Date>,

    /// Last valid day
    #[serde(
        rename = "fechaFin",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub ends_on: Option<Date>,

    /// Whether the promotion is enabled
    #[serde(rename = "activa", default)]
    pub active: Option<bool>,

    /// Banner image
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
}

impl TryFrom<PromotionRecord> for Promotion {
    type Error = PromotionRecordError;

    fn try_from(record: PromotionRecord) -> Result<Self, Self::Error> {
        let code =
            PromotionCode::parse(&record.code).map_err(|_err| PromotionRecordError::MissingCode)?;

        let kind = match record.kind.as_deref().map(str::trim) {
            None | Some(KIND_GENERAL) => {
                PromotionKind::PercentageGeneral(percentage(record.discount)?)
            }
            Some(KIND_PRODUCT) => PromotionKind::PercentageProduct {
                percent: percentage(record.discount)?,
                products: record
                    .applicable_products
                    .as_ref()
                    .map(ApplicableProducts::product_ids)
                    .transpose()?
                    .unwrap_or_default(),
            },
            Some(KIND_FIXED_AMOUNT) => PromotionKind::FixedAmount(from_decimal(record.discount)?),
            Some(other) => return Err(PromotionRecordError::UnknownKind(other.to_string())),
        };

        let min_quantity = record
            .min_quantity
            .map_or(0, |min| u32::try_from(min.max(0)).unwrap_or(u32::MAX));

        Ok(Self {
            id: record.id,
            code,
            title: record.title,
            description: record.description,
            kind,
            min_amount: from_decimal(record.min_amount.unwrap_or_default())?,
            min_quantity,
            active: record.active.unwrap_or_default(),
            starts_on: record.starts_on,
            ends_on: record.ends_on,
            image: record.image,
        })
    }
}

impl From<&Promotion> for PromotionRecord {
    fn from(promotion: &Promotion) -> Self {
        let (kind, discount, applicable_products) = match &promotion.kind {
            PromotionKind::PercentageGeneral(percent) => {
                (KIND_GENERAL, percent_points(*percent), None)
            }
            PromotionKind::PercentageProduct { percent, products } => (
                KIND_PRODUCT,
                percent_points(*percent),
                Some(ApplicableProducts::from(products.as_slice())),
            ),
            PromotionKind::FixedAmount(amount) => (KIND_FIXED_AMOUNT, to_decimal(amount), None),
        };

        Self {
            id: promotion.id,
            code: promotion.code.to_string(),
            title: promotion.title.clone(),
            description: promotion.description.clone(),
            discount,
            kind: Some(kind.to_string()),
            applicable_products,
            min_amount: Some(to_decimal(&promotion.min_amount)),
            min_quantity: Some(i64::from(promotion.min_quantity)),
            starts_on: promotion.starts_on,
            ends_on: promotion.ends_on,
            active: Some(promotion.active),
            image: promotion.image.clone(),
        }
    }
}

fn percentage(points: Decimal) -> Result<Percentage, PromotionRecordError> {
    if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
        return Err(PromotionRecordError::PercentOutOfRange(points));
    }

    Ok(Percentage::from(points / Decimal::ONE_HUNDRED))
}

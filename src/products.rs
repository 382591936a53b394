//! Products

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    pricing::{PricingError, Soles, from_decimal},
    validation::ValidationErrors,
    wire::null_as_default,
};

/// Product identifier assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Menu category.
///
/// The API stores categories as free strings; values it adds later are kept verbatim in
/// [`Category::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Main dishes
    Mains,

    /// Starters
    Starters,

    /// Drinks
    Drinks,

    /// Side orders and extras
    Extras,

    /// Creams and sauces
    Sauces,

    /// Desserts
    Desserts,

    /// Any other category
    Other(String),
}

impl Category {
    /// Wire name of the category.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mains => "platos",
            Self::Starters => "entradas",
            Self::Drinks => "bebidas",
            Self::Extras => "adicionales",
            Self::Sauces => "cremas",
            Self::Desserts => "postres",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "platos" => Self::Mains,
            "entradas" => Self::Starters,
            "bebidas" => Self::Drinks,
            "adicionales" => Self::Extras,
            "cremas" => Self::Sauces,
            "postres" => Self::Desserts,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A menu product, as served by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Display name
    #[serde(rename = "nombre")]
    pub name: String,

    /// Description
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,

    /// Unit price in soles
    #[serde(rename = "precio")]
    pub price: Decimal,

    /// Menu category
    #[serde(rename = "categoria")]
    pub category: Category,

    /// Whether the kitchen is currently serving it. Missing means available; `null` does not.
    #[serde(
        rename = "disponible",
        default = "available_by_default",
        deserialize_with = "null_as_default"
    )]
    pub available: bool,

    /// Image reference
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
}

/// A product as the back office creates or replaces it; the API assigns the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Display name
    #[serde(rename = "nombre")]
    pub name: String,

    /// Description
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,

    /// Unit price in soles
    #[serde(rename = "precio")]
    pub price: Decimal,

    /// Menu category
    #[serde(rename = "categoria")]
    pub category: Category,

    /// Whether the kitchen is serving it
    #[serde(rename = "disponible", default = "available_by_default")]
    pub available: bool,

    /// Image reference
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
}

impl ProductDraft {
    /// Check the draft can go on the menu.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] for a blank name or a negative or unrepresentable price.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("nombre", "El nombre es requerido");
        }

        if from_decimal(self.price).is_err() {
            errors.add("precio", "El precio debe ser un monto válido");
        }

        errors.into_result(())
    }
}

impl From<Product> for ProductDraft {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            available: product.available,
            image: product.image,
        }
    }
}

fn available_by_default() -> bool {
    true
}

impl Product {
    /// Unit price as money.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the API sent a negative or unrepresentable price.
    pub fn unit_price(&self) -> Result<Soles, PricingError> {
        from_decimal(self.price)
    }
}

//! Cart
//!
//! The in-memory shopping cart. A cart holds at most one line per product; adding the same
//! product again bumps that line's quantity. Lines snapshot the product's name, price and image
//! at the moment they are added, and that snapshot is what the order is priced from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    pricing::{PricingError, Soles, from_decimal, line_total, total_price},
    products::{Product, ProductId},
};

mod store;

pub use store::{CartStore, CartStoreError};

/// A single product line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product the line was added from
    #[serde(rename = "id")]
    pub product_id: ProductId,

    /// Product name when it was added
    #[serde(rename = "nombre")]
    pub name: String,

    /// Unit price when it was added
    #[serde(rename = "precio")]
    pub unit_price: Decimal,

    /// Product image when it was added
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,

    /// Number of units, always at least one
    #[serde(rename = "cantidad")]
    pub quantity: u32,

    /// Free-text note for the kitchen
    #[serde(rename = "comentarios", default)]
    pub comment: String,
}

impl CartLine {
    /// Unit price as money.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the stored price is negative or unrepresentable.
    pub fn price(&self) -> Result<Soles, PricingError> {
        from_decimal(self.unit_price)
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the price is invalid or the product overflows.
    pub fn total(&self) -> Result<Soles, PricingError> {
        line_total(&self.price()?, self.quantity)
    }
}

/// An ordered list of cart lines, unique by product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for `product_id`.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Returns `true` if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`.
    ///
    /// A product already in the cart has its quantity incremented and keeps its original
    /// snapshot; otherwise a new line with quantity 1 and an empty comment is appended.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the product's price is negative or unrepresentable. The
    /// cart is unchanged in that case.
    pub fn add_item(&mut self, product: &Product) -> Result<(), PricingError> {
        product.unit_price()?;

        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);

            return Ok(());
        }

        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            quantity: 1,
            comment: String::new(),
        });

        Ok(())
    }

    /// Set the quantity of a line. Zero or a negative quantity removes the line; an unknown
    /// product is ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);

            return;
        }

        if let Some(line) = self.line_mut(product_id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove the line for `product_id`, if present.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Replace the comment on a line; an unknown product is ignored.
    pub fn update_comment(&mut self, product_id: ProductId, comment: impl Into<String>) {
        if let Some(line) = self.line_mut(product_id) {
            line.comment = comment.into();
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price times quantity over every line. Zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line price is invalid or the sum overflows.
    pub fn total(&self) -> Result<Soles, PricingError> {
        total_price(
            self.lines
                .iter()
                .map(CartLine::total)
                .collect::<Result<Vec<_>, _>>()?,
        )
    }

    /// Total of the lines whose product is in `products`.
    ///
    /// # Errors
    ///
    /// See [`Cart::total`].
    pub fn total_for(&self, products: &[ProductId]) -> Result<Soles, PricingError> {
        total_price(
            self.lines
                .iter()
                .filter(|line| products.contains(&line.product_id))
                .map(CartLine::total)
                .collect::<Result<Vec<_>, _>>()?,
        )
    }

    /// Returns `true` if at least one line is for a product in `products`.
    pub fn contains_any(&self, products: &[ProductId]) -> bool {
        self.lines
            .iter()
            .any(|line| products.contains(&line.product_id))
    }

    /// Sum of quantities over every line.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Restore the one-line-per-product invariant on a cart read back from storage.
    ///
    /// Lines for the same product are merged into the first one, adding up their quantities and
    /// keeping the first non-empty comment. Lines with no units are dropped.
    pub(crate) fn normalize(&mut self) {
        let mut lines: Vec<CartLine> = Vec::with_capacity(self.lines.len());

        for line in self.lines.drain(..).filter(|line| line.quantity > 0) {
            match lines
                .iter_mut()
                .find(|kept| kept.product_id == line.product_id)
            {
                Some(kept) => {
                    kept.quantity = kept.quantity.saturating_add(line.quantity);

                    if kept.comment.is_empty() {
                        kept.comment = line.comment;
                    }
                }
                None => lines.push(line),
            }
        }

        self.lines = lines;
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

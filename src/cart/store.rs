//! Persistent cart

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::Cart,
    pricing::PricingError,
    products::{Product, ProductId},
    storage::{CART_KEY, Storage, StorageError, load_json, save_json},
};

/// Errors raised while adding to a persistent cart.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The product could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The cart changed but could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A [`Cart`] that writes itself to storage after every change.
///
/// Mutations are applied in memory first. If persisting then fails the error is returned, but
/// the in-memory change is kept.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
}

impl<S: Storage> CartStore<S> {
    /// Restore the cart saved in `storage`, or start empty.
    ///
    /// A cart that cannot be read or decoded is discarded with a warning. Duplicate lines for a
    /// product are merged and empty lines dropped.
    pub fn load(storage: S) -> Self {
        let cart = match load_json::<Cart>(&storage, CART_KEY) {
            Ok(Some(mut cart)) => {
                let stored = cart.lines().len();

                cart.normalize();

                if cart.lines().len() != stored {
                    warn!(stored, kept = cart.lines().len(), "repaired saved cart");
                }

                debug!(lines = cart.lines().len(), "restored cart");

                cart
            }
            Ok(None) => Cart::new(),
            Err(error) => {
                warn!(%error, "discarding unreadable cart");

                Cart::new()
            }
        };

        Self { cart, storage }
    }

    /// Current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Borrow the backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of `product` and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the product cannot be priced or the cart cannot be saved.
    pub fn add_item(&mut self, product: &Product) -> Result<(), CartStoreError> {
        self.cart.add_item(product)?;
        self.persist()?;

        Ok(())
    }

    /// Set a line's quantity and persist. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart cannot be saved.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), StorageError> {
        self.cart.update_quantity(product_id, quantity);
        self.persist()
    }

    /// Remove a line and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart cannot be saved.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), StorageError> {
        self.cart.remove_item(product_id);
        self.persist()
    }

    /// Replace a line's comment and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart cannot be saved.
    pub fn update_comment(
        &mut self,
        product_id: ProductId,
        comment: impl Into<String>,
    ) -> Result<(), StorageError> {
        self.cart.update_comment(product_id, comment);
        self.persist()
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart cannot be saved.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        save_json(&mut self.storage, CART_KEY, &self.cart)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{products::Category, storage::MemoryStorage};

    use super::*;

    fn product(id: i64, price_minor: i64) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Plato {id}"),
            description: None,
            price: Decimal::new(price_minor, 2),
            category: Category::Mains,
            available: true,
            image: Some(format!("plato-{id}.jpg")),
        }
    }

    #[derive(Debug, Default)]
    struct ReadOnlyStorage;

    impl Storage for ReadOnlyStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(io::Error::other("quota exceeded")))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn starts_empty_without_saved_cart() {
        let store = CartStore::load(MemoryStorage::new());

        assert!(store.cart().is_empty());
    }

    #[test]
    fn persisted_cart_reloads_identically() -> TestResult {
        let mut store = CartStore::load(MemoryStorage::new());

        store.add_item(&product(1, 4500))?;
        store.add_item(&product(2, 650))?;
        store.update_quantity(ProductId(2), 3)?;
        store.update_comment(ProductId(1), "término medio")?;

        let reloaded = CartStore::load(store.storage().clone());

        assert_eq!(reloaded.cart(), store.cart());

        Ok(())
    }

    #[test]
    fn every_mutation_is_saved() -> TestResult {
        let mut store = CartStore::load(MemoryStorage::new());

        store.add_item(&product(1, 4500))?;
        store.remove_item(ProductId(1))?;

        assert_eq!(store.storage().load(CART_KEY)?.as_deref(), Some("[]"));

        store.add_item(&product(1, 4500))?;
        store.clear()?;

        assert_eq!(store.storage().load(CART_KEY)?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn corrupt_saved_cart_is_treated_as_empty() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.save(CART_KEY, "{\"lines\": 3")?;

        let store = CartStore::load(storage);

        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn saved_cart_with_duplicates_and_empty_lines_is_repaired() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.save(
            CART_KEY,
            r#"[
                {"id": 1, "nombre": "Lomo Saltado", "precio": 45.0, "cantidad": 1, "comentarios": ""},
                {"id": 2, "nombre": "Chicha Morada", "precio": 6.5, "cantidad": 0},
                {"id": 1, "nombre": "Lomo Saltado", "precio": 45.0, "cantidad": 2, "comentarios": "sin cebolla"}
            ]"#,
        )?;

        let store = CartStore::load(storage);
        let lines = store.cart().lines();

        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines
                .first()
                .map(|line| (line.product_id, line.quantity, line.comment.as_str())),
            Some((ProductId(1), 3, "sin cebolla"))
        );
        assert_eq!(store.cart().total()?, crate::pricing::soles(13_500));

        Ok(())
    }

    #[test]
    fn save_failure_is_reported_but_change_is_kept() {
        let mut store = CartStore::load(ReadOnlyStorage);

        let result = store.add_item(&product(1, 4500));

        assert!(matches!(result, Err(CartStoreError::Storage(_))));
        assert_eq!(store.cart().item_count(), 1);
    }
}

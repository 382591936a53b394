//! Back office
//!
//! The API's `PUT` endpoints replace whole resources, so every edit here is a read, a change to
//! the requested fields, and a write of the full resource back.

use std::{fmt, sync::Arc};

use jiff::civil::Date;
use rust_decimal::Decimal;
use sanisidro::{
    orders::{Order, OrderId, OrderStatus},
    products::{Category, Product, ProductDraft, ProductId},
    promotions::{ApplicableProducts, Promotion, PromotionId, PromotionRecord, PromotionRecordError},
    reservations::{Reservation, ReservationId, ReservationStatus},
    users::{User, UserId},
    validation::ValidationErrors,
};
use thiserror::Error;
use tracing::info;

use crate::{
    api::ApiError,
    context::AppContext,
    domain::{
        orders::OrdersService, products::ProductsService, promotions::PromotionsService,
        reservations::ReservationsService, users::UsersService,
    },
};

/// Errors raised by back-office operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The edited product is not valid.
    #[error("{0}")]
    InvalidProduct(#[from] ValidationErrors),

    /// The edited promotion is not valid.
    #[error("invalid promotion: {0}")]
    InvalidPromotion(#[from] PromotionRecordError),

    /// The API could not be reached or refused the change.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Fields to change on a product; `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New price in soles
    pub price: Option<Decimal>,

    /// New category
    pub category: Option<Category>,

    /// New availability
    pub available: Option<bool>,

    /// New image reference
    pub image: Option<String>,
}

impl ProductChanges {
    fn apply(self, draft: &mut ProductDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }

        if let Some(description) = self.description {
            draft.description = Some(description);
        }

        if let Some(price) = self.price {
            draft.price = price;
        }

        if let Some(category) = self.category {
            draft.category = category;
        }

        if let Some(available) = self.available {
            draft.available = available;
        }

        if let Some(image) = self.image {
            draft.image = Some(image);
        }
    }
}

/// Fields to change on a promotion; `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct PromotionChanges {
    /// New headline
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New percent points, or soles for fixed-amount promotions
    pub discount: Option<Decimal>,

    /// New kind (`general`, `producto`, `monto_fijo`)
    pub kind: Option<String>,

    /// New comma-separated product IDs
    pub products: Option<String>,

    /// New minimum subtotal
    pub min_amount: Option<Decimal>,

    /// New minimum number of units
    pub min_quantity: Option<i64>,

    /// New first valid day
    pub starts_on: Option<Date>,

    /// New last valid day
    pub ends_on: Option<Date>,

    /// Switch on or off
    pub active: Option<bool>,
}

impl PromotionChanges {
    fn apply(self, record: &mut PromotionRecord) {
        if let Some(title) = self.title {
            record.title = title;
        }

        if let Some(description) = self.description {
            record.description = description;
        }

        if let Some(discount) = self.discount {
            record.discount = discount;
        }

        if let Some(kind) = self.kind {
            record.kind = Some(kind);
        }

        if let Some(products) = self.products {
            record.applicable_products = Some(ApplicableProducts::Csv(products));
        }

        if self.min_amount.is_some() {
            record.min_amount = self.min_amount;
        }

        if self.min_quantity.is_some() {
            record.min_quantity = self.min_quantity;
        }

        if self.starts_on.is_some() {
            record.starts_on = self.starts_on;
        }

        if self.ends_on.is_some() {
            record.ends_on = self.ends_on;
        }

        if self.active.is_some() {
            record.active = self.active;
        }
    }
}

/// Catalogue, promotion, account, order and reservation management.
pub struct AdminService {
    products: Arc<dyn ProductsService>,
    promotions: Arc<dyn PromotionsService>,
    users: Arc<dyn UsersService>,
    orders: Arc<dyn OrdersService>,
    reservations: Arc<dyn ReservationsService>,
}

impl fmt::Debug for AdminService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminService").finish_non_exhaustive()
    }
}

impl AdminService {
    /// Build from the application's services.
    #[must_use]
    pub fn new(context: &AppContext) -> Self {
        Self {
            products: Arc::clone(&context.products),
            promotions: Arc::clone(&context.promotions),
            users: Arc::clone(&context.users),
            orders: Arc::clone(&context.orders),
            reservations: Arc::clone(&context.reservations),
        }
    }

    /// Validate and add a product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidProduct`] before any request if the draft is invalid.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, AdminError> {
        draft.validate()?;

        Ok(self.products.create_product(draft).await?)
    }

    /// Change some fields of a product.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidProduct`] without writing if the result is invalid.
    #[tracing::instrument(name = "admin.update_product", skip(self, changes), err)]
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, AdminError> {
        let mut draft = ProductDraft::from(self.products.get_product(id).await?);

        changes.apply(&mut draft);
        draft.validate()?;

        Ok(self.products.update_product(id, draft).await?)
    }

    /// Flip whether a product is being served.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the product cannot be read or written.
    #[tracing::instrument(name = "admin.toggle_product", skip(self), err)]
    pub async fn toggle_product(&self, id: ProductId) -> Result<Product, AdminError> {
        let mut draft = ProductDraft::from(self.products.get_product(id).await?);

        draft.available = !draft.available;

        let updated = self.products.update_product(id, draft).await?;

        info!(product_id = %id, available = updated.available, "toggled product");

        Ok(updated)
    }

    /// Remove a product from the menu.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the API refuses.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), AdminError> {
        Ok(self.products.delete_product(id).await?)
    }

    /// Validate and add a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidPromotion`] before any request if the record is unusable.
    pub async fn create_promotion(&self, record: PromotionRecord) -> Result<Promotion, AdminError> {
        Promotion::try_from(record.clone())?;

        Ok(self.promotions.create_promotion(record).await?)
    }

    /// Change some fields of a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidPromotion`] without writing if the result is unusable.
    #[tracing::instrument(name = "admin.update_promotion", skip(self, changes), err)]
    pub async fn update_promotion(
        &self,
        id: PromotionId,
        changes: PromotionChanges,
    ) -> Result<Promotion, AdminError> {
        let current = self.promotions.get_promotion(id).await?;
        let mut record = PromotionRecord::from(&current);

        changes.apply(&mut record);
        Promotion::try_from(record.clone())?;

        Ok(self.promotions.update_promotion(id, record).await?)
    }

    /// Switch a promotion on or off.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the promotion cannot be read or written.
    pub async fn toggle_promotion(&self, id: PromotionId) -> Result<Promotion, AdminError> {
        let current = self.promotions.get_promotion(id).await?;
        let mut record = PromotionRecord::from(&current);

        record.active = Some(!current.active);

        Ok(self.promotions.update_promotion(id, record).await?)
    }

    /// Remove a promotion.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the API refuses.
    pub async fn delete_promotion(&self, id: PromotionId) -> Result<(), AdminError> {
        Ok(self.promotions.delete_promotion(id).await?)
    }

    /// Every account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the list cannot be loaded.
    pub async fn users(&self) -> Result<Vec<User>, AdminError> {
        Ok(self.users.list_users().await?)
    }

    /// Activate or deactivate an account; `None` flips the current state.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the account cannot be read or written.
    #[tracing::instrument(name = "admin.set_user_active", skip(self), err)]
    pub async fn set_user_active(
        &self,
        id: UserId,
        active: Option<bool>,
    ) -> Result<User, AdminError> {
        let mut user = self.users.get_user(id).await?;

        user.active = Some(active.unwrap_or(!user.is_active()));

        let updated = self.users.update_user(user).await?;

        info!(user_id = %id, active = updated.is_active(), "changed account status");

        Ok(updated)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the API refuses.
    pub async fn delete_user(&self, id: UserId) -> Result<(), AdminError> {
        Ok(self.users.delete_user(id).await?)
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if it cannot be loaded.
    pub async fn order(&self, id: OrderId) -> Result<Order, AdminError> {
        Ok(self.orders.get_order(id).await?)
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the API refuses.
    pub async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, AdminError> {
        Ok(self.orders.update_status(id, status).await?)
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the API refuses.
    pub async fn delete_order(&self, id: OrderId) -> Result<(), AdminError> {
        Ok(self.orders.delete_order(id).await?)
    }

    /// Move a reservation to `status`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the reservation cannot be read or written.
    #[tracing::instrument(name = "admin.set_reservation_status", skip(self), err)]
    pub async fn set_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation, AdminError> {
        let mut reservation = self.reservations.get_reservation(id).await?;

        reservation.status = status;

        Ok(self.reservations.update_reservation(id, reservation).await?)
    }

    /// Delete a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the API refuses.
    pub async fn delete_reservation(&self, id: ReservationId) -> Result<(), AdminError> {
        Ok(self.reservations.delete_reservation(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};
    use testresult::TestResult;

    use crate::domain::{
        orders::MockOrdersService, products::MockProductsService,
        promotions::MockPromotionsService, reservations::MockReservationsService,
        users::MockUsersService,
    };

    use super::*;

    #[derive(Default)]
    struct Mocks {
        products: MockProductsService,
        promotions: MockPromotionsService,
        users: MockUsersService,
        orders: MockOrdersService,
        reservations: MockReservationsService,
    }

    impl Mocks {
        fn into_service(self) -> AdminService {
            AdminService {
                products: Arc::new(self.products),
                promotions: Arc::new(self.promotions),
                users: Arc::new(self.users),
                orders: Arc::new(self.orders),
                reservations: Arc::new(self.reservations),
            }
        }
    }

    fn chicha() -> Product {
        Product {
            id: ProductId(4),
            name: "Chicha Morada".to_string(),
            description: None,
            price: Decimal::new(650, 2),
            category: Category::Drinks,
            available: true,
            image: None,
        }
    }

    fn stored(id: ProductId, draft: ProductDraft) -> Product {
        Product {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            available: draft.available,
            image: draft.image,
        }
    }

    fn diez() -> TestResult<Promotion> {
        let record: PromotionRecord = serde_json::from_str(
            r#"{"id": 5, "codigo": "DIEZ", "titulo": "Diez", "descuento": 10, "activa": true}"#,
        )?;

        Ok(Promotion::try_from(record)?)
    }

    #[tokio::test]
    async fn toggling_a_product_flips_availability() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_get_product()
            .returning(|_| Ok(chicha()));
        mocks
            .products
            .expect_update_product()
            .once()
            .withf(|id, draft| {
                *id == ProductId(4) && !draft.available && draft.name == "Chicha Morada"
            })
            .returning(|id, draft| Ok(stored(id, draft)));

        let updated = mocks.into_service().toggle_product(ProductId(4)).await?;

        assert!(!updated.available);

        Ok(())
    }

    #[tokio::test]
    async fn product_edit_keeps_untouched_fields() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_get_product()
            .returning(|_| Ok(chicha()));
        mocks
            .products
            .expect_update_product()
            .once()
            .withf(|_, draft| {
                draft.price == Decimal::new(700, 2)
                    && draft.name == "Chicha Morada"
                    && draft.category == Category::Drinks
            })
            .returning(|id, draft| Ok(stored(id, draft)));

        let changes = ProductChanges {
            price: Some(Decimal::new(700, 2)),
            ..ProductChanges::default()
        };

        mocks
            .into_service()
            .update_product(ProductId(4), changes)
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn invalid_product_edit_is_not_written() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .products
            .expect_get_product()
            .returning(|_| Ok(chicha()));
        mocks.products.expect_update_product().never();

        let changes = ProductChanges {
            name: Some(String::new()),
            ..ProductChanges::default()
        };

        let result = mocks
            .into_service()
            .update_product(ProductId(4), changes)
            .await;

        assert!(matches!(result, Err(AdminError::InvalidProduct(_))));

        Ok(())
    }

    #[tokio::test]
    async fn toggling_a_promotion_switches_it_off() -> TestResult {
        let mut mocks = Mocks::default();
        let current = diez()?;

        mocks
            .promotions
            .expect_get_promotion()
            .returning(move |_| Ok(current.clone()));
        mocks
            .promotions
            .expect_update_promotion()
            .once()
            .withf(|id, record| {
                *id == PromotionId(5) && record.active == Some(false) && record.code == "DIEZ"
            })
            .returning(|_, record| Ok(Promotion::try_from(record)?));

        let updated = mocks
            .into_service()
            .toggle_promotion(PromotionId(5))
            .await?;

        assert!(!updated.active);

        Ok(())
    }

    #[tokio::test]
    async fn promotion_edit_out_of_range_is_not_written() -> TestResult {
        let mut mocks = Mocks::default();
        let current = diez()?;

        mocks
            .promotions
            .expect_get_promotion()
            .returning(move |_| Ok(current.clone()));
        mocks.promotions.expect_update_promotion().never();

        let changes = PromotionChanges {
            discount: Some(Decimal::new(150, 0)),
            ..PromotionChanges::default()
        };

        let result = mocks
            .into_service()
            .update_promotion(PromotionId(5), changes)
            .await;

        assert!(matches!(result, Err(AdminError::InvalidPromotion(_))));

        Ok(())
    }

    #[tokio::test]
    async fn deactivating_an_account_keeps_its_other_fields() -> TestResult {
        let mut mocks = Mocks::default();
        let ana: User = serde_json::from_value(serde_json::json!({
            "id": 3,
            "nombre": "Ana Quispe",
            "email": "ana@sanisidro.pe",
            "pedidos": 2,
            "activo": true,
            "fechaCreacion": "2026-01-05T10:00:00"
        }))?;

        mocks
            .users
            .expect_get_user()
            .returning(move |_| Ok(ana.clone()));
        mocks
            .users
            .expect_update_user()
            .once()
            .withf(|user| {
                user.active == Some(false)
                    && user.order_count == Some(2)
                    && user.extra.contains_key("fechaCreacion")
            })
            .returning(Ok);

        let updated = mocks
            .into_service()
            .set_user_active(UserId(3), None)
            .await?;

        assert!(!updated.is_active());

        Ok(())
    }

    #[tokio::test]
    async fn reservation_status_is_written_back() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.reservations.expect_get_reservation().returning(|id| {
            Ok(Reservation {
                id: Some(id),
                name: "Ana Quispe".to_string(),
                email: "ana@sanisidro.pe".to_string(),
                phone: "987654321".to_string(),
                date: date(2026, 10, 20),
                time: time(19, 30, 0, 0),
                party_size: 4,
                notes: None,
                status: ReservationStatus::Pending,
            })
        });
        mocks
            .reservations
            .expect_update_reservation()
            .once()
            .withf(|_, reservation| reservation.status == ReservationStatus::Confirmed)
            .returning(|_, reservation| Ok(reservation));

        let updated = mocks
            .into_service()
            .set_reservation_status(ReservationId(8), ReservationStatus::Confirmed)
            .await?;

        assert_eq!(updated.status, ReservationStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn deleting_an_order() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_delete_order()
            .once()
            .withf(|id| *id == OrderId(12))
            .returning(|_| Ok(()));

        mocks.into_service().delete_order(OrderId(12)).await?;

        Ok(())
    }
}

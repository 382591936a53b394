//! Checkout
//!
//! Ties the persisted cart, the applied promotion and the remote services together: applying
//! and removing promotion codes, pricing the cart, and placing the order.

use std::{fmt, sync::Arc};

use jiff::{Zoned, civil::Date};
use sanisidro::{
    cart::CartStore,
    discounts::{DiscountError, Totals},
    orders::{Customer, Order, OrderError, build_order},
    payments::{PaymentForm, PaymentValidationError},
    promotions::{AppliedPromotion, EligibilityError, Promotion, PromotionCode},
    receipt::{Invoice, ReceiptError},
    storage::Storage,
    users::{User, UserId},
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    api::ApiError,
    domain::{orders::OrdersService, promotions::PromotionsService, users::UsersService},
};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The signed-in account has been deactivated.
    #[error("Tu cuenta ha sido desactivada. Contacta con el administrador para más información.")]
    InactiveUser,

    /// The promotion code cannot be applied.
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),

    /// The payment form is incomplete or invalid.
    #[error(transparent)]
    Payment(#[from] PaymentValidationError),

    /// The order could not be assembled.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The invoice could not be built.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// The cart could not be priced.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The API rejected the order or could not be reached.
    #[error("Error al procesar el pedido")]
    Submit(#[source] ApiError),

    /// The API could not be reached.
    #[error("Error de conexión con el servidor: {0}")]
    Api(#[from] ApiError),
}

/// An accepted order.
#[derive(Debug)]
pub struct PlacedOrder {
    /// The order as the API stored it
    pub order: Order,

    /// Invoice for the customer
    pub invoice: Invoice,

    /// Background update of the customer's order counter, for signed-in customers
    pub counter: Option<JoinHandle<()>>,
}

/// One customer's checkout session.
pub struct CheckoutService<S> {
    cart: CartStore<S>,
    applied: AppliedPromotion,
    promotions: Arc<dyn PromotionsService>,
    orders: Arc<dyn OrdersService>,
    users: Arc<dyn UsersService>,
}

impl<S: fmt::Debug> fmt::Debug for CheckoutService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutService")
            .field("cart", &self.cart)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

impl<S: Storage> CheckoutService<S> {
    /// Start a session over `cart` with no promotion applied.
    #[must_use]
    pub fn new(
        cart: CartStore<S>,
        promotions: Arc<dyn PromotionsService>,
        orders: Arc<dyn OrdersService>,
        users: Arc<dyn UsersService>,
    ) -> Self {
        Self {
            cart,
            applied: AppliedPromotion::new(),
            promotions,
            orders,
            users,
        }
    }

    /// The persisted cart.
    pub fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    /// The persisted cart, for editing.
    pub fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    /// The applied promotion and last rejection.
    pub fn applied(&self) -> &AppliedPromotion {
        &self.applied
    }

    /// Look up `raw` and bind it to the cart if it is eligible on `today`.
    ///
    /// A rejected code leaves any previously applied promotion in place.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Eligibility`]: the code is empty, unknown, stored as a record that
    ///   does not describe a usable promotion, or not eligible.
    /// - [`CheckoutError::Api`]: the lookup failed for any other reason.
    #[tracing::instrument(name = "checkout.apply_code", skip(self), err)]
    pub async fn apply_code(&mut self, raw: &str, today: Date) -> Result<&Promotion, CheckoutError> {
        let code = match PromotionCode::parse(raw) {
            Ok(code) => code,
            Err(error) => return Err(self.reject(error)),
        };

        let promotion = match self.promotions.find_by_code(&code).await {
            Ok(promotion) => promotion,
            Err(ApiError::NotFound) => {
                return Err(self.reject(EligibilityError::CodeNotFound(code.to_string())));
            }
            Err(ApiError::Promotion(error)) => {
                warn!(%code, %error, "promotion record is unusable");

                return Err(self.reject(EligibilityError::CodeNotFound(code.to_string())));
            }
            Err(error) => return Err(error.into()),
        };

        let applied = self.applied.apply(promotion, self.cart.cart(), today)?;

        info!(code = %applied.code, "applied promotion");

        Ok(applied)
    }

    /// Drop the applied promotion.
    pub fn remove_code(&mut self) {
        self.applied.clear();
    }

    /// Subtotal, discount and total for the current cart.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the cart cannot be priced.
    pub fn totals(&self) -> Result<Totals, DiscountError> {
        Totals::for_cart(self.cart.cart(), self.applied.promotion())
    }

    /// Validate payment, submit the order and, once accepted, empty the cart.
    ///
    /// If the API rejects the order, the cart and applied promotion are left untouched. For a
    /// signed-in customer the order counter is bumped in the background; its failure is only
    /// logged.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InactiveUser`]: the signed-in account has been deactivated.
    /// - [`CheckoutError::Payment`]: the payment form is invalid.
    /// - [`CheckoutError::Order`]: the cart is empty or cannot be priced.
    /// - [`CheckoutError::Submit`]: the API did not accept the order.
    #[tracing::instrument(
        name = "checkout.place_order",
        skip(self, payment, user, now),
        fields(user_id = tracing::field::Empty),
        err
    )]
    pub async fn place_order(
        &mut self,
        payment: &PaymentForm,
        user: Option<&User>,
        now: &Zoned,
    ) -> Result<PlacedOrder, CheckoutError> {
        if let Some(user) = user {
            tracing::Span::current().record("user_id", tracing::field::display(user.id));

            if !user.is_active() {
                return Err(CheckoutError::InactiveUser);
            }
        }

        let details = payment.validate(now.date())?;
        let customer = Customer::resolve(&details, user);
        let order = build_order(self.cart.cart(), &self.applied, &details, &customer, now)?;
        let invoice = Invoice::from_order(&order)?;

        let order = self
            .orders
            .create_order(order)
            .await
            .map_err(CheckoutError::Submit)?;

        info!(invoice_number = %invoice.number, "order placed");

        if let Err(error) = self.cart.clear() {
            warn!(%error, "order placed but the cart could not be cleared");
        }

        self.applied.clear();

        let counter = user.map(|user| spawn_order_counter(Arc::clone(&self.users), user.id));

        Ok(PlacedOrder {
            order,
            invoice,
            counter,
        })
    }

    fn reject(&mut self, error: EligibilityError) -> CheckoutError {
        debug!(code = error.code(), "rejected promotion code");

        self.applied.reject(error.clone());

        error.into()
    }
}

fn spawn_order_counter(users: Arc<dyn UsersService>, user: UserId) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            match count_order(users.as_ref(), user).await {
                Ok(updated) => debug!(orders = ?updated.order_count, "order counted"),
                Err(error) => error!(%error, "failed to update order counter"),
            }
        }
        .instrument(info_span!("checkout.order_counter", user_id = %user)),
    )
}

async fn count_order(users: &dyn UsersService, user: UserId) -> Result<User, ApiError> {
    let current = users.get_user(user).await?;

    users.update_user(current.with_order_counted()).await
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::{civil::date, tz::TimeZone};
    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use sanisidro::{
        orders::OrderId,
        payments::PaymentMethod,
        products::{Category, Product, ProductId},
        promotions::{PromotionKind, PromotionRecordError},
        storage::MemoryStorage,
    };
    use testresult::TestResult;

    use crate::domain::{
        orders::MockOrdersService, promotions::MockPromotionsService, users::MockUsersService,
    };

    use super::*;

    const TODAY: Date = date(2026, 3, 14);

    fn now() -> TestResult<Zoned> {
        Ok(TODAY
            .at(19, 5, 9, 0)
            .to_zoned(TimeZone::fixed(jiff::tz::offset(-5)))?)
    }

    fn lomo() -> Product {
        Product {
            id: ProductId(1),
            name: "Lomo Saltado".to_string(),
            description: None,
            price: Decimal::new(4500, 2),
            category: Category::Mains,
            available: true,
            image: None,
        }
    }

    fn ten_percent(code: &str) -> TestResult<Promotion> {
        Ok(Promotion {
            id: None,
            code: PromotionCode::parse(code)?,
            title: "Diez por ciento".to_string(),
            description: String::new(),
            kind: PromotionKind::PercentageGeneral(Percentage::from(Decimal::new(10, 2))),
            min_amount: sanisidro::pricing::zero(),
            min_quantity: 0,
            active: true,
            starts_on: None,
            ends_on: None,
            image: None,
        })
    }

    fn card() -> PaymentForm {
        PaymentForm {
            method: Some(PaymentMethod::Card),
            card_number: "4111 1111 1111 1111".to_string(),
            card_holder: "Ana Quispe".to_string(),
            card_expiry: "12/29".to_string(),
            card_cvv: "123".to_string(),
            ..PaymentForm::default()
        }
    }

    fn user(active: bool) -> TestResult<User> {
        Ok(serde_json::from_value(serde_json::json!({
            "id": 3,
            "nombre": "Ana Quispe",
            "email": "ana@sanisidro.pe",
            "telefono": "987654321",
            "pedidos": 2,
            "activo": active
        }))?)
    }

    fn checkout(
        promotions: MockPromotionsService,
        orders: MockOrdersService,
        users: MockUsersService,
    ) -> TestResult<CheckoutService<MemoryStorage>> {
        let mut cart = CartStore::load(MemoryStorage::new());

        cart.add_item(&lomo())?;
        cart.add_item(&lomo())?;

        Ok(CheckoutService::new(
            cart,
            Arc::new(promotions),
            Arc::new(orders),
            Arc::new(users),
        ))
    }

    fn promotions_with(code: &'static str) -> MockPromotionsService {
        let mut promotions = MockPromotionsService::new();

        promotions
            .expect_find_by_code()
            .withf(move |requested| requested.as_str() == code)
            .returning(|requested| ten_percent(requested.as_str()).map_err(|_err| ApiError::NotFound));

        promotions
    }

    fn accepting_orders() -> MockOrdersService {
        let mut orders = MockOrdersService::new();

        orders.expect_create_order().once().returning(|order| {
            Ok(Order {
                id: Some(OrderId(99)),
                ..order
            })
        });

        orders
    }

    #[tokio::test]
    async fn applying_a_code_discounts_the_cart() -> TestResult {
        let mut checkout = checkout(
            promotions_with("DIEZ"),
            MockOrdersService::new(),
            MockUsersService::new(),
        )?;

        let applied = checkout.apply_code(" diez ", TODAY).await?;

        assert_eq!(applied.code.as_str(), "DIEZ");

        let totals = checkout.totals()?;

        assert_eq!(totals.subtotal, sanisidro::pricing::soles(9000));
        assert_eq!(totals.discount, sanisidro::pricing::soles(900));
        assert_eq!(totals.total, sanisidro::pricing::soles(8100));

        checkout.remove_code();

        assert_eq!(checkout.totals()?.discount, sanisidro::pricing::zero());

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_keeps_previous_promotion() -> TestResult {
        let mut promotions = promotions_with("DIEZ");

        promotions
            .expect_find_by_code()
            .withf(|requested| requested.as_str() == "NOEXISTE")
            .returning(|_| Err(ApiError::NotFound));

        let mut checkout = checkout(promotions, MockOrdersService::new(), MockUsersService::new())?;

        checkout.apply_code("DIEZ", TODAY).await?;

        let result = checkout.apply_code("noexiste", TODAY).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Eligibility(EligibilityError::CodeNotFound(_)))
        ));
        assert_eq!(
            checkout.applied().promotion().map(|promotion| promotion.code.as_str()),
            Some("DIEZ")
        );
        assert_eq!(
            checkout.applied().error().map(ToString::to_string).as_deref(),
            Some("Código inválido")
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_code_is_rejected_without_a_lookup() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_find_by_code().never();

        let mut checkout = checkout(promotions, MockOrdersService::new(), MockUsersService::new())?;

        let result = checkout.apply_code("   ", TODAY).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Eligibility(EligibilityError::EmptyCode))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn lookup_failure_is_reported_as_connection_error() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_find_by_code().returning(|_| {
            Err(ApiError::UnexpectedResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            })
        });

        let mut checkout = checkout(promotions, MockOrdersService::new(), MockUsersService::new())?;

        let result = checkout.apply_code("DIEZ", TODAY).await;

        assert!(matches!(result, Err(CheckoutError::Api(_))));
        assert!(checkout.applied().error().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn unusable_promotion_record_is_an_invalid_code() -> TestResult {
        let mut promotions = MockPromotionsService::new();

        promotions.expect_find_by_code().returning(|_| {
            Err(ApiError::Promotion(PromotionRecordError::UnknownKind(
                "regalo".to_string(),
            )))
        });

        let mut checkout = checkout(promotions, MockOrdersService::new(), MockUsersService::new())?;

        let result = checkout.apply_code("REGALO", TODAY).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Eligibility(EligibilityError::CodeNotFound(_)))
        ));
        assert_eq!(
            checkout.applied().error().map(ToString::to_string).as_deref(),
            Some("Código inválido")
        );

        Ok(())
    }

    #[tokio::test]
    async fn guest_order_clears_cart_and_promotion() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .withf(|order| {
                order.total == Decimal::new(8100, 2)
                    && order.discount == Decimal::new(900, 2)
                    && order.promo_code.as_deref() == Some("DIEZ")
                    && order.customer == "Ana Quispe"
                    && order.invoice_number.as_str() == "20260314-190509"
            })
            .returning(|order| {
                Ok(Order {
                    id: Some(OrderId(99)),
                    ..order
                })
            });

        let mut users = MockUsersService::new();

        users.expect_get_user().never();

        let mut checkout = checkout(promotions_with("DIEZ"), orders, users)?;

        checkout.apply_code("DIEZ", TODAY).await?;

        let placed = checkout.place_order(&card(), None, &now()?).await?;

        assert_eq!(placed.order.id, Some(OrderId(99)));
        assert_eq!(placed.invoice.total, sanisidro::pricing::soles(8100));
        assert!(placed.counter.is_none());
        assert!(checkout.cart().cart().is_empty());
        assert!(checkout.applied().promotion().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn rejected_order_leaves_cart_and_promotion() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_create_order().once().returning(|_| {
            Err(ApiError::UnexpectedResponse {
                status: StatusCode::BAD_REQUEST,
                body: "datos inválidos".to_string(),
            })
        });

        let mut checkout = checkout(promotions_with("DIEZ"), orders, MockUsersService::new())?;

        checkout.apply_code("DIEZ", TODAY).await?;

        let result = checkout.place_order(&card(), None, &now()?).await;

        assert!(matches!(result, Err(CheckoutError::Submit(_))));
        assert_eq!(
            result.map(|_| ()).err().map(|error| error.to_string()).as_deref(),
            Some("Error al procesar el pedido")
        );
        assert_eq!(checkout.cart().cart().item_count(), 2);
        assert!(checkout.applied().promotion().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn signed_in_order_bumps_the_counter() -> TestResult {
        let mut users = MockUsersService::new();
        let stored = user(true)?;

        users
            .expect_get_user()
            .once()
            .withf(|id| *id == UserId(3))
            .returning(move |_| Ok(stored.clone()));
        users
            .expect_update_user()
            .once()
            .withf(|updated| updated.order_count == Some(3))
            .returning(Ok);

        let mut checkout = checkout(MockPromotionsService::new(), accepting_orders(), users)?;
        let signed_in = user(true)?;

        let placed = checkout
            .place_order(&card(), Some(&signed_in), &now()?)
            .await?;

        if let Some(counter) = placed.counter {
            counter.await?;
        }

        Ok(())
    }

    #[tokio::test]
    async fn counter_failure_does_not_fail_checkout() -> TestResult {
        let mut users = MockUsersService::new();

        users
            .expect_get_user()
            .once()
            .returning(|_| Err(ApiError::NotFound));
        users.expect_update_user().never();

        let mut checkout = checkout(MockPromotionsService::new(), accepting_orders(), users)?;
        let signed_in = user(true)?;

        let placed = checkout
            .place_order(&card(), Some(&signed_in), &now()?)
            .await?;

        assert!(placed.counter.is_some());

        if let Some(counter) = placed.counter {
            counter.await?;
        }

        assert!(checkout.cart().cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn deactivated_account_cannot_order() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_create_order().never();

        let mut checkout = checkout(MockPromotionsService::new(), orders, MockUsersService::new())?;
        let deactivated = user(false)?;

        let result = checkout
            .place_order(&card(), Some(&deactivated), &now()?)
            .await;

        assert!(matches!(result, Err(CheckoutError::InactiveUser)));
        assert_eq!(checkout.cart().cart().item_count(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_payment_is_caught_before_submitting() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_create_order().never();

        let mut checkout = checkout(MockPromotionsService::new(), orders, MockUsersService::new())?;
        let payment = PaymentForm {
            card_number: "4111".to_string(),
            ..card()
        };

        let result = checkout.place_order(&payment, None, &now()?).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Payment(PaymentValidationError::CardNumberLength))
        ));

        Ok(())
    }
}

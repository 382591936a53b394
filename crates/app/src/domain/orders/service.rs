//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use sanisidro::orders::{Order, OrderId, OrderStatus};
use serde::Serialize;
use tracing::info;

use crate::api::{ApiClient, ApiError};

const ORDERS: &str = "pedidos";

#[derive(Debug, Serialize)]
struct StatusUpdate {
    #[serde(rename = "estado")]
    status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct HttpOrdersService {
    api: ApiClient,
}

impl HttpOrdersService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl OrdersService for HttpOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(invoice_number = %order.invoice_number, total = %order.total),
        err
    )]
    async fn create_order(&self, order: Order) -> Result<Order, ApiError> {
        let created: Order = self.api.post([ORDERS], &order).await?;

        info!(order_id = ?created.id, "created order");

        Ok(created)
    }

    #[tracing::instrument(name = "orders.service.list_orders", skip(self), err)]
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.api.get([ORDERS]).await
    }

    #[tracing::instrument(
        name = "orders.service.list_by_status",
        skip(self),
        fields(status = %status),
        err
    )]
    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ApiError> {
        self.api.get([ORDERS, "estado", status.as_str()]).await
    }

    #[tracing::instrument(name = "orders.service.list_for_user", skip(self), err)]
    async fn list_for_user(&self, email: &str) -> Result<Vec<Order>, ApiError> {
        self.api.get([ORDERS, "usuario", email]).await
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self),
        fields(order_id = %id),
        err
    )]
    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.api.get([ORDERS, &id.to_string()]).await
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_id = %id, status = %status),
        err
    )]
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, ApiError> {
        let updated: Order = self
            .api
            .put([ORDERS, &id.to_string(), "estado"], &StatusUpdate { status })
            .await?;

        info!(order_id = %id, %status, "updated order status");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.delete_order",
        skip(self),
        fields(order_id = %id),
        err
    )]
    async fn delete_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.api.delete([ORDERS, &id.to_string()]).await
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Submits a new order.
    async fn create_order(&self, order: Order) -> Result<Order, ApiError>;

    /// Retrieves every order.
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// Retrieves the orders in one status.
    async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ApiError>;

    /// Retrieves the orders placed by a customer.
    async fn list_for_user(&self, email: &str) -> Result<Vec<Order>, ApiError>;

    /// Retrieve a single order.
    async fn get_order(&self, id: OrderId) -> Result<Order, ApiError>;

    /// Moves an order to another status.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, ApiError>;

    /// Deletes an order.
    async fn delete_order(&self, id: OrderId) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn status_update_body_uses_wire_names() -> TestResult {
        let body = serde_json::to_value(StatusUpdate {
            status: OrderStatus::Ready,
        })?;

        assert_eq!(body, serde_json::json!({"estado": "listo"}));

        Ok(())
    }
}

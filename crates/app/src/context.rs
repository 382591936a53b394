//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    api::{ApiClient, ApiConfig, ApiError},
    domain::{
        identity::{HttpIdentityService, IdentityService},
        orders::{HttpOrdersService, OrdersService},
        products::{HttpProductsService, ProductsService},
        promotions::{HttpPromotionsService, PromotionsService},
        reservations::{HttpReservationsService, ReservationsService},
        users::{HttpUsersService, UsersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to create API client")]
    Api(#[from] ApiError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub promotions: Arc<dyn PromotionsService>,
    pub orders: Arc<dyn OrdersService>,
    pub users: Arc<dyn UsersService>,
    pub reservations: Arc<dyn ReservationsService>,
    pub identity: Arc<dyn IdentityService>,
}

impl AppContext {
    /// Build application context for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error when the API client cannot be created.
    pub fn from_api_config(config: &ApiConfig) -> Result<Self, AppInitError> {
        let api = ApiClient::new(config)?;

        Ok(Self {
            products: Arc::new(HttpProductsService::new(api.clone())),
            promotions: Arc::new(HttpPromotionsService::new(api.clone())),
            orders: Arc::new(HttpOrdersService::new(api.clone())),
            users: Arc::new(HttpUsersService::new(api.clone())),
            reservations: Arc::new(HttpReservationsService::new(api.clone())),
            identity: Arc::new(HttpIdentityService::new(api)),
        })
    }
}

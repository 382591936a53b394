//! National ID lookup service.

use async_trait::async_trait;
use mockall::automock;
use sanisidro::reservations::{Dni, IdentityRecord};
use tracing::debug;

use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    api: ApiClient,
}

impl HttpIdentityService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    #[tracing::instrument(name = "identity.service.lookup", skip(self, dni), err)]
    async fn lookup(&self, dni: &Dni) -> Result<Option<IdentityRecord>, ApiError> {
        match self.api.get::<IdentityRecord, _>(["reniec", "consulta", dni.as_str()]).await {
            Ok(record) => Ok(record.name().is_some().then_some(record)),
            Err(ApiError::NotFound) => {
                debug!("no identity record");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

#[automock]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Looks up the registered name for a DNI.
    ///
    /// Returns `Ok(None)` when the registry has no usable record for it.
    async fn lookup(&self, dni: &Dni) -> Result<Option<IdentityRecord>, ApiError>;
}

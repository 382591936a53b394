//! Promotions service.

use async_trait::async_trait;
use mockall::automock;
use sanisidro::promotions::{Promotion, PromotionCode, PromotionId, PromotionRecord};
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};

const PROMOTIONS: &str = "promociones";

#[derive(Debug, Clone)]
pub struct HttpPromotionsService {
    api: ApiClient,
}

impl HttpPromotionsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PromotionsService for HttpPromotionsService {
    #[tracing::instrument(name = "promotions.service.list_promotions", skip(self), err)]
    async fn list_promotions(&self) -> Result<Vec<Promotion>, ApiError> {
        let records: Vec<PromotionRecord> = self.api.get([PROMOTIONS]).await?;

        Ok(valid_promotions(records))
    }

    #[tracing::instrument(
        name = "promotions.service.get_promotion",
        skip(self),
        fields(promotion_id = %id),
        err
    )]
    async fn get_promotion(&self, id: PromotionId) -> Result<Promotion, ApiError> {
        let record: PromotionRecord = self.api.get([PROMOTIONS, &id.to_string()]).await?;

        Ok(Promotion::try_from(record)?)
    }

    #[tracing::instrument(
        name = "promotions.service.find_by_code",
        skip(self),
        fields(code = %code),
        err
    )]
    async fn find_by_code(&self, code: &PromotionCode) -> Result<Promotion, ApiError> {
        let record: PromotionRecord = self
            .api
            .get([PROMOTIONS, "codigo", code.as_str()])
            .await?;

        Ok(Promotion::try_from(record)?)
    }

    #[tracing::instrument(
        name = "promotions.service.create_promotion",
        skip(self, promotion),
        fields(code = %promotion.code),
        err
    )]
    async fn create_promotion(&self, promotion: PromotionRecord) -> Result<Promotion, ApiError> {
        let record: PromotionRecord = self.api.post([PROMOTIONS], &promotion).await?;
        let created = Promotion::try_from(record)?;

        info!(code = %created.code, "created promotion");

        Ok(created)
    }

    #[tracing::instrument(
        name = "promotions.service.update_promotion",
        skip(self, promotion),
        fields(promotion_id = %id),
        err
    )]
    async fn update_promotion(
        &self,
        id: PromotionId,
        promotion: PromotionRecord,
    ) -> Result<Promotion, ApiError> {
        let record: PromotionRecord = self
            .api
            .put([PROMOTIONS, &id.to_string()], &promotion)
            .await?;

        Ok(Promotion::try_from(record)?)
    }

    #[tracing::instrument(
        name = "promotions.service.delete_promotion",
        skip(self),
        fields(promotion_id = %id),
        err
    )]
    async fn delete_promotion(&self, id: PromotionId) -> Result<(), ApiError> {
        self.api.delete([PROMOTIONS, &id.to_string()]).await?;

        info!(promotion_id = %id, "deleted promotion");

        Ok(())
    }
}

/// Convert API records, dropping the ones that do not describe a usable promotion.
fn valid_promotions(records: Vec<PromotionRecord>) -> Vec<Promotion> {
    records
        .into_iter()
        .filter_map(|record| {
            let code = record.code.clone();

            Promotion::try_from(record)
                .inspect_err(|error| warn!(%code, %error, "skipping invalid promotion"))
                .ok()
        })
        .collect()
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Retrieves every promotion.
    async fn list_promotions(&self) -> Result<Vec<Promotion>, ApiError>;

    /// Retrieve a single promotion.
    async fn get_promotion(&self, id: PromotionId) -> Result<Promotion, ApiError>;

    /// Looks up a promotion by its code.
    async fn find_by_code(&self, code: &PromotionCode) -> Result<Promotion, ApiError>;

    /// Creates a promotion.
    async fn create_promotion(&self, promotion: PromotionRecord) -> Result<Promotion, ApiError>;

    /// Replaces a promotion.
    async fn update_promotion(
        &self,
        id: PromotionId,
        promotion: PromotionRecord,
    ) -> Result<Promotion, ApiError>;

    /// Deletes a promotion.
    async fn delete_promotion(&self, id: PromotionId) -> Result<(), ApiError>;
}

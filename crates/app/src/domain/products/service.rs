//! Products service.

use async_trait::async_trait;
use mockall::automock;
use sanisidro::products::{Category, Product, ProductDraft, ProductId};
use tracing::info;

use crate::api::{ApiClient, ApiError};

const PRODUCTS: &str = "productos";

#[derive(Debug, Clone)]
pub struct HttpProductsService {
    api: ApiClient,
}

impl HttpProductsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProductsService for HttpProductsService {
    #[tracing::instrument(name = "products.service.list_products", skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.api.get([PRODUCTS]).await
    }

    #[tracing::instrument(
        name = "products.service.list_by_category",
        skip(self),
        fields(category = %category),
        err
    )]
    async fn list_by_category(&self, category: Category) -> Result<Vec<Product>, ApiError> {
        self.api
            .get([PRODUCTS, "categoria", category.as_str()])
            .await
    }

    #[tracing::instrument(
        name = "products.service.get_product",
        skip(self),
        fields(product_id = %product),
        err
    )]
    async fn get_product(&self, product: ProductId) -> Result<Product, ApiError> {
        self.api.get([PRODUCTS, &product.to_string()]).await
    }

    #[tracing::instrument(
        name = "products.service.create_product",
        skip(self, product),
        fields(name = %product.name),
        err
    )]
    async fn create_product(&self, product: ProductDraft) -> Result<Product, ApiError> {
        let created: Product = self.api.post([PRODUCTS], &product).await?;

        info!(product_id = %created.id, "created product");

        Ok(created)
    }

    #[tracing::instrument(
        name = "products.service.update_product",
        skip(self, product),
        fields(product_id = %id),
        err
    )]
    async fn update_product(
        &self,
        id: ProductId,
        product: ProductDraft,
    ) -> Result<Product, ApiError> {
        self.api.put([PRODUCTS, &id.to_string()], &product).await
    }

    #[tracing::instrument(
        name = "products.service.delete_product",
        skip(self),
        fields(product_id = %id),
        err
    )]
    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.api.delete([PRODUCTS, &id.to_string()]).await?;

        info!(product_id = %id, "deleted product");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves the whole menu.
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// Retrieves the products of one category.
    async fn list_by_category(&self, category: Category) -> Result<Vec<Product>, ApiError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductId) -> Result<Product, ApiError>;

    /// Adds a product to the menu.
    async fn create_product(&self, product: ProductDraft) -> Result<Product, ApiError>;

    /// Replaces a product.
    async fn update_product(
        &self,
        id: ProductId,
        product: ProductDraft,
    ) -> Result<Product, ApiError>;

    /// Removes a product from the menu.
    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError>;
}

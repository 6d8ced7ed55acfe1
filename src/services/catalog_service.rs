//! Domain service for browsing and maintaining the product catalog.

use thiserror::Error;

use crate::db::{ProductDraft, ProductFilter};
use crate::entities::products;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<products::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// A page of products matching `filter`, newest first. `page` is 1-based.
    async fn list(
        &self,
        filter: ProductFilter,
        page: u64,
        limit: u64,
    ) -> Result<ProductPage, CatalogError>;

    async fn get(&self, id: i32) -> Result<products::Model, CatalogError>;

    async fn list_for_seller(&self, seller_id: i32) -> Result<Vec<products::Model>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::Forbidden`] when `seller_id` does not own the
    /// product.
    async fn update(
        &self,
        seller_id: i32,
        id: i32,
        draft: ProductDraft,
    ) -> Result<products::Model, CatalogError>;

    async fn delete(&self, seller_id: i32, id: i32) -> Result<(), CatalogError>;
}

//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use tracing::info;

use super::catalog_service::{CatalogError, CatalogService, ProductPage};
use crate::db::{ProductDraft, ProductFilter, Store};
use crate::entities::products;

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn owned(&self, seller_id: i32, id: i32) -> Result<products::Model, CatalogError> {
        let product = self.get(id).await?;
        if product.seller_id != seller_id {
            return Err(CatalogError::Forbidden(
                "You can only modify your own products".to_string(),
            ));
        }
        Ok(product)
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn list(
        &self,
        filter: ProductFilter,
        page: u64,
        limit: u64,
    ) -> Result<ProductPage, CatalogError> {
        let (products, total) = self.store.products().list(&filter, page, limit).await?;

        Ok(ProductPage {
            products,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit.max(1)),
        })
    }

    async fn get(&self, id: i32) -> Result<products::Model, CatalogError> {
        self.store
            .products()
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    async fn list_for_seller(&self, seller_id: i32) -> Result<Vec<products::Model>, CatalogError> {
        Ok(self.store.products().list_by_seller(seller_id).await?)
    }

    async fn update(
        &self,
        seller_id: i32,
        id: i32,
        draft: ProductDraft,
    ) -> Result<products::Model, CatalogError> {
        self.owned(seller_id, id).await?;

        let product = self
            .store
            .products()
            .update(id, draft)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        info!(seller_id, product_id = id, "Product updated");
        Ok(product)
    }

    async fn delete(&self, seller_id: i32, id: i32) -> Result<(), CatalogError> {
        self.owned(seller_id, id).await?;
        self.store.products().delete(id).await?;

        info!(seller_id, product_id = id, "Product deleted");
        Ok(())
    }
}

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use super::now_rfc3339;
use crate::domain::{ProductSex, ProductType};
use crate::entities::products;

/// Complete attribute set of a product, as submitted by a seller.
///
/// This is also the JSON payload stored on a pending product-creation code,
/// so the product created after approval matches the submission exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub sex: ProductSex,
    pub size: i32,
    pub quantity: i32,
    pub brand: String,
    pub product_type: ProductType,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub product_type: Option<ProductType>,
    pub sex: Option<ProductSex>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

pub struct ProductRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProductRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<products::Model>> {
        products::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query product")
    }

    pub async fn create(&self, seller_id: i32, draft: ProductDraft) -> Result<products::Model> {
        let now = now_rfc3339();

        products::ActiveModel {
            name: Set(draft.name),
            price: Set(draft.price),
            description: Set(draft.description),
            image_url: Set(draft.image_url),
            sex: Set(draft.sex.as_str().to_string()),
            size: Set(draft.size),
            quantity: Set(draft.quantity),
            brand: Set(draft.brand),
            product_type: Set(draft.product_type.as_str().to_string()),
            seller_id: Set(seller_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to insert product")
    }

    pub async fn update(&self, id: i32, draft: ProductDraft) -> Result<Option<products::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: products::ActiveModel = existing.into();
        active.name = Set(draft.name);
        active.price = Set(draft.price);
        active.description = Set(draft.description);
        active.image_url = Set(draft.image_url);
        active.sex = Set(draft.sex.as_str().to_string());
        active.size = Set(draft.size);
        active.quantity = Set(draft.quantity);
        active.brand = Set(draft.brand);
        active.product_type = Set(draft.product_type.as_str().to_string());
        active.updated_at = Set(now_rfc3339());

        let model = active
            .update(self.conn)
            .await
            .context("Failed to update product")?;
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = products::Entity::delete_by_id(id)
            .exec(self.conn)
            .await
            .context("Failed to delete product")?;
        Ok(result.rows_affected > 0)
    }

    /// One page of products matching `filter`, newest first, plus the total
    /// number of matches. `page` is 1-based.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<products::Model>, u64)> {
        let mut query = products::Entity::find();

        if let Some(product_type) = filter.product_type {
            query = query.filter(products::Column::ProductType.eq(product_type.as_str()));
        }
        if let Some(sex) = filter.sex {
            query = query.filter(products::Column::Sex.eq(sex.as_str()));
        }
        if let Some(brand) = &filter.brand {
            query = query.filter(products::Column::Brand.eq(brand.as_str()));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(products::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(products::Column::Price.lte(max));
        }

        let total = query
            .clone()
            .count(self.conn)
            .await
            .context("Failed to count products")?;

        let items = query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .offset(page.saturating_sub(1).saturating_mul(limit))
            .limit(limit)
            .all(self.conn)
            .await
            .context("Failed to list products")?;

        Ok((items, total))
    }

    pub async fn list_by_seller(&self, seller_id: i32) -> Result<Vec<products::Model>> {
        products::Entity::find()
            .filter(products::Column::SellerId.eq(seller_id))
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list seller products")
    }

    /// Removes `amount` units from stock if at least that many remain.
    /// Returns false when stock is short or the product is gone.
    pub async fn take_stock(&self, id: i32, amount: i32) -> Result<bool> {
        let result = products::Entity::update_many()
            .col_expr(
                products::Column::Quantity,
                Expr::col(products::Column::Quantity).sub(amount),
            )
            .filter(products::Column::Id.eq(id))
            .filter(products::Column::Quantity.gte(amount))
            .exec(self.conn)
            .await
            .context("Failed to decrement stock")?;

        Ok(result.rows_affected == 1)
    }

    pub async fn restore_stock(&self, id: i32, amount: i32) -> Result<()> {
        products::Entity::update_many()
            .col_expr(
                products::Column::Quantity,
                Expr::col(products::Column::Quantity).add(amount),
            )
            .filter(products::Column::Id.eq(id))
            .exec(self.conn)
            .await
            .context("Failed to restore stock")?;
        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        products::Entity::find()
            .count(self.conn)
            .await
            .context("Failed to count products")
    }
}

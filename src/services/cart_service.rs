//! Domain service for a customer's shopping cart.

use thiserror::Error;

use crate::entities::{cart_items, carts, products};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CartError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<sea_orm::DbErr> for CartError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub item: cart_items::Model,
    pub product: Option<products::Model>,
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub cart: carts::Model,
    pub items: Vec<CartLineView>,
}

#[async_trait::async_trait]
pub trait CartService: Send + Sync {
    async fn get(&self, customer_id: i32) -> Result<CartView, CartError>;

    /// Adds `quantity` units, merging with an existing line for the product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Conflict`] when the line would exceed stock.
    async fn add(
        &self,
        customer_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartView, CartError>;

    async fn update_item(
        &self,
        customer_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> Result<CartView, CartError>;

    async fn remove_item(&self, customer_id: i32, item_id: i32) -> Result<CartView, CartError>;

    async fn clear(&self, customer_id: i32) -> Result<CartView, CartError>;
}

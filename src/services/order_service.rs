//! Domain service for placing and tracking orders.

use thiserror::Error;

use crate::db::OrderWithItems;
use crate::domain::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("Order {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Turns the customer's cart into an order and empties the cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] for an empty cart and
    /// [`OrderError::Conflict`] when any product lacks stock; nothing is
    /// written in either case.
    async fn place(
        &self,
        customer_id: i32,
        shipping_address: &str,
    ) -> Result<OrderWithItems, OrderError>;

    async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<OrderWithItems>, OrderError>;

    /// An order of `customer_id`. Other customers' orders are reported as
    /// missing.
    async fn get_for_customer(
        &self,
        customer_id: i32,
        order_id: i32,
    ) -> Result<OrderWithItems, OrderError>;

    /// Cancels a pending or confirmed order and puts its units back in stock.
    async fn cancel(&self, customer_id: i32, order_id: i32) -> Result<OrderWithItems, OrderError>;

    async fn list_all(&self) -> Result<Vec<OrderWithItems>, OrderError>;

    /// Admin status change. Terminal orders are frozen; moving to
    /// `cancelled` returns the units to stock.
    async fn update_status(
        &self,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<OrderWithItems, OrderError>;
}

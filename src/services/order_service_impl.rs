//! `SeaORM` implementation of the `OrderService` trait.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;

use super::order_service::{OrderError, OrderService};
use crate::db::{
    CartRepository, NewOrderItem, OrderRepository, OrderWithItems, ProductRepository, Store,
};
use crate::domain::OrderStatus;
use crate::entities::{order_items, orders};

pub struct SeaOrmOrderService {
    store: Store,
}

impl SeaOrmOrderService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderService for SeaOrmOrderService {
    async fn place(
        &self,
        customer_id: i32,
        shipping_address: &str,
    ) -> Result<OrderWithItems, OrderError> {
        let txn = self.store.conn.begin().await?;
        let carts = CartRepository::new(&txn);
        let products = ProductRepository::new(&txn);

        let Some(cart) = carts.get_for_customer(customer_id).await? else {
            return Err(OrderError::Validation("Cart is empty".to_string()));
        };
        let lines = carts.lines(cart.id).await?;
        if lines.is_empty() {
            return Err(OrderError::Validation("Cart is empty".to_string()));
        }

        let mut items = Vec::with_capacity(lines.len());
        for (line, product) in lines {
            let Some(product) = product else {
                return Err(OrderError::Conflict(format!(
                    "Product {} is no longer available",
                    line.product_id
                )));
            };

            if !products.take_stock(product.id, line.quantity).await? {
                return Err(OrderError::Conflict(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }

            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name,
                quantity: line.quantity,
                price_at_purchase: product.price,
            });
        }

        let order = OrderRepository::new(&txn)
            .create(customer_id, shipping_address, items)
            .await?;

        carts.clear(cart.id).await?;
        carts.recompute(cart.id).await?;

        txn.commit().await?;

        info!(
            customer_id,
            order_id = order.0.id,
            total = order.0.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<OrderWithItems>, OrderError> {
        Ok(self.store.orders().list_for_customer(customer_id).await?)
    }

    async fn get_for_customer(
        &self,
        customer_id: i32,
        order_id: i32,
    ) -> Result<OrderWithItems, OrderError> {
        match self.store.orders().get(order_id).await? {
            Some(order) if order.0.customer_id == customer_id => Ok(order),
            _ => Err(OrderError::NotFound(order_id)),
        }
    }

    async fn cancel(&self, customer_id: i32, order_id: i32) -> Result<OrderWithItems, OrderError> {
        let txn = self.store.conn.begin().await?;
        let orders = OrderRepository::new(&txn);

        let (order, items) = match orders.get(order_id).await? {
            Some(order) if order.0.customer_id == customer_id => order,
            _ => return Err(OrderError::NotFound(order_id)),
        };

        let cancellable = order
            .status
            .parse::<OrderStatus>()
            .is_ok_and(OrderStatus::is_cancellable);
        if !cancellable {
            return Err(OrderError::Validation(format!(
                "Order cannot be cancelled while {}",
                order.status
            )));
        }

        cancel_in(&txn, &order, &items).await?;
        let order = orders
            .get(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        txn.commit().await?;

        info!(customer_id, order_id, "Order cancelled");
        Ok(order)
    }

    async fn list_all(&self) -> Result<Vec<OrderWithItems>, OrderError> {
        Ok(self.store.orders().list_all().await?)
    }

    async fn update_status(
        &self,
        order_id: i32,
        status: OrderStatus,
    ) -> Result<OrderWithItems, OrderError> {
        let txn = self.store.conn.begin().await?;
        let orders = OrderRepository::new(&txn);

        let (order, items) = orders
            .get(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let current = order
            .status
            .parse::<OrderStatus>()
            .map_err(|e| OrderError::Database(e.to_string()))?;
        if current.is_terminal() {
            return Err(OrderError::Validation(format!(
                "Order is already {current} and cannot change status"
            )));
        }

        if status == OrderStatus::Cancelled {
            cancel_in(&txn, &order, &items).await?;
        } else if !orders.transition(order_id, &order.status, status).await? {
            return Err(OrderError::Conflict(format!(
                "Order {order_id} changed status concurrently"
            )));
        }

        let order = orders
            .get(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;
        txn.commit().await?;

        info!(order_id, from = %current, status = %status, "Order status updated");
        Ok(order)
    }
}

/// Marks the order cancelled and returns its units to stock, once.
async fn cancel_in<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
    items: &[order_items::Model],
) -> Result<(), OrderError> {
    if !OrderRepository::new(conn)
        .transition(order.id, &order.status, OrderStatus::Cancelled)
        .await?
    {
        return Err(OrderError::Conflict(format!(
            "Order {} changed status concurrently",
            order.id
        )));
    }

    let products = ProductRepository::new(conn);
    for item in items {
        products.restore_stock(item.product_id, item.quantity).await?;
    }
    Ok(())
}

use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::now_rfc3339;
use crate::domain::OrderStatus;
use crate::entities::{order_items, orders, prelude::*};

pub type OrderWithItems = (orders::Model, Vec<order_items::Model>);

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_purchase: f64,
}

pub struct OrderRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> OrderRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        customer_id: i32,
        shipping_address: &str,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems> {
        let now = now_rfc3339();
        let total_amount: f64 = items
            .iter()
            .map(|i| f64::from(i.quantity) * i.price_at_purchase)
            .sum();

        let order = orders::ActiveModel {
            customer_id: Set(customer_id),
            order_date: Set(now.clone()),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            total_amount: Set(total_amount),
            shipping_address: Set(shipping_address.to_string()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to insert order")?;

        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let model = order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name),
                quantity: Set(item.quantity),
                price_at_purchase: Set(item.price_at_purchase),
                ..Default::default()
            }
            .insert(self.conn)
            .await
            .context("Failed to insert order item")?;
            created.push(model);
        }

        Ok((order, created))
    }

    pub async fn get(&self, id: i32) -> Result<Option<OrderWithItems>> {
        let Some(order) = Orders::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query order")?
        else {
            return Ok(None);
        };

        let items = OrderItems::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to load order items")?;

        Ok(Some((order, items)))
    }

    pub async fn list_for_customer(&self, customer_id: i32) -> Result<Vec<OrderWithItems>> {
        let orders = Orders::find()
            .filter(orders::Column::CustomerId.eq(customer_id))
            .order_by_desc(orders::Column::OrderDate)
            .order_by_desc(orders::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list orders")?;

        self.with_items(orders).await
    }

    pub async fn list_all(&self) -> Result<Vec<OrderWithItems>> {
        let orders = Orders::find()
            .order_by_desc(orders::Column::OrderDate)
            .order_by_desc(orders::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list orders")?;

        self.with_items(orders).await
    }

    async fn with_items(&self, orders: Vec<orders::Model>) -> Result<Vec<OrderWithItems>> {
        let items = orders.load_many(OrderItems, self.conn).await?;
        Ok(orders.into_iter().zip(items).collect())
    }

    /// Moves an order from `from` to `to`. Returns false when the order is
    /// missing or no longer in `from`, so concurrent transitions apply once.
    pub async fn transition(&self, id: i32, from: &str, to: OrderStatus) -> Result<bool> {
        let result = Orders::update_many()
            .col_expr(orders::Column::Status, Expr::value(to.as_str()))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::Status.eq(from))
            .exec(self.conn)
            .await
            .context("Failed to update order status")?;

        Ok(result.rows_affected == 1)
    }

    pub async fn count(&self) -> Result<u64> {
        Orders::find()
            .count(self.conn)
            .await
            .context("Failed to count orders")
    }

    /// Sum of order totals in the given statuses.
    pub async fn revenue(&self, statuses: &[OrderStatus]) -> Result<f64> {
        let total: Option<Option<f64>> = Orders::find()
            .select_only()
            .column_as(orders::Column::TotalAmount.sum(), "total")
            .filter(orders::Column::Status.is_in(statuses.iter().map(OrderStatus::as_str)))
            .into_tuple()
            .one(self.conn)
            .await
            .context("Failed to sum revenue")?;

        Ok(total.flatten().unwrap_or(0.0))
    }
}

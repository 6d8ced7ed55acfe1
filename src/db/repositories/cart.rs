use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::now_rfc3339;
use crate::entities::{cart_items, carts, prelude::*, products};

pub type CartLine = (cart_items::Model, Option<products::Model>);

pub struct CartRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CartRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, customer_id: i32) -> Result<carts::Model> {
        carts::ActiveModel {
            customer_id: Set(customer_id),
            total_amount: Set(0.0),
            total_quantity: Set(0),
            updated_at: Set(now_rfc3339()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to create cart")
    }

    pub async fn get_for_customer(&self, customer_id: i32) -> Result<Option<carts::Model>> {
        Carts::find()
            .filter(carts::Column::CustomerId.eq(customer_id))
            .one(self.conn)
            .await
            .context("Failed to query cart")
    }

    /// Items of a cart joined with their products, oldest first.
    pub async fn lines(&self, cart_id: i32) -> Result<Vec<CartLine>> {
        CartItems::find()
            .find_also_related(Products)
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to load cart items")
    }

    pub async fn get_item(&self, cart_id: i32, item_id: i32) -> Result<Option<cart_items::Model>> {
        CartItems::find_by_id(item_id)
            .filter(cart_items::Column::CartId.eq(cart_id))
            .one(self.conn)
            .await
            .context("Failed to query cart item")
    }

    pub async fn get_item_for_product(
        &self,
        cart_id: i32,
        product_id: i32,
    ) -> Result<Option<cart_items::Model>> {
        CartItems::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .one(self.conn)
            .await
            .context("Failed to query cart item by product")
    }

    pub async fn add_item(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
        price: f64,
    ) -> Result<cart_items::Model> {
        cart_items::ActiveModel {
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price_at_addition: Set(price),
            created_at: Set(now_rfc3339()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to insert cart item")
    }

    pub async fn set_item_quantity(&self, item_id: i32, quantity: i32, price: f64) -> Result<()> {
        CartItems::update_many()
            .col_expr(cart_items::Column::Quantity, Expr::value(quantity))
            .col_expr(cart_items::Column::PriceAtAddition, Expr::value(price))
            .filter(cart_items::Column::Id.eq(item_id))
            .exec(self.conn)
            .await
            .context("Failed to update cart item")?;
        Ok(())
    }

    pub async fn remove_item(&self, item_id: i32) -> Result<bool> {
        let result = CartItems::delete_by_id(item_id)
            .exec(self.conn)
            .await
            .context("Failed to remove cart item")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn clear(&self, cart_id: i32) -> Result<()> {
        CartItems::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .exec(self.conn)
            .await
            .context("Failed to clear cart")?;
        Ok(())
    }

    /// Recomputes the cart totals from its current items.
    pub async fn recompute(&self, cart_id: i32) -> Result<carts::Model> {
        let items = CartItems::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .all(self.conn)
            .await
            .context("Failed to load cart items for totals")?;

        let total_quantity: i32 = items.iter().map(|i| i.quantity).sum();
        let total_amount: f64 = items
            .iter()
            .map(|i| f64::from(i.quantity) * i.price_at_addition)
            .sum();

        let cart = Carts::find_by_id(cart_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Cart {cart_id} not found"))?;

        let mut active: carts::ActiveModel = cart.into();
        active.total_amount = Set(total_amount);
        active.total_quantity = Set(total_quantity);
        active.updated_at = Set(now_rfc3339());

        active
            .update(self.conn)
            .await
            .context("Failed to update cart totals")
    }

    pub async fn delete_for_customer(&self, customer_id: i32) -> Result<()> {
        if let Some(cart) = self.get_for_customer(customer_id).await? {
            self.clear(cart.id).await?;
            Carts::delete_by_id(cart.id)
                .exec(self.conn)
                .await
                .context("Failed to delete cart")?;
        }
        Ok(())
    }
}

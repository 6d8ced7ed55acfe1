//! `SeaORM` implementation of the `CartService` trait.
//!
//! Every mutation recomputes the cart totals in the same transaction.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, TransactionTrait};

use super::cart_service::{CartError, CartLineView, CartService, CartView};
use crate::db::{CartRepository, ProductRepository, Store};
use crate::entities::carts;

pub struct SeaOrmCartService {
    store: Store,
}

impl SeaOrmCartService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn cart_for<C: ConnectionTrait>(
        conn: &C,
        customer_id: i32,
    ) -> Result<carts::Model, CartError> {
        let repo = CartRepository::new(conn);
        match repo.get_for_customer(customer_id).await? {
            Some(cart) => Ok(cart),
            None => Ok(repo.create(customer_id).await?),
        }
    }

    async fn view<C: ConnectionTrait>(conn: &C, cart: carts::Model) -> Result<CartView, CartError> {
        let items = CartRepository::new(conn)
            .lines(cart.id)
            .await?
            .into_iter()
            .map(|(item, product)| CartLineView { item, product })
            .collect();

        Ok(CartView { cart, items })
    }

    fn check_stock(available: i32, wanted: i32) -> Result<(), CartError> {
        if wanted > available {
            return Err(CartError::Conflict(format!(
                "Insufficient stock: {available} available"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CartService for SeaOrmCartService {
    async fn get(&self, customer_id: i32) -> Result<CartView, CartError> {
        let cart = Self::cart_for(&self.store.conn, customer_id).await?;
        Self::view(&self.store.conn, cart).await
    }

    async fn add(
        &self,
        customer_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartView, CartError> {
        let txn = self.store.conn.begin().await?;
        let cart = Self::cart_for(&txn, customer_id).await?;
        let carts = CartRepository::new(&txn);

        let product = ProductRepository::new(&txn)
            .get(product_id)
            .await?
            .ok_or_else(|| CartError::NotFound(format!("Product {product_id}")))?;

        match carts.get_item_for_product(cart.id, product_id).await? {
            Some(item) => {
                let total = item.quantity.saturating_add(quantity);
                Self::check_stock(product.quantity, total)?;
                carts
                    .set_item_quantity(item.id, total, product.price)
                    .await?;
            }
            None => {
                Self::check_stock(product.quantity, quantity)?;
                carts
                    .add_item(cart.id, product_id, quantity, product.price)
                    .await?;
            }
        }

        let cart = carts.recompute(cart.id).await?;
        let view = Self::view(&txn, cart).await?;
        txn.commit().await?;
        Ok(view)
    }

    async fn update_item(
        &self,
        customer_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> Result<CartView, CartError> {
        let txn = self.store.conn.begin().await?;
        let cart = Self::cart_for(&txn, customer_id).await?;
        let carts = CartRepository::new(&txn);

        let item = carts
            .get_item(cart.id, item_id)
            .await?
            .ok_or_else(|| CartError::NotFound(format!("Cart item {item_id}")))?;

        let product = ProductRepository::new(&txn)
            .get(item.product_id)
            .await?
            .ok_or_else(|| CartError::NotFound(format!("Product {}", item.product_id)))?;
        Self::check_stock(product.quantity, quantity)?;

        carts
            .set_item_quantity(item.id, quantity, product.price)
            .await?;

        let cart = carts.recompute(cart.id).await?;
        let view = Self::view(&txn, cart).await?;
        txn.commit().await?;
        Ok(view)
    }

    async fn remove_item(&self, customer_id: i32, item_id: i32) -> Result<CartView, CartError> {
        let txn = self.store.conn.begin().await?;
        let cart = Self::cart_for(&txn, customer_id).await?;
        let carts = CartRepository::new(&txn);

        if carts.get_item(cart.id, item_id).await?.is_none() {
            return Err(CartError::NotFound(format!("Cart item {item_id}")));
        }
        carts.remove_item(item_id).await?;

        let cart = carts.recompute(cart.id).await?;
        let view = Self::view(&txn, cart).await?;
        txn.commit().await?;
        Ok(view)
    }

    async fn clear(&self, customer_id: i32) -> Result<CartView, CartError> {
        let txn = self.store.conn.begin().await?;
        let cart = Self::cart_for(&txn, customer_id).await?;
        let carts = CartRepository::new(&txn);

        carts.clear(cart.id).await?;

        let cart = carts.recompute(cart.id).await?;
        let view = Self::view(&txn, cart).await?;
        txn.commit().await?;
        Ok(view)
    }
}

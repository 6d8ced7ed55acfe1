use anyhow::{Context, Result};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{BlockInfo, now_rfc3339};
use crate::domain::Gender;
use crate::entities::customers;

/// Attributes of a customer about to be materialized.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    pub gender: Gender,
    pub date_of_birth: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

pub struct CustomerRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CustomerRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<customers::Model>> {
        customers::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query customer by ID")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<customers::Model>> {
        customers::Entity::find()
            .filter(customers::Column::Email.eq(email))
            .one(self.conn)
            .await
            .context("Failed to query customer by email")
    }

    /// Whether another customer already owns `email` or `phone`.
    pub async fn identity_taken(&self, email: &str, phone: &str) -> Result<bool> {
        let count = customers::Entity::find()
            .filter(
                Condition::any()
                    .add(customers::Column::Email.eq(email))
                    .add(customers::Column::Phone.eq(phone)),
            )
            .count(self.conn)
            .await
            .context("Failed to check customer identity")?;

        Ok(count > 0)
    }

    pub async fn phone_taken_by_other(&self, phone: &str, id: i32) -> Result<bool> {
        let count = customers::Entity::find()
            .filter(customers::Column::Phone.eq(phone))
            .filter(customers::Column::Id.ne(id))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn create(&self, customer: NewCustomer) -> Result<customers::Model> {
        let now = now_rfc3339();

        let active = customers::ActiveModel {
            name: Set(customer.name),
            address: Set(customer.address),
            gender: Set(customer.gender.as_str().to_string()),
            date_of_birth: Set(customer.date_of_birth),
            email: Set(customer.email),
            phone: Set(customer.phone),
            password_hash: Set(customer.password_hash),
            cart_id: Set(None),
            email_verified: Set(true),
            phone_verified: Set(false),
            blocked: Set(false),
            blocked_reason: Set(None),
            blocked_at: Set(None),
            blocked_by: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(self.conn)
            .await
            .context("Failed to insert customer")
    }

    pub async fn set_cart(&self, id: i32, cart_id: i32) -> Result<()> {
        customers::Entity::update_many()
            .col_expr(customers::Column::CartId, Expr::value(cart_id))
            .filter(customers::Column::Id.eq(id))
            .exec(self.conn)
            .await
            .context("Failed to link cart")?;
        Ok(())
    }

    pub async fn update_profile(
        &self,
        id: i32,
        changes: CustomerChanges,
    ) -> Result<Option<customers::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: customers::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        active.updated_at = Set(now_rfc3339());

        let model = active
            .update(self.conn)
            .await
            .context("Failed to update customer profile")?;
        Ok(Some(model))
    }

    pub async fn update_password(&self, id: i32, password_hash: String) -> Result<bool> {
        let result = customers::Entity::update_many()
            .col_expr(customers::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(customers::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(customers::Column::Id.eq(id))
            .exec(self.conn)
            .await
            .context("Failed to update customer password")?;

        Ok(result.rows_affected == 1)
    }

    /// Applies or clears a block. Returns the updated row, `None` if the
    /// customer does not exist.
    pub async fn set_block(
        &self,
        id: i32,
        block: Option<BlockInfo>,
    ) -> Result<Option<customers::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: customers::ActiveModel = existing.into();
        active.blocked = Set(block.is_some());
        match block {
            Some(info) => {
                active.blocked_reason = Set(Some(info.reason));
                active.blocked_at = Set(Some(info.blocked_at));
                active.blocked_by = Set(Some(info.blocked_by));
            }
            None => {
                active.blocked_reason = Set(None);
                active.blocked_at = Set(None);
                active.blocked_by = Set(None);
            }
        }
        active.updated_at = Set(now_rfc3339());

        let model = active
            .update(self.conn)
            .await
            .context("Failed to update customer moderation state")?;
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = customers::Entity::delete_by_id(id)
            .exec(self.conn)
            .await
            .context("Failed to delete customer")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self, include_blocked: bool) -> Result<Vec<customers::Model>> {
        let mut query = customers::Entity::find();
        if !include_blocked {
            query = query.filter(customers::Column::Blocked.eq(false));
        }

        query
            .order_by_desc(customers::Column::CreatedAt)
            .order_by_desc(customers::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list customers")
    }

    pub async fn list_blocked(&self) -> Result<Vec<customers::Model>> {
        customers::Entity::find()
            .filter(customers::Column::Blocked.eq(true))
            .order_by_desc(customers::Column::BlockedAt)
            .all(self.conn)
            .await
            .context("Failed to list blocked customers")
    }

    pub async fn count(&self, blocked: bool) -> Result<u64> {
        customers::Entity::find()
            .filter(customers::Column::Blocked.eq(blocked))
            .count(self.conn)
            .await
            .context("Failed to count customers")
    }
}

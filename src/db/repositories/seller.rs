use anyhow::{Context, Result};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::{BlockInfo, now_rfc3339};
use crate::entities::sellers;

/// Attributes of a seller approved by the administrator.
#[derive(Debug, Clone)]
pub struct NewSeller {
    pub name: String,
    pub address: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct SellerChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

pub struct SellerRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SellerRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<sellers::Model>> {
        sellers::Entity::find_by_id(id)
            .one(self.conn)
            .await
            .context("Failed to query seller by ID")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<sellers::Model>> {
        sellers::Entity::find()
            .filter(sellers::Column::Email.eq(email))
            .one(self.conn)
            .await
            .context("Failed to query seller by email")
    }

    /// Whether another seller already owns `email` or `phone`.
    pub async fn identity_taken(&self, email: &str, phone: &str) -> Result<bool> {
        let count = sellers::Entity::find()
            .filter(
                Condition::any()
                    .add(sellers::Column::Email.eq(email))
                    .add(sellers::Column::Phone.eq(phone)),
            )
            .count(self.conn)
            .await
            .context("Failed to check seller identity")?;

        Ok(count > 0)
    }

    pub async fn phone_taken_by_other(&self, phone: &str, id: i32) -> Result<bool> {
        let count = sellers::Entity::find()
            .filter(sellers::Column::Phone.eq(phone))
            .filter(sellers::Column::Id.ne(id))
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn create(&self, seller: NewSeller) -> Result<sellers::Model> {
        let now = now_rfc3339();

        let active = sellers::ActiveModel {
            name: Set(seller.name),
            address: Set(seller.address),
            company: Set(seller.company),
            email: Set(seller.email),
            phone: Set(seller.phone),
            password_hash: Set(seller.password_hash),
            email_verified: Set(true),
            phone_verified: Set(true),
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
            .context("Failed to insert seller")
    }

    pub async fn update_profile(
        &self,
        id: i32,
        changes: SellerChanges,
    ) -> Result<Option<sellers::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: sellers::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(company) = changes.company {
            active.company = Set(company);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        active.updated_at = Set(now_rfc3339());

        let model = active
            .update(self.conn)
            .await
            .context("Failed to update seller profile")?;
        Ok(Some(model))
    }

    pub async fn update_password(&self, id: i32, password_hash: String) -> Result<bool> {
        let result = sellers::Entity::update_many()
            .col_expr(sellers::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(sellers::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(sellers::Column::Id.eq(id))
            .exec(self.conn)
            .await
            .context("Failed to update seller password")?;

        Ok(result.rows_affected == 1)
    }

    /// Applies or clears a block. Returns the updated row, `None` if the
    /// seller does not exist.
    pub async fn set_block(
        &self,
        id: i32,
        block: Option<BlockInfo>,
    ) -> Result<Option<sellers::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: sellers::ActiveModel = existing.into();
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
            .context("Failed to update seller moderation state")?;
        Ok(Some(model))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = sellers::Entity::delete_by_id(id)
            .exec(self.conn)
            .await
            .context("Failed to delete seller")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self, include_blocked: bool) -> Result<Vec<sellers::Model>> {
        let mut query = sellers::Entity::find();
        if !include_blocked {
            query = query.filter(sellers::Column::Blocked.eq(false));
        }

        query
            .order_by_desc(sellers::Column::CreatedAt)
            .order_by_desc(sellers::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list sellers")
    }

    pub async fn list_blocked(&self) -> Result<Vec<sellers::Model>> {
        sellers::Entity::find()
            .filter(sellers::Column::Blocked.eq(true))
            .order_by_desc(sellers::Column::BlockedAt)
            .all(self.conn)
            .await
            .context("Failed to list blocked sellers")
    }

    pub async fn count(&self, blocked: bool) -> Result<u64> {
        sellers::Entity::find()
            .filter(sellers::Column::Blocked.eq(blocked))
            .count(self.conn)
            .await
            .context("Failed to count sellers")
    }
}

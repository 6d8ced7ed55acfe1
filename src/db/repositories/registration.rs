use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use super::now_rfc3339;
use crate::domain::{ActorKind, RegistrationStatus};
use crate::entities::registrations;

pub struct RegistrationRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RegistrationRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(
        &self,
        email: &str,
        actor_kind: ActorKind,
    ) -> Result<Option<registrations::Model>> {
        registrations::Entity::find()
            .filter(registrations::Column::Email.eq(email))
            .filter(registrations::Column::ActorKind.eq(actor_kind.as_str()))
            .one(self.conn)
            .await
            .context("Failed to query registration")
    }

    /// Creates the registration, or resets an existing one back to
    /// `unverified` with the newly submitted name and phone.
    pub async fn upsert_unverified(
        &self,
        email: &str,
        actor_kind: ActorKind,
        name: &str,
        phone: &str,
    ) -> Result<registrations::Model> {
        let now = now_rfc3339();

        if let Some(existing) = self.get(email, actor_kind).await? {
            let mut active: registrations::ActiveModel = existing.into();
            active.name = Set(name.to_string());
            active.phone = Set(phone.to_string());
            active.status = Set(RegistrationStatus::Unverified.as_str().to_string());
            active.updated_at = Set(now);
            return active
                .update(self.conn)
                .await
                .context("Failed to reset registration");
        }

        registrations::ActiveModel {
            email: Set(email.to_string()),
            actor_kind: Set(actor_kind.as_str().to_string()),
            name: Set(name.to_string()),
            phone: Set(phone.to_string()),
            status: Set(RegistrationStatus::Unverified.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to insert registration")
    }

    /// Moves the registration from `from` to `to`. Returns false when the
    /// registration is missing or in another status.
    pub async fn advance(
        &self,
        email: &str,
        actor_kind: ActorKind,
        from: RegistrationStatus,
        to: RegistrationStatus,
    ) -> Result<bool> {
        let result = registrations::Entity::update_many()
            .col_expr(registrations::Column::Status, Expr::value(to.as_str()))
            .col_expr(registrations::Column::UpdatedAt, Expr::value(now_rfc3339()))
            .filter(registrations::Column::Email.eq(email))
            .filter(registrations::Column::ActorKind.eq(actor_kind.as_str()))
            .filter(registrations::Column::Status.eq(from.as_str()))
            .exec(self.conn)
            .await
            .context("Failed to advance registration status")?;

        Ok(result.rows_affected == 1)
    }

    pub async fn delete(&self, email: &str, actor_kind: ActorKind) -> Result<u64> {
        let result = registrations::Entity::delete_many()
            .filter(registrations::Column::Email.eq(email))
            .filter(registrations::Column::ActorKind.eq(actor_kind.as_str()))
            .exec(self.conn)
            .await
            .context("Failed to delete registration")?;

        Ok(result.rows_affected)
    }
}

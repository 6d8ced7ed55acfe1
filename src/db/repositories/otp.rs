use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{ActorKind, OtpPurpose};
use crate::entities::one_time_codes;

/// Key a one-time code is issued and redeemed under.
#[derive(Debug, Clone, Copy)]
pub struct CodeKey<'k> {
    pub subject: &'k str,
    pub purpose: OtpPurpose,
    pub actor_kind: ActorKind,
}

#[derive(Debug, Clone)]
pub struct NewCode {
    pub code: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub payload: Option<String>,
}

pub struct OtpRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> OtpRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Deletes every unconsumed code for `key` and stores `code` in its place.
    /// Run inside a transaction so the key never holds two live codes.
    pub async fn replace_pending(
        &self,
        key: CodeKey<'_>,
        code: NewCode,
    ) -> Result<one_time_codes::Model> {
        one_time_codes::Entity::delete_many()
            .filter(one_time_codes::Column::Subject.eq(key.subject))
            .filter(one_time_codes::Column::Purpose.eq(key.purpose.as_str()))
            .filter(one_time_codes::Column::ActorKind.eq(key.actor_kind.as_str()))
            .filter(one_time_codes::Column::Consumed.eq(false))
            .exec(self.conn)
            .await
            .context("Failed to supersede pending codes")?;

        one_time_codes::ActiveModel {
            subject: Set(key.subject.to_string()),
            purpose: Set(key.purpose.as_str().to_string()),
            actor_kind: Set(key.actor_kind.as_str().to_string()),
            code: Set(code.code),
            consumed: Set(false),
            issued_at: Set(code.issued_at),
            expires_at: Set(code.expires_at),
            payload: Set(code.payload),
            ..Default::default()
        }
        .insert(self.conn)
        .await
        .context("Failed to insert one-time code")
    }

    /// Newest unconsumed, unexpired code for `key` whose value is `code`.
    pub async fn find_pending(
        &self,
        key: CodeKey<'_>,
        code: &str,
        now_ms: i64,
    ) -> Result<Option<one_time_codes::Model>> {
        one_time_codes::Entity::find()
            .filter(one_time_codes::Column::Subject.eq(key.subject))
            .filter(one_time_codes::Column::Purpose.eq(key.purpose.as_str()))
            .filter(one_time_codes::Column::ActorKind.eq(key.actor_kind.as_str()))
            .filter(one_time_codes::Column::Code.eq(code))
            .filter(one_time_codes::Column::Consumed.eq(false))
            .filter(one_time_codes::Column::ExpiresAt.gt(now_ms))
            .order_by_desc(one_time_codes::Column::IssuedAt)
            .order_by_desc(one_time_codes::Column::Id)
            .one(self.conn)
            .await
            .context("Failed to query one-time code")
    }

    /// Flips `consumed` on, but only if nobody else did first.
    pub async fn consume(&self, id: i32) -> Result<bool> {
        let result = one_time_codes::Entity::update_many()
            .col_expr(one_time_codes::Column::Consumed, Expr::value(true))
            .filter(one_time_codes::Column::Id.eq(id))
            .filter(one_time_codes::Column::Consumed.eq(false))
            .exec(self.conn)
            .await
            .context("Failed to consume one-time code")?;

        Ok(result.rows_affected == 1)
    }

    pub async fn purge_expired(&self, now_ms: i64) -> Result<u64> {
        let result = one_time_codes::Entity::delete_many()
            .filter(one_time_codes::Column::ExpiresAt.lte(now_ms))
            .exec(self.conn)
            .await
            .context("Failed to purge expired codes")?;

        Ok(result.rows_affected)
    }

    pub async fn delete_for_subject(&self, subject: &str, actor_kind: ActorKind) -> Result<u64> {
        let result = one_time_codes::Entity::delete_many()
            .filter(one_time_codes::Column::Subject.eq(subject))
            .filter(one_time_codes::Column::ActorKind.eq(actor_kind.as_str()))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}

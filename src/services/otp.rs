//! Issuing and redeeming one-time codes.

use rand::Rng;
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::notifier::{Notification, Notifier, NotifyError};
use crate::db::{CodeKey, NewCode, OtpRepository};

pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum OtpError {
    /// Wrong, expired and already used codes are indistinguishable.
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    #[error(transparent)]
    Notification(#[from] NotifyError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for OtpError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

/// Where a freshly issued code is sent.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
    pub context: Vec<(&'static str, String)>,
}

#[derive(Clone)]
pub struct OtpService {
    notifier: Arc<dyn Notifier>,
    ttl_seconds: u64,
}

impl OtpService {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, ttl_seconds: u64) -> Self {
        Self {
            notifier,
            ttl_seconds,
        }
    }

    /// Uniformly random six digit code, leading zeros kept.
    #[must_use]
    pub fn generate_code() -> String {
        let value: u32 = rand::rng().random_range(0..1_000_000);
        format!("{value:06}")
    }

    /// Replaces any pending code for `key` with a new one and delivers it.
    ///
    /// `conn` should be a transaction: when delivery fails the caller drops
    /// it and the new code never becomes visible.
    pub async fn issue<C: ConnectionTrait>(
        &self,
        conn: &C,
        key: CodeKey<'_>,
        recipient: Recipient,
        payload: Option<String>,
    ) -> Result<(), OtpError> {
        let code = Self::generate_code();
        let issued_at = chrono::Utc::now().timestamp_millis();
        let ttl_ms = i64::try_from(self.ttl_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);

        OtpRepository::new(conn)
            .replace_pending(
                key,
                NewCode {
                    code: code.clone(),
                    issued_at,
                    expires_at: issued_at.saturating_add(ttl_ms),
                    payload,
                },
            )
            .await?;

        let notification = Notification {
            recipient: recipient.email,
            recipient_name: recipient.name,
            kind: key.purpose,
            code,
            valid_minutes: self.ttl_seconds.div_ceil(60),
            context: recipient.context,
        };
        self.notifier.send(&notification).await?;

        metrics::counter!(
            "otp_issued_total",
            "purpose" => key.purpose.as_str(),
            "actor" => key.actor_kind.as_str()
        )
        .increment(1);
        info!(purpose = %key.purpose, actor = %key.actor_kind, "One-time code issued");

        Ok(())
    }

    /// Redeems `submitted` for `key`, returning the payload stored with it.
    ///
    /// At most one caller can redeem a given code; the loser of a race sees
    /// the same error as for a wrong code.
    pub async fn validate<C: ConnectionTrait>(
        &self,
        conn: &C,
        key: CodeKey<'_>,
        submitted: &str,
    ) -> Result<Option<String>, OtpError> {
        let result = Self::redeem(conn, key, submitted).await;

        let outcome = match &result {
            Ok(_) => "accepted",
            Err(OtpError::InvalidOrExpiredCode) => "rejected",
            Err(_) => "error",
        };
        metrics::counter!(
            "otp_validation_total",
            "purpose" => key.purpose.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        debug!(purpose = %key.purpose, actor = %key.actor_kind, outcome, "One-time code checked");

        result
    }

    async fn redeem<C: ConnectionTrait>(
        conn: &C,
        key: CodeKey<'_>,
        submitted: &str,
    ) -> Result<Option<String>, OtpError> {
        let submitted = submitted.trim();
        if submitted.len() != CODE_LENGTH || !submitted.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::InvalidOrExpiredCode);
        }

        let repo = OtpRepository::new(conn);
        let now_ms = chrono::Utc::now().timestamp_millis();

        let Some(record) = repo.find_pending(key, submitted, now_ms).await? else {
            return Err(OtpError::InvalidOrExpiredCode);
        };

        if !repo.consume(record.id).await? {
            return Err(OtpError::InvalidOrExpiredCode);
        }

        Ok(record.payload)
    }

    /// Deletes codes past their expiry. Returns how many were removed.
    pub async fn purge_expired<C: ConnectionTrait>(conn: &C) -> Result<u64, OtpError> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let removed = OtpRepository::new(conn).purge_expired(now_ms).await?;
        if removed > 0 {
            info!(removed, "Purged expired one-time codes");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..200 {
            let code = OtpService::generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}

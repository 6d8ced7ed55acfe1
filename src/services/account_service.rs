//! Domain service for logins, profiles and password resets of customers and
//! sellers.

use thiserror::Error;

use super::otp::OtpError;
use super::registration_service::AuthSession;
use super::tokens::TokenError;
use crate::db::{CustomerChanges, SellerChanges};
use crate::domain::ActorKind;
use crate::entities::{customers, sellers};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is blocked: {reason}")]
    Blocked {
        reason: String,
        blocked_at: Option<String>,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    DuplicateIdentity(String),

    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OtpError> for AccountError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::InvalidOrExpiredCode => Self::InvalidOrExpiredCode,
            OtpError::Notification(e) => Self::Notification(e.to_string()),
            OtpError::Storage(msg) => Self::Database(msg),
        }
    }
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Moderation fields the authentication layer needs on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationState {
    pub blocked: bool,
    pub reason: Option<String>,
    pub blocked_at: Option<String>,
}

impl ModerationState {
    /// `Err(Blocked)` when the account is blocked.
    pub fn ensure_active(self) -> Result<(), AccountError> {
        if self.blocked {
            return Err(AccountError::Blocked {
                reason: self
                    .reason
                    .unwrap_or_else(|| super::DEFAULT_BLOCK_REASON.to_string()),
                blocked_at: self.blocked_at,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] for an unknown email or
    /// wrong password and [`AccountError::Blocked`] for a blocked account.
    async fn login_customer(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession<customers::Model>, AccountError>;

    async fn login_seller(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession<sellers::Model>, AccountError>;

    /// Looks up the moderation state of an authenticated principal.
    async fn moderation_state(
        &self,
        actor_kind: ActorKind,
        id: i32,
    ) -> Result<ModerationState, AccountError>;

    /// Sends a password reset code to the account's email.
    async fn request_password_reset(
        &self,
        actor_kind: ActorKind,
        email: &str,
    ) -> Result<(), AccountError>;

    async fn reset_password(
        &self,
        actor_kind: ActorKind,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;

    async fn get_customer(&self, id: i32) -> Result<customers::Model, AccountError>;

    async fn update_customer(
        &self,
        id: i32,
        changes: CustomerChanges,
    ) -> Result<customers::Model, AccountError>;

    /// Removes the customer, its cart and its registration record. Orders
    /// are kept.
    async fn delete_customer(&self, id: i32) -> Result<(), AccountError>;

    async fn get_seller(&self, id: i32) -> Result<sellers::Model, AccountError>;

    async fn update_seller(
        &self,
        id: i32,
        changes: SellerChanges,
    ) -> Result<sellers::Model, AccountError>;

    /// Removes the seller and its registration record. Products are kept.
    async fn delete_seller(&self, id: i32) -> Result<(), AccountError>;

    /// Sellers that are not blocked.
    async fn list_sellers(&self) -> Result<Vec<sellers::Model>, AccountError>;
}

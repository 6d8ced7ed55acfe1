//! Domain service for the administrator: login, moderation and reporting.

use serde::Serialize;
use thiserror::Error;

use super::tokens::TokenError;
use crate::domain::ActorKind;
use crate::entities::{customers, sellers};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<TokenError> for AdminError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub token: String,
    pub admin: AdminProfile,
}

/// Moderation view of a customer or seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeratedAccount {
    pub id: i32,
    pub kind: ActorKind,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blocked: bool,
    pub blocked_reason: Option<String>,
    pub blocked_at: Option<String>,
    pub blocked_by: Option<String>,
    pub created_at: String,
}

impl From<customers::Model> for ModeratedAccount {
    fn from(c: customers::Model) -> Self {
        Self {
            id: c.id,
            kind: ActorKind::Customer,
            name: c.name,
            email: c.email,
            phone: c.phone,
            blocked: c.blocked,
            blocked_reason: c.blocked_reason,
            blocked_at: c.blocked_at,
            blocked_by: c.blocked_by,
            created_at: c.created_at,
        }
    }
}

impl From<sellers::Model> for ModeratedAccount {
    fn from(s: sellers::Model) -> Self {
        Self {
            id: s.id,
            kind: ActorKind::Seller,
            name: s.name,
            email: s.email,
            phone: s.phone,
            blocked: s.blocked,
            blocked_reason: s.blocked_reason,
            blocked_at: s.blocked_at,
            blocked_by: s.blocked_by,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockedUsers {
    pub customers: Vec<ModeratedAccount>,
    pub sellers: Vec<ModeratedAccount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub active_customers: u64,
    pub blocked_customers: u64,
    pub active_sellers: u64,
    pub blocked_sellers: u64,
    pub total_products: u64,
    pub total_orders: u64,
    /// Sum over shipped and delivered orders.
    pub total_revenue: f64,
}

#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    /// Checks the configured administrator credential.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidCredentials`] on mismatch or when no
    /// password hash is configured.
    async fn login(&self, email: &str, password: &str) -> Result<AdminSession, AdminError>;

    async fn dashboard(&self) -> Result<DashboardStats, AdminError>;

    async fn list_accounts(
        &self,
        kind: ActorKind,
        include_blocked: bool,
    ) -> Result<Vec<ModeratedAccount>, AdminError>;

    async fn blocked_users(&self) -> Result<BlockedUsers, AdminError>;

    /// Blocks an account. Its tokens stop working on the next request.
    async fn block(
        &self,
        kind: ActorKind,
        id: i32,
        reason: Option<String>,
        admin_email: &str,
    ) -> Result<ModeratedAccount, AdminError>;

    async fn unblock(&self, kind: ActorKind, id: i32) -> Result<ModeratedAccount, AdminError>;
}

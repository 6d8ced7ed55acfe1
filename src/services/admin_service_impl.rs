//! `SeaORM` implementation of the `AdminService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use super::admin_service::{
    AdminError, AdminProfile, AdminService, AdminSession, BlockedUsers, DashboardStats,
    ModeratedAccount,
};
use super::tokens::TokenService;
use super::{DEFAULT_BLOCK_REASON, credentials};
use crate::config::AdminConfig;
use crate::db::{BlockInfo, Store};
use crate::domain::{ActorKind, OrderStatus, Role, normalize_email};

pub struct SeaOrmAdminService {
    store: Store,
    tokens: TokenService,
    admin: AdminConfig,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenService, admin: AdminConfig) -> Self {
        Self {
            store,
            tokens,
            admin,
        }
    }

    async fn set_block(
        &self,
        kind: ActorKind,
        id: i32,
        block: Option<BlockInfo>,
    ) -> Result<ModeratedAccount, AdminError> {
        let account = match kind {
            ActorKind::Customer => self
                .store
                .customers()
                .set_block(id, block)
                .await?
                .map(ModeratedAccount::from),
            ActorKind::Seller => self
                .store
                .sellers()
                .set_block(id, block)
                .await?
                .map(ModeratedAccount::from),
        };

        account.ok_or_else(|| AdminError::NotFound(format!("{kind} {id}")))
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn login(&self, email: &str, password: &str) -> Result<AdminSession, AdminError> {
        if self.admin.password_hash.is_empty() {
            warn!("Admin login attempted but admin.password_hash is not configured");
            return Err(AdminError::InvalidCredentials);
        }

        if normalize_email(email) != normalize_email(&self.admin.email) {
            return Err(AdminError::InvalidCredentials);
        }

        let valid = credentials::verify_password(password, &self.admin.password_hash)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?;
        if !valid {
            warn!("Failed admin login attempt");
            return Err(AdminError::InvalidCredentials);
        }

        let token = self.tokens.issue(
            0,
            Role::Admin,
            &normalize_email(&self.admin.email),
            Some(&self.admin.name),
        )?;

        info!("Administrator logged in");
        Ok(AdminSession {
            token,
            admin: AdminProfile {
                name: self.admin.name.clone(),
                email: self.admin.email.clone(),
                phone: self.admin.phone.clone(),
            },
        })
    }

    async fn dashboard(&self) -> Result<DashboardStats, AdminError> {
        let customers = self.store.customers();
        let sellers = self.store.sellers();

        Ok(DashboardStats {
            active_customers: customers.count(false).await?,
            blocked_customers: customers.count(true).await?,
            active_sellers: sellers.count(false).await?,
            blocked_sellers: sellers.count(true).await?,
            total_products: self.store.products().count().await?,
            total_orders: self.store.orders().count().await?,
            total_revenue: self.store.orders().revenue(OrderStatus::REVENUE).await?,
        })
    }

    async fn list_accounts(
        &self,
        kind: ActorKind,
        include_blocked: bool,
    ) -> Result<Vec<ModeratedAccount>, AdminError> {
        Ok(match kind {
            ActorKind::Customer => self
                .store
                .customers()
                .list(include_blocked)
                .await?
                .into_iter()
                .map(ModeratedAccount::from)
                .collect(),
            ActorKind::Seller => self
                .store
                .sellers()
                .list(include_blocked)
                .await?
                .into_iter()
                .map(ModeratedAccount::from)
                .collect(),
        })
    }

    async fn blocked_users(&self) -> Result<BlockedUsers, AdminError> {
        Ok(BlockedUsers {
            customers: self
                .store
                .customers()
                .list_blocked()
                .await?
                .into_iter()
                .map(ModeratedAccount::from)
                .collect(),
            sellers: self
                .store
                .sellers()
                .list_blocked()
                .await?
                .into_iter()
                .map(ModeratedAccount::from)
                .collect(),
        })
    }

    async fn block(
        &self,
        kind: ActorKind,
        id: i32,
        reason: Option<String>,
        admin_email: &str,
    ) -> Result<ModeratedAccount, AdminError> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string());

        let account = self
            .set_block(
                kind,
                id,
                Some(BlockInfo {
                    reason,
                    blocked_at: chrono::Utc::now().to_rfc3339(),
                    blocked_by: admin_email.to_string(),
                }),
            )
            .await?;

        info!(kind = %kind, account_id = id, "Account blocked");
        Ok(account)
    }

    async fn unblock(&self, kind: ActorKind, id: i32) -> Result<ModeratedAccount, AdminError> {
        let account = self.set_block(kind, id, None).await?;
        info!(kind = %kind, account_id = id, "Account unblocked");
        Ok(account)
    }
}

//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use sea_orm::TransactionTrait;
use tracing::{info, warn};

use super::account_service::{AccountError, AccountService, ModerationState};
use super::credentials;
use super::otp::{OtpService, Recipient};
use super::registration_service::AuthSession;
use super::tokens::TokenService;
use crate::config::SecurityConfig;
use crate::db::{
    CartRepository, CodeKey, CustomerChanges, CustomerRepository, OtpRepository,
    RegistrationRepository, SellerChanges, SellerRepository, Store,
};
use crate::domain::{ActorKind, OtpPurpose};
use crate::entities::{customers, sellers};

pub struct SeaOrmAccountService {
    store: Store,
    otp: OtpService,
    tokens: TokenService,
    security: SecurityConfig,
}

/// The fields shared by both account tables that login and reset need.
struct Credentials {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    moderation: ModerationState,
}

impl From<&customers::Model> for Credentials {
    fn from(c: &customers::Model) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            password_hash: c.password_hash.clone(),
            moderation: ModerationState {
                blocked: c.blocked,
                reason: c.blocked_reason.clone(),
                blocked_at: c.blocked_at.clone(),
            },
        }
    }
}

impl From<&sellers::Model> for Credentials {
    fn from(s: &sellers::Model) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            email: s.email.clone(),
            password_hash: s.password_hash.clone(),
            moderation: ModerationState {
                blocked: s.blocked,
                reason: s.blocked_reason.clone(),
                blocked_at: s.blocked_at.clone(),
            },
        }
    }
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(
        store: Store,
        otp: OtpService,
        tokens: TokenService,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            otp,
            tokens,
            security,
        }
    }

    async fn credentials_by_email(
        &self,
        actor_kind: ActorKind,
        email: &str,
    ) -> Result<Option<Credentials>, AccountError> {
        Ok(match actor_kind {
            ActorKind::Customer => self
                .store
                .customers()
                .get_by_email(email)
                .await?
                .as_ref()
                .map(Credentials::from),
            ActorKind::Seller => self
                .store
                .sellers()
                .get_by_email(email)
                .await?
                .as_ref()
                .map(Credentials::from),
        })
    }

    /// Checks the password, then the block. Unknown emails and wrong
    /// passwords produce the same error.
    async fn authenticate(
        &self,
        actor_kind: ActorKind,
        email: &str,
        password: &str,
    ) -> Result<String, AccountError> {
        let Some(account) = self.credentials_by_email(actor_kind, email).await? else {
            return Err(AccountError::InvalidCredentials);
        };

        let valid = credentials::verify_password(password, &account.password_hash)
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?;
        if !valid {
            warn!(actor = %actor_kind, "Failed login attempt");
            return Err(AccountError::InvalidCredentials);
        }

        account.moderation.ensure_active()?;

        let token = self.tokens.issue(
            account.id,
            actor_kind.role(),
            &account.email,
            Some(&account.name),
        )?;
        info!(actor = %actor_kind, account_id = account.id, "Login succeeded");
        Ok(token)
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn login_customer(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession<customers::Model>, AccountError> {
        let token = self
            .authenticate(ActorKind::Customer, email, password)
            .await?;
        let account = self
            .store
            .customers()
            .get_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;
        Ok(AuthSession { token, account })
    }

    async fn login_seller(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession<sellers::Model>, AccountError> {
        let token = self.authenticate(ActorKind::Seller, email, password).await?;
        let account = self
            .store
            .sellers()
            .get_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;
        Ok(AuthSession { token, account })
    }

    async fn moderation_state(
        &self,
        actor_kind: ActorKind,
        id: i32,
    ) -> Result<ModerationState, AccountError> {
        let credentials = match actor_kind {
            ActorKind::Customer => self
                .store
                .customers()
                .get(id)
                .await?
                .as_ref()
                .map(Credentials::from),
            ActorKind::Seller => self
                .store
                .sellers()
                .get(id)
                .await?
                .as_ref()
                .map(Credentials::from),
        };

        credentials
            .map(|c| c.moderation)
            .ok_or_else(|| AccountError::NotFound(capitalize(actor_kind.as_str())))
    }

    async fn request_password_reset(
        &self,
        actor_kind: ActorKind,
        email: &str,
    ) -> Result<(), AccountError> {
        let Some(account) = self.credentials_by_email(actor_kind, email).await? else {
            return Err(AccountError::NotFound(capitalize(actor_kind.as_str())));
        };
        account.moderation.ensure_active()?;

        let txn = self.store.conn.begin().await?;
        self.otp
            .issue(
                &txn,
                CodeKey {
                    subject: &account.email,
                    purpose: OtpPurpose::PasswordReset,
                    actor_kind,
                },
                Recipient {
                    email: account.email.clone(),
                    name: Some(account.name.clone()),
                    context: Vec::new(),
                },
                None,
            )
            .await?;
        txn.commit().await?;

        Ok(())
    }

    async fn reset_password(
        &self,
        actor_kind: ActorKind,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let password_hash = credentials::hash_password(new_password, &self.security)
            .await
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        let txn = self.store.conn.begin().await?;

        self.otp
            .validate(
                &txn,
                CodeKey {
                    subject: email,
                    purpose: OtpPurpose::PasswordReset,
                    actor_kind,
                },
                code,
            )
            .await?;

        let updated = match actor_kind {
            ActorKind::Customer => {
                let repo = CustomerRepository::new(&txn);
                match repo.get_by_email(email).await? {
                    Some(c) => repo.update_password(c.id, password_hash).await?,
                    None => false,
                }
            }
            ActorKind::Seller => {
                let repo = SellerRepository::new(&txn);
                match repo.get_by_email(email).await? {
                    Some(s) => repo.update_password(s.id, password_hash).await?,
                    None => false,
                }
            }
        };
        if !updated {
            return Err(AccountError::NotFound(capitalize(actor_kind.as_str())));
        }

        txn.commit().await?;

        info!(actor = %actor_kind, "Password reset");
        Ok(())
    }

    async fn get_customer(&self, id: i32) -> Result<customers::Model, AccountError> {
        self.store
            .customers()
            .get(id)
            .await?
            .ok_or_else(|| AccountError::NotFound("Customer".to_string()))
    }

    async fn update_customer(
        &self,
        id: i32,
        changes: CustomerChanges,
    ) -> Result<customers::Model, AccountError> {
        let repo = self.store.customers();
        if let Some(phone) = &changes.phone
            && repo.phone_taken_by_other(phone, id).await?
        {
            return Err(AccountError::DuplicateIdentity(
                "Phone number already in use".to_string(),
            ));
        }

        repo.update_profile(id, changes)
            .await?
            .ok_or_else(|| AccountError::NotFound("Customer".to_string()))
    }

    async fn delete_customer(&self, id: i32) -> Result<(), AccountError> {
        let txn = self.store.conn.begin().await?;
        let customers = CustomerRepository::new(&txn);

        let Some(customer) = customers.get(id).await? else {
            return Err(AccountError::NotFound("Customer".to_string()));
        };

        CartRepository::new(&txn).delete_for_customer(id).await?;
        RegistrationRepository::new(&txn)
            .delete(&customer.email, ActorKind::Customer)
            .await?;
        OtpRepository::new(&txn)
            .delete_for_subject(&customer.email, ActorKind::Customer)
            .await?;
        customers.delete(id).await?;

        txn.commit().await?;

        info!(customer_id = id, "Customer account deleted");
        Ok(())
    }

    async fn get_seller(&self, id: i32) -> Result<sellers::Model, AccountError> {
        self.store
            .sellers()
            .get(id)
            .await?
            .ok_or_else(|| AccountError::NotFound("Seller".to_string()))
    }

    async fn update_seller(
        &self,
        id: i32,
        changes: SellerChanges,
    ) -> Result<sellers::Model, AccountError> {
        let repo = self.store.sellers();
        if let Some(phone) = &changes.phone
            && repo.phone_taken_by_other(phone, id).await?
        {
            return Err(AccountError::DuplicateIdentity(
                "Phone number already in use".to_string(),
            ));
        }

        repo.update_profile(id, changes)
            .await?
            .ok_or_else(|| AccountError::NotFound("Seller".to_string()))
    }

    async fn delete_seller(&self, id: i32) -> Result<(), AccountError> {
        let txn = self.store.conn.begin().await?;
        let sellers = SellerRepository::new(&txn);

        let Some(seller) = sellers.get(id).await? else {
            return Err(AccountError::NotFound("Seller".to_string()));
        };

        RegistrationRepository::new(&txn)
            .delete(&seller.email, ActorKind::Seller)
            .await?;
        OtpRepository::new(&txn)
            .delete_for_subject(&seller.email, ActorKind::Seller)
            .await?;
        sellers.delete(id).await?;

        txn.commit().await?;

        info!(seller_id = id, "Seller account deleted");
        Ok(())
    }

    async fn list_sellers(&self) -> Result<Vec<sellers::Model>, AccountError> {
        Ok(self.store.sellers().list(false).await?)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

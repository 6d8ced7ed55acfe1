//! Domain service for the code-gated registration and approval flows.
//!
//! Customers verify their email and are created straight away. Sellers
//! verify their email, then need a code the administrator received. Product
//! submissions are parked on an approval code until the seller redeems it.

use thiserror::Error;

use super::otp::OtpError;
use super::tokens::TokenError;
use crate::db::ProductDraft;
use crate::domain::Gender;
use crate::entities::{customers, products, sellers};

#[derive(Debug, Error)]
pub enum RegistrationError {
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

impl From<OtpError> for RegistrationError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::InvalidOrExpiredCode => Self::InvalidOrExpiredCode,
            OtpError::Notification(e) => Self::Notification(e.to_string()),
            OtpError::Storage(msg) => Self::Database(msg),
        }
    }
}

impl From<sea_orm::DbErr> for RegistrationError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RegistrationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<TokenError> for RegistrationError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Step one of either registration flow.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    /// Already normalized
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct CustomerSignup {
    pub name: String,
    pub address: String,
    pub gender: Gender,
    pub date_of_birth: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SellerSignup {
    pub name: String,
    pub address: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// The authenticated seller submitting or redeeming a product approval.
#[derive(Debug, Clone)]
pub struct SellerIdentity {
    pub id: i32,
    pub email: String,
    pub name: String,
}

/// A freshly created or logged-in account together with its session token.
#[derive(Debug, Clone)]
pub struct AuthSession<T> {
    pub token: String,
    pub account: T,
}

#[async_trait::async_trait]
pub trait RegistrationService: Send + Sync {
    /// Records the registrant and mails them an email verification code.
    /// Returns the normalized email the code went to.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateIdentity`] if a customer already
    /// uses the email or phone.
    async fn request_customer_code(
        &self,
        request: RegistrationRequest,
    ) -> Result<String, RegistrationError>;

    /// Redeems the email code and creates the customer with an empty cart.
    async fn complete_customer(
        &self,
        signup: CustomerSignup,
        code: &str,
    ) -> Result<AuthSession<customers::Model>, RegistrationError>;

    async fn request_seller_code(
        &self,
        request: RegistrationRequest,
    ) -> Result<String, RegistrationError>;

    /// Redeems the seller's email code and sends the administrator the
    /// approval code for this registrant.
    async fn verify_seller_email(&self, email: &str, code: &str)
    -> Result<(), RegistrationError>;

    /// Redeems the administrator's approval code and creates the seller.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidOrExpiredCode`] when the email was
    /// never verified, as well as for a bad code.
    async fn complete_seller(
        &self,
        signup: SellerSignup,
        admin_code: &str,
    ) -> Result<AuthSession<sellers::Model>, RegistrationError>;

    /// Parks `draft` on an approval code sent to the administrator.
    async fn request_product_approval(
        &self,
        seller: &SellerIdentity,
        draft: ProductDraft,
    ) -> Result<(), RegistrationError>;

    /// Redeems an approval code and creates the parked product for `seller`.
    async fn create_approved_product(
        &self,
        seller: &SellerIdentity,
        code: &str,
    ) -> Result<products::Model, RegistrationError>;
}

//! Out-of-band delivery of one-time codes.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{NotifierConfig, NotifierMode};
use crate::domain::OtpPurpose;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("Notifier misconfigured: {0}")]
    Config(String),
}

/// A code on its way to a registrant or to the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub recipient_name: Option<String>,
    pub kind: OtpPurpose,
    pub code: String,
    /// Minutes the code stays valid.
    pub valid_minutes: u64,
    /// Who or what the code is about, e.g. the registering seller or the
    /// product awaiting approval.
    pub context: Vec<(&'static str, String)>,
}

impl Notification {
    #[must_use]
    pub fn subject(&self) -> &'static str {
        match self.kind {
            OtpPurpose::EmailVerification => "Verify your email",
            OtpPurpose::PasswordReset => "Reset your password",
            OtpPurpose::SellerAdminApproval => "New seller registration awaiting approval",
            OtpPurpose::ProductCreationApproval => "New product awaiting approval",
        }
    }

    #[must_use]
    pub fn body(&self) -> String {
        let greeting = self
            .recipient_name
            .as_deref()
            .map_or_else(|| "Hello,".to_string(), |name| format!("Hello {name},"));

        let intro = match self.kind {
            OtpPurpose::EmailVerification => "Use this code to verify your email address:",
            OtpPurpose::PasswordReset => "Use this code to reset your password:",
            OtpPurpose::SellerAdminApproval => {
                "A seller is requesting to register. Share this code with them to approve:"
            }
            OtpPurpose::ProductCreationApproval => {
                "A seller submitted a product. Share this code with them to approve it:"
            }
        };

        let mut body = format!("{greeting}\n\n{intro}\n\n    {}\n\n", self.code);
        for (label, value) in &self.context {
            body.push_str(&format!("{label}: {value}\n"));
        }
        body.push_str(&format!(
            "\nThe code is valid for {} minutes. If you did not expect this message, ignore it.\n",
            self.valid_minutes
        ));
        body
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes codes to the application log. Development only.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            event = "otp_delivered_to_log",
            recipient = %notification.recipient,
            kind = %notification.kind,
            code = %notification.code,
            "{}",
            notification.subject()
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody<'a> {
    sender: EmailAddress<'a>,
    to: Vec<EmailAddress<'a>>,
    subject: &'a str,
    text_content: String,
}

/// Delivers through a Brevo-compatible transactional email endpoint.
pub struct HttpEmailNotifier {
    client: reqwest::Client,
    config: NotifierConfig,
}

impl HttpEmailNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("marketplace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: &self.config.sender_email,
                name: Some(&self.config.sender_name),
            },
            to: vec![EmailAddress {
                email: &notification.recipient,
                name: notification.recipient_name.as_deref(),
            }],
            subject: notification.subject(),
            text_content: notification.body(),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), kind = %notification.kind, "Email API rejected message");
            return Err(NotifyError::Delivery(format!(
                "email API returned {status}: {text}"
            )));
        }

        info!(kind = %notification.kind, recipient = %notification.recipient, "Code delivered");
        Ok(())
    }
}

pub fn build_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match config.mode {
        NotifierMode::Log => Ok(Arc::new(LogNotifier)),
        NotifierMode::Http => Ok(Arc::new(HttpEmailNotifier::new(config.clone())?)),
    }
}

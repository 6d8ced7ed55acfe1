use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use super::ApiResponse;
use crate::services::{
    AccountError, AdminError, CartError, CatalogError, OrderError, RegistrationError,
};

/// The one message every failed code redemption gets.
pub const INVALID_CODE_MESSAGE: &str = "Invalid or expired OTP";

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    InvalidOrExpiredCode,

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),

    Blocked {
        reason: String,
        blocked_at: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct BlockedDetails {
    blocked_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked_at: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::InvalidOrExpiredCode => f.write_str(INVALID_CODE_MESSAGE),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::Blocked { reason, .. } => write!(f, "Blocked: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} service is unavailable"),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::InvalidOrExpiredCode => {
                (StatusCode::BAD_REQUEST, INVALID_CODE_MESSAGE.to_string())
            }
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::Blocked { reason, blocked_at } => {
                let body = ApiResponse::error_with_data(
                    format!("Your account has been blocked. Reason: {reason}"),
                    BlockedDetails {
                        blocked_reason: reason.clone(),
                        blocked_at: blocked_at.clone(),
                    },
                );
                return (StatusCode::FORBIDDEN, Json(body)).into_response();
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    fn notifier(message: String) -> Self {
        Self::ExternalApiError {
            service: "Email".to_string(),
            message,
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::DuplicateIdentity(msg) => Self::Conflict(msg),
            RegistrationError::InvalidOrExpiredCode => Self::InvalidOrExpiredCode,
            RegistrationError::Notification(msg) => Self::notifier(msg),
            RegistrationError::Database(msg) => Self::DatabaseError(msg),
            RegistrationError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidCredentials => {
                Self::unauthorized("Invalid email or password")
            }
            AccountError::Blocked { reason, blocked_at } => Self::Blocked { reason, blocked_at },
            AccountError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            AccountError::DuplicateIdentity(msg) => Self::Conflict(msg),
            AccountError::InvalidOrExpiredCode => Self::InvalidOrExpiredCode,
            AccountError::Notification(msg) => Self::notifier(msg),
            AccountError::Database(msg) => Self::DatabaseError(msg),
            AccountError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => Self::not_found("Product", id),
            CatalogError::Forbidden(msg) => Self::Forbidden(msg),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            CartError::Conflict(msg) => Self::Conflict(msg),
            CartError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(msg) => Self::ValidationError(msg),
            OrderError::NotFound(id) => Self::not_found("Order", id),
            OrderError::Conflict(msg) => Self::Conflict(msg),
            OrderError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::InvalidCredentials => Self::unauthorized("Invalid email or password"),
            AdminError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            AdminError::Database(msg) => Self::DatabaseError(msg),
            AdminError::Internal(msg) => Self::internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_code_is_generic() {
        let (status, json) = body_json(ApiError::InvalidOrExpiredCode).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], INVALID_CODE_MESSAGE);
    }

    #[tokio::test]
    async fn test_blocked_carries_reason() {
        let (status, json) = body_json(ApiError::Blocked {
            reason: "spam".to_string(),
            blocked_at: Some("2026-01-01T00:00:00+00:00".to_string()),
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["data"]["blocked_reason"], "spam");
        assert!(json["message"].as_str().unwrap().contains("spam"));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, json) = body_json(ApiError::internal("secret detail")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "An internal error occurred");
    }

    #[test]
    fn test_service_error_mapping() {
        assert!(matches!(
            ApiError::from(RegistrationError::Notification("down".into())),
            ApiError::ExternalApiError { .. }
        ));
        assert!(matches!(
            ApiError::from(RegistrationError::DuplicateIdentity("dup".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(OrderError::Conflict("stock".into())),
            ApiError::Conflict(_)
        ));
    }
}

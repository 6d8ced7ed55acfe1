use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::domain::{ActorKind, Role};
use crate::services::{AccountError, SellerIdentity};

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i32,
    pub role: Role,
    pub email: String,
    pub name: Option<String>,
}

impl Principal {
    #[must_use]
    pub fn seller_identity(&self) -> SellerIdentity {
        SellerIdentity {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone().unwrap_or_default(),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies the bearer token and, for customers and sellers, re-reads the
/// moderation state so a block takes effect on the very next request.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = state.tokens().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    let kind = match claims.role {
        Role::Customer => Some(ActorKind::Customer),
        Role::Seller => Some(ActorKind::Seller),
        Role::Admin => None,
    };

    if let Some(kind) = kind {
        let moderation = state
            .account_service()
            .moderation_state(kind, claims.sub)
            .await
            .map_err(|e| match e {
                AccountError::NotFound(_) => ApiError::unauthorized("Account no longer exists"),
                other => ApiError::from(other),
            })?;
        moderation.ensure_active()?;
    }

    tracing::Span::current().record("user_id", format!("{}:{}", claims.role, claims.sub));

    request.extensions_mut().insert(Principal {
        id: claims.sub,
        role: claims.role,
        email: claims.email,
        name: claims.name,
    });

    Ok(next.run(request).await)
}

fn require_role(request: &Request, role: Role) -> Result<(), ApiError> {
    match request.extensions().get::<Principal>() {
        Some(p) if p.role == role => Ok(()),
        Some(_) => Err(ApiError::forbidden(format!("Access denied. {role} only"))),
        None => Err(ApiError::unauthorized("Not authenticated")),
    }
}

pub async fn require_customer(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Customer)?;
    Ok(next.run(request).await)
}

pub async fn require_seller(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Seller)?;
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&request, Role::Admin)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}

//! Administrator login, moderation and reporting endpoints.

use axum::{Extension, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::extract::{Json, Path, Query};
use super::validation::{require, validate_email, validate_id};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::ActorKind;
use crate::services::{AdminSession, BlockedUsers, DashboardStats, ModeratedAccount};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlockRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountListQuery {
    pub include_blocked: bool,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AdminSession>>, ApiError> {
    let email = validate_email(body.admin_email.as_deref())?;
    let password = require("Password", body.admin_password.as_deref())?;

    let session = state.admin_service().login(&email, &password).await?;
    Ok(Json(ApiResponse::success("Admin login successful", session)))
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let stats = state.admin_service().dashboard().await?;
    Ok(Json(ApiResponse::success("Dashboard statistics", stats)))
}

/// GET /api/admin/customers?includeBlocked=
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<ApiResponse<Vec<ModeratedAccount>>>, ApiError> {
    let customers = state
        .admin_service()
        .list_accounts(ActorKind::Customer, query.include_blocked)
        .await?;
    Ok(Json(ApiResponse::success("Customers retrieved", customers)))
}

/// GET /api/admin/sellers?includeBlocked=
pub async fn list_sellers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<ApiResponse<Vec<ModeratedAccount>>>, ApiError> {
    let sellers = state
        .admin_service()
        .list_accounts(ActorKind::Seller, query.include_blocked)
        .await?;
    Ok(Json(ApiResponse::success("Sellers retrieved", sellers)))
}

/// GET /api/admin/blocked-users
pub async fn blocked_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BlockedUsers>>, ApiError> {
    let blocked = state.admin_service().blocked_users().await?;
    Ok(Json(ApiResponse::success("Blocked users retrieved", blocked)))
}

async fn block(
    state: &AppState,
    principal: &Principal,
    kind: ActorKind,
    id: i32,
    body: BlockRequest,
) -> Result<Json<ApiResponse<ModeratedAccount>>, ApiError> {
    let id = validate_id(id)?;
    let reason = body
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let account = state
        .admin_service()
        .block(kind, id, reason, &principal.email)
        .await?;

    Ok(Json(ApiResponse::success(
        format!("{} blocked successfully", capitalized(kind)),
        account,
    )))
}

async fn unblock(
    state: &AppState,
    kind: ActorKind,
    id: i32,
) -> Result<Json<ApiResponse<ModeratedAccount>>, ApiError> {
    let id = validate_id(id)?;
    let account = state.admin_service().unblock(kind, id).await?;
    Ok(Json(ApiResponse::success(
        format!("{} unblocked successfully", capitalized(kind)),
        account,
    )))
}

const fn capitalized(kind: ActorKind) -> &'static str {
    match kind {
        ActorKind::Customer => "Customer",
        ActorKind::Seller => "Seller",
    }
}

/// PUT /api/admin/blacklist-customer/{id}
pub async fn block_customer(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    body: Option<Json<BlockRequest>>,
) -> Result<Json<ApiResponse<ModeratedAccount>>, ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    block(&state, &principal, ActorKind::Customer, id, body).await
}

/// PUT /api/admin/blacklist-seller/{id}
pub async fn block_seller(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    body: Option<Json<BlockRequest>>,
) -> Result<Json<ApiResponse<ModeratedAccount>>, ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    block(&state, &principal, ActorKind::Seller, id, body).await
}

/// PUT /api/admin/unblock-customer/{id}
pub async fn unblock_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ModeratedAccount>>, ApiError> {
    unblock(&state, ActorKind::Customer, id).await
}

/// PUT /api/admin/unblock-seller/{id}
pub async fn unblock_seller(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ModeratedAccount>>, ApiError> {
    unblock(&state, ActorKind::Seller, id).await
}

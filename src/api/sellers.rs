//! Seller registration (email code, then administrator approval), login,
//! password reset and profile endpoints.

use axum::{Extension, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::extract::Json;
use super::customers::{ForgotPasswordRequest, ResetPasswordRequest};
use super::validation::{require, validate_email, validate_password, validate_phone};
use super::{ApiError, ApiResponse, AppState, AuthResponse, EmailSentDto, SellerDto};
use crate::db::SellerChanges;
use crate::domain::ActorKind;
use crate::services::{RegistrationRequest, SellerSignup};

#[derive(Debug, Deserialize)]
pub struct EmailOtpRequest {
    pub seller_name: Option<String>,
    pub seller_email: Option<String>,
    pub seller_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub seller_email: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyAdminRequest {
    pub seller_name: Option<String>,
    pub seller_address: Option<String>,
    pub seller_company: Option<String>,
    pub seller_email: Option<String>,
    pub seller_phone: Option<String>,
    pub seller_password: Option<String>,
    pub admin_otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub seller_email: Option<String>,
    pub seller_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub seller_name: Option<String>,
    pub seller_address: Option<String>,
    pub seller_company: Option<String>,
    pub seller_phone: Option<String>,
}

/// POST /api/sellers/request-email-otp
pub async fn request_email_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EmailOtpRequest>,
) -> Result<Json<ApiResponse<EmailSentDto>>, ApiError> {
    let request = RegistrationRequest {
        name: require("Name", body.seller_name.as_deref())?,
        email: validate_email(body.seller_email.as_deref())?,
        phone: validate_phone(body.seller_phone.as_deref())?,
    };

    let email = state
        .registration_service()
        .request_seller_code(request)
        .await?;

    Ok(Json(ApiResponse::success(
        "OTP sent to your email",
        EmailSentDto { email },
    )))
}

/// POST /api/sellers/verify-email-otp
pub async fn verify_email_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<EmailSentDto>>, ApiError> {
    let email = validate_email(body.seller_email.as_deref())?;
    let otp = require("OTP", body.otp.as_deref())?;

    state
        .registration_service()
        .verify_seller_email(&email, &otp)
        .await?;

    Ok(Json(ApiResponse::success(
        "Email verified. Waiting for admin approval code",
        EmailSentDto { email },
    )))
}

/// POST /api/sellers/verify-admin-otp-register
pub async fn verify_admin_otp_register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse<SellerDto>>>), ApiError> {
    let min_password = state.config().read().await.security.min_password_length;

    let signup = SellerSignup {
        name: require("Name", body.seller_name.as_deref())?,
        address: require("Address", body.seller_address.as_deref())?,
        company: require("Company", body.seller_company.as_deref())?,
        email: validate_email(body.seller_email.as_deref())?,
        phone: validate_phone(body.seller_phone.as_deref())?,
        password: validate_password(body.seller_password.as_deref(), min_password)?,
    };
    let admin_otp = require("Admin OTP", body.admin_otp.as_deref())?;

    let session = state
        .registration_service()
        .complete_seller(signup, &admin_otp)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Seller registered successfully",
            AuthResponse {
                token: session.token,
                user: SellerDto::from(session.account),
            },
        )),
    ))
}

/// POST /api/sellers/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse<SellerDto>>>, ApiError> {
    let email = validate_email(body.seller_email.as_deref())?;
    let password = require("Password", body.seller_password.as_deref())?;

    let session = state
        .account_service()
        .login_seller(&email, &password)
        .await?;

    Ok(Json(ApiResponse::success(
        "Login successful",
        AuthResponse {
            token: session.token,
            user: SellerDto::from(session.account),
        },
    )))
}

/// POST /api/sellers/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<EmailSentDto>>, ApiError> {
    let email = validate_email(body.email.as_deref())?;

    state
        .account_service()
        .request_password_reset(ActorKind::Seller, &email)
        .await?;

    Ok(Json(ApiResponse::success(
        "Password reset OTP sent to your email",
        EmailSentDto { email },
    )))
}

/// POST /api/sellers/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let min_password = state.config().read().await.security.min_password_length;

    let email = validate_email(body.email.as_deref())?;
    let otp = require("OTP", body.otp.as_deref())?;
    let new_password = validate_password(body.new_password.as_deref(), min_password)?;

    state
        .account_service()
        .reset_password(ActorKind::Seller, &email, &otp, &new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password reset successfully")))
}

/// GET /api/sellers
pub async fn list_sellers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<SellerDto>>>, ApiError> {
    let sellers = state.account_service().list_sellers().await?;
    Ok(Json(ApiResponse::success(
        "Sellers retrieved",
        sellers.into_iter().map(SellerDto::from).collect(),
    )))
}

/// GET /api/sellers/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<SellerDto>>, ApiError> {
    let seller = state.account_service().get_seller(principal.id).await?;
    Ok(Json(ApiResponse::success(
        "Profile retrieved",
        SellerDto::from(seller),
    )))
}

/// PUT /api/sellers/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<SellerDto>>, ApiError> {
    let changes = SellerChanges {
        name: body
            .seller_name
            .as_deref()
            .map(|v| require("Name", Some(v)))
            .transpose()?,
        address: body
            .seller_address
            .as_deref()
            .map(|v| require("Address", Some(v)))
            .transpose()?,
        company: body
            .seller_company
            .as_deref()
            .map(|v| require("Company", Some(v)))
            .transpose()?,
        phone: body
            .seller_phone
            .as_deref()
            .map(|v| validate_phone(Some(v)))
            .transpose()?,
    };

    let seller = state
        .account_service()
        .update_seller(principal.id, changes)
        .await?;

    Ok(Json(ApiResponse::success(
        "Profile updated successfully",
        SellerDto::from(seller),
    )))
}

/// DELETE /api/sellers/profile
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.account_service().delete_seller(principal.id).await?;
    Ok(Json(ApiResponse::message("Account deleted successfully")))
}

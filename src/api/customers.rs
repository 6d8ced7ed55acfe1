//! Customer registration, login, password reset and profile endpoints.

use axum::{Extension, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::extract::Json;
use super::validation::{
    parse_choice, require, validate_date_of_birth, validate_email, validate_password,
    validate_phone,
};
use super::{ApiError, ApiResponse, AppState, AuthResponse, CustomerDto, EmailSentDto};
use crate::db::CustomerChanges;
use crate::domain::{ActorKind, Gender};
use crate::services::{CustomerSignup, RegistrationRequest};

#[derive(Debug, Deserialize)]
pub struct RegistrationOtpRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRegistrationRequest {
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub customer_gender: Option<String>,
    #[serde(rename = "customer_DOB")]
    pub customer_dob: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_password: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub customer_email: Option<String>,
    pub customer_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub customer_phone: Option<String>,
}

/// POST /api/customers/request-registration-otp
pub async fn request_registration_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegistrationOtpRequest>,
) -> Result<Json<ApiResponse<EmailSentDto>>, ApiError> {
    let request = RegistrationRequest {
        name: require("Name", body.customer_name.as_deref())?,
        email: validate_email(body.customer_email.as_deref())?,
        phone: validate_phone(body.customer_phone.as_deref())?,
    };

    let email = state
        .registration_service()
        .request_customer_code(request)
        .await?;

    Ok(Json(ApiResponse::success(
        "OTP sent to your email",
        EmailSentDto { email },
    )))
}

/// POST /api/customers/verify-otp-register
///
/// Every profile field is checked before the code is touched, so a
/// rejected submission leaves both the code and the registration intact.
pub async fn verify_otp_register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyRegistrationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse<CustomerDto>>>), ApiError> {
    let min_password = state.config().read().await.security.min_password_length;

    let signup = CustomerSignup {
        name: require("Name", body.customer_name.as_deref())?,
        address: require("Address", body.customer_address.as_deref())?,
        gender: parse_choice::<Gender>("Gender", body.customer_gender.as_deref())?,
        date_of_birth: validate_date_of_birth(body.customer_dob.as_deref())?,
        email: validate_email(body.customer_email.as_deref())?,
        phone: validate_phone(body.customer_phone.as_deref())?,
        password: validate_password(body.customer_password.as_deref(), min_password)?,
    };
    let otp = require("OTP", body.otp.as_deref())?;

    let session = state
        .registration_service()
        .complete_customer(signup, &otp)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Customer registered successfully",
            AuthResponse {
                token: session.token,
                user: CustomerDto::from(session.account),
            },
        )),
    ))
}

/// POST /api/customers/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse<CustomerDto>>>, ApiError> {
    let email = validate_email(body.customer_email.as_deref())?;
    let password = require("Password", body.customer_password.as_deref())?;

    let session = state
        .account_service()
        .login_customer(&email, &password)
        .await?;

    Ok(Json(ApiResponse::success(
        "Login successful",
        AuthResponse {
            token: session.token,
            user: CustomerDto::from(session.account),
        },
    )))
}

/// POST /api/customers/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<EmailSentDto>>, ApiError> {
    let email = validate_email(body.email.as_deref())?;

    state
        .account_service()
        .request_password_reset(ActorKind::Customer, &email)
        .await?;

    Ok(Json(ApiResponse::success(
        "Password reset OTP sent to your email",
        EmailSentDto { email },
    )))
}

/// POST /api/customers/reset-password
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
        .reset_password(ActorKind::Customer, &email, &otp, &new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password reset successfully")))
}

/// GET /api/customers/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    let customer = state.account_service().get_customer(principal.id).await?;
    Ok(Json(ApiResponse::success(
        "Profile retrieved",
        CustomerDto::from(customer),
    )))
}

/// PUT /api/customers/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError> {
    let changes = CustomerChanges {
        name: body
            .customer_name
            .as_deref()
            .map(|v| require("Name", Some(v)))
            .transpose()?,
        address: body
            .customer_address
            .as_deref()
            .map(|v| require("Address", Some(v)))
            .transpose()?,
        phone: body
            .customer_phone
            .as_deref()
            .map(|v| validate_phone(Some(v)))
            .transpose()?,
    };

    let customer = state
        .account_service()
        .update_customer(principal.id, changes)
        .await?;

    Ok(Json(ApiResponse::success(
        "Profile updated successfully",
        CustomerDto::from(customer),
    )))
}

/// DELETE /api/customers/profile
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.account_service().delete_customer(principal.id).await?;
    Ok(Json(ApiResponse::message("Account deleted successfully")))
}

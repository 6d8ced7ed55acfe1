use axum::{Extension, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::extract::{Json, Path};
use super::validation::{parse_choice, validate_id, validate_shipping_address};
use super::{ApiError, ApiResponse, AppState, OrderDto};
use crate::domain::OrderStatus;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub shipping_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub order_status: Option<String>,
}

/// POST /api/orders/place
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDto>>), ApiError> {
    let address = validate_shipping_address(body.shipping_address.as_deref())?;

    let order = state
        .order_service()
        .place(principal.id, &address)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Order placed successfully",
            OrderDto::from(order),
        )),
    ))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    let orders = state
        .order_service()
        .list_for_customer(principal.id)
        .await?;
    Ok(Json(ApiResponse::success(
        "Orders retrieved",
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = validate_id(id)?;
    let order = state
        .order_service()
        .get_for_customer(principal.id, id)
        .await?;
    Ok(Json(ApiResponse::success(
        "Order retrieved",
        OrderDto::from(order),
    )))
}

/// PUT /api/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = validate_id(id)?;
    let order = state.order_service().cancel(principal.id, id).await?;
    Ok(Json(ApiResponse::success(
        "Order cancelled successfully",
        OrderDto::from(order),
    )))
}

/// GET /api/admin/orders
pub async fn list_all_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>, ApiError> {
    let orders = state.order_service().list_all().await?;
    Ok(Json(ApiResponse::success(
        "Orders retrieved",
        orders.into_iter().map(OrderDto::from).collect(),
    )))
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderDto>>, ApiError> {
    let id = validate_id(id)?;
    let status = parse_choice::<OrderStatus>("Order status", body.order_status.as_deref())?;

    let order = state.order_service().update_status(id, status).await?;
    Ok(Json(ApiResponse::success(
        "Order status updated",
        OrderDto::from(order),
    )))
}

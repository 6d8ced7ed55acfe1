use axum::{Extension, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::extract::{Json, Path};
use super::validation::{validate_id, validate_quantity};
use super::{ApiError, ApiResponse, AppState, CartDto};

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Option<i32>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: Option<i32>,
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let cart = state.cart_service().get(principal.id).await?;
    Ok(Json(ApiResponse::success("Cart retrieved", CartDto::from(cart))))
}

/// POST /api/cart/add
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let product_id = body
        .product_id
        .ok_or_else(|| ApiError::validation("Product ID is required"))
        .and_then(validate_id)?;
    let quantity = validate_quantity(Some(body.quantity.unwrap_or(1)))?;

    let cart = state
        .cart_service()
        .add(principal.id, product_id, quantity)
        .await?;

    Ok(Json(ApiResponse::success(
        "Item added to cart",
        CartDto::from(cart),
    )))
}

/// PUT /api/cart/update/{item_id}
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(item_id): Path<i32>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let item_id = validate_id(item_id)?;
    let quantity = validate_quantity(body.quantity)?;

    let cart = state
        .cart_service()
        .update_item(principal.id, item_id, quantity)
        .await?;

    Ok(Json(ApiResponse::success(
        "Cart item updated",
        CartDto::from(cart),
    )))
}

/// DELETE /api/cart/remove/{item_id}
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(item_id): Path<i32>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let item_id = validate_id(item_id)?;

    let cart = state
        .cart_service()
        .remove_item(principal.id, item_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Item removed from cart",
        CartDto::from(cart),
    )))
}

/// DELETE /api/cart/clear
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<CartDto>>, ApiError> {
    let cart = state.cart_service().clear(principal.id).await?;
    Ok(Json(ApiResponse::success("Cart cleared", CartDto::from(cart))))
}

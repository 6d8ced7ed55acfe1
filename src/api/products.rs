//! Catalog endpoints plus the approval-gated product creation flow.

use axum::{Extension, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::Principal;
use super::extract::{Json, Path, Query};
use super::validation::{
    parse_choice, require, validate_id, validate_pagination, validate_price, validate_size,
    validate_stock,
};
use super::{ApiError, ApiResponse, AppState, ProductDto, ProductListDto};
use crate::db::{ProductDraft, ProductFilter};
use crate::domain::{ProductSex, ProductType};
use crate::entities::products;

#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub product_name: Option<String>,
    pub product_price: Option<f64>,
    pub product_description: Option<String>,
    pub product_img: Option<String>,
    pub product_sex: Option<String>,
    pub product_size: Option<i32>,
    pub product_quantity: Option<i32>,
    pub product_brand: Option<String>,
    pub product_type: Option<String>,
}

impl ProductRequest {
    /// Validates the submission. Fields left out fall back to `base`, which
    /// is how partial updates keep the stored values.
    fn into_draft(self, base: Option<&products::Model>) -> Result<ProductDraft, ApiError> {
        let name = self.product_name.or_else(|| base.map(|p| p.name.clone()));
        let description = self
            .product_description
            .or_else(|| base.map(|p| p.description.clone()));
        let image_url = self.product_img.or_else(|| base.map(|p| p.image_url.clone()));
        let sex = self.product_sex.or_else(|| base.map(|p| p.sex.clone()));
        let brand = self.product_brand.or_else(|| base.map(|p| p.brand.clone()));
        let product_type = self
            .product_type
            .or_else(|| base.map(|p| p.product_type.clone()));

        Ok(ProductDraft {
            name: require("Product name", name.as_deref())?,
            price: validate_price(self.product_price.or(base.map(|p| p.price)))?,
            description: require("Product description", description.as_deref())?,
            image_url: require("Product image", image_url.as_deref())?,
            sex: parse_choice::<ProductSex>("Product sex", sex.as_deref())?,
            size: validate_size(self.product_size.or(base.map(|p| p.size)))?,
            quantity: validate_stock(self.product_quantity.or(base.map(|p| p.quantity)))?,
            brand: require("Product brand", brand.as_deref())?,
            product_type: parse_choice::<ProductType>("Product type", product_type.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyCreateRequest {
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub product_type: Option<String>,
    pub product_sex: Option<String>,
    pub product_brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListProductsQuery {
    fn filter(&self) -> Result<ProductFilter, ApiError> {
        let product_type = self
            .product_type
            .as_deref()
            .map(|v| parse_choice::<ProductType>("Product type", Some(v)))
            .transpose()?;
        let sex = self
            .product_sex
            .as_deref()
            .map(|v| parse_choice::<ProductSex>("Product sex", Some(v)))
            .transpose()?;

        if let (Some(min), Some(max)) = (self.min_price, self.max_price)
            && min > max
        {
            return Err(ApiError::validation(
                "min_price cannot be greater than max_price",
            ));
        }

        Ok(ProductFilter {
            product_type,
            sex,
            brand: self
                .product_brand
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
            min_price: self.min_price,
            max_price: self.max_price,
        })
    }
}

/// GET /api/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ApiResponse<ProductListDto>>, ApiError> {
    let (page, limit) = validate_pagination(query.page, query.limit)?;
    let filter = query.filter()?;

    let result = state.catalog_service().list(filter, page, limit).await?;

    Ok(Json(ApiResponse::success(
        "Products retrieved",
        ProductListDto::from(result),
    )))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id(id)?;
    let product = state.catalog_service().get(id).await?;
    Ok(Json(ApiResponse::success(
        "Product retrieved",
        ProductDto::from(product),
    )))
}

/// GET /api/products/seller/my-products
pub async fn my_products(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let products = state
        .catalog_service()
        .list_for_seller(principal.id)
        .await?;
    Ok(Json(ApiResponse::success(
        "Products retrieved",
        products.into_iter().map(ProductDto::from).collect(),
    )))
}

/// POST /api/products/request-creation-otp
pub async fn request_creation_otp(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let draft = body.into_draft(None)?;

    state
        .registration_service()
        .request_product_approval(&principal.seller_identity(), draft)
        .await?;

    Ok(Json(ApiResponse::message(
        "Product approval OTP sent to admin",
    )))
}

/// POST /api/products/verify-otp-create
pub async fn verify_otp_create(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<VerifyCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDto>>), ApiError> {
    let otp = require("OTP", body.otp.as_deref())?;

    let product = state
        .registration_service()
        .create_approved_product(&principal.seller_identity(), &otp)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Product created successfully",
            ProductDto::from(product),
        )),
    ))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let id = validate_id(id)?;
    let existing = state.catalog_service().get(id).await?;
    let draft = body.into_draft(Some(&existing))?;

    let product = state
        .catalog_service()
        .update(principal.id, id, draft)
        .await?;

    Ok(Json(ApiResponse::success(
        "Product updated successfully",
        ProductDto::from(product),
    )))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = validate_id(id)?;
    state.catalog_service().delete(principal.id, id).await?;
    Ok(Json(ApiResponse::message("Product deleted successfully")))
}

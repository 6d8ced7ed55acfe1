use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::Notifier;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod cart;
mod customers;
mod error;
mod extract;
mod observability;
mod orders;
mod products;
mod sellers;
mod system;
mod types;
mod validation;

pub use auth::Principal;
pub use error::{ApiError, INVALID_CODE_MESSAGE};
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{
    AccountService, AdminService, CartService, CatalogService, OrderService, RegistrationService,
    TokenService,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.shared.tokens
    }

    #[must_use]
    pub fn registration_service(&self) -> &Arc<dyn RegistrationService> {
        &self.shared.registration_service
    }

    #[must_use]
    pub fn account_service(&self) -> &Arc<dyn AccountService> {
        &self.shared.account_service
    }

    #[must_use]
    pub fn catalog_service(&self) -> &Arc<dyn CatalogService> {
        &self.shared.catalog_service
    }

    #[must_use]
    pub fn cart_service(&self) -> &Arc<dyn CartService> {
        &self.shared.cart_service
    }

    #[must_use]
    pub fn order_service(&self) -> &Arc<dyn OrderService> {
        &self.shared.order_service
    }

    #[must_use]
    pub fn admin_service(&self) -> &Arc<dyn AdminService> {
        &self.shared.admin_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Same as [`create_app_state_from_config`] with a caller-supplied notifier.
pub async fn create_app_state_with_notifier(
    config: Config,
    notifier: Arc<dyn Notifier>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_notifier(config, notifier).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(public_routes())
        .merge(customer_routes(state.clone()))
        .merge(seller_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/customers/request-registration-otp",
            post(customers::request_registration_otp),
        )
        .route(
            "/customers/verify-otp-register",
            post(customers::verify_otp_register),
        )
        .route("/customers/login", post(customers::login))
        .route("/customers/forgot-password", post(customers::forgot_password))
        .route("/customers/reset-password", post(customers::reset_password))
        .route("/sellers", get(sellers::list_sellers))
        .route("/sellers/request-email-otp", post(sellers::request_email_otp))
        .route("/sellers/verify-email-otp", post(sellers::verify_email_otp))
        .route(
            "/sellers/verify-admin-otp-register",
            post(sellers::verify_admin_otp_register),
        )
        .route("/sellers/login", post(sellers::login))
        .route("/sellers/forgot-password", post(sellers::forgot_password))
        .route("/sellers/reset-password", post(sellers::reset_password))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .route("/admin/login", post(admin::login))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .route("/metrics", get(observability::get_metrics))
}

fn customer_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/customers/profile",
            get(customers::get_profile)
                .put(customers::update_profile)
                .delete(customers::delete_profile),
        )
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add_item))
        .route("/cart/update/{item_id}", put(cart::update_item))
        .route("/cart/remove/{item_id}", delete(cart::remove_item))
        .route("/cart/clear", delete(cart::clear))
        .route("/orders", get(orders::list_orders))
        .route("/orders/place", post(orders::place_order))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/cancel", put(orders::cancel_order))
        .route_layer(middleware::from_fn(auth::require_customer))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}

fn seller_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/sellers/profile",
            get(sellers::get_profile)
                .put(sellers::update_profile)
                .delete(sellers::delete_profile),
        )
        .route("/products/seller/my-products", get(products::my_products))
        .route(
            "/products/request-creation-otp",
            post(products::request_creation_otp),
        )
        .route("/products/verify-otp-create", post(products::verify_otp_create))
        .route(
            "/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route_layer(middleware::from_fn(auth::require_seller))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}

fn admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/customers", get(admin::list_customers))
        .route("/admin/sellers", get(admin::list_sellers))
        .route("/admin/blocked-users", get(admin::blocked_users))
        .route("/admin/orders", get(orders::list_all_orders))
        .route(
            "/admin/blacklist-customer/{id}",
            put(admin::block_customer),
        )
        .route("/admin/blacklist-seller/{id}", put(admin::block_seller))
        .route("/admin/unblock-customer/{id}", put(admin::unblock_customer))
        .route("/admin/unblock-seller/{id}", put(admin::unblock_seller))
        .route("/orders/{id}/status", put(orders::update_status))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}

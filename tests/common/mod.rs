#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use marketplace::config::Config;
use marketplace::domain::OtpPurpose;
use marketplace::services::{Notification, Notifier, NotifyError};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Captures every notification so tests can read the codes.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Most recent code sent to `recipient` for `kind`.
    pub fn last_code(&self, recipient: &str, kind: OtpPurpose) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|n| n.recipient == recipient && n.kind == kind)
            .map(|n| n.code.clone())
            .unwrap_or_else(|| panic!("no {kind} code sent to {recipient}"))
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if *self.failing.lock().unwrap() {
            return Err(NotifyError::Delivery("mail server unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
    pub state: Arc<marketplace::api::AppState>,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn test_config() -> (Config, PathBuf) {
    let db_path =
        std::env::temp_dir().join(format!("marketplace-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = "integration-test-secret-value".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;
    config.admin.email = ADMIN_EMAIL.to_string();
    config.admin.password_hash = marketplace::services::credentials::hash_password_blocking(
        ADMIN_PASSWORD,
        &config.security,
    )
    .unwrap();

    (config, db_path)
}

pub async fn spawn_app() -> TestApp {
    let (config, db_path) = test_config();
    spawn_app_with(config, db_path).await
}

pub async fn spawn_app_with(config: Config, db_path: PathBuf) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = marketplace::api::create_app_state_with_notifier(config, notifier.clone(), None)
        .await
        .expect("Failed to create app state");
    let router = marketplace::api::router(state.clone()).await;

    TestApp {
        router,
        notifier,
        state,
        db_path,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Sends `body` verbatim, for inputs that are not valid JSON.
    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Runs the whole customer flow and returns `(token, customer id)`.
    pub async fn register_customer(&self, email: &str, phone: &str) -> (String, i64) {
        let (status, _) = self
            .post(
                "/api/customers/request-registration-otp",
                None,
                serde_json::json!({
                    "customer_name": "Test Customer",
                    "customer_email": email,
                    "customer_phone": phone,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self
            .notifier
            .last_code(email, OtpPurpose::EmailVerification);
        let (status, body) = self
            .post(
                "/api/customers/verify-otp-register",
                None,
                customer_profile(email, phone, &code),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_i64().unwrap(),
        )
    }

    /// Runs the whole seller flow and returns `(token, seller id)`.
    pub async fn register_seller(&self, email: &str, phone: &str) -> (String, i64) {
        let (status, _) = self
            .post(
                "/api/sellers/request-email-otp",
                None,
                serde_json::json!({
                    "seller_name": "Test Seller",
                    "seller_email": email,
                    "seller_phone": phone,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self
            .notifier
            .last_code(email, OtpPurpose::EmailVerification);
        let (status, _) = self
            .post(
                "/api/sellers/verify-email-otp",
                None,
                serde_json::json!({ "seller_email": email, "otp": code }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let admin_code = self
            .notifier
            .last_code(ADMIN_EMAIL, OtpPurpose::SellerAdminApproval);
        let (status, body) = self
            .post(
                "/api/sellers/verify-admin-otp-register",
                None,
                seller_profile(email, phone, &admin_code),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_i64().unwrap(),
        )
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .post(
                "/api/admin/login",
                None,
                serde_json::json!({
                    "admin_email": ADMIN_EMAIL,
                    "admin_password": ADMIN_PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Submits `product` for approval and redeems the admin's code.
    pub async fn create_product(&self, seller_token: &str, product: Value) -> Value {
        let (status, body) = self
            .post(
                "/api/products/request-creation-otp",
                Some(seller_token),
                product,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let code = self
            .notifier
            .last_code(ADMIN_EMAIL, OtpPurpose::ProductCreationApproval);
        let (status, body) = self
            .post(
                "/api/products/verify-otp-create",
                Some(seller_token),
                serde_json::json!({ "otp": code }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }
}

pub fn customer_profile(email: &str, phone: &str, otp: &str) -> Value {
    serde_json::json!({
        "customer_name": "Test Customer",
        "customer_address": "221B Baker Street, London",
        "customer_gender": "female",
        "customer_DOB": "1992-04-17",
        "customer_email": email,
        "customer_phone": phone,
        "customer_password": "hunter22",
        "otp": otp,
    })
}

pub fn seller_profile(email: &str, phone: &str, admin_otp: &str) -> Value {
    serde_json::json!({
        "seller_name": "Test Seller",
        "seller_address": "1 Market Square, Springfield",
        "seller_company": "Acme Goods",
        "seller_email": email,
        "seller_phone": phone,
        "seller_password": "hunter22",
        "admin_otp": admin_otp,
    })
}

pub fn sample_product(name: &str, price: f64, quantity: i64) -> Value {
    serde_json::json!({
        "product_name": name,
        "product_price": price,
        "product_description": "A sturdy item for everyday use",
        "product_img": "https://img.example.com/item.png",
        "product_sex": "both",
        "product_size": 42,
        "product_quantity": quantity,
        "product_brand": "Acme",
        "product_type": "furniture",
    })
}

mod common;

use axum::http::StatusCode;
use common::{ADMIN_EMAIL, customer_profile, sample_product, seller_profile, spawn_app};
use marketplace::domain::OtpPurpose;
use serde_json::json;

#[tokio::test]
async fn test_customer_registration_scenario() {
    let app = spawn_app().await;
    let email = "new@x.com";
    let phone = "0123456789";

    let (status, body) = app
        .post(
            "/api/customers/request-registration-otp",
            None,
            json!({
                "customer_name": "New Customer",
                "customer_email": "New@X.com",
                "customer_phone": phone,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email);

    let code = app.notifier.last_code(email, OtpPurpose::EmailVerification);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = app
        .post(
            "/api/customers/verify-otp-register",
            None,
            customer_profile(email, phone, wrong),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], marketplace::api::INVALID_CODE_MESSAGE);

    let mut bad_gender = customer_profile(email, phone, &code);
    bad_gender["customer_gender"] = json!("robot");
    let (status, _) = app
        .post("/api/customers/verify-otp-register", None, bad_gender)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        app.state
            .store()
            .customers()
            .get_by_email(email)
            .await
            .unwrap()
            .is_none()
    );

    let (status, body) = app
        .post(
            "/api/customers/verify-otp-register",
            None,
            customer_profile(email, phone, &code),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["token"].as_str().is_some());
    assert_eq!(body["data"]["user"]["email"], email);
    assert_eq!(body["data"]["user"]["email_verified"], true);
    assert!(body["data"]["user"]["cart_id"].as_i64().is_some());

    let token = body["data"]["token"].as_str().unwrap().to_string();
    let (status, cart) = app.get("/api/cart", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["data"]["total_quantity"], 0);
    assert_eq!(cart["data"]["id"], body["data"]["user"]["cart_id"]);
}

#[tokio::test]
async fn test_customer_requires_prior_code_request() {
    let app = spawn_app().await;

    let (status, _) = app
        .post(
            "/api/customers/verify-otp-register",
            None,
            customer_profile("ghost@x.com", "0123456789", "123456"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.state.store().customers().count(false).await.unwrap(), 0);
}

#[tokio::test]
async fn test_completion_must_keep_the_requested_phone() {
    let app = spawn_app().await;
    let email = "switch@x.com";

    app.post(
        "/api/customers/request-registration-otp",
        None,
        json!({
            "customer_name": "Switcher",
            "customer_email": email,
            "customer_phone": "0123456700",
        }),
    )
    .await;
    let code = app.notifier.last_code(email, OtpPurpose::EmailVerification);

    let (status, body) = app
        .post(
            "/api/customers/verify-otp-register",
            None,
            customer_profile(email, "0987654321", &code),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], marketplace::api::INVALID_CODE_MESSAGE);
    assert_eq!(app.state.store().customers().count(false).await.unwrap(), 0);

    // The code was not spent on the rejected attempt.
    let (status, body) = app
        .post(
            "/api/customers/verify-otp-register",
            None,
            customer_profile(email, "(012) 345-6700", &code),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["phone"], "0123456700");
}

#[tokio::test]
async fn test_seller_completion_must_keep_the_requested_phone() {
    let app = spawn_app().await;
    let email = "moving@x.com";

    app.post(
        "/api/sellers/request-email-otp",
        None,
        json!({
            "seller_name": "Mover",
            "seller_email": email,
            "seller_phone": "0214444444",
        }),
    )
    .await;
    let code = app.notifier.last_code(email, OtpPurpose::EmailVerification);
    let (status, _) = app
        .post(
            "/api/sellers/verify-email-otp",
            None,
            json!({ "seller_email": email, "otp": code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let admin_code = app
        .notifier
        .last_code(ADMIN_EMAIL, OtpPurpose::SellerAdminApproval);
    let (status, _) = app
        .post(
            "/api/sellers/verify-admin-otp-register",
            None,
            seller_profile(email, "0215555555", &admin_code),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.state.store().sellers().count(false).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_identity_is_rejected() {
    let app = spawn_app().await;
    app.register_customer("dup@x.com", "0123456789").await;

    let (status, _) = app
        .post(
            "/api/customers/request-registration-otp",
            None,
            json!({
                "customer_name": "Other",
                "customer_email": "DUP@x.com",
                "customer_phone": "0999999999",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/api/customers/request-registration-otp",
            None,
            json!({
                "customer_name": "Other",
                "customer_email": "other@x.com",
                "customer_phone": "012-345-6789",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_notifier_failure_aborts_issuance() {
    let app = spawn_app().await;
    app.notifier.set_failing(true);

    let (status, body) = app
        .post(
            "/api/customers/request-registration-otp",
            None,
            json!({
                "customer_name": "Unlucky",
                "customer_email": "unlucky@x.com",
                "customer_phone": "0123456789",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(
        app.state
            .store()
            .registrations()
            .get("unlucky@x.com", marketplace::domain::ActorKind::Customer)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_seller_needs_email_verification_then_admin_approval() {
    let app = spawn_app().await;
    let email = "shop@x.com";
    let phone = "0211111111";

    let (status, _) = app
        .post(
            "/api/sellers/request-email-otp",
            None,
            json!({
                "seller_name": "Shop Owner",
                "seller_email": email,
                "seller_phone": phone,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Skipping the email step: no admin code exists and the status is wrong.
    let (status, _) = app
        .post(
            "/api/sellers/verify-admin-otp-register",
            None,
            seller_profile(email, phone, "123456"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The email code does not double as the admin approval code.
    let email_code = app.notifier.last_code(email, OtpPurpose::EmailVerification);
    let (status, _) = app
        .post(
            "/api/sellers/verify-admin-otp-register",
            None,
            seller_profile(email, phone, &email_code),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/sellers/verify-email-otp",
            None,
            json!({ "seller_email": email, "otp": email_code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let approval = app
        .notifier
        .sent()
        .into_iter()
        .rev()
        .find(|n| n.kind == OtpPurpose::SellerAdminApproval)
        .unwrap();
    assert_eq!(approval.recipient, ADMIN_EMAIL);
    assert!(approval.context.iter().any(|(_, v)| v == "Shop Owner"));
    assert!(approval.context.iter().any(|(_, v)| v == email));

    let (status, body) = app
        .post(
            "/api/sellers/verify-admin-otp-register",
            None,
            seller_profile(email, phone, &approval.code),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["email_verified"], true);
    assert_eq!(body["data"]["user"]["phone_verified"], true);

    let (status, _) = app
        .post(
            "/api/sellers/verify-admin-otp-register",
            None,
            seller_profile(email, phone, &approval.code),
        )
        .await;
    assert_ne!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_blocked_customer_cannot_login_or_use_token() {
    let app = spawn_app().await;
    let (token, id) = app.register_customer("blocked@x.com", "0123456789").await;
    let admin = app.admin_token().await;

    let (status, _) = app.get("/api/customers/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(
            &format!("/api/admin/blacklist-customer/{id}"),
            Some(&admin),
            json!({ "reason": "spam" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["blocked"], true);
    assert_eq!(body["data"]["blocked_by"], ADMIN_EMAIL);

    let (status, body) = app.get("/api/customers/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["data"]["blocked_reason"], "spam");

    let (status, body) = app
        .post(
            "/api/customers/login",
            None,
            json!({ "customer_email": "blocked@x.com", "customer_password": "hunter22" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("spam"));

    let (status, body) = app.get("/api/admin/blocked-users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["customers"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .put(
            &format!("/api/admin/unblock-customer/{id}"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/customers/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_block_without_reason_uses_default() {
    let app = spawn_app().await;
    let (token, id) = app.register_seller("quiet@x.com", "0222222222").await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .put(
            &format!("/api/admin/blacklist-seller/{id}"),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/sellers/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["data"]["blocked_reason"],
        marketplace::services::DEFAULT_BLOCK_REASON
    );

    // No body at all is the same as an empty one.
    let (_, customer_id) = app.register_customer("calm@x.com", "0122222222").await;
    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/admin/blacklist-customer/{customer_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["data"]["blocked_reason"],
        marketplace::services::DEFAULT_BLOCK_REASON
    );
}

#[tokio::test]
async fn test_malformed_input_uses_error_envelope() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("path"));

    let (status, body) = app
        .post(
            "/api/customers/request-registration-otp",
            None,
            json!({ "customer_name": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .send_raw(
            "POST",
            "/api/customers/login",
            "application/json",
            "{not json",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .send_raw("POST", "/api/customers/login", "text/plain", "hello")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app.get("/api/products?page=two", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_product_approval_creates_submitted_product() {
    let app = spawn_app().await;
    let (token, seller_id) = app.register_seller("maker@x.com", "0233333333").await;

    let product = app
        .create_product(&token, sample_product("Oak Chair", 149.99, 7))
        .await;

    assert_eq!(product["name"], "Oak Chair");
    assert_eq!(product["price"], 149.99);
    assert_eq!(product["description"], "A sturdy item for everyday use");
    assert_eq!(product["image_url"], "https://img.example.com/item.png");
    assert_eq!(product["sex"], "both");
    assert_eq!(product["size"], 42);
    assert_eq!(product["quantity"], 7);
    assert_eq!(product["brand"], "Acme");
    assert_eq!(product["product_type"], "furniture");
    assert_eq!(product["seller_id"], seller_id);

    let approval = app
        .notifier
        .sent()
        .into_iter()
        .rev()
        .find(|n| n.kind == OtpPurpose::ProductCreationApproval)
        .unwrap();
    assert!(approval.context.iter().any(|(_, v)| v == "Oak Chair"));

    let (status, body) = app.get("/api/products/seller/my-products", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_newest_product_submission_wins() {
    let app = spawn_app().await;
    let (token, _) = app.register_seller("twice@x.com", "0244444444").await;

    for name in ["First Draft", "Second Draft"] {
        let (status, _) = app
            .post(
                "/api/products/request-creation-otp",
                Some(&token),
                sample_product(name, 10.0, 1),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let codes: Vec<String> = app
        .notifier
        .sent()
        .into_iter()
        .filter(|n| n.kind == OtpPurpose::ProductCreationApproval)
        .map(|n| n.code)
        .collect();
    assert_eq!(codes.len(), 2);

    let (status, body) = app
        .post(
            "/api/products/verify-otp-create",
            Some(&token),
            json!({ "otp": codes[1] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Second Draft");
}

#[tokio::test]
async fn test_role_guards() {
    let app = spawn_app().await;
    let (customer, _) = app.register_customer("guard@x.com", "0123456789").await;

    let (status, _) = app.get("/api/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/cart", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/products/request-creation-otp",
            Some(&customer),
            sample_product("Nope", 1.0, 1),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/admin/dashboard", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/admin/login",
            None,
            json!({ "admin_email": ADMIN_EMAIL, "admin_password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = spawn_app().await;
    app.register_customer("forgetful@x.com", "0123456789").await;

    let (status, _) = app
        .post(
            "/api/customers/forgot-password",
            None,
            json!({ "email": "nobody@x.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/customers/forgot-password",
            None,
            json!({ "email": "Forgetful@x.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let code = app
        .notifier
        .last_code("forgetful@x.com", OtpPurpose::PasswordReset);
    let (status, _) = app
        .post(
            "/api/customers/reset-password",
            None,
            json!({ "email": "forgetful@x.com", "otp": code, "new_password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/customers/login",
            None,
            json!({ "customer_email": "forgetful@x.com", "customer_password": "hunter22" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/api/customers/login",
            None,
            json!({ "customer_email": "forgetful@x.com", "customer_password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some());
}

#[tokio::test]
async fn test_profile_update_and_delete() {
    let app = spawn_app().await;
    let (token, _) = app.register_customer("mover@x.com", "0123456789").await;

    let (status, body) = app
        .put(
            "/api/customers/profile",
            Some(&token),
            json!({ "customer_address": "42 New Road, Elsewhere" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["address"], "42 New Road, Elsewhere");
    assert_eq!(body["data"]["name"], "Test Customer");

    let (status, _) = app
        .put(
            "/api/customers/profile",
            Some(&token),
            json!({ "customer_phone": "12" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete("/api/customers/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/customers/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The identity is free again.
    app.register_customer("mover@x.com", "0123456789").await;
}

#[tokio::test]
async fn test_health_and_public_listing() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "alive");

    let (status, body) = app.get("/api/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], true);

    app.register_seller("listed@x.com", "0255555555").await;
    let (status, body) = app.get("/api/sellers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert!(body["data"][0].get("password_hash").is_none());
}

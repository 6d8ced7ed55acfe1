mod common;

use axum::http::StatusCode;
use common::{TestApp, sample_product, spawn_app};
use serde_json::json;

async fn place_order(app: &TestApp, token: &str, product_id: i64, quantity: i64) -> i64 {
    app.post(
        "/api/cart/add",
        Some(token),
        json!({ "product_id": product_id, "quantity": quantity }),
    )
    .await;
    let (status, order) = app
        .post(
            "/api/orders/place",
            Some(token),
            json!({ "shipping_address": "3 Teapot Row, Bristol" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    order["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_cart_order_and_cancel_cycle() {
    let app = spawn_app().await;
    let (seller, _) = app.register_seller("vendor@x.com", "0210000001").await;
    let (buyer, buyer_id) = app.register_customer("buyer@x.com", "0120000001").await;
    let (other, _) = app.register_customer("other@x.com", "0120000002").await;

    let product = app
        .create_product(&seller, sample_product("Stool", 10.0, 3))
        .await;
    let product_id = product["id"].as_i64().unwrap();

    let (status, cart) = app
        .post(
            "/api/cart/add",
            Some(&buyer),
            json!({ "product_id": product_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{cart}");
    assert_eq!(cart["data"]["total_quantity"], 2);
    assert_eq!(cart["data"]["total_amount"], 20.0);
    let item_id = cart["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, _) = app
        .post(
            "/api/cart/add",
            Some(&buyer),
            json!({ "product_id": product_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, cart) = app
        .put(
            &format!("/api/cart/update/{item_id}"),
            Some(&buyer),
            json!({ "quantity": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["data"]["total_quantity"], 3);

    // Someone else's cart item is not reachable.
    let (status, _) = app
        .delete(&format!("/api/cart/remove/{item_id}"), Some(&other))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/orders/place",
            Some(&buyer),
            json!({ "shipping_address": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, order) = app
        .post(
            "/api/orders/place",
            Some(&buyer),
            json!({ "shipping_address": "10 Downing Street, London" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["data"]["status"], "pending");
    assert_eq!(order["data"]["customer_id"], buyer_id);
    assert_eq!(order["data"]["total_amount"], 30.0);
    assert_eq!(order["data"]["items"][0]["product_name"], "Stool");
    assert_eq!(order["data"]["items"][0]["quantity"], 3);
    let order_id = order["data"]["id"].as_i64().unwrap();

    let (_, cart) = app.get("/api/cart", Some(&buyer)).await;
    assert_eq!(cart["data"]["total_quantity"], 0);
    assert!(cart["data"]["items"].as_array().unwrap().is_empty());

    let (_, stored) = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(stored["data"]["quantity"], 0);

    let (status, _) = app
        .post(
            "/api/orders/place",
            Some(&buyer),
            json!({ "shipping_address": "10 Downing Street, London" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/cart/add",
            Some(&other),
            json!({ "product_id": product_id, "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.get(&format!("/api/orders/{order_id}"), Some(&other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, orders) = app.get("/api/orders", Some(&buyer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders["data"].as_array().unwrap().len(), 1);

    let (status, cancelled) = app
        .put(&format!("/api/orders/{order_id}/cancel"), Some(&buyer), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["data"]["status"], "cancelled");

    let (_, stored) = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(stored["data"]["quantity"], 3);

    let (status, _) = app
        .put(&format!("/api/orders/{order_id}/cancel"), Some(&buyer), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stock_is_never_oversold() {
    let app = spawn_app().await;
    let (seller, _) = app.register_seller("scarce@x.com", "0210000003").await;
    let (first, _) = app.register_customer("first@x.com", "0120000003").await;
    let (second, _) = app.register_customer("second@x.com", "0120000004").await;

    let product = app
        .create_product(&seller, sample_product("Rare Lamp", 50.0, 3))
        .await;
    let product_id = product["id"].as_i64().unwrap();

    for token in [&first, &second] {
        let (status, _) = app
            .post(
                "/api/cart/add",
                Some(token),
                json!({ "product_id": product_id, "quantity": 2 }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = app
        .post(
            "/api/orders/place",
            Some(&first),
            json!({ "shipping_address": "1 First Avenue, Town" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(
            "/api/orders/place",
            Some(&second),
            json!({ "shipping_address": "2 Second Avenue, Town" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stored) = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(stored["data"]["quantity"], 1);

    // The failed order left the cart untouched.
    let (_, cart) = app.get("/api/cart", Some(&second)).await;
    assert_eq!(cart["data"]["total_quantity"], 2);
}

#[tokio::test]
async fn test_admin_order_status_and_dashboard() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (seller, _) = app.register_seller("books@x.com", "0210000005").await;
    let (buyer, _) = app.register_customer("reader@x.com", "0120000005").await;

    let product = app
        .create_product(&seller, sample_product("Atlas", 25.0, 10))
        .await;
    app.post(
        "/api/cart/add",
        Some(&buyer),
        json!({ "product_id": product["id"], "quantity": 2 }),
    )
    .await;
    let (_, order) = app
        .post(
            "/api/orders/place",
            Some(&buyer),
            json!({ "shipping_address": "7 Library Lane, Oxford" }),
        )
        .await;
    let order_id = order["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .put(
            &format!("/api/orders/{order_id}/status"),
            Some(&buyer),
            json!({ "order_status": "shipped" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(
            &format!("/api/orders/{order_id}/status"),
            Some(&admin),
            json!({ "order_status": "teleported" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .put(
            &format!("/api/orders/{order_id}/status"),
            Some(&admin),
            json!({ "order_status": "delivered" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["status"], "delivered");

    let (status, _) = app
        .put(&format!("/api/orders/{order_id}/cancel"), Some(&buyer), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, all) = app.get("/api/admin/orders", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["data"].as_array().unwrap().len(), 1);

    let (status, stats) = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["active_customers"], 1);
    assert_eq!(stats["data"]["active_sellers"], 1);
    assert_eq!(stats["data"]["total_products"], 1);
    assert_eq!(stats["data"]["total_orders"], 1);
    assert_eq!(stats["data"]["total_revenue"], 50.0);

    let (status, customers) = app
        .get("/api/admin/customers?includeBlocked=true", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customers["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_catalog_filters_and_ownership() {
    let app = spawn_app().await;
    let (owner, _) = app.register_seller("owner@x.com", "0210000006").await;
    let (rival, _) = app.register_seller("rival@x.com", "0210000007").await;

    let chair = app
        .create_product(&owner, sample_product("Chair", 40.0, 5))
        .await;
    let mut shirt = sample_product("Shirt", 15.0, 9);
    shirt["product_type"] = json!("clothing");
    shirt["product_sex"] = json!("male");
    app.create_product(&owner, shirt).await;
    app.create_product(&rival, sample_product("Table", 120.0, 2))
        .await;

    let (status, page) = app.get("/api/products?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["products"].as_array().unwrap().len(), 2);
    assert_eq!(page["data"]["pagination"]["total"], 3);
    assert_eq!(page["data"]["pagination"]["total_pages"], 2);
    assert_eq!(page["data"]["products"][0]["name"], "Table");

    let (_, clothing) = app.get("/api/products?product_type=clothing", None).await;
    assert_eq!(clothing["data"]["pagination"]["total"], 1);
    assert_eq!(clothing["data"]["products"][0]["name"], "Shirt");

    let (_, priced) = app
        .get("/api/products?min_price=30&max_price=100", None)
        .await;
    assert_eq!(priced["data"]["pagination"]["total"], 1);
    assert_eq!(priced["data"]["products"][0]["name"], "Chair");

    let (status, _) = app.get("/api/products?limit=500", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let chair_id = chair["id"].as_i64().unwrap();

    let (status, _) = app
        .put(
            &format!("/api/products/{chair_id}"),
            Some(&rival),
            json!({ "product_price": 1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .put(
            &format!("/api/products/{chair_id}"),
            Some(&owner),
            json!({ "product_price": 35.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["price"], 35.5);
    assert_eq!(updated["data"]["name"], "Chair");

    let (status, _) = app
        .delete(&format!("/api/products/{chair_id}"), Some(&rival))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .delete(&format!("/api/products/{chair_id}"), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/products/{chair_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_finished_orders_keep_their_status_and_stock() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let (seller, _) = app.register_seller("kettles@x.com", "0210000008").await;
    let (buyer, _) = app.register_customer("tea@x.com", "0120000008").await;

    let product = app
        .create_product(&seller, sample_product("Kettle", 30.0, 3))
        .await;
    let product_id = product["id"].as_i64().unwrap();

    let first = place_order(&app, &buyer, product_id, 3).await;
    let (status, _) = app
        .put(&format!("/api/orders/{first}/cancel"), Some(&buyer), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // A cancelled order cannot be reopened and cancelled a second time.
    let (status, body) = app
        .put(
            &format!("/api/orders/{first}/status"),
            Some(&admin),
            json!({ "order_status": "pending" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .put(&format!("/api/orders/{first}/cancel"), Some(&buyer), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(stored["data"]["quantity"], 3);

    // Cancelling through the admin endpoint returns the units too.
    let second = place_order(&app, &buyer, product_id, 2).await;
    let (_, stored) = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(stored["data"]["quantity"], 1);

    let (status, updated) = app
        .put(
            &format!("/api/orders/{second}/status"),
            Some(&admin),
            json!({ "order_status": "cancelled" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["status"], "cancelled");

    let (_, stored) = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(stored["data"]["quantity"], 3);

    let (status, _) = app
        .put(
            &format!("/api/orders/{second}/status"),
            Some(&admin),
            json!({ "order_status": "cancelled" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = app.get(&format!("/api/products/{product_id}"), None).await;
    assert_eq!(stored["data"]["quantity"], 3);
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected() {
    let app = spawn_app().await;

    let (status, body) = app
        .get("/api/products?page=18446744073709551615&limit=100", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/products?page=2&limit=100", None).await;
    assert_eq!(status, StatusCode::OK);
}

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shop_backoffice::events::EventPublisher;
use shop_backoffice::store::MemoryStore;
use shop_backoffice::{api, AppState, Config};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

// Helper to build the router over an empty in-memory store
async fn setup_app() -> (Router, TempDir) {
    let uploads = tempfile::tempdir().expect("Failed to create upload dir");
    let config = Config::in_memory("test-secret", uploads.path());
    let state = AppState::with_store(Arc::new(MemoryStore::new()), config, EventPublisher::disabled())
        .await
        .expect("Failed to build state");
    (api::router(state), uploads)
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// Helper to register and log in a test user
async fn login(app: &Router) -> String {
    let (status, _) = send(app, "POST", "/api/register", None, Some(json!({
        "name": "Admin", "email": "admin@example.com", "password": "secret1"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(app, "POST", "/api/login", None, Some(json!({
        "email": "admin@example.com", "password": "secret1"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

// Helper to seed a category, brand and product; returns the product id
async fn seed_product(app: &Router, token: &str, name: &str, amount: f64) -> String {
    let (_, categories) = send(app, "GET", "/api/categories", Some(token), None).await;
    let category_id = match categories.as_array().and_then(|c| c.first()) {
        Some(c) => c["id"].as_str().unwrap().to_string(),
        None => {
            let (_, c) = send(app, "POST", "/api/categories", Some(token), Some(json!({"name": "Kitchen", "status": "Active"}))).await;
            c["id"].as_str().unwrap().to_string()
        }
    };
    let (_, brands) = send(app, "GET", "/api/brands", Some(token), None).await;
    let brand_id = match brands.as_array().and_then(|b| b.first()) {
        Some(b) => b["id"].as_str().unwrap().to_string(),
        None => {
            let (_, b) = send(app, "POST", "/api/brands", Some(token), Some(json!({"name": "Acme", "category": category_id, "status": "Active"}))).await;
            b["id"].as_str().unwrap().to_string()
        }
    };
    let (status, product) = send(app, "POST", "/api/products", Some(token), Some(json!({
        "name": name, "category": category_id, "brand": brand_id, "amount": amount, "status": "Active"
    }))).await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    product["id"].as_str().unwrap().to_string()
}

fn order_body(items: Value, discount: f64) -> Value {
    json!({
        "customerName": "Ada Lovelace",
        "customerEmail": "ada@example.com",
        "customerContactNumber": "555-0100",
        "customerAddress": "1 Main St",
        "discountPercentage": discount,
        "paymentMode": "Card",
        "items": items,
    })
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _dir) = setup_app().await;
    let (status, body) = send(&app, "GET", "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/orders", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_and_login_errors() {
    let (app, _dir) = setup_app().await;
    login(&app).await;

    let (status, body) = send(&app, "POST", "/api/register", None, Some(json!({
        "name": "Other", "email": "ADMIN@example.com", "password": "secret1"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let (status, _) = send(&app, "POST", "/api/register", None, Some(json!({
        "name": "Short", "email": "short@example.com", "password": "abc"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/api/login", None, Some(json!({
        "email": "admin@example.com", "password": "wrong-password"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = send(&app, "POST", "/api/login", None, Some(json!({
        "email": "nobody@example.com", "password": "secret1"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_category_crud() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;

    let (status, created) = send(&app, "POST", "/api/categories", Some(&token), Some(json!({"name": "Tea", "status": "Active"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "POST", "/api/categories", Some(&token), Some(json!({"name": "Tea", "status": "Active"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category already exists");

    let (status, _) = send(&app, "POST", "/api/categories", Some(&token), Some(json!({"name": "Coffee"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(&app, "PUT", &format!("/api/categories/{id}"), Some(&token), Some(json!({"name": "Green Tea", "status": "Inactive"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Green Tea");
    assert_eq!(updated["status"], "Inactive");

    let missing = uuid::Uuid::now_v7();
    let (status, _) = send(&app, "PUT", &format!("/api/categories/{missing}"), Some(&token), Some(json!({"name": "X", "status": "Active"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", &format!("/api/categories/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");
    let (status, _) = send(&app, "DELETE", &format!("/api/categories/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_search_and_total_count() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;
    for name in ["Black Tea", "Green Tea", "Coffee"] {
        send(&app, "POST", "/api/categories", Some(&token), Some(json!({"name": name, "status": "Active"}))).await;
    }

    let req = Request::builder()
        .uri("/api/categories?search=tea&page=1&limit=1")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-total-count"], "2");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Green Tea");
}

#[tokio::test]
async fn test_references_are_checked() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;

    let ghost = uuid::Uuid::now_v7();
    let (status, _) = send(&app, "POST", "/api/brands", Some(&token), Some(json!({"name": "Acme", "category": ghost, "status": "Active"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    seed_product(&app, &token, "Kettle", 25.0).await;
    let (_, categories) = send(&app, "GET", "/api/categories", Some(&token), None).await;
    let category_id = categories[0]["id"].as_str().unwrap().to_string();
    let (status, _) = send(&app, "DELETE", &format!("/api/categories/{category_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, products) = send(&app, "GET", "/api/products", Some(&token), None).await;
    assert_eq!(products[0]["category"], "Kitchen");
    assert_eq!(products[0]["brand"], "Acme");
    assert_eq!(products[0]["amount"], 25.0);
}

#[tokio::test]
async fn test_product_multipart_with_image() {
    let (app, dir) = setup_app().await;
    let token = login(&app).await;
    seed_product(&app, &token, "Seed", 1.0).await;
    let (_, brands) = send(&app, "GET", "/api/brands", Some(&token), None).await;
    let brand_id = brands[0]["id"].as_str().unwrap();
    let category_id = brands[0]["categoryId"].as_str().unwrap();

    let boundary = "XBOUNDARYX";
    let mut body = String::new();
    for (name, value) in [("name", "Teapot"), ("category", category_id), ("brand", brand_id), ("amount", "49.99"), ("status", "Active")] {
        body.push_str(&format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"tea pot.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    ));
    let req = Request::builder()
        .method("POST")
        .uri("/api/products")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let product: Value = serde_json::from_slice(&bytes).unwrap();
    let image = product["productImage"].as_str().unwrap();
    assert!(image.starts_with("/uploads/") && image.ends_with("-tea_pot.png"));
    assert!(dir.path().join(image.trim_start_matches("/uploads/")).exists());

    // Updating without a new image keeps the stored path
    let id = product["id"].as_str().unwrap();
    let (status, updated) = send(&app, "PUT", &format!("/api/products/{id}"), Some(&token), Some(json!({
        "name": "Teapot", "category": category_id, "brand": brand_id, "amount": "55", "status": "Active"
    }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["productImage"], image);
    assert_eq!(updated["amount"], 55.0);
}

#[tokio::test]
async fn test_order_lifecycle() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;
    let kettle = seed_product(&app, &token, "Kettle", 100.0).await;
    let ghost = uuid::Uuid::now_v7();

    let (status, created) = send(&app, "POST", "/api/orders", Some(&token), Some(order_body(json!([
        {"productId": kettle, "quantity": 2},
        {"productId": ghost, "quantity": 1}
    ]), 10.0))).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["skippedProductIds"], json!([ghost]));
    let order_id = created["orderId"].as_str().unwrap().to_string();

    let (status, detail) = send(&app, "GET", &format!("/api/orders/{order_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["order"]["totalAmount"], 180.0);
    assert_eq!(detail["order"]["subtotalAmount"], 200.0);
    assert_eq!(detail["order"]["totalProducts"], 1);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);
    assert_eq!(detail["items"][0]["productName"], "Kettle");

    let (status, updated) = send(&app, "PUT", &format!("/api/orders/{order_id}"), Some(&token), Some(order_body(json!([
        {"productId": kettle, "quantity": 5}
    ]), 0.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["updatedOrder"]["totalAmount"], 500.0);
    let (_, detail) = send(&app, "GET", &format!("/api/orders/{order_id}"), Some(&token), None).await;
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);
    assert_eq!(detail["items"][0]["quantity"], 5);

    let (status, _) = send(&app, "POST", "/api/orders", Some(&token), Some(order_body(json!([]), 0.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "PUT", &format!("/api/orders/{ghost}"), Some(&token), Some(order_body(json!([
        {"productId": kettle, "quantity": 1}
    ]), 0.0))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, counts) = send(&app, "GET", "/api/counts", Some(&token), None).await;
    assert_eq!(counts, json!({"categories": 1, "brands": 1, "products": 1, "orders": 1}));

    let (status, report) = send(&app, "GET", "/api/reports", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["totalOrders"], 1);
    assert_eq!(report["summary"]["totalRevenue"], 500.0);
    assert_eq!(report["summary"]["totalCustomers"], 1);
    let (status, _) = send(&app, "GET", "/api/reports?startDate=2024-05-02&endDate=2024-05-01", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "DELETE", &format!("/api/orders/{order_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order deleted successfully");
    let (status, _) = send(&app, "GET", &format!("/api/orders/{order_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_defaults_and_update() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;

    let (status, settings) = send(&app, "GET", "/api/settings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["siteName"], "My Shop");
    assert_eq!(settings["currency"], "INR");

    let (status, settings) = send(&app, "PUT", "/api/settings", Some(&token), Some(json!({"theme": "dark"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["theme"], "dark");
    assert_eq!(settings["siteName"], "My Shop");
}

#[tokio::test]
async fn test_update_missing_brand_and_product() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;
    seed_product(&app, &token, "Kettle", 10.0).await;
    let (_, brands) = send(&app, "GET", "/api/brands", Some(&token), None).await;
    let brand_id = brands[0]["id"].as_str().unwrap();
    let category_id = brands[0]["categoryId"].as_str().unwrap();
    let missing = uuid::Uuid::now_v7();

    let (status, body) = send(&app, "PUT", &format!("/api/brands/{missing}"), Some(&token), Some(json!({
        "name": "Nope", "category": category_id, "status": "Active"
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Brand not found");

    let (status, body) = send(&app, "PUT", &format!("/api/products/{missing}"), Some(&token), Some(json!({
        "name": "Nope", "category": category_id, "brand": brand_id, "amount": 1, "status": "Active"
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn test_out_of_range_amounts_and_quantities_are_rejected() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;
    let kettle = seed_product(&app, &token, "Kettle", 1.0).await;
    let (_, brands) = send(&app, "GET", "/api/brands", Some(&token), None).await;
    let brand_id = brands[0]["id"].as_str().unwrap();
    let category_id = brands[0]["categoryId"].as_str().unwrap();

    let (status, body) = send(&app, "POST", "/api/products", Some(&token), Some(json!({
        "name": "Yacht", "category": category_id, "brand": brand_id, "amount": "10000000000000000000000000", "status": "Active"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount must be less than 10000000000");

    let (status, _) = send(&app, "POST", "/api/orders", Some(&token), Some(order_body(json!([
        {"productId": kettle, "quantity": 3_000_000_000_i64}
    ]), 0.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/api/products", Some(&token), Some(json!({
        "name": "Villa", "category": category_id, "brand": brand_id, "amount": "9999999999.99", "status": "Active"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let villa = body["id"].as_str().unwrap();
    let (status, body) = send(&app, "POST", "/api/orders", Some(&token), Some(order_body(json!([
        {"productId": villa, "quantity": 100_000}
    ]), 0.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Order total is too large");

    let (_, counts) = send(&app, "GET", "/api/counts", Some(&token), None).await;
    assert_eq!(counts["orders"], 0);
}

#[tokio::test]
async fn test_discount_is_stored_at_two_places() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;
    let p1 = seed_product(&app, &token, "Kettle", 1000.0).await;
    let mut body = order_body(json!([{"productId": p1, "quantity": 1}]), 0.0);
    body["discountPercentage"] = json!("12.345");
    let (status, created) = send(&app, "POST", "/api/orders", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["orderId"].as_str().unwrap();
    let (_, detail) = send(&app, "GET", &format!("/api/orders/{id}"), Some(&token), None).await;
    assert_eq!(detail["order"]["discountPercentage"], 12.35);
    assert_eq!(detail["order"]["discountAmount"], 123.5);
    assert_eq!(detail["order"]["totalAmount"], 876.5);
}

#[tokio::test]
async fn test_update_missing_category_with_taken_name_is_not_found() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;
    send(&app, "POST", "/api/categories", Some(&token), Some(json!({"name": "Tea", "status": "Active"}))).await;
    let missing = uuid::Uuid::now_v7();
    let (status, body) = send(&app, "PUT", &format!("/api/categories/{missing}"), Some(&token), Some(json!({"name": "Tea", "status": "Active"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");
}

#[tokio::test]
async fn test_settings_accept_logo_path_as_text() {
    let (app, _dir) = setup_app().await;
    let token = login(&app).await;
    let (status, settings) = send(&app, "PUT", "/api/settings", Some(&token), Some(json!({"logo": "/uploads/1700000000000-logo.png"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["logo"], "/uploads/1700000000000-logo.png");
    assert_eq!(settings["siteName"], "My Shop");
}

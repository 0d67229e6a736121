//! Black-box API tests.
//!
//! These spawn the production router on an ephemeral port against a real
//! `PostgreSQL` database and drive it over HTTP. Set
//! `AMBRE_TEST_DATABASE_URL` to run them; without it every test skips.
//!
//! Tests only ever add rows (with unique names/emails/categories), so they
//! are safe to run concurrently against a shared test database.

#![allow(clippy::unwrap_used, clippy::print_stderr, clippy::indexing_slicing)]

use std::sync::atomic::{AtomicU32, Ordering};

use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::{Value, json};

use ambre_api::config::ApiConfig;
use ambre_api::services::token::TokenService;
use ambre_api::state::AppState;
use ambre_api::{db, routes};
use ambre_core::AdminId;

const JWT_SECRET: &str = "k9!mQ2@xV7#bN4$wL1&pJ8*zR5^dF3(tU6)hG0[yS2]";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn the production router against the test database, or `None`
    /// (skip) when `AMBRE_TEST_DATABASE_URL` is unset.
    async fn spawn() -> Option<Self> {
        let Ok(database_url) = std::env::var("AMBRE_TEST_DATABASE_URL") else {
            eprintln!("AMBRE_TEST_DATABASE_URL not set; skipping black-box test");
            return None;
        };

        let config = ApiConfig {
            database_url: SecretString::from(database_url),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            public_base_url: "http://localhost:5000".to_string(),
            jwt_secret: SecretString::from(JWT_SECRET),
            jwt_ttl_days: 7,
            upload_dir: std::env::temp_dir().join("ambre-test-uploads"),
            sentry_dsn: None,
        };

        let pool = db::create_pool(&config.database_url)
            .await
            .expect("failed to connect to test database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("failed to run migrations");

        let app = routes::app(AppState::new(config, pool));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Some(Self { base_url, handle })
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Unique suffix so concurrent tests never collide on unique columns.
fn unique(prefix: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{nanos}-{n}", std::process::id())
}

/// Register a fresh admin and return `(token, email, password)`.
async fn register_admin(client: &reqwest::Client, base_url: &str) -> (String, String, String) {
    let email = format!("{}@test.example", unique("admin"));
    let password = "orchid-vault-9".to_string();

    let res = client
        .post(format!("{base_url}/api/admin/register"))
        .json(&json!({
            "username": unique("admin"),
            "email": email,
            "password": password,
            "name": "Test Admin",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    (body["token"].as_str().unwrap().to_string(), email, password)
}

fn product_form(name: &str, price: &str, category: &str, in_stock: bool) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("name", name.to_string())
        .text("price", price.to_string())
        .text("description", "A test fragrance with notes of cedar and citrus.")
        .text("shortDescription", "Test fragrance")
        .text("category", category.to_string())
        .text("image", "https://cdn.example/test.jpg")
        .text("inStock", if in_stock { "true" } else { "false" })
}

/// Create a product through the API and return its ID.
async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    price: &str,
    in_stock: bool,
) -> i64 {
    let res = client
        .post(format!("{base_url}/api/products"))
        .bearer_auth(token)
        .multipart(product_form(&unique("perfume"), price, &unique("cat"), in_stock))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await.unwrap();
    body["data"]["id"].as_i64().unwrap()
}

fn order_body(product_id: i64, quantity: i64) -> Value {
    json!({
        "productId": product_id,
        "quantity": quantity,
        "customerName": "Ada Lovelace",
        "customerEmail": "ada@example.com",
        "customerPhone": "+44 20 7946 0000",
        "shippingAddress": "12 Analytical Row, London",
    })
}

// =============================================================================
// Order lifecycle
// =============================================================================

#[tokio::test]
async fn order_snapshot_survives_price_change_and_status_updates() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();
    let (token, _, _) = register_admin(&client, &srv.base_url).await;

    // Seed one product priced $100, in stock
    let product_id = create_product(&client, &srv.base_url, &token, "100", true).await;

    // Order quantity 3: total is snapshotted at creation
    let res = client
        .post(format!("{}/api/orders", srv.base_url))
        .json(&order_body(product_id, 3))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["totalAmount"].as_f64().unwrap(), 300.0);
    assert_eq!(body["data"]["status"], "pending");
    let order_id = body["data"]["id"].as_i64().unwrap();

    // Raise the catalogue price afterwards
    let res = client
        .put(format!("{}/api/products/{product_id}", srv.base_url))
        .bearer_auth(&token)
        .multipart(reqwest::multipart::Form::new().text("price", "250"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Ship the order (skipping "processing" is a legal forward move)
    let res = client
        .put(format!("{}/api/orders/{order_id}/status", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The stored order reflects the new status and the original total
    let res = client
        .get(format!("{}/api/orders/{order_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["status"], "shipped");
    assert_eq!(body["data"]["totalAmount"].as_f64().unwrap(), 300.0);
    assert_eq!(body["data"]["productPrice"].as_f64().unwrap(), 100.0);
}

#[tokio::test]
async fn order_for_out_of_stock_product_is_rejected() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();
    let (token, _, _) = register_admin(&client, &srv.base_url).await;

    let product_id = create_product(&client, &srv.base_url, &token, "80", false).await;

    let res = client
        .post(format!("{}/api/orders", srv.base_url))
        .json(&order_body(product_id, 1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Product is out of stock");
}

#[tokio::test]
async fn status_updates_validate_value_and_transition() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();
    let (token, _, _) = register_admin(&client, &srv.base_url).await;

    let product_id = create_product(&client, &srv.base_url, &token, "60", true).await;
    let res = client
        .post(format!("{}/api/orders", srv.base_url))
        .json(&order_body(product_id, 2))
        .send()
        .await
        .unwrap();
    let order_id: i64 = res.json::<Value>().await.unwrap()["data"]["id"].as_i64().unwrap();

    // Unknown value: 400, order untouched
    let res = client
        .put(format!("{}/api/orders/{order_id}/status", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "refunded" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/api/orders/{order_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.json::<Value>().await.unwrap()["data"]["status"], "pending");

    // Deliver, then attempt to leave the terminal state
    let res = client
        .put(format!("{}/api/orders/{order_id}/status", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(format!("{}/api/orders/{order_id}/status", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "pending" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn protected_routes_reject_bad_tokens() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();

    // No token
    let res = client
        .get(format!("{}/api/orders", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Token signed with a different secret
    let foreign = TokenService::new(
        &SecretString::from("wrong-signing-key-with-entropy-Zq8!x2"),
        7,
    );
    let res = client
        .get(format!("{}/api/orders", srv.base_url))
        .bearer_auth(foreign.issue(AdminId::new(1)).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Expired token signed with the right secret
    let expired = TokenService::new(&SecretString::from(JWT_SECRET), -1);
    let res = client
        .get(format!("{}/api/orders", srv.base_url))
        .bearer_auth(expired.issue(AdminId::new(1)).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_verifies_password_and_updates_last_login() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();
    let (_, email, password) = register_admin(&client, &srv.base_url).await;

    // Wrong password
    let res = client
        .post(format!("{}/api/admin/login", srv.base_url))
        .json(&json!({ "email": email, "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid credentials");

    // Correct password
    let res = client
        .post(format!("{}/api/admin/login", srv.base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    // Profile reflects the login timestamp
    let res = client
        .get(format!("{}/api/admin/profile", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["email"], email);
    assert!(body["data"]["lastLogin"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();

    let email = format!("{}@test.example", unique("dup"));
    let register = |username: String, email: String| {
        let client = client.clone();
        let url = format!("{}/api/admin/register", srv.base_url);
        async move {
            client
                .post(url)
                .json(&json!({
                    "username": username,
                    "email": email,
                    "password": "orchid-vault-9",
                    "name": "Dup Admin",
                }))
                .send()
                .await
                .unwrap()
        }
    };

    let res = register(unique("dup"), email.clone()).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Same email (different case), different username
    let res = register(unique("dup"), email.to_uppercase()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn pagination_reports_totals_and_pages() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();
    let (token, _, _) = register_admin(&client, &srv.base_url).await;

    // Five products in a category nobody else uses
    let category = unique("paging");
    for i in 0..5 {
        let res = client
            .post(format!("{}/api/products", srv.base_url))
            .bearer_auth(&token)
            .multipart(product_form(
                &format!("{category}-{i}"),
                "42",
                &category,
                true,
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!(
            "{}/api/products?category={category}&page=2&limit=2",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 5);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn product_crud_round_trip() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();
    let (token, _, _) = register_admin(&client, &srv.base_url).await;

    let product_id = create_product(&client, &srv.base_url, &token, "185", true).await;

    // Public read
    let res = client
        .get(format!("{}/api/products/{product_id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["price"].as_f64().unwrap(), 185.0);
    let original_image = body["data"]["image"].as_str().unwrap().to_string();

    // Partial update: name only, image untouched
    let res = client
        .put(format!("{}/api/products/{product_id}", srv.base_url))
        .bearer_auth(&token)
        .multipart(reqwest::multipart::Form::new().text("name", "Velvet Orchid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Velvet Orchid");
    assert_eq!(body["data"]["image"], original_image);

    // Mutations require the token
    let res = client
        .delete(format!("{}/api/products/{product_id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Delete, then the row is gone
    let res = client
        .delete(format!("{}/api/products/{product_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/products/{product_id}", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_map_to_not_found() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();
    let (token, _, _) = register_admin(&client, &srv.base_url).await;

    let res = client
        .get(format!(
            "{}/api/products/64a7f0c2e1b2c3d4e5f6a7b8",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/api/orders/not-a-number", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn dashboard_aggregates_respond_for_admins_only() {
    let Some(srv) = TestServer::spawn().await else { return };
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/dashboard/stats", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (token, _, _) = register_admin(&client, &srv.base_url).await;
    let product_id = create_product(&client, &srv.base_url, &token, "90", true).await;
    let res = client
        .post(format!("{}/api/orders", srv.base_url))
        .json(&order_body(product_id, 2))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/api/dashboard/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"]["products"]["total"].as_i64().unwrap() >= 1);
    assert!(body["data"]["orders"]["total"].as_i64().unwrap() >= 1);
    assert!(body["data"]["revenue"]["total"].as_f64().unwrap() >= 180.0);

    let res = client
        .get(format!("{}/api/dashboard/sales-by-status", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().iter().any(|row| {
        row["status"] == "pending" && row["count"].as_i64().unwrap() >= 1
    }));
}

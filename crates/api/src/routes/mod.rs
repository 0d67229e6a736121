//! Route registration and the shared response envelope.
//!
//! [`app`] assembles the full production router; `main` and the black-box
//! tests both use it, so what ships is what gets tested.

pub mod admin;
pub mod dashboard;
pub mod orders;
pub mod products;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Build the complete application router.
///
/// Uploaded images are served statically under `/uploads`; everything else
/// lives under `/api`. CORS is permissive, matching the SPA's blanket
/// `cors()` expectations.
pub fn app(state: AppState) -> Router {
    let uploads_dir = state.images().dir().to_path_buf();

    let api = Router::new()
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
        .nest("/dashboard", dashboard::router());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Service banner.
async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the Ambre API" }))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK; clients probe this
/// per call instead of tracking availability in shared state.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

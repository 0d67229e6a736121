//! Admin account routes: registration, login, own profile.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use ambre_core::Email;

use crate::db::admins::AdminPatch;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::AdminSummary;
use crate::services::auth::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile).put(update_profile))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let (admin, token) = auth
        .register(
            body.username.as_deref().unwrap_or_default(),
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
            body.name.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "token": token,
            "data": AdminSummary::from(&admin),
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>> {
    let auth = AuthService::new(state.pool(), state.tokens());

    let (admin, token) = auth
        .login(
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "data": AdminSummary::from(&admin),
    })))
}

async fn profile(RequireAdmin(admin): RequireAdmin) -> Json<serde_json::Value> {
    // The extractor already loaded the freshest row
    Json(json!({ "success": true, "data": admin }))
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    name: Option<String>,
    email: Option<String>,
    username: Option<String>,
}

async fn update_profile(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| ApiError::InvalidInput(format!("invalid email: {e}")))?;

    let patch = AdminPatch {
        name: body.name,
        email,
        username: body.username,
    };

    let updated = AuthService::new(state.pool(), state.tokens())
        .update_profile(admin.id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": updated })))
}

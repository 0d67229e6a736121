//! Bearer-token authentication extractor.
//!
//! Admin-only routes take [`RequireAdmin`] as an argument; the extractor
//! verifies the `Authorization: Bearer <token>` header and resolves the
//! admin account before the handler runs.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::AdminRepository;
use crate::error::ApiError;
use crate::models::Admin;
use crate::state::AppState;

/// Extractor that requires a valid admin bearer token.
///
/// Rejects with a 401 envelope when the header is missing, the token does
/// not verify, or the account behind it no longer exists. There is no
/// anonymous fallback.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub Admin);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(parts).ok_or_else(|| {
            ApiError::Unauthorized("No authentication token, access denied".to_string())
        })?;

        let admin_id = state.tokens().verify(token).map_err(|_| {
            ApiError::Unauthorized("Token is invalid or expired".to_string())
        })?;

        // A token can outlive its account; treat that the same as a bad token
        let admin = AdminRepository::new(state.pool())
            .get_by_id(admin_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Token is invalid or expired".to_string()))?;

        Ok(Self(admin))
    }
}

/// Pull the token out of the `Authorization: Bearer ...` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

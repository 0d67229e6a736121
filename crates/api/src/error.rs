//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, ApiError>`, and every error body uses the same
//! `{ "success": false, "message": ... }` envelope as successful responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found (including malformed IDs).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad payload, illegal status value, or illegal transition.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Ordered product is not in stock.
    #[error("Product is out of stock")]
    OutOfStock,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_))
            || matches!(
                &self,
                Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_))
            )
        {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AlreadyExists
                | AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) | Self::OutOfStock => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Server Error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::AlreadyExists => {
                    "Admin already exists with this email or username".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::MissingField(field) => format!("{field} is required"),
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_) => {
                    "Server Error".to_string()
                }
            },
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::InvalidInput(msg) => msg.clone(),
            Self::OutOfStock => "Product is out of stock".to_string(),
        };

        (
            status,
            Json(json!({
                "success": false,
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

//! Authentication error type.

use thiserror::Error;

use ambre_core::EmailError;

use crate::db::RepositoryError;

/// Errors from registration, login, and profile operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; indistinguishable to the caller.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("admin already exists with this email or username")]
    AlreadyExists,

    /// Password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required field was empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token issuing failed.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

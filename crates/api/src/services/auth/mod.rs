//! Admin authentication service.
//!
//! Passwords are hashed with Argon2id and verified by recomputing; hashes
//! are never reversible and never leave the repository layer. Successful
//! register/login both return a signed bearer token.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use ambre_core::{AdminId, Email};

use crate::db::RepositoryError;
use crate::db::admins::{AdminPatch, AdminRepository};
use crate::models::Admin;
use crate::services::token::TokenService;

/// Minimum password length for admin accounts.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Admin authentication service.
pub struct AuthService<'a> {
    admins: AdminRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            admins: AdminRepository::new(pool),
            tokens,
        }
    }

    /// Register a new admin and issue their first token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for empty username or name.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::AlreadyExists` if the username or email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(Admin, String), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }

        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let admin = self
            .admins
            .create(username, &email, &password_hash, name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(admin.id)?;
        Ok((admin, token))
    }

    /// Login with email and password, updating the last-login timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the email is unknown or
    /// the password does not verify; the two cases are indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Admin, String), AuthError> {
        // An unparseable email can't match any account
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (admin, password_hash) = self
            .admins
            .get_auth_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        // The row can only vanish in a concurrent delete; fall back to the
        // account we just authenticated
        let admin = self
            .admins
            .touch_last_login(admin.id)
            .await?
            .unwrap_or(admin);

        let token = self.tokens.issue(admin.id)?;
        Ok((admin, token))
    }

    /// Read an admin's own profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn profile(&self, id: AdminId) -> Result<Option<Admin>, AuthError> {
        Ok(self.admins.get_by_id(id).await?)
    }

    /// Update an admin's own profile (name, email, username).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyExists` if the new username or email is
    /// taken. Returns `AuthError::Repository` for other database errors.
    pub async fn update_profile(
        &self,
        id: AdminId,
        patch: AdminPatch,
    ) -> Result<Option<Admin>, AuthError> {
        self.admins.update_profile(id, patch).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::AlreadyExists,
            other => AuthError::Repository(other),
        })
    }

}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(matches!(
            verify_password("hunter3!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("hunter2!").unwrap();
        let b = hash_password("hunter2!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(!hash.contains("hunter2"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_verify_rejects_corrupt_hash() {
        assert!(matches!(
            verify_password("hunter2!", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}

//! Admin account management.
//!
//! Passwords are read from an environment variable named on the command
//! line, keeping them out of argv and shell history.

use ambre_api::db::AdminRepository;
use ambre_api::services::auth::hash_password;
use ambre_core::Email;

/// Minimum password length (matches the API's registration rule).
const MIN_PASSWORD_LENGTH: usize = 6;

/// Create a new admin account.
///
/// # Errors
///
/// Returns an error if the password env var is unset or too short, the email
/// is invalid, the identity is already taken, or the database is unreachable.
pub async fn create(
    username: &str,
    email: &str,
    name: &str,
    password_env: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = read_password(password_env)?;
    let email = Email::parse(email)?;
    let password_hash = hash_password(&password)?;

    let pool = super::connect().await?;
    let admin = AdminRepository::new(&pool)
        .create(username, &email, &password_hash, name)
        .await?;

    tracing::info!("created admin {} ({})", admin.username, admin.email);
    Ok(())
}

/// Replace an existing admin account's password (rehash-on-change).
///
/// # Errors
///
/// Returns an error if the password env var is unset or too short, no admin
/// has this email, or the database is unreachable.
pub async fn set_password(
    email: &str,
    password_env: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let password = read_password(password_env)?;
    let email = Email::parse(email)?;
    let password_hash = hash_password(&password)?;

    let pool = super::connect().await?;
    let admins = AdminRepository::new(&pool);

    let admin = admins
        .get_by_email(&email)
        .await?
        .ok_or_else(|| format!("no admin with email {email}"))?;

    admins.set_password_hash(admin.id, &password_hash).await?;

    tracing::info!("password updated for {}", admin.email);
    Ok(())
}

fn read_password(password_env: &str) -> Result<String, Box<dyn std::error::Error>> {
    let password = std::env::var(password_env)
        .map_err(|_| format!("environment variable {password_env} must hold the password"))?;

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!("password must be at least {MIN_PASSWORD_LENGTH} characters").into());
    }

    Ok(password)
}

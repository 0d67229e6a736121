//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Connect to the database named by `AMBRE_DATABASE_URL` (or the generic
/// `DATABASE_URL`), loading `.env` first.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let url = std::env::var("AMBRE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "AMBRE_DATABASE_URL (or DATABASE_URL) must be set")?;

    let pool = ambre_api::db::create_pool(&SecretString::from(url)).await?;
    Ok(pool)
}

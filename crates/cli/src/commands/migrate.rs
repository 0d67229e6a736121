//! Database migrations.

/// Run all pending migrations from `crates/api/migrations`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations");
    sqlx::migrate!("../api/migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(())
}

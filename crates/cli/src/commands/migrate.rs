//! Database migration command.
//!
//! Runs the SQL migrations embedded from `crates/storefront/migrations/`.
//! The storefront binary never migrates on startup; this command is the
//! only migration path.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Errors from the migrate command.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// Reads `SUNDRY_DATABASE_URL` (falling back to `DATABASE_URL`).
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Resolve the database URL from the environment.
pub fn database_url() -> Result<SecretString, MigrationError> {
    if let Ok(url) = std::env::var("SUNDRY_DATABASE_URL") {
        return Ok(SecretString::from(url));
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(url));
    }
    Err(MigrationError::MissingEnvVar("SUNDRY_DATABASE_URL"))
}

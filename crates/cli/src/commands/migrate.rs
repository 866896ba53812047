//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! portal-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Server migrations: `crates/server/migrations/`
//!
//! ```text
//! migrations/
//! ├── 20260301000001_create_accounts.sql
//! └── 20260301000002_create_sessions.sql
//! ```

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the portal server migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url =
        super::database_url().ok_or(MigrationError::MissingEnvVar("PORTAL_DATABASE_URL"))?;

    tracing::info!("Connecting to portal database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running portal migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Portal migrations complete!");
    Ok(())
}

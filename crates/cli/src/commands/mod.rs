//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;

/// Read the database URL (`PORTAL_DATABASE_URL`, falling back to `DATABASE_URL`).
fn database_url() -> Option<SecretString> {
    std::env::var("PORTAL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
}

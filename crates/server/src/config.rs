//! Portal server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PORTAL_BASE_URL` - Public URL of the API (decides the `Secure` cookie flag)
//!
//! ## Optional
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 8000)
//! - `INSTITUTIONAL_DOMAINS` - Comma-separated email domains treated as institutional
//!   (default: the Unitec domain set)
//! - `GRADUATION_WINDOW_MONTHS` - Grace window after graduation (default: 12)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use unitec_portal_core::{DEFAULT_GRADUATION_WINDOW_MONTHS, InstitutionalDomains};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Portal server configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    /// Email domains whose accounts are auto-approved
    pub institutional_domains: InstitutionalDomains,
    /// Months an account counts as recently graduated
    pub graduation_window_months: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env
            .optional("PORTAL_DATABASE_URL")
            // Fallback to generic DATABASE_URL (set by most Postgres hosts)
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("PORTAL_DATABASE_URL".to_owned()))?;
        let host = env.parsed("PORTAL_HOST", "127.0.0.1")?;
        let port = env.parsed("PORTAL_PORT", "8000")?;
        let base_url = env.required("PORTAL_BASE_URL")?;

        let institutional_domains = match env.optional("INSTITUTIONAL_DOMAINS") {
            Some(list) => {
                let domains = InstitutionalDomains::parse_list(&list);
                if domains.is_empty() {
                    return Err(ConfigError::InvalidEnvVar(
                        "INSTITUTIONAL_DOMAINS".to_owned(),
                        "must list at least one domain".to_owned(),
                    ));
                }
                domains
            }
            None => InstitutionalDomains::default(),
        };
        let graduation_window_months = env.parsed(
            "GRADUATION_WINDOW_MONTHS",
            &DEFAULT_GRADUATION_WINDOW_MONTHS.to_string(),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            institutional_domains,
            graduation_window_months,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the API is served over HTTPS (sessions get the `Secure` flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.optional(key).unwrap_or_else(|| default.to_owned());
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    }
}

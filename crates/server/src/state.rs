//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use sqlx::PgPool;

use unitec_portal_core::InstitutionalDomains;

use crate::config::PortalConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Portal configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: PortalConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the configured institutional email domains.
    #[must_use]
    pub fn domains(&self) -> &InstitutionalDomains {
        &self.inner.config.institutional_domains
    }

    /// Graduation grace window in months.
    #[must_use]
    pub fn graduation_window_months(&self) -> u32 {
        self.inner.config.graduation_window_months
    }

    /// Today's date in the server's local timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

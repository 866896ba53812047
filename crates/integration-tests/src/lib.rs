//! Integration test helpers for the Unitec portal API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the server
//! cargo run -p unitec-portal-cli -- migrate
//! cargo run -p unitec-portal-server
//!
//! # Run the ignored integration tests against it
//! cargo test -p unitec-portal-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `PORTAL_TEST_URL` - Base URL of the running server (default: `http://localhost:8000`)
//! - `PORTAL_TEST_ADMIN_EMAIL` / `PORTAL_TEST_ADMIN_PASSWORD` - Admin account
//!   created with `portal-cli admin create` (admin tests only)

use reqwest::{Client, Response};
use serde_json::{Value, json};

/// Base URL for the portal API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("PORTAL_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_owned())
}

/// HTTP client that keeps the session cookie between requests.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn client() -> reqwest::Result<Client> {
    Client::builder().cookie_store(true).build()
}

/// An email address no earlier test run has registered.
#[must_use]
pub fn unique_email(domain: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("it-{nanos}@{domain}")
}

/// Registration body with valid defaults.
#[must_use]
pub fn registration(email: &str, student_id: Option<&str>) -> Value {
    json!({
        "email": email,
        "password": "correct-horse-battery",
        "re_password": "correct-horse-battery",
        "first_name": "Test",
        "last_name": "Student",
        "student_id": student_id,
        "year_group": "Y3",
        "graduation_date": "2025-11-30"
    })
}

/// POST a registration body.
///
/// # Errors
///
/// Returns the transport error if the server is unreachable.
pub async fn register(client: &Client, body: &Value) -> reqwest::Result<Response> {
    client
        .post(format!("{}/auth/users", base_url()))
        .json(body)
        .send()
        .await
}

/// Log in, storing the session cookie in `client`.
///
/// # Errors
///
/// Returns the transport error if the server is unreachable.
pub async fn login(client: &Client, email: &str, password: &str) -> reqwest::Result<Response> {
    client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
}

//! HTTP route handlers for the portal API.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                          - Liveness check
//! GET   /health/ready                    - Readiness check (database)
//!
//! # Auth
//! POST  /auth/users                      - Register
//! POST  /auth/login                      - Login (sets session cookie)
//! POST  /auth/logout                     - Logout
//!
//! # Current account (requires auth)
//! GET   /me                              - Account summary
//! PATCH /me                              - Profile update
//!
//! # Admin dashboard (requires admin)
//! GET   /admin/users                     - List with filters and search
//! GET   /admin/users/{id}                - Account detail
//! PATCH /admin/users/{id}/approval       - Set approval status
//! POST  /admin/users/approve             - Bulk approve
//! POST  /admin/users/deny                - Bulk deny
//! POST  /admin/users/extend-graduation   - Bulk extend graduation date
//! ```

pub mod admin_users;
pub mod auth;
pub mod me;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the admin dashboard routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin_users::list))
        .route("/users/approve", post(admin_users::approve))
        .route("/users/deny", post(admin_users::deny))
        .route(
            "/users/extend-graduation",
            post(admin_users::extend_graduation),
        )
        .route("/users/{id}", get(admin_users::show))
        .route("/users/{id}/approval", patch(admin_users::set_approval))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .route("/me", get(me::show).patch(me::update))
        .nest("/admin", admin_routes())
}

/// Build the application with sessions and request tracing.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

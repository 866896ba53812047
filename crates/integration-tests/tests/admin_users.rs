//! Integration tests for the admin account dashboard API.
//!
//! These tests require:
//! - The portal server running (cargo run -p unitec-portal-server)
//! - An admin account created with `portal-cli admin create`, whose
//!   credentials are in `PORTAL_TEST_ADMIN_EMAIL` / `PORTAL_TEST_ADMIN_PASSWORD`
//!
//! Run with: cargo test -p unitec-portal-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use unitec_portal_integration_tests::{base_url, client, login, register, registration, unique_email};

/// Log in as the bootstrap admin.
async fn admin_client() -> Client {
    let email = std::env::var("PORTAL_TEST_ADMIN_EMAIL").expect("PORTAL_TEST_ADMIN_EMAIL not set");
    let password =
        std::env::var("PORTAL_TEST_ADMIN_PASSWORD").expect("PORTAL_TEST_ADMIN_PASSWORD not set");

    let client = client().expect("Failed to create HTTP client");
    let resp = login(&client, &email, &password)
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

/// Register a pending account and return its ID.
async fn pending_account() -> i64 {
    let client = client().expect("Failed to create HTTP client");
    let resp = register(&client, &registration(&unique_email("gmail.com"), None))
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("id missing")
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_admin_routes_require_login() {
    let client = client().expect("Failed to create HTTP client");

    let resp = client
        .get(format!("{}/admin/users", base_url()))
        .send()
        .await
        .expect("Failed to list users");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_students_cannot_use_admin_routes() {
    let client = client().expect("Failed to create HTTP client");
    let email = unique_email("unitec.ac.nz");
    register(&client, &registration(&email, None))
        .await
        .expect("Failed to register");
    login(&client, &email, "correct-horse-battery")
        .await
        .expect("Failed to log in");

    let resp = client
        .get(format!("{}/admin/users", base_url()))
        .send()
        .await
        .expect("Failed to list users");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Approval workflow
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal server and admin credentials"]
async fn test_bulk_approve_and_deny() {
    let admin = admin_client().await;
    let base_url = base_url();
    let first = pending_account().await;
    let second = pending_account().await;

    let resp = admin
        .post(format!("{base_url}/admin/users/approve"))
        .json(&json!({ "ids": [first, second] }))
        .send()
        .await
        .expect("Failed to approve");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["updated"], 2);
    assert_eq!(body["message"], "Successfully approved 2 user(s).");

    let resp = admin
        .post(format!("{base_url}/admin/users/deny"))
        .json(&json!({ "ids": [second] }))
        .send()
        .await
        .expect("Failed to deny");
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Successfully denied 1 user(s).");

    let resp = admin
        .get(format!("{base_url}/admin/users/{second}"))
        .send()
        .await
        .expect("Failed to get user");
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["approval_status"], "denied");
}

#[tokio::test]
#[ignore = "Requires running portal server and admin credentials"]
async fn test_single_approval_change() {
    let admin = admin_client().await;
    let id = pending_account().await;

    let resp = admin
        .patch(format!("{}/admin/users/{id}/approval", base_url()))
        .json(&json!({ "approval_status": "approved" }))
        .send()
        .await
        .expect("Failed to set approval");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["approval_status"], "approved");
    assert_eq!(body["approval_status_display"], "Approved");
}

#[tokio::test]
#[ignore = "Requires running portal server and admin credentials"]
async fn test_extend_graduation_moves_date_one_year_ahead() {
    let admin = admin_client().await;
    let id = pending_account().await;

    let resp = admin
        .post(format!("{}/admin/users/extend-graduation", base_url()))
        .json(&json!({ "ids": [id] }))
        .send()
        .await
        .expect("Failed to extend graduation");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Successfully extended 1 graduated user(s).");

    let resp = admin
        .get(format!("{}/admin/users/{id}", base_url()))
        .send()
        .await
        .expect("Failed to get user");
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["graduation_status"], "graduated");
}

#[tokio::test]
#[ignore = "Requires running portal server and admin credentials"]
async fn test_list_filters() {
    let admin = admin_client().await;
    let base_url = base_url();
    pending_account().await;

    let resp = admin
        .get(format!(
            "{base_url}/admin/users?approval_status=pending&email_domain=non_institutional"
        ))
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["page_size"], 25);
    let results = body["results"].as_array().expect("results missing");
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r["approval_status"] == "pending"
        && r["is_institutional_email"] == false));

    let resp = admin
        .get(format!("{base_url}/admin/users?graduation_status=sometimes"))
        .send()
        .await
        .expect("Failed to list users");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

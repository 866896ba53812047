//! Integration tests for self-service registration and sessions.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`portal-cli migrate`)
//! - The portal server running (cargo run -p unitec-portal-server)
//! - The default institutional domain set
//!
//! Run with: cargo test -p unitec-portal-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::Value;

use unitec_portal_integration_tests::{base_url, client, login, register, registration, unique_email};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_institutional_registration_is_approved() {
    let client = client().expect("Failed to create HTTP client");
    let email = unique_email("unitec.ac.nz");

    let resp = register(&client, &registration(&email, Some("123-4567")))
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["approval_status"], "approved");
    assert_eq!(body["is_institutional_email"], true);
    assert_eq!(body["is_institutional_email_display"], "Unitec");
    assert_eq!(body["role"], "student");
    assert_eq!(body["student_id"], "1234567");
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_personal_registration_is_pending() {
    let client = client().expect("Failed to create HTTP client");
    let email = unique_email("gmail.com");

    let resp = register(&client, &registration(&email, None))
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["approval_status"], "pending");
    assert_eq!(body["is_institutional_email"], false);
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_student_id_requires_institutional_email() {
    let client = client().expect("Failed to create HTTP client");
    let email = unique_email("gmail.com");

    let resp = register(&client, &registration(&email, Some("1234567")))
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(
        body["non_field_errors"][0],
        "Unitec student ID can only be provided with Unitec email addresses."
    );
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_duplicate_email_is_rejected() {
    let client = client().expect("Failed to create HTTP client");
    let email = unique_email("unitec.ac.nz");
    let body = registration(&email, None);

    let first = register(&client, &body).await.expect("Failed to register");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = register(&client, &body).await.expect("Failed to register");
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let errors: Value = second.json().await.expect("Failed to parse response");
    assert_eq!(errors["email"][0], "user with this email already exists.");
}

// ============================================================================
// Sessions and profile
// ============================================================================

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_login_profile_logout() {
    let client = client().expect("Failed to create HTTP client");
    let base_url = base_url();
    let email = unique_email("gmail.com");

    register(&client, &registration(&email, None))
        .await
        .expect("Failed to register");

    let resp = login(&client, &email, "correct-horse-battery")
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    // Setting a student ID on a personal-email account is refused
    let resp = client
        .patch(format!("{base_url}/me"))
        .json(&serde_json::json!({ "student_id": "1234567" }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .patch(format!("{base_url}/me"))
        .json(&serde_json::json!({ "year_group": "Y4" }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["year_group"], "Y4");
    assert_eq!(body["approval_status"], "pending");

    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{base_url}/me"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_wrong_password_is_unauthorized() {
    let client = client().expect("Failed to create HTTP client");
    let email = unique_email("unitec.ac.nz");

    register(&client, &registration(&email, None))
        .await
        .expect("Failed to register");

    let resp = login(&client, &email, "not-the-password")
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

//! Realm scope guard behavior across the inbound surface.

mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp, TEST_REALM};

#[tokio::test]
async fn test_hello_returns_realm_name_for_in_scope_realm() {
    let app = TestApp::spawn();

    let response = app.get(&format!("/realms/{}/hello", TEST_REALM), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["hello"], TEST_REALM);
}

#[tokio::test]
async fn test_realm_matching_is_case_insensitive() {
    let app = TestApp::spawn();

    let response = app.get("/realms/SWIFTLY-prod/hello", None).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_out_of_scope_realm_is_rejected() {
    let app = TestApp::spawn();

    let response = app.get("/realms/master/hello", None).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guard_runs_before_authentication() {
    let app = TestApp::spawn();

    // No credential at all: the realm rejection wins over the missing token.
    let response = app.get("/realms/master/myorg", None).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_guard_covers_the_invitation_endpoint() {
    let app = TestApp::spawn();
    let token = app.token_for("u-1", "admin");

    let response = app
        .post_form(
            "/realms/master/invite-user",
            Some(&token),
            &[
                ("email", "new@example.com"),
                ("firstName", "Ada"),
                ("lastName", "Lovelace"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.notifier.sent().len(), 0);
}

//! End-to-end behavior of the caller-organization endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, body_string, TestApp, TEST_REALM};
use org_service::models::Organization;

fn myorg_path() -> String {
    format!("/realms/{}/myorg", TEST_REALM)
}

#[tokio::test]
async fn test_unauthenticated_call_is_rejected() {
    let app = TestApp::spawn();

    let response = app.get(&myorg_path(), None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::spawn();

    let response = app.get(&myorg_path(), Some("not-a-token")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_without_organization_gets_not_found() {
    let app = TestApp::spawn();
    let token = app.token_for("u-1", "alice");

    let response = app.get(&myorg_path(), Some(&token)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_string(response).await;
    assert!(body.contains("No organization found for the user."));
}

#[tokio::test]
async fn test_user_with_one_organization_gets_it_back() {
    let app = TestApp::spawn();
    app.store.add_organization(
        Organization {
            id: "org-1".to_string(),
            name: "Acme".to_string(),
        },
        &["u-1"],
    );
    let token = app.token_for("u-1", "alice");

    let response = app.get(&myorg_path(), Some(&token)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["id"], "org-1");
}

#[tokio::test]
async fn test_first_enumerated_organization_wins() {
    let app = TestApp::spawn();
    app.store.add_organization(
        Organization {
            id: "org-1".to_string(),
            name: "Acme".to_string(),
        },
        &["u-1"],
    );
    app.store.add_organization(
        Organization {
            id: "org-2".to_string(),
            name: "Globex".to_string(),
        },
        &["u-1"],
    );
    let token = app.token_for("u-1", "alice");

    let response = app.get(&myorg_path(), Some(&token)).await;

    let body = body_json(response).await;
    assert_eq!(body["id"], "org-1");
}

//! Test helper module for org-service integration tests.
//!
//! Builds the full router against the in-memory identity store and a
//! recording notifier, and mints RS256 tokens the verifier accepts.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tower::ServiceExt;

use org_service::{
    build_router,
    config::{
        Environment, IdentityStoreConfig, InvitationConfig, JwtConfig, OrgServiceConfig,
        PolicyConfig, RateLimitConfig, RealmScopeConfig, SecurityConfig, SmtpConfig,
    },
    services::{AccessClaims, JwtVerifier, MockIdentityStore, MockNotifier},
    AppState,
};

/// Test RSA keypair; the private half signs tokens, the public half is what
/// the verifier gets.
const TEST_PRIVATE_KEY: &str = include_str!("../keys/test_private.pem");
const TEST_PUBLIC_KEY: &str = include_str!("../keys/test_public.pem");

pub const TEST_REALM: &str = "TrackSwiftly-Demo";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MockIdentityStore>,
    pub notifier: Arc<MockNotifier>,
    encoding_key: EncodingKey,
}

impl TestApp {
    /// Build the application with an empty in-memory store.
    pub fn spawn() -> Self {
        Self::spawn_with_config(create_test_config())
    }

    pub fn spawn_with_config(config: OrgServiceConfig) -> Self {
        let store = Arc::new(MockIdentityStore::new());
        let notifier = Arc::new(MockNotifier::new());
        let verifier =
            JwtVerifier::from_pem(TEST_PUBLIC_KEY.as_bytes()).expect("Failed to parse test key");

        let state = AppState::new(config, store.clone(), notifier.clone(), verifier)
            .expect("Failed to build app state");

        TestApp {
            router: build_router(state),
            store,
            notifier,
            encoding_key: EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY.as_bytes())
                .expect("Failed to parse test private key"),
        }
    }

    /// Mint a valid access token for the given user.
    pub fn token_for(&self, user_id: &str, username: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            preferred_username: Some(username.to_string()),
            exp: now + 300,
            iat: now,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .expect("Failed to sign test token")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response<Body> {
        let body = serde_urlencoded::to_string(fields).expect("Failed to encode form");
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }
}

pub fn create_test_config() -> OrgServiceConfig {
    OrgServiceConfig {
        common: service_core::config::Config { port: 0 },
        environment: Environment::Dev,
        service_name: "org-service-test".to_string(),
        service_version: "0.1.0".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        realm: RealmScopeConfig {
            scope_pattern: "track|swiftly".to_string(),
        },
        policy: PolicyConfig {
            hello_join_requires_role: false,
        },
        identity_store: IdentityStoreConfig {
            base_url: "http://localhost:8080".to_string(),
            service_token: "test-service-token".to_string(),
            timeout_seconds: 5,
        },
        jwt: JwtConfig {
            public_key_path: "unused-in-tests".to_string(),
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 587,
            user: "test@example.com".to_string(),
            password: "test-password".to_string(),
            from_email: "test@example.com".to_string(),
        },
        invitation: InvitationConfig {
            registration_base_url: "http://localhost:3000".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit: RateLimitConfig {
            invite_attempts: 100,
            invite_window_seconds: 60,
        },
    }
}

/// Read a response body to a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body was not UTF-8")
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let text = body_string(response).await;
    serde_json::from_str(&text).expect("Body was not JSON")
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use regex::Regex;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::OrgServiceConfig;
use crate::services::{policy, IdentityStore, InvitationService, JwtVerifier, Notifier};
use service_core::error::AppError;
use service_core::middleware::rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimiter};
use service_core::middleware::security_headers::security_headers_middleware;
use service_core::middleware::tracing::request_id_middleware;

#[derive(Clone)]
pub struct AppState {
    pub config: OrgServiceConfig,
    pub store: Arc<dyn IdentityStore>,
    pub notifier: Arc<dyn Notifier>,
    pub verifier: JwtVerifier,
    pub invitations: InvitationService,
    pub realm_scope: Regex,
    pub invite_rate_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(
        config: OrgServiceConfig,
        store: Arc<dyn IdentityStore>,
        notifier: Arc<dyn Notifier>,
        verifier: JwtVerifier,
    ) -> Result<Self, AppError> {
        let realm_scope = policy::compile_scope_pattern(&config.realm.scope_pattern)?;
        let invite_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.invite_attempts,
            config.rate_limit.invite_window_seconds,
        );
        let invitations = InvitationService::new(
            store.clone(),
            notifier.clone(),
            &config.invitation.registration_base_url,
        );

        Ok(Self {
            config,
            store,
            notifier,
            verifier,
            invitations,
            realm_scope,
            invite_rate_limiter,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    // No auth by itself; the join variant enforces its configurable policy in
    // the handler, so it only gets best-effort principal resolution here.
    let open_routes = Router::new()
        .route("/hello", get(handlers::hello::hello))
        .route(
            "/hello/:group/users/:user_id",
            post(handlers::hello::hello_join_group),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::optional_auth_middleware,
        ));

    let authed_routes = Router::new()
        .route("/groups", get(handlers::group::list_groups))
        .route(
            "/groups/:group/users/:user_id",
            post(handlers::group::assign_user_to_group),
        )
        .route("/myorg", get(handlers::org::my_org))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    // Invitations dispatch outbound mail with no idempotency key, so the
    // endpoint carries its own IP rate limit.
    let invite_limiter = state.invite_rate_limiter.clone();
    let invite_route = Router::new()
        .route("/invite-user", post(handlers::invitation::invite_user))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn_with_state(invite_limiter, ip_rate_limit_middleware));

    // One realm per request; the scope guard runs before anything else under
    // this subtree.
    let realm_routes = Router::new()
        .merge(open_routes)
        .merge(authed_routes)
        .merge(invite_route)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::realm_scope_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        axum::http::HeaderValue::from_static("*")
                    })
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/realms/:realm", realm_routes)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Service health check
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
    }))
}

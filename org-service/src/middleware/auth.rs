use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::models::Principal;
use crate::AppState;
use service_core::error::AppError;

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Principal resolver: verify the bearer credential and bind the request to
/// exactly one authenticated principal. Fails closed with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or_else(|| {
        AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
    })?;

    let claims = state.verifier.validate(token)?;
    req.extensions_mut().insert(claims.principal());

    Ok(next.run(req).await)
}

/// Best-effort variant for endpoints whose gating is configurable: resolves a
/// principal when a valid credential is present, continues anonymously
/// otherwise. Enforcement happens at the handler.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req) {
        if let Ok(claims) = state.verifier.validate(token) {
            req.extensions_mut().insert(claims.principal());
        }
    }

    next.run(req).await
}

/// Extractor for the authenticated principal.
pub struct AuthPrincipal(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts.extensions.get::<Principal>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Principal missing from request extensions"))
        })?;

        Ok(AuthPrincipal(principal))
    }
}

/// Extractor for an optionally-present principal.
pub struct MaybePrincipal(pub Option<Principal>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(parts.extensions.get::<Principal>().cloned()))
    }
}

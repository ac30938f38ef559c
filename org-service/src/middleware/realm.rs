//! Realm context and scope guard.
//!
//! Every request under `/realms/:realm` carries exactly one realm, derived
//! from the path. The guard runs before any privileged operation: a realm
//! outside the configured allow-pattern is rejected with 403.

use axum::{
    extract::{FromRequestParts, RawPathParams, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::services::policy;
use crate::AppState;
use service_core::error::AppError;

/// Request-scoped realm.
#[derive(Debug, Clone)]
pub struct RealmContext {
    pub name: String,
}

pub async fn realm_scope_middleware(
    State(state): State<AppState>,
    params: RawPathParams,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let realm = params
        .iter()
        .find(|(key, _)| *key == "realm")
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Realm segment missing from route"))
        })?;

    if !policy::realm_in_scope(&realm, &state.realm_scope) {
        tracing::warn!(realm = %realm, "Realm outside configured scope");
        return Err(AppError::OutOfScope(anyhow::anyhow!(
            "This endpoint is not available in realm '{}'",
            realm
        )));
    }

    req.extensions_mut().insert(RealmContext { name: realm });
    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RealmContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RealmContext>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Realm context not found"))
        })
    }
}

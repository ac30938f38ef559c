//! Caller organization lookup.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::middleware::{AuthPrincipal, RealmContext};
use crate::services::organization;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct MyOrgResponse {
    pub name: String,
    pub id: String,
}

/// GET /realms/:realm/myorg
pub async fn my_org(
    State(state): State<AppState>,
    realm: RealmContext,
    AuthPrincipal(principal): AuthPrincipal,
) -> Result<Json<MyOrgResponse>, AppError> {
    match organization::first_organization_of(state.store.as_ref(), &realm.name, &principal.id)
        .await?
    {
        Some(org) => Ok(Json(MyOrgResponse {
            name: org.name,
            id: org.id,
        })),
        None => Err(AppError::NotFound(anyhow::anyhow!(
            "No organization found for the user."
        ))),
    }
}

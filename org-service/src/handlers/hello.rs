//! Public hello endpoints.
//!
//! The join variant historically shipped without any auth or role check; that
//! behavior is preserved as the default and switchable per deployment (see
//! `PolicyConfig::hello_join_requires_role`).

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::middleware::{MaybePrincipal, RealmContext};
use crate::models::RealmRole;
use crate::services::policy;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct HelloJoinResponse {
    pub name: String,
    pub user: String,
}

/// GET /realms/:realm/hello
pub async fn hello(realm: RealmContext) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "hello": realm.name }))
}

/// POST /realms/:realm/hello/:group/users/:user_id
pub async fn hello_join_group(
    State(state): State<AppState>,
    realm: RealmContext,
    MaybePrincipal(principal): MaybePrincipal,
    Path((_realm, group_name, user_id)): Path<(String, String, String)>,
) -> Result<Json<HelloJoinResponse>, AppError> {
    if state.config.policy.hello_join_requires_role {
        let principal = principal
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Bearer credential required")))?;
        policy::require_any_role(
            state.store.as_ref(),
            &realm.name,
            &principal,
            RealmRole::MANAGEMENT,
        )
        .await?;
    }

    let target = state
        .store
        .find_user_by_id(&realm.name, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    let group = state
        .store
        .find_group_by_name(&realm.name, &group_name.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Group not found")))?;

    state
        .store
        .join_group(&realm.name, &target.id, &group)
        .await?;

    Ok(Json(HelloJoinResponse {
        name: group_name,
        user: user_id,
    }))
}

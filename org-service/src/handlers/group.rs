//! Group listing and role-gated group assignment.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::middleware::{AuthPrincipal, RealmContext};
use crate::models::{Group, RealmRole};
use crate::services::{organization, policy};
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            name: group.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignGroupResponse {
    pub group: String,
    pub user: String,
}

/// GET /realms/:realm/groups
pub async fn list_groups(
    State(state): State<AppState>,
    realm: RealmContext,
    AuthPrincipal(principal): AuthPrincipal,
) -> Result<Json<Vec<GroupResponse>>, AppError> {
    policy::require_any_role(
        state.store.as_ref(),
        &realm.name,
        &principal,
        RealmRole::MANAGEMENT,
    )
    .await?;

    let groups = state.store.realm_groups(&realm.name).await?;

    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

/// POST /realms/:realm/groups/:group/users/:user_id
///
/// Check order matters: role first (before any lookup), then the
/// organization-sharing gate, then group resolution.
pub async fn assign_user_to_group(
    State(state): State<AppState>,
    realm: RealmContext,
    AuthPrincipal(actor): AuthPrincipal,
    Path((_realm, group_name, user_id)): Path<(String, String, String)>,
) -> Result<Json<AssignGroupResponse>, AppError> {
    policy::require_any_role(
        state.store.as_ref(),
        &realm.name,
        &actor,
        RealmRole::MANAGEMENT,
    )
    .await?;

    let target = state
        .store
        .find_user_by_id(&realm.name, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    organization::require_shared_organization(state.store.as_ref(), &realm.name, &actor, &target)
        .await?;

    let group = state
        .store
        .find_group_by_name(&realm.name, &group_name.to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Group not found")))?;

    state
        .store
        .join_group(&realm.name, &target.id, &group)
        .await?;

    Ok(Json(AssignGroupResponse {
        group: group_name,
        user: target.username,
    }))
}

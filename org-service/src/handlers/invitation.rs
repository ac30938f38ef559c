//! Member invitation endpoint.

use axum::{extract::State, Form, Json};
use serde::Serialize;
use validator::Validate;

use crate::middleware::{AuthPrincipal, RealmContext};
use crate::models::{InvitationOutcome, InvitationRequest, RealmRole};
use crate::services::{organization, policy};
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct InviteUserResponse {
    pub outcome: InvitationOutcome,
    pub email: String,
    pub organization: String,
}

/// POST /realms/:realm/invite-user (form-encoded)
///
/// Requires ADMIN or MANAGER. The caller's first organization scopes the
/// invitation; a caller without an organization is a terminal 404, and the
/// orchestrator is never invoked for them.
pub async fn invite_user(
    State(state): State<AppState>,
    realm: RealmContext,
    AuthPrincipal(principal): AuthPrincipal,
    Form(form): Form<InvitationRequest>,
) -> Result<Json<InviteUserResponse>, AppError> {
    form.validate()?;

    policy::require_any_role(
        state.store.as_ref(),
        &realm.name,
        &principal,
        RealmRole::MANAGEMENT,
    )
    .await?;

    let Some(org) =
        organization::first_organization_of(state.store.as_ref(), &realm.name, &principal.id)
            .await?
    else {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "No organization found for the user."
        )));
    };

    let outcome = state.invitations.invite(&realm.name, &org, &form).await?;

    Ok(Json(InviteUserResponse {
        outcome,
        email: form.email,
        organization: org.name,
    }))
}

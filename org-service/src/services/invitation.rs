//! Invitation orchestration.
//!
//! Decides between the existing-user invitation and the new-user
//! registration flow. Exactly one directory lookup and exactly one
//! notification dispatch per call; deduplication of repeated invitation
//! requests is the caller's responsibility.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::{InvitationOutcome, InvitationRequest, Organization};
use crate::services::email::Notifier;
use crate::services::store::IdentityStore;
use service_core::error::AppError;

#[derive(Clone)]
pub struct InvitationService {
    store: Arc<dyn IdentityStore>,
    notifier: Arc<dyn Notifier>,
    registration_base_url: String,
}

impl InvitationService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        notifier: Arc<dyn Notifier>,
        registration_base_url: &str,
    ) -> Self {
        Self {
            store,
            notifier,
            registration_base_url: registration_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Invite `request.email` into `organization`.
    ///
    /// Callers resolve the organization first; an organization-less caller is
    /// a terminal not-found outcome at the handler, not an input here.
    #[tracing::instrument(skip(self, request), fields(realm = %realm, org_id = %organization.id))]
    pub async fn invite(
        &self,
        realm: &str,
        organization: &Organization,
        request: &InvitationRequest,
    ) -> Result<InvitationOutcome, AppError> {
        match self.store.find_user_by_email(realm, &request.email).await? {
            Some(user) => {
                self.notifier
                    .send_invitation(&request.email, organization)
                    .await?;

                tracing::info!(user_id = %user.id, "Invited existing user to organization");
                Ok(InvitationOutcome::InvitedExisting)
            }
            None => {
                let join_token = Uuid::new_v4().to_string();
                let registration_link = format!(
                    "{}/register?org_id={}&token={}",
                    self.registration_base_url, organization.id, join_token
                );

                self.notifier
                    .send_registration_link(&request.email, organization, &registration_link)
                    .await?;

                tracing::info!("Sent registration link to new user");
                Ok(InvitationOutcome::InvitedNew)
            }
        }
    }
}

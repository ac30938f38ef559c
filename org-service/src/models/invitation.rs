use serde::{Deserialize, Serialize};
use validator::Validate;

/// Transient invitation form value; lives only for the duration of one
/// orchestration call and is never persisted here.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
}

/// Which invitation path was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvitationOutcome {
    /// The address belongs to a known user; a join-organization invitation
    /// was sent.
    InvitedExisting,
    /// The address is unknown; a registration link carrying an org-join
    /// token was sent.
    InvitedNew,
}

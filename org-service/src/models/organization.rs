use serde::{Deserialize, Serialize};

/// Organization reference resolved from the identity store for the duration
/// of one request. Membership scoping for invitations and cross-user
/// management; distinct from [`super::Group`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

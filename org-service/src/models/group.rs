use serde::{Deserialize, Serialize};

/// Group reference within a realm. Membership is many-to-many and owned by
/// the identity store; joining an already-joined group is a no-op there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

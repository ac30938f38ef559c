use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Realm-level roles this service gates on.
///
/// A closed set rather than free-form strings: a typo in a caller cannot
/// silently degrade into a "role not found" negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealmRole {
    Admin,
    Manager,
}

impl RealmRole {
    /// Roles allowed to manage organization membership.
    pub const MANAGEMENT: &'static [RealmRole] = &[RealmRole::Admin, RealmRole::Manager];

    /// Store-side role identifier within the realm.
    pub fn as_str(&self) -> &'static str {
        match self {
            RealmRole::Admin => "ADMIN",
            RealmRole::Manager => "MANAGER",
        }
    }
}

impl fmt::Display for RealmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RealmRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(RealmRole::Admin),
            "MANAGER" => Ok(RealmRole::Manager),
            other => Err(format!("Unknown realm role: {}", other)),
        }
    }
}

/// Role record resolved from the identity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_identifiers_round_trip() {
        for role in RealmRole::MANAGEMENT {
            assert_eq!(role.as_str().parse::<RealmRole>().unwrap(), *role);
        }
    }

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("admin".parse::<RealmRole>().unwrap(), RealmRole::Admin);
        assert_eq!("Manager".parse::<RealmRole>().unwrap(), RealmRole::Manager);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!("SUPERUSER".parse::<RealmRole>().is_err());
    }
}

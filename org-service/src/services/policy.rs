//! Role policy engine and realm scope predicate.
//!
//! Both checks fail closed: an absent role or a non-matching realm is a
//! negative result, never an internal error. Role membership is re-read from
//! the identity store on every call.

use regex::{Regex, RegexBuilder};

use crate::models::{Principal, RealmRole};
use crate::services::store::IdentityStore;
use service_core::error::AppError;

/// Compile the configured scope fragment into the matcher used by the realm
/// guard. Matching is case-insensitive and anchored nowhere: the fragment
/// matches any part of the realm name.
pub fn compile_scope_pattern(fragment: &str) -> Result<Regex, AppError> {
    RegexBuilder::new(fragment)
        .case_insensitive(true)
        .build()
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid realm scope pattern: {}", e))
        })
}

/// Pure predicate: is this realm within the extension's policy domain?
pub fn realm_in_scope(realm_name: &str, scope_pattern: &Regex) -> bool {
    scope_pattern.is_match(realm_name)
}

/// Does the principal hold at least one of the given roles in the realm?
///
/// Roles absent from the realm are skipped; the first membership hit
/// short-circuits.
pub async fn has_any_role(
    store: &dyn IdentityStore,
    realm: &str,
    principal: &Principal,
    roles: &[RealmRole],
) -> Result<bool, AppError> {
    for role in roles {
        let Some(realm_role) = store.find_realm_role(realm, *role).await? else {
            continue;
        };
        if store.has_role(realm, &principal.id, &realm_role).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Access-control gate: fail with `Forbidden` unless the principal holds one
/// of the roles.
pub async fn require_any_role(
    store: &dyn IdentityStore,
    realm: &str,
    principal: &Principal,
    roles: &[RealmRole],
) -> Result<(), AppError> {
    if has_any_role(store, realm, principal, roles).await? {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %principal.id,
            required = ?roles,
            "Role check failed"
        );
        Err(AppError::Forbidden(anyhow::anyhow!("You are not allowed")))
    }
}

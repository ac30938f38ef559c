//! Organization resolution under the one-user-one-organization policy.

use std::collections::HashSet;

use crate::models::{Organization, Principal, StoreUser};
use crate::services::store::IdentityStore;
use service_core::error::AppError;

/// The principal's organization for policy purposes: the first entry in store
/// enumeration order, `None` when the user belongs to no organization.
///
/// Enumeration order is platform-defined and not guaranteed stable across
/// calls if membership changes concurrently; callers get an arbitrary but
/// deterministic-per-call representative.
pub async fn first_organization_of(
    store: &dyn IdentityStore,
    realm: &str,
    user_id: &str,
) -> Result<Option<Organization>, AppError> {
    let organizations = store.organizations_by_member(realm, user_id).await?;
    Ok(organizations.into_iter().next())
}

/// Do the two users' organization sets intersect?
pub async fn share_organization(
    store: &dyn IdentityStore,
    realm: &str,
    actor_id: &str,
    target_id: &str,
) -> Result<bool, AppError> {
    let target_orgs = store.organizations_by_member(realm, target_id).await?;
    if target_orgs.is_empty() {
        return Ok(false);
    }

    let actor_orgs: HashSet<String> = store
        .organizations_by_member(realm, actor_id)
        .await?
        .into_iter()
        .map(|o| o.id)
        .collect();

    Ok(target_orgs.iter().any(|o| actor_orgs.contains(&o.id)))
}

/// Gate for one principal managing another: actor and target must share an
/// organization, unless the actor acts on themselves.
pub async fn require_shared_organization(
    store: &dyn IdentityStore,
    realm: &str,
    actor: &Principal,
    target: &StoreUser,
) -> Result<(), AppError> {
    if actor.id == target.id {
        return Ok(());
    }

    if share_organization(store, realm, &actor.id, &target.id).await? {
        Ok(())
    } else {
        tracing::warn!(
            actor_id = %actor.id,
            target_id = %target.id,
            "Organization sharing check failed"
        );
        Err(AppError::Forbidden(anyhow::anyhow!(
            "Users do not share an organization"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MockIdentityStore;

    const REALM: &str = "trackswiftly-demo";

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn user(id: &str) -> StoreUser {
        StoreUser {
            id: id.to_string(),
            username: id.to_string(),
            email: None,
            first_name: None,
            last_name: None,
            enabled: true,
        }
    }

    fn principal(id: &str) -> Principal {
        Principal {
            id: id.to_string(),
            username: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_membership_yields_none() {
        let store = MockIdentityStore::new();
        let resolved = first_organization_of(&store, REALM, "alice").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_single_membership_yields_that_organization() {
        let store = MockIdentityStore::new();
        store.add_organization(org("org-1", "Acme"), &["alice"]);

        let resolved = first_organization_of(&store, REALM, "alice").await.unwrap();
        assert_eq!(resolved, Some(org("org-1", "Acme")));
    }

    #[tokio::test]
    async fn test_multiple_memberships_yield_first_enumerated() {
        let store = MockIdentityStore::new();
        store.add_organization(org("org-1", "Acme"), &["alice"]);
        store.add_organization(org("org-2", "Globex"), &["alice"]);

        let resolved = first_organization_of(&store, REALM, "alice").await.unwrap();
        assert_eq!(resolved, Some(org("org-1", "Acme")));
    }

    #[tokio::test]
    async fn test_share_organization_disjoint_sets() {
        let store = MockIdentityStore::new();
        store.add_organization(org("org-1", "Acme"), &["alice"]);
        store.add_organization(org("org-2", "Globex"), &["bob"]);

        assert!(!share_organization(&store, REALM, "alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_share_organization_identical_sets() {
        let store = MockIdentityStore::new();
        store.add_organization(org("org-1", "Acme"), &["alice", "bob"]);

        assert!(share_organization(&store, REALM, "alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_share_organization_partial_overlap() {
        let store = MockIdentityStore::new();
        store.add_organization(org("org-1", "Acme"), &["alice"]);
        store.add_organization(org("org-2", "Globex"), &["alice", "bob"]);
        store.add_organization(org("org-3", "Initech"), &["bob"]);

        assert!(share_organization(&store, REALM, "alice", "bob").await.unwrap());
    }

    #[tokio::test]
    async fn test_require_shared_organization_forbidden_when_disjoint() {
        let store = MockIdentityStore::new();
        store.add_organization(org("org-1", "Acme"), &["alice"]);
        store.add_organization(org("org-2", "Globex"), &["bob"]);

        let err = require_shared_organization(&store, REALM, &principal("alice"), &user("bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_actor_may_act_on_self_without_organization() {
        let store = MockIdentityStore::new();
        require_shared_organization(&store, REALM, &principal("alice"), &user("alice"))
            .await
            .unwrap();
    }
}

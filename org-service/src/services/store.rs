//! Identity store access.
//!
//! The platform owns users, groups, roles and organizations; this service
//! reads them per request through the narrow [`IdentityStore`] interface and
//! never caches results across requests.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::config::IdentityStoreConfig;
use crate::models::{Group, Organization, RealmRole, Role, StoreUser};
use service_core::error::AppError;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, realm: &str, user_id: &str)
        -> Result<Option<StoreUser>, AppError>;

    async fn find_user_by_email(
        &self,
        realm: &str,
        email: &str,
    ) -> Result<Option<StoreUser>, AppError>;

    /// Resolve a realm role by its closed-set identifier. An absent role is a
    /// normal negative, not an error.
    async fn find_realm_role(&self, realm: &str, role: RealmRole)
        -> Result<Option<Role>, AppError>;

    async fn has_role(&self, realm: &str, user_id: &str, role: &Role) -> Result<bool, AppError>;

    /// Organizations containing the user, in platform enumeration order.
    async fn organizations_by_member(
        &self,
        realm: &str,
        user_id: &str,
    ) -> Result<Vec<Organization>, AppError>;

    async fn realm_groups(&self, realm: &str) -> Result<Vec<Group>, AppError>;

    async fn find_group_by_name(&self, realm: &str, name: &str)
        -> Result<Option<Group>, AppError>;

    /// Join is idempotent at the platform layer.
    async fn join_group(&self, realm: &str, user_id: &str, group: &Group)
        -> Result<(), AppError>;
}

/// REST client against the platform admin API.
#[derive(Clone)]
pub struct RestIdentityStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestIdentityStore {
    pub fn new(config: &IdentityStoreConfig) -> Result<Self, AppError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth_value = reqwest::header::HeaderValue::from_str(&format!(
            "Bearer {}",
            config.service_token
        ))
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid service token: {}", e)))?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build store client: {}", e))
            })?;

        tracing::info!(base_url = %config.base_url, "Identity store client configured");

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn realm_url(&self, realm: &str, path: &str) -> String {
        format!("{}/admin/realms/{}/{}", self.base_url, realm, path)
    }

    /// GET a JSON resource; 404 maps to `None`, transport and non-2xx
    /// responses map to `BadGateway`.
    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Identity store request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| AppError::BadGateway(format!("Identity store error: {}", e)))?;

        let value = response
            .json::<T>()
            .await
            .map_err(|e| AppError::BadGateway(format!("Identity store response invalid: {}", e)))?;

        Ok(Some(value))
    }

    async fn get_list<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, AppError> {
        Ok(self.get_optional::<Vec<T>>(url).await?.unwrap_or_default())
    }
}

#[async_trait]
impl IdentityStore for RestIdentityStore {
    async fn find_user_by_id(
        &self,
        realm: &str,
        user_id: &str,
    ) -> Result<Option<StoreUser>, AppError> {
        let url = self.realm_url(realm, &format!("users/{}", user_id));
        self.get_optional(&url).await
    }

    async fn find_user_by_email(
        &self,
        realm: &str,
        email: &str,
    ) -> Result<Option<StoreUser>, AppError> {
        let url = self.realm_url(realm, &format!("users?email={}&exact=true", email));
        let users: Vec<StoreUser> = self.get_list(&url).await?;
        Ok(users.into_iter().next())
    }

    async fn find_realm_role(
        &self,
        realm: &str,
        role: RealmRole,
    ) -> Result<Option<Role>, AppError> {
        let url = self.realm_url(realm, &format!("roles/{}", role.as_str()));
        self.get_optional(&url).await
    }

    async fn has_role(&self, realm: &str, user_id: &str, role: &Role) -> Result<bool, AppError> {
        let url = self.realm_url(realm, &format!("users/{}/role-mappings/realm", user_id));
        let assigned: Vec<Role> = self.get_list(&url).await?;
        Ok(assigned.iter().any(|r| r.name == role.name))
    }

    async fn organizations_by_member(
        &self,
        realm: &str,
        user_id: &str,
    ) -> Result<Vec<Organization>, AppError> {
        let url = self.realm_url(realm, &format!("users/{}/organizations", user_id));
        self.get_list(&url).await
    }

    async fn realm_groups(&self, realm: &str) -> Result<Vec<Group>, AppError> {
        let url = self.realm_url(realm, "groups");
        self.get_list(&url).await
    }

    async fn find_group_by_name(
        &self,
        realm: &str,
        name: &str,
    ) -> Result<Option<Group>, AppError> {
        let url = self.realm_url(realm, &format!("groups?search={}&exact=true", name));
        let groups: Vec<Group> = self.get_list(&url).await?;
        Ok(groups.into_iter().find(|g| g.name == name))
    }

    async fn join_group(
        &self,
        realm: &str,
        user_id: &str,
        group: &Group,
    ) -> Result<(), AppError> {
        let url = self.realm_url(realm, &format!("users/{}/groups/{}", user_id, group.id));
        self.client
            .put(&url)
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("Identity store request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::BadGateway(format!("Identity store error: {}", e)))?;

        tracing::info!(user_id = %user_id, group = %group.name, "User joined group");
        Ok(())
    }
}

/// In-memory store used by tests.
#[derive(Default)]
pub struct MockIdentityStore {
    inner: std::sync::Mutex<MockData>,
    group_lookups: std::sync::atomic::AtomicUsize,
}

#[derive(Default)]
struct MockData {
    users: Vec<StoreUser>,
    realm_roles: std::collections::HashMap<String, Vec<Role>>,
    user_roles: std::collections::HashMap<String, Vec<String>>,
    organizations: Vec<(Organization, Vec<String>)>,
    groups: std::collections::HashMap<String, Vec<Group>>,
    joined: Vec<(String, String)>,
}

impl MockIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: StoreUser) {
        self.inner.lock().unwrap().users.push(user);
    }

    pub fn add_realm_role(&self, realm: &str, role: RealmRole) {
        self.inner
            .lock()
            .unwrap()
            .realm_roles
            .entry(realm.to_string())
            .or_default()
            .push(Role {
                id: format!("role-{}", role.as_str().to_lowercase()),
                name: role.as_str().to_string(),
            });
    }

    pub fn grant_role(&self, user_id: &str, role: RealmRole) {
        self.inner
            .lock()
            .unwrap()
            .user_roles
            .entry(user_id.to_string())
            .or_default()
            .push(role.as_str().to_string());
    }

    pub fn add_organization(&self, organization: Organization, member_ids: &[&str]) {
        self.inner.lock().unwrap().organizations.push((
            organization,
            member_ids.iter().map(|s| s.to_string()).collect(),
        ));
    }

    pub fn add_group(&self, realm: &str, group: Group) {
        self.inner
            .lock()
            .unwrap()
            .groups
            .entry(realm.to_string())
            .or_default()
            .push(group);
    }

    /// Number of group lookups performed so far.
    pub fn group_lookup_count(&self) -> usize {
        self.group_lookups.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// `(user_id, group_id)` pairs recorded by `join_group`.
    pub fn joined_groups(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().joined.clone()
    }
}

#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn find_user_by_id(
        &self,
        _realm: &str,
        user_id: &str,
    ) -> Result<Option<StoreUser>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn find_user_by_email(
        &self,
        _realm: &str,
        email: &str,
    ) -> Result<Option<StoreUser>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_realm_role(
        &self,
        realm: &str,
        role: RealmRole,
    ) -> Result<Option<Role>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .realm_roles
            .get(realm)
            .and_then(|roles| roles.iter().find(|r| r.name == role.as_str()))
            .cloned())
    }

    async fn has_role(&self, _realm: &str, user_id: &str, role: &Role) -> Result<bool, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .user_roles
            .get(user_id)
            .map(|roles| roles.iter().any(|r| r == &role.name))
            .unwrap_or(false))
    }

    async fn organizations_by_member(
        &self,
        _realm: &str,
        user_id: &str,
    ) -> Result<Vec<Organization>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .organizations
            .iter()
            .filter(|(_, members)| members.iter().any(|m| m == user_id))
            .map(|(org, _)| org.clone())
            .collect())
    }

    async fn realm_groups(&self, realm: &str) -> Result<Vec<Group>, AppError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .groups
            .get(realm)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_group_by_name(
        &self,
        realm: &str,
        name: &str,
    ) -> Result<Option<Group>, AppError> {
        self.group_lookups
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self
            .inner
            .lock()
            .unwrap()
            .groups
            .get(realm)
            .and_then(|groups| groups.iter().find(|g| g.name == name))
            .cloned())
    }

    async fn join_group(
        &self,
        _realm: &str,
        user_id: &str,
        group: &Group,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let entry = (user_id.to_string(), group.id.clone());
        if !inner.joined.contains(&entry) {
            inner.joined.push(entry);
        }
        Ok(())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tessera_application::{GrantStore, RoleStore, UserStore};
use tessera_core::{AppError, AppResult};
use tessera_domain::{Grant, Role, RoleId, RoleStatus, User, UserId, UserStatus};
use tokio::sync::RwLock;

mod grants;
mod roles;
mod users;


/// In-memory user, role and grant store.
///
/// Each table sits behind its own lock. Operations touching more than one
/// table acquire them in the order users, roles, grants.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: RwLock<HashMap<UserId, User>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    grants: RwLock<Vec<Grant>>,
}

impl InMemoryIdentityStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryIdentityStore {
    async fn create(&self, user: User) -> AppResult<User> {
        self.create_user_impl(user).await
    }

    async fn get(&self, id: UserId) -> AppResult<User> {
        self.get_user_impl(id).await
    }

    async fn get_by_email_lookup(&self, lookup: &[u8]) -> AppResult<User> {
        self.find_user(|user| user.email.lookup == lookup).await
    }

    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        self.find_user(|user| user.username == username).await
    }

    async fn get_by_pin_lookup(&self, lookup: &[u8]) -> AppResult<User> {
        self.find_user(|user| user.pin.as_ref().is_some_and(|pin| pin.lookup == lookup))
            .await
    }

    async fn update(&self, user: User) -> AppResult<User> {
        self.update_user_impl(user).await
    }

    async fn delete(&self, id: UserId, actor: &str) -> AppResult<()> {
        self.delete_user_impl(id, actor).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        self.list_users_impl(None).await
    }

    async fn list_by_status(&self, status: UserStatus) -> AppResult<Vec<User>> {
        self.list_users_impl(Some(status)).await
    }
}

#[async_trait]
impl RoleStore for InMemoryIdentityStore {
    async fn create(&self, role: Role) -> AppResult<Role> {
        self.create_role_impl(role).await
    }

    async fn get(&self, id: RoleId) -> AppResult<Role> {
        self.roles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::RoleNotFound)
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Role> {
        self.roles
            .read()
            .await
            .values()
            .find(|role| role.name == name)
            .cloned()
            .ok_or(AppError::RoleNotFound)
    }

    async fn update(&self, role: Role) -> AppResult<Role> {
        self.update_role_impl(role).await
    }

    async fn delete(&self, id: RoleId) -> AppResult<()> {
        self.delete_role_impl(id).await
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        self.list_roles_impl(None).await
    }

    async fn list_by_status(&self, status: RoleStatus) -> AppResult<Vec<Role>> {
        self.list_roles_impl(Some(status)).await
    }
}

#[async_trait]
impl GrantStore for InMemoryIdentityStore {
    async fn create(&self, grant: Grant) -> AppResult<Grant> {
        self.create_grant_impl(grant).await
    }

    async fn delete(&self, username: &str, role_id: RoleId) -> AppResult<()> {
        self.delete_grant_impl(username, role_id).await
    }

    async fn get_user_grants(&self, username: &str) -> AppResult<Vec<Grant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .filter(|grant| grant.username == username)
            .cloned()
            .collect())
    }

    async fn get_role_grants(&self, role_id: RoleId) -> AppResult<Vec<Grant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn get_user_roles(&self, username: &str) -> AppResult<Vec<Role>> {
        self.get_user_roles_impl(username).await
    }

    async fn has_role(&self, username: &str, role_name: &str) -> AppResult<bool> {
        Ok(self
            .get_user_roles_impl(username)
            .await?
            .iter()
            .any(|role| role.name == role_name))
    }
}

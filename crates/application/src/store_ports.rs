//! Persistence ports for users, roles and grants.
//!
//! Lookups return the matching `*NotFound` error instead of `Option` so a
//! miss is reported the same way by every backend.

use async_trait::async_trait;

use tessera_core::AppResult;
use tessera_domain::{Grant, Role, RoleId, RoleStatus, User, UserId, UserStatus};

/// User persistence.
///
/// Unique on `username`, email lookup and PIN lookup when present, reported
/// as `UsernameExists`, `UserAlreadyExists` and `PinAlreadyInUse`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a prepared user record.
    async fn create(&self, user: User) -> AppResult<User>;

    /// Finds a user by id.
    async fn get(&self, id: UserId) -> AppResult<User>;

    /// Finds a user by the keyed hash of their normalized email.
    async fn get_by_email_lookup(&self, lookup: &[u8]) -> AppResult<User>;

    /// Finds a user by normalized username.
    async fn get_by_username(&self, username: &str) -> AppResult<User>;

    /// Finds a user by the keyed hash of their PIN.
    async fn get_by_pin_lookup(&self, lookup: &[u8]) -> AppResult<User>;

    /// Replaces a stored user record.
    async fn update(&self, user: User) -> AppResult<User>;

    /// Marks a user as deleted, keeping the row.
    async fn delete(&self, id: UserId, actor: &str) -> AppResult<()>;

    /// Lists all users.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Lists users in one status.
    async fn list_by_status(&self, status: UserStatus) -> AppResult<Vec<User>>;
}

/// Role persistence, unique on normalized name.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Inserts a prepared role.
    async fn create(&self, role: Role) -> AppResult<Role>;

    /// Finds a role by id.
    async fn get(&self, id: RoleId) -> AppResult<Role>;

    /// Finds a role by normalized name.
    async fn get_by_name(&self, name: &str) -> AppResult<Role>;

    /// Replaces a stored role.
    async fn update(&self, role: Role) -> AppResult<Role>;

    /// Removes a role together with every grant that references it.
    async fn delete(&self, id: RoleId) -> AppResult<()>;

    /// Lists all roles.
    async fn list(&self) -> AppResult<Vec<Role>>;

    /// Lists roles in one status.
    async fn list_by_status(&self, status: RoleStatus) -> AppResult<Vec<Role>>;
}

/// Grant persistence, unique on `(username, role_id)`.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Inserts a grant. Fails with `RoleNotFound` for unknown roles.
    async fn create(&self, grant: Grant) -> AppResult<Grant>;

    /// Removes the grant for `(username, role_id)`.
    async fn delete(&self, username: &str, role_id: RoleId) -> AppResult<()>;

    /// Lists grants held by a principal.
    async fn get_user_grants(&self, username: &str) -> AppResult<Vec<Grant>>;

    /// Lists grants referencing a role.
    async fn get_role_grants(&self, role_id: RoleId) -> AppResult<Vec<Grant>>;

    /// Lists roles granted to a principal, whatever their status.
    async fn get_user_roles(&self, username: &str) -> AppResult<Vec<Role>>;

    /// Returns whether a principal holds a role with the given name.
    async fn has_role(&self, username: &str, role_name: &str) -> AppResult<bool>;
}

//! Role, grant and permission-query service.
//!
//! Principals are usernames; every grant operation normalizes them first.
//! Inactive roles keep their grants but contribute no permissions.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use tessera_core::{AppError, AppResult};
use tessera_domain::validation::{normalize_role_name, normalize_username, validate_username};
use tessera_domain::{
    Grant, Role, RoleId, RoleStatus, dedup_permissions, has_all_permissions, has_any_permission,
    has_permission,
};

use crate::{AuthzCheckRequest, AuthzCheckResponse, GrantStore, RoleStore};

mod grants;
mod queries;
mod roles;

#[cfg(test)]
mod tests;

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Role name; normalized before use.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Permission strings attached to the role.
    pub permissions: Vec<String>,
}

/// Application service for roles, grants and permission checks.
#[derive(Clone)]
pub struct AuthzService {
    roles: Arc<dyn RoleStore>,
    grants: Arc<dyn GrantStore>,
}

impl AuthzService {
    /// Creates a new service from role and grant stores.
    #[must_use]
    pub fn new(roles: Arc<dyn RoleStore>, grants: Arc<dyn GrantStore>) -> Self {
        Self { roles, grants }
    }
}

fn principal(value: &str) -> AppResult<String> {
    let principal = normalize_username(value);
    validate_username(&principal)?;
    Ok(principal)
}

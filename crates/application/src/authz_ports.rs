//! Ports and wire types for remote permission checks.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tessera_core::AppResult;

/// Body of a `POST /authz/check` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzCheckRequest {
    /// Principal being checked.
    pub user_id: String,
    /// Required permission, or a bare action when `resource` is set.
    pub permission: String,
    /// Optional resource qualifier; empty when unused.
    #[serde(default)]
    pub resource: String,
}

impl AuthzCheckRequest {
    /// Creates a check request.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        permission: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            permission: permission.into(),
            resource: resource.into(),
        }
    }

    /// Returns the permission the request resolves to.
    ///
    /// A bare action such as `read` with resource `content` becomes
    /// `content:read`; qualified permissions are used as-is.
    #[must_use]
    pub fn required_permission(&self) -> String {
        if !self.resource.is_empty() && !self.permission.contains(':') {
            format!("{}:{}", self.resource, self.permission)
        } else {
            self.permission.clone()
        }
    }
}

/// Body of a `POST /authz/check` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthzCheckResponse {
    /// Whether the principal holds the permission.
    pub allowed: bool,
}

/// TTL cache for permission decisions.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the cached decision when a live entry exists.
    async fn get(&self, key: &str) -> AppResult<Option<bool>>;

    /// Stores a decision for `ttl`. A zero ttl stores nothing.
    async fn set(&self, key: &str, allowed: bool, ttl: Duration) -> AppResult<()>;

    /// Drops expired entries and returns how many were removed.
    async fn purge_expired(&self) -> AppResult<usize>;
}

/// Remote authorization endpoint.
#[async_trait]
pub trait AuthzTransport: Send + Sync {
    /// Asks the remote service for a decision.
    async fn check(&self, request: &AuthzCheckRequest) -> AppResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_action_is_qualified_by_resource() {
        let request = AuthzCheckRequest::new("alice", "read", "content");
        assert_eq!(request.required_permission(), "content:read");
    }

    #[test]
    fn qualified_permission_ignores_resource() {
        let request = AuthzCheckRequest::new("alice", "users:read", "content");
        assert_eq!(request.required_permission(), "users:read");

        let request = AuthzCheckRequest::new("alice", "admin", "");
        assert_eq!(request.required_permission(), "admin");
    }

    #[test]
    fn wire_shape_uses_snake_case_fields() -> Result<(), serde_json::Error> {
        let body = serde_json::to_value(AuthzCheckRequest::new("alice", "read", "content"))?;
        assert_eq!(body["user_id"], "alice");
        assert_eq!(body["permission"], "read");
        assert_eq!(body["resource"], "content");

        let response: AuthzCheckResponse = serde_json::from_str(r#"{"allowed":true}"#)?;
        assert!(response.allowed);
        Ok(())
    }
}

//! Role assignments keyed by principal username.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::RoleId;
use crate::validation::normalize_username;

/// Unique identifier for a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantId(Uuid);

impl GrantId {
    /// Creates a new random grant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a grant identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GrantId {
    fn default() -> Self {
        Self::new()
    }
}

/// Assignment of one role to one principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Identifier.
    pub id: GrantId,
    /// Normalized principal username.
    pub username: String,
    /// Granted role.
    pub role_id: RoleId,
    /// Assignment time.
    pub assigned_at: DateTime<Utc>,
    /// Assigning actor.
    pub assigned_by: String,
}

impl Grant {
    /// Creates a grant stamped with `actor` and `now`.
    #[must_use]
    pub fn new(username: &str, role_id: RoleId, actor: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: GrantId::new(),
            username: normalize_username(username),
            role_id,
            assigned_at: now,
            assigned_by: actor.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_is_normalized() {
        let grant = Grant::new(" Alice ", RoleId::new(), "admin", Utc::now());
        assert_eq!(grant.username, "alice");
        assert_eq!(grant.assigned_by, "admin");
    }
}

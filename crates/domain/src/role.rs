//! Roles: named, deduplicated permission bundles.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult};
use uuid::Uuid;

use crate::permission::{Permission, dedup_permissions};
use crate::validation::{normalize_role_name, validate_role_name};

/// Unique identifier for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the nil identifier.
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns whether this is the nil identifier.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Whether a role currently contributes permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleStatus {
    /// Permissions apply to grantees.
    Active,
    /// Grants are kept but contribute nothing.
    Inactive,
}

impl RoleStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parses a storage string into a role status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AppError::Internal(format!("unknown role status '{value}'"))),
        }
    }
}

impl FromStr for RoleStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Named permission bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Identifier, assigned on create when nil.
    pub id: RoleId,
    /// Normalized unique name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Permission strings, deduplicated in first-seen order.
    pub permissions: Vec<String>,
    /// Role status.
    pub status: RoleStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creating actor.
    pub created_by: String,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Last updating actor.
    pub updated_by: String,
}

impl Role {
    /// Creates an active role with a nil id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: Vec<String>,
    ) -> Self {
        Self {
            id: RoleId::nil(),
            name: name.into(),
            description: description.into(),
            permissions,
            status: RoleStatus::Active,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            created_by: String::new(),
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_by: String::new(),
        }
    }

    /// Checks the name and every permission string.
    pub fn validate(&self) -> AppResult<()> {
        validate_role_name(&self.name)?;
        for permission in &self.permissions {
            Permission::parse(permission.as_str())?;
        }

        Ok(())
    }

    /// Prepares a new record for insertion.
    pub fn before_create(&mut self, actor: &str, now: DateTime<Utc>) {
        if self.id.is_nil() {
            self.id = RoleId::new();
        }
        self.normalize();
        self.created_at = now;
        self.created_by = actor.to_owned();
        self.updated_at = now;
        self.updated_by = actor.to_owned();
    }

    /// Prepares an existing record for saving.
    pub fn before_update(&mut self, actor: &str, now: DateTime<Utc>) {
        self.normalize();
        self.updated_at = now;
        self.updated_by = actor.to_owned();
    }

    /// Returns whether the role contributes permissions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RoleStatus::Active
    }

    fn normalize(&mut self) {
        self.name = normalize_role_name(&self.name);
        self.description = self.description.trim().to_owned();
        let permissions = std::mem::take(&mut self.permissions);
        self.permissions = dedup_permissions(
            permissions
                .into_iter()
                .map(|permission| permission.trim().to_owned()),
        );
    }
}

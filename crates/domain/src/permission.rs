//! Wildcard-aware `resource:action` permission strings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult};

/// Segment separator inside a permission string.
pub const SEGMENT_SEPARATOR: char = ':';

/// Segment or whole-string wildcard.
pub const WILDCARD: &str = "*";

/// Validated permission string such as `content:write` or `users:*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    /// Parses a permission, rejecting empty strings, empty segments and
    /// whitespace.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.is_empty() {
            return Err(AppError::InvalidPermission(
                "permission must not be empty".to_owned(),
            ));
        }

        if value.chars().any(char::is_whitespace) {
            return Err(AppError::InvalidPermission(format!(
                "permission '{value}' must not contain whitespace"
            )));
        }

        if value.split(SEGMENT_SEPARATOR).any(str::is_empty) {
            return Err(AppError::InvalidPermission(format!(
                "permission '{value}' contains an empty segment"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the permission string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this grant satisfies `required`.
    #[must_use]
    pub fn matches(&self, required: &str) -> bool {
        permission_matches(&self.0, required)
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.0
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Returns whether `granted` satisfies `required`.
///
/// `*` matches everything. Otherwise both strings need the same number of
/// segments and every granted segment is either `*` or equal to the required
/// one.
#[must_use]
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == WILDCARD || granted == required {
        return true;
    }

    let mut granted_segments = granted.split(SEGMENT_SEPARATOR);
    let mut required_segments = required.split(SEGMENT_SEPARATOR);

    loop {
        match (granted_segments.next(), required_segments.next()) {
            (None, None) => return true,
            (Some(granted), Some(required)) if granted == WILDCARD || granted == required => {}
            _ => return false,
        }
    }
}

/// Returns whether any of `permissions` satisfies `required`.
#[must_use]
pub fn has_permission<S: AsRef<str>>(permissions: &[S], required: &str) -> bool {
    permissions
        .iter()
        .any(|granted| permission_matches(granted.as_ref(), required))
}

/// Returns whether at least one of `required` is satisfied.
///
/// An empty `required` list is never satisfied.
#[must_use]
pub fn has_any_permission<S: AsRef<str>, R: AsRef<str>>(permissions: &[S], required: &[R]) -> bool {
    required
        .iter()
        .any(|needed| has_permission(permissions, needed.as_ref()))
}

/// Returns whether every entry of `required` is satisfied.
///
/// Vacuously true for an empty `required` list.
#[must_use]
pub fn has_all_permissions<S: AsRef<str>, R: AsRef<str>>(
    permissions: &[S],
    required: &[R],
) -> bool {
    required
        .iter()
        .all(|needed| has_permission(permissions, needed.as_ref()))
}

/// Removes repeated permissions, keeping first occurrences in order.
#[must_use]
pub fn dedup_permissions<I>(permissions: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    permissions
        .into_iter()
        .filter(|permission| seen.insert(permission.clone()))
        .collect()
}

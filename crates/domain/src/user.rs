//! User aggregate and its credential bundles.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult};
use uuid::Uuid;

use crate::validation::{normalize_display_name, normalize_username};

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the nil identifier, replaced on create.
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Lifecycle state of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// May sign in.
    Active,
    /// Temporarily blocked by an operator.
    Suspended,
    /// Created but not yet enabled.
    Pending,
    /// Soft-deleted; the row is kept.
    Deleted,
}

impl UserStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Pending => "pending",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a storage string into a status.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "pending" => Ok(Self::Pending),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::Internal(format!("unknown user status '{value}'"))),
        }
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// AEAD-sealed value plus the keyed hash used to find it.
///
/// The lookup must always be derived from the plaintext that is sealed in
/// the same bundle.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedSecret {
    /// Ciphertext without tag.
    pub ciphertext: Vec<u8>,
    /// 12-byte nonce.
    pub iv: Vec<u8>,
    /// 16-byte authentication tag.
    pub tag: Vec<u8>,
    /// HMAC-SHA-256 of the normalized plaintext.
    pub lookup: Vec<u8>,
}

impl std::fmt::Debug for SealedSecret {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SealedSecret")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

/// Argon2id-derived password hash and its salt.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    /// 32-byte derived key.
    pub hash: Vec<u8>,
    /// 32-byte random salt.
    pub salt: Vec<u8>,
}

impl std::fmt::Debug for PasswordCredential {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("PasswordCredential(..)")
    }
}

/// Persistent identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier, assigned on create when nil.
    pub id: UserId,
    /// Normalized unique username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Encrypted email with its lookup hash.
    pub email: SealedSecret,
    /// Password verifier.
    pub password: PasswordCredential,
    /// Optional encrypted PIN; either fully present or absent.
    pub pin: Option<SealedSecret>,
    /// Account status.
    pub status: UserStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Creating actor.
    pub created_by: String,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Last updating actor.
    pub updated_by: String,
}

impl User {
    /// Creates an active user with a nil id and unset audit fields.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: SealedSecret,
        password: PasswordCredential,
    ) -> Self {
        Self {
            id: UserId::nil(),
            username: username.into(),
            name: name.into(),
            email,
            password,
            pin: None,
            status: UserStatus::Active,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            created_by: String::new(),
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_by: String::new(),
        }
    }

    /// Prepares a new record for insertion.
    pub fn before_create(&mut self, actor: &str, now: DateTime<Utc>) {
        if self.id.is_nil() {
            self.id = UserId::new();
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

    /// Returns whether the account may sign in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    fn normalize(&mut self) {
        self.username = normalize_username(&self.username);
        self.name = normalize_display_name(&self.name);
    }
}

//! Shared primitives for all Rust crates in Tessera.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across Tessera crates.
pub type AppResult<T> = Result<T, AppError>;

/// Closed set of errors surfaced by stores and services.
///
/// Every variant maps onto exactly one [`ErrorKind`], which callers compare
/// instead of matching on rendered messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// No user matched the lookup.
    #[error("user not found")]
    UserNotFound,

    /// No role matched the lookup.
    #[error("role not found")]
    RoleNotFound,

    /// No grant matched the principal and role.
    #[error("grant not found")]
    GrantNotFound,

    /// Another user already owns the email address.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Another user already owns the username.
    #[error("username already exists")]
    UsernameExists,

    /// Another role already owns the name.
    #[error("role already exists")]
    RoleAlreadyExists,

    /// The principal already holds the role.
    #[error("grant already exists")]
    GrantAlreadyExists,

    /// Another user already owns the PIN lookup hash.
    #[error("pin already in use")]
    PinAlreadyInUse,

    /// Sign-in failed. Unknown account, inactive account and wrong secret
    /// all collapse into this variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but is not active.
    #[error("account is not active")]
    InactiveAccount,

    /// Email failed syntactic validation.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Password failed the strength policy.
    #[error("invalid password: {0}")]
    InvalidPassword(String),

    /// Username failed syntactic validation.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Role name failed syntactic validation.
    #[error("invalid role name: {0}")]
    InvalidRoleName(String),

    /// Display name failed syntactic validation.
    #[error("invalid display name: {0}")]
    InvalidDisplayName(String),

    /// PIN failed syntactic validation.
    #[error("invalid pin: {0}")]
    InvalidPin(String),

    /// Permission string is malformed.
    #[error("invalid permission: {0}")]
    InvalidPermission(String),

    /// The caller lacks a required permission.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Sealing a confidential value failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Opening a confidential value failed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Password key derivation failed.
    #[error("password hashing failed: {0}")]
    PasswordHashFailed(String),

    /// Signing a session token failed.
    #[error("token generation failed: {0}")]
    TokenGenerationFailed(String),

    /// Token signature, format or key check failed.
    #[error("token verification failed: {0}")]
    TokenVerificationFailed(String),

    /// Token was valid but its expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// Bootstrap was requested while disabled by configuration.
    #[error("bootstrap is disabled")]
    BootstrapDisabled,

    /// Configuration value is missing or out of range.
    #[error("configuration error: {0}")]
    Config(String),

    /// Store backend failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Remote authorization call failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Identity of an [`AppError`] without its detail payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AppError::UserNotFound`].
    UserNotFound,
    /// See [`AppError::RoleNotFound`].
    RoleNotFound,
    /// See [`AppError::GrantNotFound`].
    GrantNotFound,
    /// See [`AppError::UserAlreadyExists`].
    UserAlreadyExists,
    /// See [`AppError::UsernameExists`].
    UsernameExists,
    /// See [`AppError::RoleAlreadyExists`].
    RoleAlreadyExists,
    /// See [`AppError::GrantAlreadyExists`].
    GrantAlreadyExists,
    /// See [`AppError::PinAlreadyInUse`].
    PinAlreadyInUse,
    /// See [`AppError::InvalidCredentials`].
    InvalidCredentials,
    /// See [`AppError::InactiveAccount`].
    InactiveAccount,
    /// See [`AppError::InvalidEmail`].
    InvalidEmail,
    /// See [`AppError::InvalidPassword`].
    InvalidPassword,
    /// See [`AppError::InvalidUsername`].
    InvalidUsername,
    /// See [`AppError::InvalidRoleName`].
    InvalidRoleName,
    /// See [`AppError::InvalidDisplayName`].
    InvalidDisplayName,
    /// See [`AppError::InvalidPin`].
    InvalidPin,
    /// See [`AppError::InvalidPermission`].
    InvalidPermission,
    /// See [`AppError::PermissionDenied`].
    PermissionDenied,
    /// See [`AppError::EncryptionFailed`].
    EncryptionFailed,
    /// See [`AppError::DecryptionFailed`].
    DecryptionFailed,
    /// See [`AppError::PasswordHashFailed`].
    PasswordHashFailed,
    /// See [`AppError::TokenGenerationFailed`].
    TokenGenerationFailed,
    /// See [`AppError::TokenVerificationFailed`].
    TokenVerificationFailed,
    /// See [`AppError::TokenExpired`].
    TokenExpired,
    /// See [`AppError::BootstrapDisabled`].
    BootstrapDisabled,
    /// See [`AppError::Config`].
    Config,
    /// See [`AppError::Storage`].
    Storage,
    /// See [`AppError::Transport`].
    Transport,
    /// See [`AppError::Internal`].
    Internal,
}

impl ErrorKind {
    /// Returns whether the kind reports a uniqueness violation.
    #[must_use]
    pub fn is_conflict(self) -> bool {
        matches!(
            self,
            Self::UserAlreadyExists
                | Self::UsernameExists
                | Self::RoleAlreadyExists
                | Self::GrantAlreadyExists
                | Self::PinAlreadyInUse
        )
    }

    /// Returns whether the kind reports a lookup miss.
    #[must_use]
    pub fn is_not_found(self) -> bool {
        matches!(
            self,
            Self::UserNotFound | Self::RoleNotFound | Self::GrantNotFound
        )
    }

    /// Returns whether the kind reports rejected caller input.
    #[must_use]
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::InvalidEmail
                | Self::InvalidPassword
                | Self::InvalidUsername
                | Self::InvalidRoleName
                | Self::InvalidDisplayName
                | Self::InvalidPin
                | Self::InvalidPermission
        )
    }

    /// Returns whether the kind stems from the crypto or token pipeline.
    ///
    /// These fail the request but never the process.
    #[must_use]
    pub fn is_crypto(self) -> bool {
        matches!(
            self,
            Self::EncryptionFailed
                | Self::DecryptionFailed
                | Self::PasswordHashFailed
                | Self::TokenGenerationFailed
                | Self::TokenVerificationFailed
                | Self::TokenExpired
        )
    }
}

impl AppError {
    /// Returns the identity of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound => ErrorKind::UserNotFound,
            Self::RoleNotFound => ErrorKind::RoleNotFound,
            Self::GrantNotFound => ErrorKind::GrantNotFound,
            Self::UserAlreadyExists => ErrorKind::UserAlreadyExists,
            Self::UsernameExists => ErrorKind::UsernameExists,
            Self::RoleAlreadyExists => ErrorKind::RoleAlreadyExists,
            Self::GrantAlreadyExists => ErrorKind::GrantAlreadyExists,
            Self::PinAlreadyInUse => ErrorKind::PinAlreadyInUse,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::InactiveAccount => ErrorKind::InactiveAccount,
            Self::InvalidEmail(_) => ErrorKind::InvalidEmail,
            Self::InvalidPassword(_) => ErrorKind::InvalidPassword,
            Self::InvalidUsername(_) => ErrorKind::InvalidUsername,
            Self::InvalidRoleName(_) => ErrorKind::InvalidRoleName,
            Self::InvalidDisplayName(_) => ErrorKind::InvalidDisplayName,
            Self::InvalidPin(_) => ErrorKind::InvalidPin,
            Self::InvalidPermission(_) => ErrorKind::InvalidPermission,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::EncryptionFailed(_) => ErrorKind::EncryptionFailed,
            Self::DecryptionFailed(_) => ErrorKind::DecryptionFailed,
            Self::PasswordHashFailed(_) => ErrorKind::PasswordHashFailed,
            Self::TokenGenerationFailed(_) => ErrorKind::TokenGenerationFailed,
            Self::TokenVerificationFailed(_) => ErrorKind::TokenVerificationFailed,
            Self::TokenExpired => ErrorKind::TokenExpired,
            Self::BootstrapDisabled => ErrorKind::BootstrapDisabled,
            Self::Config(_) => ErrorKind::Config,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, ErrorKind};

    #[test]
    fn kinds_ignore_detail_payload() {
        let left = AppError::InvalidEmail("missing '@'".to_owned());
        let right = AppError::InvalidEmail("domain has no dot".to_owned());
        assert_ne!(left, right);
        assert_eq!(left.kind(), right.kind());
        assert_eq!(left.kind(), ErrorKind::InvalidEmail);
    }

    #[test]
    fn conflict_kinds_are_classified() {
        assert!(AppError::UserAlreadyExists.kind().is_conflict());
        assert!(AppError::GrantAlreadyExists.kind().is_conflict());
        assert!(!AppError::UserNotFound.kind().is_conflict());
        assert!(AppError::GrantNotFound.kind().is_not_found());
    }

    #[test]
    fn validation_and_crypto_kinds_are_disjoint() {
        let validation = AppError::InvalidPin("too short".to_owned()).kind();
        let crypto = AppError::DecryptionFailed("tag mismatch".to_owned()).kind();
        assert!(validation.is_validation() && !validation.is_crypto());
        assert!(crypto.is_crypto() && !crypto.is_validation());
    }
}

//! Authentication service: sign-up, sign-in, PINs, bootstrap and the user
//! lifecycle.
//!
//! Sign-in failures are reported as `InvalidCredentials` whatever the cause,
//! and a password derivation runs even when no account matches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use tessera_core::{AppError, AppResult};
use tessera_crypto::TokenClaims;
use tessera_domain::validation::{
    normalize_display_name, normalize_email, normalize_username, validate_display_name,
    validate_email, validate_password, validate_pin, validate_username,
};
use tessera_domain::{PasswordCredential, SealedSecret, User, UserId, UserStatus};

use crate::{AuthConfig, UserStore};

mod bootstrap;
mod credentials;
mod lifecycle;
mod login;
mod pin;
mod registration;
mod secrets;


/// Actor recorded for changes made by the service itself.
pub const SYSTEM_ACTOR: &str = "system";

/// Input for [`AuthnService::sign_up`].
#[derive(Clone)]
pub struct SignUpInput {
    /// Email address; normalized before use.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Username; normalized before use.
    pub username: String,
    /// Display name; trimmed before use.
    pub display_name: String,
}

impl std::fmt::Debug for SignUpInput {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SignUpInput")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Successful password sign-in.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// Signed-in user.
    pub user: User,
    /// Signed session token.
    pub token: String,
    /// Session id carried in the token.
    pub session_id: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Result of [`AuthnService::bootstrap`].
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    /// The well-known superadmin.
    pub user: User,
    /// Generated password, present only for the call that created the user.
    pub password: Option<String>,
}

/// Application service for identity and credentials.
#[derive(Clone)]
pub struct AuthnService {
    users: Arc<dyn UserStore>,
    config: Arc<AuthConfig>,
}

impl AuthnService {
    /// Creates a new service over a user store.
    ///
    /// Fails with `Config` when `config` does not pass
    /// [`AuthConfig::validate`].
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            users,
            config: Arc::new(config),
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Maps a lookup to `Ok(())` when nothing was found and to `conflict` when
/// a record exists.
fn ensure_absent<T>(lookup: AppResult<T>, conflict: AppError) -> AppResult<()> {
    match lookup {
        Ok(_) => Err(conflict),
        Err(AppError::UserNotFound) => Ok(()),
        Err(error) => Err(error),
    }
}

/// Maps a lookup to `Ok(None)` when nothing was found.
fn found<T>(lookup: AppResult<T>) -> AppResult<Option<T>> {
    match lookup {
        Ok(value) => Ok(Some(value)),
        Err(AppError::UserNotFound) => Ok(None),
        Err(error) => Err(error),
    }
}

//! Typed options shared by the identity services.

use std::time::Duration;

use tessera_core::{AppError, AppResult};
use tessera_crypto::{KdfParams, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, public_key_from_private};
use tessera_domain::validation::{
    PASSWORD_MAX_LENGTH, PIN_MAX_LENGTH, PIN_MIN_LENGTH, normalize_display_name, normalize_email,
    normalize_username, validate_display_name, validate_email, validate_username,
};

/// Default session token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default token audience.
pub const DEFAULT_TOKEN_AUDIENCE: &str = "tessera";

/// Default generated password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 24;

/// Shortest generated password accepted by configuration.
pub const MIN_GENERATED_PASSWORD_LENGTH: usize = 16;

/// Default generated PIN length.
pub const DEFAULT_PIN_LENGTH: usize = 6;

/// Default well-known superadmin email.
pub const DEFAULT_SUPERADMIN_EMAIL: &str = "superadmin@tessera.local";

/// Default well-known superadmin username.
pub const DEFAULT_SUPERADMIN_USERNAME: &str = "superadmin";

/// Default well-known superadmin display name.
pub const DEFAULT_SUPERADMIN_NAME: &str = "Super Admin";

/// Keys and policies for the identity services.
#[derive(Clone)]
pub struct AuthConfig {
    /// AES-256-GCM key for emails and PINs.
    pub encryption_key: [u8; 32],
    /// HMAC key for lookup hashes.
    pub signing_key: [u8; 32],
    /// Ed25519 secret key for session tokens.
    pub token_private_key: Option<[u8; PRIVATE_KEY_LENGTH]>,
    /// Session token lifetime.
    pub token_ttl: Duration,
    /// Audience claim of issued tokens.
    pub token_audience: String,
    /// Length of generated passwords.
    pub password_length: usize,
    /// Length of generated PINs.
    pub pin_length: usize,
    /// Whether `bootstrap` may create the superadmin.
    pub bootstrap_enabled: bool,
    /// Well-known superadmin email.
    pub superadmin_email: String,
    /// Well-known superadmin username.
    pub superadmin_username: String,
    /// Well-known superadmin display name.
    pub superadmin_name: String,
    /// Argon2id cost parameters.
    pub kdf: KdfParams,
}

impl AuthConfig {
    /// Creates a configuration with default policies around the two
    /// symmetric keys.
    #[must_use]
    pub fn new(encryption_key: [u8; 32], signing_key: [u8; 32]) -> Self {
        Self {
            encryption_key,
            signing_key,
            token_private_key: None,
            token_ttl: DEFAULT_TOKEN_TTL,
            token_audience: DEFAULT_TOKEN_AUDIENCE.to_owned(),
            password_length: DEFAULT_PASSWORD_LENGTH,
            pin_length: DEFAULT_PIN_LENGTH,
            bootstrap_enabled: true,
            superadmin_email: DEFAULT_SUPERADMIN_EMAIL.to_owned(),
            superadmin_username: DEFAULT_SUPERADMIN_USERNAME.to_owned(),
            superadmin_name: DEFAULT_SUPERADMIN_NAME.to_owned(),
            kdf: KdfParams::default(),
        }
    }

    /// Sets the token signing key.
    #[must_use]
    pub fn with_token_private_key(mut self, key: [u8; PRIVATE_KEY_LENGTH]) -> Self {
        self.token_private_key = Some(key);
        self
    }

    /// Sets the token lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Sets the token audience.
    #[must_use]
    pub fn with_token_audience(mut self, audience: impl Into<String>) -> Self {
        self.token_audience = audience.into();
        self
    }

    /// Sets the generated password length.
    #[must_use]
    pub fn with_password_length(mut self, length: usize) -> Self {
        self.password_length = length;
        self
    }

    /// Sets the generated PIN length.
    #[must_use]
    pub fn with_pin_length(mut self, length: usize) -> Self {
        self.pin_length = length;
        self
    }

    /// Enables or disables superadmin creation.
    #[must_use]
    pub fn with_bootstrap_enabled(mut self, enabled: bool) -> Self {
        self.bootstrap_enabled = enabled;
        self
    }

    /// Overrides the well-known superadmin identity.
    #[must_use]
    pub fn with_superadmin(
        mut self,
        email: impl Into<String>,
        username: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.superadmin_email = email.into();
        self.superadmin_username = username.into();
        self.superadmin_name = name.into();
        self
    }

    /// Sets the Argon2id parameters.
    #[must_use]
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Rejects out-of-range policies and unusable keys.
    pub fn validate(&self) -> AppResult<()> {
        if self.token_ttl.is_zero() {
            return Err(config_error("token ttl must be positive"));
        }

        if self.token_audience.trim().is_empty() {
            return Err(config_error("token audience must not be empty"));
        }

        if !(MIN_GENERATED_PASSWORD_LENGTH..=PASSWORD_MAX_LENGTH).contains(&self.password_length) {
            return Err(AppError::Config(format!(
                "password length must be between {MIN_GENERATED_PASSWORD_LENGTH} and {PASSWORD_MAX_LENGTH}"
            )));
        }

        if !(PIN_MIN_LENGTH..=PIN_MAX_LENGTH).contains(&self.pin_length) {
            return Err(AppError::Config(format!(
                "pin length must be between {PIN_MIN_LENGTH} and {PIN_MAX_LENGTH}"
            )));
        }

        if self.kdf.memory_kib == 0 || self.kdf.iterations == 0 || self.kdf.parallelism == 0 {
            return Err(config_error("kdf parameters must be positive"));
        }

        validate_email(&normalize_email(&self.superadmin_email))
            .map_err(|error| AppError::Config(format!("superadmin email: {error}")))?;
        validate_username(&normalize_username(&self.superadmin_username))
            .map_err(|error| AppError::Config(format!("superadmin username: {error}")))?;
        validate_display_name(&normalize_display_name(&self.superadmin_name))
            .map_err(|error| AppError::Config(format!("superadmin name: {error}")))?;

        if let Some(key) = self.token_private_key.as_ref() {
            public_key_from_private(key)
                .map_err(|error| AppError::Config(format!("token private key: {error}")))?;
        }

        Ok(())
    }

    /// Returns the verifying key matching the configured signing key.
    pub fn token_public_key(&self) -> AppResult<[u8; PUBLIC_KEY_LENGTH]> {
        let key = self
            .token_private_key
            .as_ref()
            .ok_or_else(|| config_error("token private key is not configured"))?;

        public_key_from_private(key)
            .map_err(|error| AppError::Config(format!("token private key: {error}")))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthConfig")
            .field("encryption_key", &"<redacted>")
            .field("signing_key", &"<redacted>")
            .field(
                "token_private_key",
                &self.token_private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("token_ttl", &self.token_ttl)
            .field("token_audience", &self.token_audience)
            .field("password_length", &self.password_length)
            .field("pin_length", &self.pin_length)
            .field("bootstrap_enabled", &self.bootstrap_enabled)
            .field("superadmin_email", &self.superadmin_email)
            .field("superadmin_username", &self.superadmin_username)
            .field("superadmin_name", &self.superadmin_name)
            .field("kdf", &self.kdf)
            .finish()
    }
}

fn config_error(message: &str) -> AppError {
    AppError::Config(message.to_owned())
}

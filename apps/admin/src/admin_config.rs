use std::env;
use std::time::Duration;

use tessera_application::{
    AuthConfig, DEFAULT_PASSWORD_LENGTH, DEFAULT_PIN_LENGTH, DEFAULT_SUPERADMIN_EMAIL,
    DEFAULT_SUPERADMIN_NAME, DEFAULT_SUPERADMIN_USERNAME, DEFAULT_TOKEN_AUDIENCE,
    DEFAULT_TOKEN_TTL,
};
use tessera_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Migrate,
    Bootstrap,
    Seed,
}

impl AdminCommand {
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            Some("migrate") => Ok(Self::Migrate),
            Some("bootstrap") => Ok(Self::Bootstrap),
            Some("seed") => Ok(Self::Seed),
            Some(other) => Err(AppError::Config(format!(
                "unknown command '{other}', expected one of: migrate, bootstrap, seed"
            ))),
            None => Err(AppError::Config(
                "missing command, expected one of: migrate, bootstrap, seed".to_owned(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub command: AdminCommand,
    pub database_url: String,
    pub auth: Option<AuthConfig>,
}

impl AdminConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = AdminCommand::parse(env::args().nth(1).as_deref())?;
        Self::from_lookup(command, |name| env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup.
    ///
    /// Key material is only required by commands that touch users.
    pub fn from_lookup(
        command: AdminCommand,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let database_url = required_non_empty(&lookup, "DATABASE_URL")?;

        let auth = match command {
            AdminCommand::Migrate => None,
            AdminCommand::Bootstrap | AdminCommand::Seed => Some(auth_config(&lookup)?),
        };

        Ok(Self {
            command,
            database_url,
            auth,
        })
    }
}

fn auth_config(lookup: &impl Fn(&str) -> Option<String>) -> Result<AuthConfig, AppError> {
    let encryption_key: [u8; 32] = hex_key(lookup, "TESSERA_ENCRYPTION_KEY")?;
    let signing_key: [u8; 32] = hex_key(lookup, "TESSERA_SIGNING_KEY")?;

    let token_ttl = optional_parsed::<u64>(lookup, "TESSERA_TOKEN_TTL_SECONDS")?
        .map_or(DEFAULT_TOKEN_TTL, Duration::from_secs);
    let token_audience = optional_non_empty(lookup, "TESSERA_TOKEN_AUDIENCE")
        .unwrap_or_else(|| DEFAULT_TOKEN_AUDIENCE.to_owned());
    let password_length = optional_parsed::<usize>(lookup, "TESSERA_PASSWORD_LENGTH")?
        .unwrap_or(DEFAULT_PASSWORD_LENGTH);
    let pin_length =
        optional_parsed::<usize>(lookup, "TESSERA_PIN_LENGTH")?.unwrap_or(DEFAULT_PIN_LENGTH);
    let bootstrap_enabled = optional_non_empty(lookup, "TESSERA_BOOTSTRAP_ENABLED")
        .is_none_or(|value| value.eq_ignore_ascii_case("true"));
    let superadmin_email = optional_non_empty(lookup, "TESSERA_SUPERADMIN_EMAIL")
        .unwrap_or_else(|| DEFAULT_SUPERADMIN_EMAIL.to_owned());

    let mut config = AuthConfig::new(encryption_key, signing_key)
        .with_token_ttl(token_ttl)
        .with_token_audience(token_audience)
        .with_password_length(password_length)
        .with_pin_length(pin_length)
        .with_bootstrap_enabled(bootstrap_enabled)
        .with_superadmin(
            superadmin_email,
            DEFAULT_SUPERADMIN_USERNAME,
            DEFAULT_SUPERADMIN_NAME,
        );

    if optional_non_empty(lookup, "TESSERA_TOKEN_PRIVATE_KEY").is_some() {
        config = config.with_token_private_key(hex_key(lookup, "TESSERA_TOKEN_PRIVATE_KEY")?);
    }

    config.validate()?;
    Ok(config)
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn hex_key<const N: usize>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<[u8; N], AppError> {
    let value = required_non_empty(lookup, name)?;
    let bytes = hex::decode(value.trim())
        .map_err(|error| AppError::Config(format!("{name} must be hex encoded: {error}")))?;

    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        AppError::Config(format!(
            "{name} must decode to {N} bytes, got {}",
            bytes.len()
        ))
    })
}

fn optional_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_non_empty(lookup, name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Config(format!("invalid {name}: {error}")))
        })
        .transpose()
}

fn optional_non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    optional_non_empty(lookup, name).ok_or_else(|| AppError::Config(format!("{name} is required")))
}

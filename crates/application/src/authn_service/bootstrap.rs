use tessera_crypto::generate_password;

use super::*;

impl AuthnService {
    /// Ensures the well-known superadmin exists.
    ///
    /// Only the call that actually inserts the account gets the generated
    /// password back. Concurrent callers that lose the insert race re-read
    /// the winner.
    pub async fn bootstrap(&self) -> AppResult<BootstrapOutcome> {
        let email = normalize_email(&self.config.superadmin_email);
        let email_lookup = self.lookup_hash(&email)?;

        if let Some(user) = found(self.users.get_by_email_lookup(&email_lookup).await)? {
            return Ok(BootstrapOutcome {
                user,
                password: None,
            });
        }

        if !self.config.bootstrap_enabled {
            return Err(AppError::BootstrapDisabled);
        }

        let password = generate_password(self.config.password_length)
            .map_err(|error| AppError::Internal(format!("failed to generate password: {error}")))?;
        validate_password(&password)?;

        let mut user = User::new(
            self.config.superadmin_username.as_str(),
            self.config.superadmin_name.as_str(),
            self.seal(&email)?,
            self.derive_password(&password)?,
        );
        user.before_create(SYSTEM_ACTOR, Utc::now());

        match self.users.create(user).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "superadmin bootstrapped");
                Ok(BootstrapOutcome {
                    user,
                    password: Some(password),
                })
            }
            Err(conflict @ (AppError::UserAlreadyExists | AppError::UsernameExists)) => {
                match found(self.users.get_by_email_lookup(&email_lookup).await)? {
                    Some(user) => Ok(BootstrapOutcome {
                        user,
                        password: None,
                    }),
                    None => Err(conflict),
                }
            }
            Err(error) => Err(error),
        }
    }
}

use tessera_crypto::generate_numeric_pin;

use super::*;

/// Fresh PINs tried before a lookup collision is reported.
const PIN_ATTEMPTS: usize = 5;

impl AuthnService {
    /// Generates, stores and returns a new numeric PIN for an active user.
    ///
    /// Replaces any previous PIN. The plaintext is only available from this
    /// call.
    pub async fn generate_pin(&self, user_id: UserId) -> AppResult<String> {
        let user = self.users.get(user_id).await?;
        self.ensure_active(&user)?;

        for attempt in 1..=PIN_ATTEMPTS {
            let pin = generate_numeric_pin(self.config.pin_length)
                .map_err(|error| AppError::Internal(format!("failed to generate pin: {error}")))?;

            match self.store_pin(user.clone(), &pin).await {
                Ok(_) => {
                    info!(user_id = %user_id, "pin generated");
                    return Ok(pin);
                }
                Err(AppError::PinAlreadyInUse) => {
                    warn!(user_id = %user_id, attempt, "generated pin collided, retrying");
                }
                Err(error) => return Err(error),
            }
        }

        Err(AppError::PinAlreadyInUse)
    }

    /// Stores a caller-chosen PIN.
    pub async fn set_pin(&self, user_id: UserId, pin: &str) -> AppResult<User> {
        validate_pin(pin)?;
        let user = self.users.get(user_id).await?;
        self.ensure_active(&user)?;

        let user = self.store_pin(user, pin).await?;
        info!(user_id = %user_id, "pin set");
        Ok(user)
    }

    /// Removes the PIN bundle.
    pub async fn clear_pin(&self, user_id: UserId) -> AppResult<User> {
        let mut user = self.users.get(user_id).await?;
        user.pin = None;
        let actor = user.username.clone();
        user.before_update(&actor, Utc::now());

        self.users.update(user).await
    }

    async fn store_pin(&self, mut user: User, pin: &str) -> AppResult<User> {
        user.pin = Some(self.seal(pin)?);
        let actor = user.username.clone();
        user.before_update(&actor, Utc::now());

        self.users.update(user).await
    }
}

use tessera_crypto::{CryptoError, verify_token};

use super::*;

impl AuthnService {
    /// Rotates the password after checking the current one.
    pub async fn change_password(
        &self,
        id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User> {
        let mut user = self.users.get(id).await?;
        if !self.password_matches(&user, current_password) {
            warn!(user_id = %id, "password change rejected: wrong current password");
            return Err(AppError::InvalidCredentials);
        }
        validate_password(new_password)?;

        user.password = self.derive_password(new_password)?;
        let actor = user.username.clone();
        user.before_update(&actor, Utc::now());
        let user = self.users.update(user).await?;
        info!(user_id = %id, "password changed");

        Ok(user)
    }

    /// Replaces the email, re-encrypting it and its lookup hash together.
    pub async fn update_email(&self, id: UserId, email: &str, actor: &str) -> AppResult<User> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let mut user = self.users.get(id).await?;
        let lookup = self.lookup_hash(&email)?;
        if user.email.lookup == lookup {
            return Ok(user);
        }
        ensure_absent(
            self.users.get_by_email_lookup(&lookup).await,
            AppError::UserAlreadyExists,
        )?;

        user.email = self.seal(&email)?;
        user.before_update(actor, Utc::now());
        let user = self.users.update(user).await?;
        info!(user_id = %id, actor, "email changed");

        Ok(user)
    }

    /// Verifies a session token issued by this service.
    ///
    /// Without a configured token key every token fails with
    /// `TokenVerificationFailed("missing key")`.
    pub fn verify_token(&self, token: &str) -> AppResult<TokenClaims> {
        if self.config.token_private_key.is_none() {
            return Err(Self::token_error(CryptoError::MissingKey));
        }
        let public_key = self.config.token_public_key()?;
        let claims = verify_token(token, &public_key).map_err(Self::token_error)?;

        if claims.audience != self.config.token_audience {
            return Err(AppError::TokenVerificationFailed(
                "unexpected audience".to_owned(),
            ));
        }

        Ok(claims)
    }
}

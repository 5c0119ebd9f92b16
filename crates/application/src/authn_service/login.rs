use std::collections::BTreeMap;

use tessera_crypto::generate_token_at;
use uuid::Uuid;

use super::*;

impl AuthnService {
    /// Authenticates with email and password and issues a session token.
    ///
    /// Unknown email, wrong password and inactive account all fail with
    /// `InvalidCredentials`.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession> {
        let email = normalize_email(email);
        let email_lookup = self.lookup_hash(&email)?;

        let Some(user) = found(self.users.get_by_email_lookup(&email_lookup).await)? else {
            self.dummy_derivation(password);
            warn!("sign-in rejected: unknown account");
            return Err(AppError::InvalidCredentials);
        };

        if !self.password_matches(&user, password) {
            warn!(user_id = %user.id, "sign-in rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active() {
            warn!(user_id = %user.id, status = %user.status, "sign-in rejected: inactive account");
            return Err(AppError::InvalidCredentials);
        }

        let session = self.issue_session(user)?;
        info!(user_id = %session.user.id, session_id = %session.session_id, "user signed in");

        Ok(session)
    }

    /// Authenticates with a PIN. No token is issued.
    pub async fn sign_in_by_pin(&self, pin: &str) -> AppResult<User> {
        if validate_pin(pin).is_err() {
            warn!("pin sign-in rejected: malformed pin");
            return Err(AppError::InvalidCredentials);
        }

        let pin_lookup = self.lookup_hash(pin)?;
        let Some(user) = found(self.users.get_by_pin_lookup(&pin_lookup).await)? else {
            warn!("pin sign-in rejected: unknown pin");
            return Err(AppError::InvalidCredentials);
        };

        let stored_matches = match user.pin.as_ref() {
            Some(sealed) => self.open(sealed).is_ok_and(|stored| stored == pin),
            None => false,
        };
        if !stored_matches {
            warn!(user_id = %user.id, "pin sign-in rejected: stored pin mismatch");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active() {
            warn!(user_id = %user.id, status = %user.status, "pin sign-in rejected: inactive account");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    fn issue_session(&self, user: User) -> AppResult<AuthenticatedSession> {
        let private_key = self.config.token_private_key.as_ref().ok_or_else(|| {
            AppError::TokenGenerationFailed("token private key is not configured".to_owned())
        })?;

        let ttl = chrono::Duration::from_std(self.config.token_ttl)
            .map_err(|error| AppError::Config(format!("invalid token ttl: {error}")))?;
        let now = Utc::now();
        let expires_at = now + ttl;
        let session_id = Uuid::new_v4().to_string();

        let claims = TokenClaims {
            subject: user.id.to_string(),
            session_id: session_id.clone(),
            audience: self.config.token_audience.clone(),
            context: BTreeMap::new(),
            expires_at: expires_at.timestamp(),
            authz_version: None,
        };
        let token = generate_token_at(&claims, private_key, now.timestamp())
            .map_err(|error| AppError::TokenGenerationFailed(error.to_string()))?;

        Ok(AuthenticatedSession {
            user,
            token,
            session_id,
            expires_at,
        })
    }
}

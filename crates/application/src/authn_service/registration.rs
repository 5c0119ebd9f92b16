use super::*;

impl AuthnService {
    /// Registers an active user.
    ///
    /// Email and username are checked up front; a racing duplicate is still
    /// rejected by the store's uniqueness rules on insert.
    pub async fn sign_up(&self, input: SignUpInput) -> AppResult<User> {
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        let username = normalize_username(&input.username);
        validate_username(&username)?;
        let display_name = normalize_display_name(&input.display_name);
        validate_display_name(&display_name)?;
        validate_password(&input.password)?;

        let email_lookup = self.lookup_hash(&email)?;
        ensure_absent(
            self.users.get_by_email_lookup(&email_lookup).await,
            AppError::UserAlreadyExists,
        )?;
        ensure_absent(
            self.users.get_by_username(&username).await,
            AppError::UsernameExists,
        )?;

        let sealed_email = self.seal(&email)?;
        let password = self.derive_password(&input.password)?;

        let mut user = User::new(username, display_name, sealed_email, password);
        let actor = user.username.clone();
        user.before_create(&actor, Utc::now());

        let user = self.users.create(user).await?;
        info!(user_id = %user.id, username = %user.username, "user signed up");

        Ok(user)
    }
}

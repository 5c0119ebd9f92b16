use super::*;

impl AuthnService {
    /// Returns a user by id.
    pub async fn get_user_by_id(&self, id: UserId) -> AppResult<User> {
        self.users.get(id).await
    }

    /// Returns a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<User> {
        self.users
            .get_by_username(&normalize_username(username))
            .await
    }

    /// Returns a user by email through the lookup hash.
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        let lookup = self.lookup_hash(&normalize_email(email))?;
        self.users.get_by_email_lookup(&lookup).await
    }

    /// Lists all users.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    /// Lists users in one status.
    pub async fn list_users_by_status(&self, status: UserStatus) -> AppResult<Vec<User>> {
        self.users.list_by_status(status).await
    }

    /// Saves profile changes after normalization and validation.
    pub async fn update_user(&self, mut user: User, actor: &str) -> AppResult<User> {
        user.before_update(actor, Utc::now());
        validate_username(&user.username)?;
        validate_display_name(&user.name)?;

        self.users.update(user).await
    }

    /// Soft-deletes a user.
    pub async fn delete_user(&self, id: UserId, actor: &str) -> AppResult<()> {
        self.users.delete(id, actor).await?;
        info!(user_id = %id, actor, "user deleted");
        Ok(())
    }

    /// Moves a user to `status`.
    pub async fn set_user_status(
        &self,
        id: UserId,
        status: UserStatus,
        actor: &str,
    ) -> AppResult<User> {
        let mut user = self.users.get(id).await?;
        if user.status == status {
            return Ok(user);
        }

        let previous = user.status;
        user.status = status;
        user.before_update(actor, Utc::now());
        let user = self.users.update(user).await?;
        info!(user_id = %id, from = %previous, to = %status, actor, "user status changed");

        Ok(user)
    }

    /// Suspends a user.
    pub async fn suspend_user(&self, id: UserId, actor: &str) -> AppResult<User> {
        self.set_user_status(id, UserStatus::Suspended, actor).await
    }

    /// Reactivates a user.
    pub async fn activate_user(&self, id: UserId, actor: &str) -> AppResult<User> {
        self.set_user_status(id, UserStatus::Active, actor).await
    }

    /// Fails with `InactiveAccount` unless the user is active.
    pub fn ensure_active(&self, user: &User) -> AppResult<()> {
        if user.is_active() {
            Ok(())
        } else {
            Err(AppError::InactiveAccount)
        }
    }

    /// Decrypts the stored email address.
    pub fn reveal_email(&self, user: &User) -> AppResult<String> {
        self.open(&user.email)
    }
}

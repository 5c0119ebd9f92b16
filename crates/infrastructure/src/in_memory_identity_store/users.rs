use super::*;

impl InMemoryIdentityStore {
    pub(super) async fn create_user_impl(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(AppError::UserAlreadyExists);
        }

        ensure_unique(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub(super) async fn get_user_impl(&self, id: UserId) -> AppResult<User> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::UserNotFound)
    }

    pub(super) async fn find_user(&self, predicate: impl Fn(&User) -> bool) -> AppResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| predicate(*user))
            .cloned()
            .ok_or(AppError::UserNotFound)
    }

    pub(super) async fn update_user_impl(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::UserNotFound);
        }

        ensure_unique(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub(super) async fn delete_user_impl(&self, id: UserId, actor: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(AppError::UserNotFound)?;

        user.status = UserStatus::Deleted;
        user.updated_at = Utc::now();
        user.updated_by = actor.to_owned();
        Ok(())
    }

    pub(super) async fn list_users_impl(&self, status: Option<UserStatus>) -> AppResult<Vec<User>> {
        let users = self.users.read().await;

        let mut values: Vec<User> = users
            .values()
            .filter(|user| status.is_none_or(|status| user.status == status))
            .cloned()
            .collect();
        values.sort_by(|left, right| left.username.cmp(&right.username));

        Ok(values)
    }
}

fn ensure_unique(users: &HashMap<UserId, User>, candidate: &User) -> AppResult<()> {
    let others = || users.values().filter(|user| user.id != candidate.id);

    if others().any(|user| user.email.lookup == candidate.email.lookup) {
        return Err(AppError::UserAlreadyExists);
    }
    if others().any(|user| user.username == candidate.username) {
        return Err(AppError::UsernameExists);
    }
    if let Some(pin) = &candidate.pin
        && others().any(|user| user.pin.as_ref().is_some_and(|other| other.lookup == pin.lookup))
    {
        return Err(AppError::PinAlreadyInUse);
    }

    Ok(())
}

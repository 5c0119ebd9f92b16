use super::*;

impl InMemoryIdentityStore {
    pub(super) async fn create_grant_impl(&self, grant: Grant) -> AppResult<Grant> {
        let roles = self.roles.read().await;
        if !roles.contains_key(&grant.role_id) {
            return Err(AppError::RoleNotFound);
        }

        let mut grants = self.grants.write().await;
        if grants
            .iter()
            .any(|existing| existing.username == grant.username && existing.role_id == grant.role_id)
        {
            return Err(AppError::GrantAlreadyExists);
        }

        grants.push(grant.clone());
        Ok(grant)
    }

    pub(super) async fn delete_grant_impl(&self, username: &str, role_id: RoleId) -> AppResult<()> {
        let mut grants = self.grants.write().await;
        let position = grants
            .iter()
            .position(|grant| grant.username == username && grant.role_id == role_id)
            .ok_or(AppError::GrantNotFound)?;

        grants.remove(position);
        Ok(())
    }

    pub(super) async fn get_user_roles_impl(&self, username: &str) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let grants = self.grants.read().await;

        Ok(grants
            .iter()
            .filter(|grant| grant.username == username)
            .filter_map(|grant| roles.get(&grant.role_id).cloned())
            .collect())
    }
}

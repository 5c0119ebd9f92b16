use super::*;

impl InMemoryIdentityStore {
    pub(super) async fn create_role_impl(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;
        if roles
            .values()
            .any(|existing| existing.id == role.id || existing.name == role.name)
        {
            return Err(AppError::RoleAlreadyExists);
        }

        roles.insert(role.id, role.clone());
        Ok(role)
    }

    pub(super) async fn update_role_impl(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.write().await;
        if !roles.contains_key(&role.id) {
            return Err(AppError::RoleNotFound);
        }
        if roles
            .values()
            .any(|existing| existing.id != role.id && existing.name == role.name)
        {
            return Err(AppError::RoleAlreadyExists);
        }

        roles.insert(role.id, role.clone());
        Ok(role)
    }

    pub(super) async fn delete_role_impl(&self, id: RoleId) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles.remove(&id).is_none() {
            return Err(AppError::RoleNotFound);
        }

        self.grants.write().await.retain(|grant| grant.role_id != id);
        Ok(())
    }

    pub(super) async fn list_roles_impl(&self, status: Option<RoleStatus>) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;

        let mut values: Vec<Role> = roles
            .values()
            .filter(|role| status.is_none_or(|status| role.status == status))
            .cloned()
            .collect();
        values.sort_by(|left, right| left.name.cmp(&right.name));

        Ok(values)
    }
}

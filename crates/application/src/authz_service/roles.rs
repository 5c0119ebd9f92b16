use super::*;

impl AuthzService {
    /// Creates an active role.
    pub async fn create_role(&self, input: CreateRoleInput, created_by: &str) -> AppResult<Role> {
        let mut role = Role::new(input.name, input.description, input.permissions);
        role.before_create(created_by, Utc::now());
        role.validate()?;

        let role = self.roles.create(role).await?;
        info!(role_id = %role.id, role = %role.name, actor = created_by, "role created");

        Ok(role)
    }

    /// Returns a role by id.
    pub async fn get_role_by_id(&self, id: RoleId) -> AppResult<Role> {
        self.roles.get(id).await
    }

    /// Returns a role by name.
    pub async fn get_role_by_name(&self, name: &str) -> AppResult<Role> {
        self.roles.get_by_name(&normalize_role_name(name)).await
    }

    /// Lists all roles.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.list().await
    }

    /// Lists roles in one status.
    pub async fn list_roles_by_status(&self, status: RoleStatus) -> AppResult<Vec<Role>> {
        self.roles.list_by_status(status).await
    }

    /// Saves role changes after normalization and validation.
    pub async fn update_role(&self, mut role: Role, actor: &str) -> AppResult<Role> {
        role.before_update(actor, Utc::now());
        role.validate()?;

        let role = self.roles.update(role).await?;
        info!(role_id = %role.id, role = %role.name, actor, "role updated");

        Ok(role)
    }

    /// Deletes a role and every grant referencing it.
    pub async fn delete_role(&self, id: RoleId) -> AppResult<()> {
        self.roles.delete(id).await?;
        info!(role_id = %id, "role deleted");
        Ok(())
    }

    /// Lets a role contribute permissions again.
    pub async fn activate_role(&self, id: RoleId, actor: &str) -> AppResult<Role> {
        self.set_role_status(id, RoleStatus::Active, actor).await
    }

    /// Stops a role from contributing permissions, keeping its grants.
    pub async fn deactivate_role(&self, id: RoleId, actor: &str) -> AppResult<Role> {
        self.set_role_status(id, RoleStatus::Inactive, actor).await
    }

    async fn set_role_status(&self, id: RoleId, status: RoleStatus, actor: &str) -> AppResult<Role> {
        let mut role = self.roles.get(id).await?;
        if role.status == status {
            return Ok(role);
        }

        role.status = status;
        role.before_update(actor, Utc::now());
        let role = self.roles.update(role).await?;
        info!(role_id = %id, status = status.as_str(), actor, "role status changed");

        Ok(role)
    }
}

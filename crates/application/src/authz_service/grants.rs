use super::*;

impl AuthzService {
    /// Grants an existing role to a principal.
    pub async fn assign_role(
        &self,
        principal_name: &str,
        role_id: RoleId,
        assigned_by: &str,
    ) -> AppResult<Grant> {
        let principal = principal(principal_name)?;
        let role = self.roles.get(role_id).await?;

        let grant = self
            .grants
            .create(Grant::new(&principal, role.id, assigned_by, Utc::now()))
            .await?;
        info!(principal = %principal, role = %role.name, actor = assigned_by, "role assigned");

        Ok(grant)
    }

    /// Revokes a role from a principal.
    pub async fn revoke_role(&self, principal_name: &str, role_id: RoleId) -> AppResult<()> {
        let principal = principal(principal_name)?;
        self.grants.delete(&principal, role_id).await?;
        info!(principal = %principal, role_id = %role_id, "role revoked");
        Ok(())
    }

    /// Lists grants held by a principal.
    pub async fn get_user_grants(&self, principal_name: &str) -> AppResult<Vec<Grant>> {
        self.grants
            .get_user_grants(&normalize_username(principal_name))
            .await
    }

    /// Lists roles granted to a principal.
    pub async fn get_user_roles(&self, principal_name: &str) -> AppResult<Vec<Role>> {
        self.grants
            .get_user_roles(&normalize_username(principal_name))
            .await
    }

    /// Lists grants referencing a role.
    pub async fn get_role_grants(&self, role_id: RoleId) -> AppResult<Vec<Grant>> {
        self.grants.get_role_grants(role_id).await
    }
}

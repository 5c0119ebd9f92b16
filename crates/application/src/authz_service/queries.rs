use super::*;

impl AuthzService {
    /// Returns the deduplicated permissions of a principal's active roles.
    pub async fn user_permissions(&self, principal_name: &str) -> AppResult<Vec<String>> {
        let roles = self
            .grants
            .get_user_roles(&normalize_username(principal_name))
            .await?;

        Ok(dedup_permissions(
            roles
                .into_iter()
                .filter(Role::is_active)
                .flat_map(|role| role.permissions),
        ))
    }

    /// Returns whether any active role grants `required`.
    pub async fn check_permission(&self, principal_name: &str, required: &str) -> AppResult<bool> {
        let permissions = self.user_permissions(principal_name).await?;
        Ok(has_permission(&permissions, required))
    }

    /// Returns whether at least one of `required` is granted.
    pub async fn check_any_permission(
        &self,
        principal_name: &str,
        required: &[String],
    ) -> AppResult<bool> {
        let permissions = self.user_permissions(principal_name).await?;
        Ok(has_any_permission(&permissions, required))
    }

    /// Returns whether every entry of `required` is granted.
    pub async fn check_all_permissions(
        &self,
        principal_name: &str,
        required: &[String],
    ) -> AppResult<bool> {
        let permissions = self.user_permissions(principal_name).await?;
        Ok(has_all_permissions(&permissions, required))
    }

    /// Returns whether a principal holds a grant to the named role.
    pub async fn has_role(&self, principal_name: &str, role_name: &str) -> AppResult<bool> {
        self.grants
            .has_role(
                &normalize_username(principal_name),
                &normalize_role_name(role_name),
            )
            .await
    }

    /// Fails with `PermissionDenied` unless `required` is granted.
    pub async fn require_permission(&self, principal_name: &str, required: &str) -> AppResult<()> {
        if self.check_permission(principal_name, required).await? {
            return Ok(());
        }

        Err(AppError::PermissionDenied(format!(
            "'{}' is missing permission '{required}'",
            normalize_username(principal_name)
        )))
    }

    /// Answers a remote `/authz/check` request.
    pub async fn evaluate_check(&self, request: &AuthzCheckRequest) -> AppResult<AuthzCheckResponse> {
        let required = request.required_permission();
        let allowed = self.check_permission(&request.user_id, &required).await?;
        debug!(principal = %request.user_id, permission = %required, allowed, "authz check evaluated");

        Ok(AuthzCheckResponse { allowed })
    }
}

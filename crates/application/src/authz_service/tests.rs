use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tessera_core::{AppError, AppResult};
use tessera_domain::{Grant, Role, RoleId, RoleStatus};

use crate::{AuthzCheckRequest, GrantStore, RoleStore};

use super::{AuthzService, CreateRoleInput};

#[derive(Default)]
struct FakeDirectory {
    roles: Mutex<Vec<Role>>,
    grants: Mutex<Vec<Grant>>,
}

#[async_trait]
impl RoleStore for FakeDirectory {
    async fn create(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        if roles.iter().any(|existing| existing.name == role.name) {
            return Err(AppError::RoleAlreadyExists);
        }
        roles.push(role.clone());
        Ok(role)
    }

    async fn get(&self, id: RoleId) -> AppResult<Role> {
        self.roles
            .lock()
            .await
            .iter()
            .find(|role| role.id == id)
            .cloned()
            .ok_or(AppError::RoleNotFound)
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Role> {
        self.roles
            .lock()
            .await
            .iter()
            .find(|role| role.name == name)
            .cloned()
            .ok_or(AppError::RoleNotFound)
    }

    async fn update(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        let slot = roles
            .iter_mut()
            .find(|existing| existing.id == role.id)
            .ok_or(AppError::RoleNotFound)?;
        *slot = role.clone();
        Ok(role)
    }

    async fn delete(&self, id: RoleId) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let before = roles.len();
        roles.retain(|role| role.id != id);
        if roles.len() == before {
            return Err(AppError::RoleNotFound);
        }
        self.grants.lock().await.retain(|grant| grant.role_id != id);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.lock().await.clone())
    }

    async fn list_by_status(&self, status: RoleStatus) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| role.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GrantStore for FakeDirectory {
    async fn create(&self, grant: Grant) -> AppResult<Grant> {
        let mut grants = self.grants.lock().await;
        if grants
            .iter()
            .any(|existing| existing.username == grant.username && existing.role_id == grant.role_id)
        {
            return Err(AppError::GrantAlreadyExists);
        }
        grants.push(grant.clone());
        Ok(grant)
    }

    async fn delete(&self, username: &str, role_id: RoleId) -> AppResult<()> {
        let mut grants = self.grants.lock().await;
        let before = grants.len();
        grants.retain(|grant| !(grant.username == username && grant.role_id == role_id));
        if grants.len() == before {
            return Err(AppError::GrantNotFound);
        }
        Ok(())
    }

    async fn get_user_grants(&self, username: &str) -> AppResult<Vec<Grant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.username == username)
            .cloned()
            .collect())
    }

    async fn get_role_grants(&self, role_id: RoleId) -> AppResult<Vec<Grant>> {
        Ok(self
            .grants
            .lock()
            .await
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn get_user_roles(&self, username: &str) -> AppResult<Vec<Role>> {
        let role_ids: Vec<RoleId> = self
            .get_user_grants(username)
            .await?
            .into_iter()
            .map(|grant| grant.role_id)
            .collect();
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| role_ids.contains(&role.id))
            .cloned()
            .collect())
    }

    async fn has_role(&self, username: &str, role_name: &str) -> AppResult<bool> {
        Ok(self
            .get_user_roles(username)
            .await?
            .iter()
            .any(|role| role.name == role_name))
    }
}

fn service() -> AuthzService {
    let directory = Arc::new(FakeDirectory::default());
    AuthzService::new(directory.clone(), directory)
}

fn role_input(name: &str, permissions: &[&str]) -> CreateRoleInput {
    CreateRoleInput {
        name: name.to_owned(),
        description: format!("{name} role"),
        permissions: permissions.iter().map(|value| (*value).to_owned()).collect(),
    }
}

#[tokio::test]
async fn create_role_normalizes_and_rejects_duplicates() -> AppResult<()> {
    let service = service();
    let role = service
        .create_role(
            role_input(" Editor ", &["content:read", "content:write", "content:read"]),
            "admin",
        )
        .await?;

    assert_eq!(role.name, "editor");
    assert_eq!(role.permissions, vec!["content:read", "content:write"]);
    assert_eq!(service.get_role_by_name("EDITOR").await?.id, role.id);
    assert_eq!(
        service
            .create_role(role_input("editor", &[]), "admin")
            .await
            .map(|_| ()),
        Err(AppError::RoleAlreadyExists)
    );
    Ok(())
}

#[tokio::test]
async fn create_role_validates_name_and_permissions() {
    let service = service();
    assert!(matches!(
        service.create_role(role_input("x", &[]), "admin").await,
        Err(AppError::InvalidRoleName(_))
    ));
    assert!(matches!(
        service
            .create_role(role_input("viewer", &["content::read"]), "admin")
            .await,
        Err(AppError::InvalidPermission(_))
    ));
}

#[tokio::test]
async fn wildcard_roles_grant_matching_permissions() -> AppResult<()> {
    let service = service();
    let admin = service.create_role(role_input("admin", &["*"]), "system").await?;
    let users = service
        .create_role(role_input("user-admin", &["users:*"]), "system")
        .await?;
    service.assign_role("root", admin.id, "system").await?;
    service.assign_role("Alice", users.id, "system").await?;

    assert!(service.check_permission("root", "anything:at:all").await?);
    assert!(service.check_permission("alice", "users:delete").await?);
    assert!(!service.check_permission("alice", "users").await?);
    assert!(!service.check_permission("alice", "roles:read").await?);
    assert!(
        service
            .check_any_permission("alice", &["roles:read".to_owned(), "users:read".to_owned()])
            .await?
    );
    assert!(
        !service
            .check_all_permissions("alice", &["roles:read".to_owned(), "users:read".to_owned()])
            .await?
    );
    assert!(service.check_all_permissions("nobody", &[]).await?);
    Ok(())
}

#[tokio::test]
async fn assign_and_revoke_follow_grant_lifecycle() -> AppResult<()> {
    let service = service();
    let role = service
        .create_role(role_input("viewer", &["content:read"]), "admin")
        .await?;

    let grant = service.assign_role(" Bob ", role.id, "admin").await?;
    assert_eq!(grant.username, "bob");
    assert_eq!(
        service
            .assign_role("bob", role.id, "admin")
            .await
            .map(|_| ()),
        Err(AppError::GrantAlreadyExists)
    );
    assert!(service.has_role("BOB", "Viewer").await?);

    service.revoke_role("bob", role.id).await?;
    assert!(service.get_user_grants("bob").await?.is_empty());
    assert_eq!(
        service.revoke_role("bob", role.id).await,
        Err(AppError::GrantNotFound)
    );
    Ok(())
}

#[tokio::test]
async fn assigning_unknown_role_fails() {
    let service = service();
    assert_eq!(
        service
            .assign_role("bob", RoleId::new(), "admin")
            .await
            .map(|_| ()),
        Err(AppError::RoleNotFound)
    );
}

#[tokio::test]
async fn inactive_roles_keep_grants_but_grant_nothing() -> AppResult<()> {
    let service = service();
    let role = service
        .create_role(role_input("editor", &["content:write"]), "admin")
        .await?;
    service.assign_role("carol", role.id, "admin").await?;

    service.deactivate_role(role.id, "admin").await?;
    assert!(!service.check_permission("carol", "content:write").await?);
    assert!(service.has_role("carol", "editor").await?);
    assert!(service.user_permissions("carol").await?.is_empty());
    assert_eq!(
        service.list_roles_by_status(RoleStatus::Inactive).await?.len(),
        1
    );

    service.activate_role(role.id, "admin").await?;
    assert!(service.check_permission("carol", "content:write").await?);
    Ok(())
}

#[tokio::test]
async fn deleting_role_removes_its_grants() -> AppResult<()> {
    let service = service();
    let role = service
        .create_role(role_input("editor", &["content:write"]), "admin")
        .await?;
    service.assign_role("carol", role.id, "admin").await?;

    service.delete_role(role.id).await?;
    assert!(service.get_role_grants(role.id).await?.is_empty());
    assert!(!service.check_permission("carol", "content:write").await?);
    Ok(())
}

#[tokio::test]
async fn user_permissions_are_deduplicated_across_roles() -> AppResult<()> {
    let service = service();
    let viewer = service
        .create_role(role_input("viewer", &["content:read"]), "admin")
        .await?;
    let editor = service
        .create_role(role_input("editor", &["content:read", "content:write"]), "admin")
        .await?;
    service.assign_role("dave", viewer.id, "admin").await?;
    service.assign_role("dave", editor.id, "admin").await?;

    let mut permissions = service.user_permissions("dave").await?;
    permissions.sort();
    assert_eq!(permissions, vec!["content:read", "content:write"]);
    Ok(())
}

#[tokio::test]
async fn require_permission_reports_denial() -> AppResult<()> {
    let service = service();
    let role = service
        .create_role(role_input("viewer", &["content:read"]), "admin")
        .await?;
    service.assign_role("erin", role.id, "admin").await?;

    assert!(service.require_permission("erin", "content:read").await.is_ok());
    assert!(matches!(
        service.require_permission("erin", "content:write").await,
        Err(AppError::PermissionDenied(_))
    ));
    Ok(())
}

#[tokio::test]
async fn evaluate_check_qualifies_bare_actions() -> AppResult<()> {
    let service = service();
    let role = service
        .create_role(role_input("viewer", &["content:read"]), "admin")
        .await?;
    service.assign_role("frank", role.id, "admin").await?;

    let qualified = service
        .evaluate_check(&AuthzCheckRequest::new("frank", "read", "content"))
        .await?;
    assert!(qualified.allowed);

    let denied = service
        .evaluate_check(&AuthzCheckRequest::new("frank", "write", "content"))
        .await?;
    assert!(!denied.allowed);
    Ok(())
}

#[tokio::test]
async fn update_role_renormalizes_permissions() -> AppResult<()> {
    let service = service();
    let mut role = service
        .create_role(role_input("viewer", &["content:read"]), "admin")
        .await?;

    role.permissions.push("content:read".to_owned());
    role.permissions.push("reports:read".to_owned());
    let updated = service.update_role(role, "auditor").await?;

    assert_eq!(updated.permissions, vec!["content:read", "reports:read"]);
    assert_eq!(updated.updated_by, "auditor");
    assert_eq!(updated.created_by, "admin");
    Ok(())
}

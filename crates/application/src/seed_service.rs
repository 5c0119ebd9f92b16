//! Reproducible roles, users and grants for development and tests.
//!
//! Every step goes through the public service operations. Duplicates resolve
//! to the stored entity; any other failure aborts the run.

use std::collections::HashMap;

use tracing::info;

use tessera_core::{AppError, AppResult};
use tessera_domain::{Role, RoleId};

use crate::{AuthnService, AuthzService, CreateRoleInput, SignUpInput};

/// Role created by a seed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRole {
    /// Role name.
    pub name: String,
    /// Role description.
    pub description: String,
    /// Permission strings.
    pub permissions: Vec<String>,
}

/// User created by a seed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Username.
    pub username: String,
    /// Display name.
    pub display_name: String,
}

/// Grant created by a seed plan, referencing role by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedGrant {
    /// Principal username.
    pub username: String,
    /// Role name.
    pub role_name: String,
}

/// Everything a seed run should ensure exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPlan {
    /// Roles to ensure.
    pub roles: Vec<SeedRole>,
    /// Users to ensure.
    pub users: Vec<SeedUser>,
    /// Grants to ensure.
    pub grants: Vec<SeedGrant>,
}

impl SeedPlan {
    /// Returns the standard fixture set: admin, editor and viewer roles with
    /// one user each.
    #[must_use]
    pub fn default_fixtures() -> Self {
        let role = |name: &str, description: &str, permissions: &[&str]| SeedRole {
            name: name.to_owned(),
            description: description.to_owned(),
            permissions: permissions.iter().map(|value| (*value).to_owned()).collect(),
        };
        let user = |username: &str, display_name: &str, password: &str| SeedUser {
            email: format!("{username}@tessera.local"),
            password: password.to_owned(),
            username: username.to_owned(),
            display_name: display_name.to_owned(),
        };
        let grant = |username: &str, role_name: &str| SeedGrant {
            username: username.to_owned(),
            role_name: role_name.to_owned(),
        };

        Self {
            roles: vec![
                role("admin", "Full access", &["*"]),
                role(
                    "editor",
                    "Reads and writes content",
                    &["content:read", "content:write"],
                ),
                role("viewer", "Reads content", &["content:read"]),
            ],
            users: vec![
                user("admin", "Admin User", "Tessera-Admin-1"),
                user("editor", "Editor User", "Tessera-Editor-1"),
                user("viewer", "Viewer User", "Tessera-Viewer-1"),
            ],
            grants: vec![
                grant("admin", "admin"),
                grant("editor", "editor"),
                grant("viewer", "viewer"),
            ],
        }
    }
}

/// Counts of entities created and found during a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Roles inserted by this run.
    pub roles_created: usize,
    /// Roles that already existed.
    pub roles_existing: usize,
    /// Users inserted by this run.
    pub users_created: usize,
    /// Users that already existed.
    pub users_existing: usize,
    /// Grants inserted by this run.
    pub grants_created: usize,
    /// Grants that already existed.
    pub grants_existing: usize,
}

/// Applies seed plans through the identity services.
#[derive(Clone)]
pub struct SeedService {
    authn: AuthnService,
    authz: AuthzService,
}

impl SeedService {
    /// Creates a seed service.
    #[must_use]
    pub fn new(authn: AuthnService, authz: AuthzService) -> Self {
        Self { authn, authz }
    }

    /// Ensures every role, user and grant in `plan` exists.
    pub async fn seed(&self, plan: &SeedPlan, actor: &str) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();
        let mut role_ids: HashMap<String, RoleId> = HashMap::new();

        for seed_role in &plan.roles {
            let role = self.ensure_role(seed_role, actor, &mut report).await?;
            role_ids.insert(role.name.clone(), role.id);
        }

        for seed_user in &plan.users {
            self.ensure_user(seed_user, &mut report).await?;
        }

        for seed_grant in &plan.grants {
            let role_id = match role_ids.get(&seed_grant.role_name) {
                Some(role_id) => *role_id,
                None => self.authz.get_role_by_name(&seed_grant.role_name).await?.id,
            };

            match self
                .authz
                .assign_role(&seed_grant.username, role_id, actor)
                .await
            {
                Ok(_) => report.grants_created += 1,
                Err(AppError::GrantAlreadyExists) => report.grants_existing += 1,
                Err(error) => return Err(error),
            }
        }

        info!(
            roles_created = report.roles_created,
            users_created = report.users_created,
            grants_created = report.grants_created,
            "seed applied"
        );

        Ok(report)
    }

    async fn ensure_role(
        &self,
        seed_role: &SeedRole,
        actor: &str,
        report: &mut SeedReport,
    ) -> AppResult<Role> {
        let input = CreateRoleInput {
            name: seed_role.name.clone(),
            description: seed_role.description.clone(),
            permissions: seed_role.permissions.clone(),
        };

        match self.authz.create_role(input, actor).await {
            Ok(role) => {
                report.roles_created += 1;
                Ok(role)
            }
            Err(AppError::RoleAlreadyExists) => {
                report.roles_existing += 1;
                self.authz.get_role_by_name(&seed_role.name).await
            }
            Err(error) => Err(error),
        }
    }

    async fn ensure_user(&self, seed_user: &SeedUser, report: &mut SeedReport) -> AppResult<()> {
        let input = SignUpInput {
            email: seed_user.email.clone(),
            password: seed_user.password.clone(),
            username: seed_user.username.clone(),
            display_name: seed_user.display_name.clone(),
        };

        match self.authn.sign_up(input).await {
            Ok(_) => report.users_created += 1,
            Err(AppError::UserAlreadyExists) => {
                self.authn.get_user_by_email(&seed_user.email).await?;
                report.users_existing += 1;
            }
            Err(AppError::UsernameExists) => {
                self.authn.get_user_by_username(&seed_user.username).await?;
                report.users_existing += 1;
            }
            Err(error) => return Err(error),
        }

        Ok(())
    }
}

//! PostgreSQL-backed role store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tessera_application::RoleStore;
use tessera_core::{AppError, AppResult};
use tessera_domain::{Role, RoleId, RoleStatus};

#[cfg(test)]
mod tests;

const ROLE_COLUMNS: &str = r#"
    id, name, description, permissions, status,
    created_at, created_by, updated_at, updated_by
"#;

/// PostgreSQL implementation of the role store port.
#[derive(Clone)]
pub struct PostgresRoleStore {
    pool: PgPool,
}

impl PostgresRoleStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all_where(&self, status: Option<RoleStatus>) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY name"
        ))
        .bind(status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RoleRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    permissions: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RoleId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            permissions: row.permissions,
            status: RoleStatus::parse(&row.status)?,
            created_at: row.created_at,
            created_by: row.created_by,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        })
    }
}

#[async_trait]
impl RoleStore for PostgresRoleStore {
    async fn create(&self, role: Role) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            INSERT INTO roles (
                id, name, description, permissions, status,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_str())
        .bind(role.permissions.as_slice())
        .bind(role.status.as_str())
        .bind(role.created_at)
        .bind(role.created_by.as_str())
        .bind(role.updated_at)
        .bind(role.updated_by.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| role_conflict_or_storage(error, "create role"))?;

        row.try_into()
    }

    async fn get(&self, id: RoleId) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 LIMIT 1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to find role by id: {error}")))?;

        row.ok_or(AppError::RoleNotFound)?.try_into()
    }

    async fn get_by_name(&self, name: &str) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1 LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to find role by name: {error}")))?;

        row.ok_or(AppError::RoleNotFound)?.try_into()
    }

    async fn update(&self, role: Role) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            UPDATE roles
            SET name = $2,
                description = $3,
                permissions = $4,
                status = $5,
                updated_at = $6,
                updated_by = $7
            WHERE id = $1
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_str())
        .bind(role.permissions.as_slice())
        .bind(role.status.as_str())
        .bind(role.updated_at)
        .bind(role.updated_by.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| role_conflict_or_storage(error, "update role"))?;

        row.ok_or(AppError::RoleNotFound)?.try_into()
    }

    async fn delete(&self, id: RoleId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to delete role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::RoleNotFound);
        }

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        self.fetch_all_where(None).await
    }

    async fn list_by_status(&self, status: RoleStatus) -> AppResult<Vec<Role>> {
        self.fetch_all_where(Some(status)).await
    }
}

fn role_conflict_or_storage(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::RoleAlreadyExists;
    }

    AppError::Storage(format!("failed to {operation}: {error}"))
}

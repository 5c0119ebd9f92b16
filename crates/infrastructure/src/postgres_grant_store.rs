//! PostgreSQL-backed grant store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tessera_application::GrantStore;
use tessera_core::{AppError, AppResult};
use tessera_domain::{Grant, GrantId, Role, RoleId};

use crate::postgres_role_store::RoleRow;

/// PostgreSQL implementation of the grant store port.
///
/// Grants reference roles with `ON DELETE CASCADE`, so deleting a role
/// through any store revokes its grants.
#[derive(Clone)]
pub struct PostgresGrantStore {
    pool: PgPool,
}

impl PostgresGrantStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    id: uuid::Uuid,
    username: String,
    role_id: uuid::Uuid,
    assigned_at: DateTime<Utc>,
    assigned_by: String,
}

impl From<GrantRow> for Grant {
    fn from(row: GrantRow) -> Self {
        Self {
            id: GrantId::from_uuid(row.id),
            username: row.username,
            role_id: RoleId::from_uuid(row.role_id),
            assigned_at: row.assigned_at,
            assigned_by: row.assigned_by,
        }
    }
}

#[async_trait]
impl GrantStore for PostgresGrantStore {
    async fn create(&self, grant: Grant) -> AppResult<Grant> {
        let row = sqlx::query_as::<_, GrantRow>(
            r#"
            INSERT INTO grants (id, username, role_id, assigned_at, assigned_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, role_id, assigned_at, assigned_by
            "#,
        )
        .bind(grant.id.as_uuid())
        .bind(grant.username.as_str())
        .bind(grant.role_id.as_uuid())
        .bind(grant.assigned_at)
        .bind(grant.assigned_by.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(grant_conflict_or_storage)?;

        Ok(row.into())
    }

    async fn delete(&self, username: &str, role_id: RoleId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM grants WHERE username = $1 AND role_id = $2")
            .bind(username)
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to delete grant: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::GrantNotFound);
        }

        Ok(())
    }

    async fn get_user_grants(&self, username: &str) -> AppResult<Vec<Grant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT id, username, role_id, assigned_at, assigned_by
            FROM grants
            WHERE username = $1
            ORDER BY assigned_at, id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list user grants: {error}")))?;

        Ok(rows.into_iter().map(Grant::from).collect())
    }

    async fn get_role_grants(&self, role_id: RoleId) -> AppResult<Vec<Grant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT id, username, role_id, assigned_at, assigned_by
            FROM grants
            WHERE role_id = $1
            ORDER BY assigned_at, id
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list role grants: {error}")))?;

        Ok(rows.into_iter().map(Grant::from).collect())
    }

    async fn get_user_roles(&self, username: &str) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name, r.description, r.permissions, r.status,
                   r.created_at, r.created_by, r.updated_at, r.updated_by
            FROM grants g
            INNER JOIN roles r ON r.id = g.role_id
            WHERE g.username = $1
            ORDER BY g.assigned_at, g.id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list user roles: {error}")))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn has_role(&self, username: &str, role_name: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM grants g
                INNER JOIN roles r ON r.id = g.role_id
                WHERE g.username = $1 AND r.name = $2
            )
            "#,
        )
        .bind(username)
        .bind(role_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to check role grant: {error}")))
    }
}

fn grant_conflict_or_storage(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error {
        match database_error.code().as_deref() {
            Some("23505") => return AppError::GrantAlreadyExists,
            Some("23503") => return AppError::RoleNotFound,
            _ => {}
        }
    }

    AppError::Storage(format!("failed to create grant: {error}"))
}

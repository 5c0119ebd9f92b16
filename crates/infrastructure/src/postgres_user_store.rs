//! PostgreSQL-backed user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tessera_application::UserStore;
use tessera_core::{AppError, AppResult};
use tessera_domain::{PasswordCredential, SealedSecret, User, UserId, UserStatus};

#[cfg(test)]
mod tests;

const USER_COLUMNS: &str = r#"
    id, username, name, email_ct, email_iv, email_tag, email_lookup,
    password_hash, password_salt, pin_ct, pin_iv, pin_tag, pin_lookup,
    status, created_at, created_by, updated_at, updated_by
"#;

/// PostgreSQL implementation of the user store port.
#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        value: Binding<'_>,
        operation: &str,
    ) -> AppResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate} LIMIT 1");
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match value {
            Binding::Id(id) => query.bind(id.as_uuid()),
            Binding::Bytes(bytes) => query.bind(bytes),
            Binding::Text(text) => query.bind(text),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Storage(format!("failed to {operation}: {error}")))?;

        row.ok_or(AppError::UserNotFound)?.try_into()
    }

    async fn fetch_all_where(&self, status: Option<UserStatus>) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY username"
        ))
        .bind(status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list users: {error}")))?;

        rows.into_iter().map(User::try_from).collect()
    }
}

enum Binding<'a> {
    Id(UserId),
    Bytes(&'a [u8]),
    Text(&'a str),
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    name: String,
    email_ct: Vec<u8>,
    email_iv: Vec<u8>,
    email_tag: Vec<u8>,
    email_lookup: Vec<u8>,
    password_hash: Vec<u8>,
    password_salt: Vec<u8>,
    pin_ct: Option<Vec<u8>>,
    pin_iv: Option<Vec<u8>>,
    pin_tag: Option<Vec<u8>>,
    pin_lookup: Option<Vec<u8>>,
    status: String,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let pin = match (row.pin_ct, row.pin_iv, row.pin_tag, row.pin_lookup) {
            (Some(ciphertext), Some(iv), Some(tag), Some(lookup)) => Some(SealedSecret {
                ciphertext,
                iv,
                tag,
                lookup,
            }),
            (None, None, None, None) => None,
            _ => {
                return Err(AppError::Internal(format!(
                    "user '{}' has an incomplete pin bundle",
                    row.id
                )));
            }
        };

        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: row.username,
            name: row.name,
            email: SealedSecret {
                ciphertext: row.email_ct,
                iv: row.email_iv,
                tag: row.email_tag,
                lookup: row.email_lookup,
            },
            password: PasswordCredential {
                hash: row.password_hash,
                salt: row.password_salt,
            },
            pin,
            status: UserStatus::parse(&row.status)?,
            created_at: row.created_at,
            created_by: row.created_by,
            updated_at: row.updated_at,
            updated_by: row.updated_by,
        })
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, user: User) -> AppResult<User> {
        let pin = user.pin.as_ref();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                id, username, name, email_ct, email_iv, email_tag, email_lookup,
                password_hash, password_salt, pin_ct, pin_iv, pin_tag, pin_lookup,
                status, created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.name.as_str())
        .bind(user.email.ciphertext.as_slice())
        .bind(user.email.iv.as_slice())
        .bind(user.email.tag.as_slice())
        .bind(user.email.lookup.as_slice())
        .bind(user.password.hash.as_slice())
        .bind(user.password.salt.as_slice())
        .bind(pin.map(|pin| pin.ciphertext.as_slice()))
        .bind(pin.map(|pin| pin.iv.as_slice()))
        .bind(pin.map(|pin| pin.tag.as_slice()))
        .bind(pin.map(|pin| pin.lookup.as_slice()))
        .bind(user.status.as_str())
        .bind(user.created_at)
        .bind(user.created_by.as_str())
        .bind(user.updated_at)
        .bind(user.updated_by.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| user_conflict_or_storage(error, "create user"))?;

        row.try_into()
    }

    async fn get(&self, id: UserId) -> AppResult<User> {
        self.fetch_one_where("id = $1", Binding::Id(id), "find user by id")
            .await
    }

    async fn get_by_email_lookup(&self, lookup: &[u8]) -> AppResult<User> {
        self.fetch_one_where(
            "email_lookup = $1",
            Binding::Bytes(lookup),
            "find user by email lookup",
        )
        .await
    }

    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        self.fetch_one_where(
            "username = $1",
            Binding::Text(username),
            "find user by username",
        )
        .await
    }

    async fn get_by_pin_lookup(&self, lookup: &[u8]) -> AppResult<User> {
        self.fetch_one_where(
            "pin_lookup = $1",
            Binding::Bytes(lookup),
            "find user by pin lookup",
        )
        .await
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let pin = user.pin.as_ref();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET username = $2,
                name = $3,
                email_ct = $4,
                email_iv = $5,
                email_tag = $6,
                email_lookup = $7,
                password_hash = $8,
                password_salt = $9,
                pin_ct = $10,
                pin_iv = $11,
                pin_tag = $12,
                pin_lookup = $13,
                status = $14,
                updated_at = $15,
                updated_by = $16
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.name.as_str())
        .bind(user.email.ciphertext.as_slice())
        .bind(user.email.iv.as_slice())
        .bind(user.email.tag.as_slice())
        .bind(user.email.lookup.as_slice())
        .bind(user.password.hash.as_slice())
        .bind(user.password.salt.as_slice())
        .bind(pin.map(|pin| pin.ciphertext.as_slice()))
        .bind(pin.map(|pin| pin.iv.as_slice()))
        .bind(pin.map(|pin| pin.tag.as_slice()))
        .bind(pin.map(|pin| pin.lookup.as_slice()))
        .bind(user.status.as_str())
        .bind(user.updated_at)
        .bind(user.updated_by.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| user_conflict_or_storage(error, "update user"))?;

        row.ok_or(AppError::UserNotFound)?.try_into()
    }

    async fn delete(&self, id: UserId, actor: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = 'deleted', updated_at = NOW(), updated_by = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(actor)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to delete user: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        self.fetch_all_where(None).await
    }

    async fn list_by_status(&self, status: UserStatus) -> AppResult<Vec<User>> {
        self.fetch_all_where(Some(status)).await
    }
}

fn user_conflict_or_storage(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return match database_error.constraint() {
            Some("users_username_key") => AppError::UsernameExists,
            Some("users_pin_lookup_key") => AppError::PinAlreadyInUse,
            _ => AppError::UserAlreadyExists,
        };
    }

    AppError::Storage(format!("failed to {operation}: {error}"))
}

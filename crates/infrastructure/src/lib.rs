//! Infrastructure adapters for the identity ports.

#![forbid(unsafe_code)]

mod http_authz_client;
mod in_memory_identity_store;
mod in_memory_permission_cache;
mod postgres_grant_store;
mod postgres_role_store;
mod postgres_user_store;

use sqlx::migrate::Migrator;

pub use http_authz_client::HttpAuthzClient;
pub use in_memory_identity_store::InMemoryIdentityStore;
pub use in_memory_permission_cache::{InMemoryPermissionCache, MAX_DECISION_TTL};
pub use postgres_grant_store::PostgresGrantStore;
pub use postgres_role_store::PostgresRoleStore;
pub use postgres_user_store::PostgresUserStore;

/// Embedded schema migrations for the PostgreSQL stores.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tessera_application::{GrantStore, RoleStore};
use tessera_core::AppError;
use tessera_domain::{Grant, Role, RoleStatus};
use uuid::Uuid;

use super::PostgresRoleStore;
use crate::{MIGRATOR, PostgresGrantStore};

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres role store tests: {error}");
    }

    Some(pool)
}

fn role(prefix: &str, permissions: &[&str]) -> Role {
    let name = format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..12]);
    let mut role = Role::new(
        name,
        "postgres test role",
        permissions.iter().map(|value| (*value).to_owned()).collect(),
    );
    role.before_create("system", Utc::now());
    role
}

#[tokio::test]
async fn roles_round_trip_and_reject_duplicate_names() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresRoleStore::new(pool);

    let editor = role("editor", &["content:read", "content:write"]);
    assert!(store.create(editor.clone()).await.is_ok());

    let by_name = store.get_by_name(&editor.name).await;
    assert_eq!(
        by_name.map(|role| role.permissions),
        Ok(vec!["content:read".to_owned(), "content:write".to_owned()])
    );

    let mut duplicate = role("editor", &[]);
    duplicate.name = editor.name.clone();
    assert_eq!(
        store.create(duplicate).await.map(|_| ()),
        Err(AppError::RoleAlreadyExists)
    );

    let mut inactive = editor.clone();
    inactive.status = RoleStatus::Inactive;
    assert!(store.update(inactive).await.is_ok());
    let inactive_roles = store.list_by_status(RoleStatus::Inactive).await;
    assert!(inactive_roles.is_ok_and(|roles| roles.iter().any(|role| role.id == editor.id)));
}

#[tokio::test]
async fn grants_join_roles_and_cascade_on_delete() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let roles = PostgresRoleStore::new(pool.clone());
    let grants = PostgresGrantStore::new(pool);
    let username = format!("pg{}", &Uuid::new_v4().simple().to_string()[..12]);

    let viewer = role("viewer", &["content:read"]);
    assert!(roles.create(viewer.clone()).await.is_ok());

    let grant = Grant::new(&username, viewer.id, "system", Utc::now());
    assert!(grants.create(grant.clone()).await.is_ok());
    assert_eq!(
        grants
            .create(Grant::new(&username, viewer.id, "system", Utc::now()))
            .await
            .map(|_| ()),
        Err(AppError::GrantAlreadyExists)
    );
    assert_eq!(grants.has_role(&username, &viewer.name).await, Ok(true));
    assert_eq!(
        grants
            .get_user_roles(&username)
            .await
            .map(|roles| roles.into_iter().map(|role| role.id).collect::<Vec<_>>()),
        Ok(vec![viewer.id])
    );

    assert!(RoleStore::delete(&roles, viewer.id).await.is_ok());
    assert_eq!(grants.get_user_grants(&username).await, Ok(Vec::new()));
    assert_eq!(
        GrantStore::delete(&grants, &username, viewer.id).await,
        Err(AppError::GrantNotFound)
    );
}

#[tokio::test]
async fn grant_for_missing_role_is_rejected() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let grants = PostgresGrantStore::new(pool);
    let orphan = role("orphan", &[]);

    assert_eq!(
        grants
            .create(Grant::new("nobody", orphan.id, "system", Utc::now()))
            .await
            .map(|_| ()),
        Err(AppError::RoleNotFound)
    );
}

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tessera_application::UserStore;
use tessera_core::AppError;
use tessera_domain::{PasswordCredential, SealedSecret, User, UserId, UserStatus};
use uuid::Uuid;

use super::PostgresUserStore;
use crate::MIGRATOR;

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
        panic!("failed to run migrations for postgres user store tests: {error}");
    }

    Some(pool)
}

fn unique_bytes() -> Vec<u8> {
    Uuid::new_v4().as_bytes().to_vec()
}

fn sealed() -> SealedSecret {
    SealedSecret {
        ciphertext: unique_bytes(),
        iv: vec![0; 12],
        tag: vec![0; 16],
        lookup: unique_bytes(),
    }
}

fn user(username: &str) -> User {
    let mut user = User::new(
        username,
        "Postgres User",
        sealed(),
        PasswordCredential {
            hash: vec![1; 32],
            salt: vec![2; 32],
        },
    );
    user.before_create("system", Utc::now());
    user
}

fn unique_username(prefix: &str) -> String {
    format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
async fn create_and_read_back_user() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresUserStore::new(pool);

    let mut candidate = user(&unique_username("pg"));
    candidate.pin = Some(sealed());
    let created = store.create(candidate.clone()).await;
    assert!(created.is_ok());

    let by_id = store.get(candidate.id).await;
    assert_eq!(by_id.as_ref().map(|user| &user.username), Ok(&candidate.username));
    assert_eq!(by_id.map(|user| user.pin), Ok(candidate.pin.clone()));

    let by_lookup = store.get_by_email_lookup(&candidate.email.lookup).await;
    assert_eq!(by_lookup.map(|user| user.id), Ok(candidate.id));

    let pin_lookup = candidate
        .pin
        .as_ref()
        .map(|pin| pin.lookup.clone())
        .unwrap_or_default();
    let by_pin = store.get_by_pin_lookup(&pin_lookup).await;
    assert_eq!(by_pin.map(|user| user.id), Ok(candidate.id));

    assert_eq!(
        store.get(UserId::new()).await.map(|_| ()),
        Err(AppError::UserNotFound)
    );
}

#[tokio::test]
async fn unique_constraints_map_to_conflicts() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresUserStore::new(pool);

    let first = user(&unique_username("pg"));
    assert!(store.create(first.clone()).await.is_ok());

    let mut same_email = user(&unique_username("pg"));
    same_email.email.lookup = first.email.lookup.clone();
    assert_eq!(
        store.create(same_email).await.map(|_| ()),
        Err(AppError::UserAlreadyExists)
    );

    let same_username = user(&first.username);
    assert_eq!(
        store.create(same_username).await.map(|_| ()),
        Err(AppError::UsernameExists)
    );
}

#[tokio::test]
async fn update_and_soft_delete_user() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresUserStore::new(pool);

    let mut candidate = user(&unique_username("pg"));
    assert!(store.create(candidate.clone()).await.is_ok());

    candidate.name = "Renamed".to_owned();
    candidate.status = UserStatus::Suspended;
    let updated = store.update(candidate.clone()).await;
    assert_eq!(updated.map(|user| user.name), Ok("Renamed".to_owned()));

    assert!(store.delete(candidate.id, "auditor").await.is_ok());
    let deleted = store.get(candidate.id).await;
    assert_eq!(
        deleted.map(|user| (user.status, user.updated_by)),
        Ok((UserStatus::Deleted, "auditor".to_owned()))
    );

    let deleted_users = store.list_by_status(UserStatus::Deleted).await;
    assert!(
        deleted_users.is_ok_and(|users| users.iter().any(|user| user.id == candidate.id))
    );
    assert_eq!(
        store.delete(UserId::new(), "auditor").await,
        Err(AppError::UserNotFound)
    );
}

//! Tessera operator commands: schema migrations, superadmin bootstrap and
//! development fixtures.

#![forbid(unsafe_code)]

mod admin_config;

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tessera_application::{
    AuthConfig, AuthnService, AuthzService, SYSTEM_ACTOR, SeedPlan, SeedService,
};
use tessera_core::{AppError, AppResult};
use tessera_infrastructure::{MIGRATOR, PostgresGrantStore, PostgresRoleStore, PostgresUserStore};
use tracing::info;

use crate::admin_config::{AdminCommand, AdminConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AdminConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to run migrations: {error}")))?;
    info!("database migrations applied");

    let Some(auth) = config.auth else {
        return Ok(());
    };
    let (authn, authz) = build_services(pool, auth)?;

    let outcome = authn.bootstrap().await?;
    match outcome.password {
        Some(password) => {
            info!(username = %outcome.user.username, "superadmin created");
            println!("superadmin password (shown once): {password}");
        }
        None => info!(username = %outcome.user.username, "superadmin already present"),
    }

    if config.command == AdminCommand::Seed {
        let report = SeedService::new(authn, authz)
            .seed(&SeedPlan::default_fixtures(), SYSTEM_ACTOR)
            .await?;
        info!(
            roles_existing = report.roles_existing,
            users_existing = report.users_existing,
            grants_existing = report.grants_existing,
            "development fixtures ensured"
        );
    }

    Ok(())
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Storage(format!("failed to connect to database: {error}")))
}

fn build_services(pool: PgPool, auth: AuthConfig) -> AppResult<(AuthnService, AuthzService)> {
    let users = Arc::new(PostgresUserStore::new(pool.clone()));
    let roles = Arc::new(PostgresRoleStore::new(pool.clone()));
    let grants = Arc::new(PostgresGrantStore::new(pool));

    Ok((
        AuthnService::new(users, auth)?,
        AuthzService::new(roles, grants),
    ))
}

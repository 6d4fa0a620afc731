use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::user::{Role, User};
use crate::domain::services::{auth_service::AuthService, tokens::generate_token};
use crate::infra::repositories::{
    postgres_event_repo::PostgresEventRepo, postgres_senior_repo::PostgresSeniorRepo,
    postgres_guest_repo::PostgresGuestRepo, postgres_user_repo::PostgresUserRepo,
    postgres_auth_repo::PostgresAuthRepo, postgres_audit_repo::PostgresAuditRepo,
    sqlite_event_repo::SqliteEventRepo, sqlite_senior_repo::SqliteSeniorRepo,
    sqlite_guest_repo::SqliteGuestRepo, sqlite_user_repo::SqliteUserRepo,
    sqlite_auth_repo::SqliteAuthRepo, sqlite_audit_repo::SqliteAuditRepo,
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_state(pool, config)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_state(pool, config)
    };

    ensure_admin_user(&state).await.expect("Failed to seed admin user");
    state
}

pub fn sqlite_state(pool: SqlitePool, config: &Config) -> AppState {
    AppState::assemble(
        config,
        Arc::new(SqliteEventRepo::new(pool.clone())),
        Arc::new(SqliteSeniorRepo::new(pool.clone())),
        Arc::new(SqliteGuestRepo::new(pool.clone())),
        Arc::new(SqliteUserRepo::new(pool.clone())),
        Arc::new(SqliteAuthRepo::new(pool.clone())),
        Arc::new(SqliteAuditRepo::new(pool)),
    )
}

pub fn postgres_state(pool: PgPool, config: &Config) -> AppState {
    AppState::assemble(
        config,
        Arc::new(PostgresEventRepo::new(pool.clone())),
        Arc::new(PostgresSeniorRepo::new(pool.clone())),
        Arc::new(PostgresGuestRepo::new(pool.clone())),
        Arc::new(PostgresUserRepo::new(pool.clone())),
        Arc::new(PostgresAuthRepo::new(pool.clone())),
        Arc::new(PostgresAuditRepo::new(pool)),
    )
}

/// Creates the first Admin account on an empty user table.
///
/// Uses `ADMIN_PASSWORD` when configured, otherwise a random password that is
/// printed once to the log.
pub async fn ensure_admin_user(state: &AppState) -> Result<Option<User>, AppError> {
    if state.user_repo.count().await? > 0 {
        return Ok(None);
    }

    let password = match &state.config.admin_password {
        Some(p) => p.clone(),
        None => {
            let generated = generate_token(16);
            warn!("No ADMIN_PASSWORD set. Generated password for '{}': {}", DEFAULT_ADMIN_USERNAME, generated);
            generated
        }
    };

    let password_hash = AuthService::hash_password(&password)?;
    let admin = User::new(DEFAULT_ADMIN_USERNAME.to_string(), password_hash, Role::Admin, None);
    let created = state.user_repo.create(&admin).await?;

    info!("Seeded initial admin user: {}", created.id);
    Ok(Some(created))
}

pub async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}

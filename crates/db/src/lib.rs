//! Database layer for secure-whisper.
//!
//! The record store behind the reporting flow: companies, profiles,
//! reports and their comment threads.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use whisper_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Message carried by `Conflict` errors raised from unique indexes.
pub const DUPLICATE_RECORD: &str = "record already exists";

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt).await.map_err(map_db_err)
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Map a store error onto the application taxonomy.
///
/// Connection failures are transport problems the caller may retry.
/// Unique index violations surface as `Conflict` so callers can tell a
/// lost race from a broken store.
pub(crate) fn map_db_err(err: DbErr) -> AppError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        tracing::debug!(%detail, "Unique constraint violation");
        return AppError::Conflict(DUPLICATE_RECORD.to_string());
    }
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => AppError::Network(err.to_string()),
        other => AppError::Database(other.to_string()),
    }
}

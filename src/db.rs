use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::AppConfig;
use crate::migrator::Migrator;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool tuned from application configuration.
pub async fn establish_connection(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(cfg.database_url.clone());
    options
        .max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    info!(
        max_connections = cfg.db_max_connections,
        "database connection established"
    );
    Ok(pool)
}

/// Applies all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    info!("running database migrations");
    Migrator::up(pool, None).await
}

mod chain_repository;
mod delegator_repository;
mod proposal_repository;
mod validator_repository;

pub use chain_repository::PostgresChainRepository;
pub use delegator_repository::PostgresDelegatorRepository;
pub use proposal_repository::PostgresProposalRepository;
pub use validator_repository::PostgresValidatorRepository;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::utils::errors::Result;

pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string)
        .await?;
    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database schema is up to date");
    Ok(())
}

pub mod postgres;
pub mod traits;

use std::sync::Arc;

use sqlx::PgPool;

pub use traits::{ChainConfigRepository, DelegatorRepository, ProposalRepository, ValidatorRepository};

/// Handles to every table the pipeline touches, constructed once and passed
/// to each service.
#[derive(Clone)]
pub struct Repositories {
    pub chains: Arc<dyn ChainConfigRepository>,
    pub validators: Arc<dyn ValidatorRepository>,
    pub delegators: Arc<dyn DelegatorRepository>,
    pub proposals: Arc<dyn ProposalRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            chains: Arc::new(postgres::PostgresChainRepository::new(pool.clone())),
            validators: Arc::new(postgres::PostgresValidatorRepository::new(pool.clone())),
            delegators: Arc::new(postgres::PostgresDelegatorRepository::new(pool.clone())),
            proposals: Arc::new(postgres::PostgresProposalRepository::new(pool)),
        }
    }

    /// Use one store for all four tables.
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: ChainConfigRepository
            + ValidatorRepository
            + DelegatorRepository
            + ProposalRepository
            + 'static,
    {
        Self {
            chains: store.clone(),
            validators: store.clone(),
            delegators: store.clone(),
            proposals: store,
        }
    }
}

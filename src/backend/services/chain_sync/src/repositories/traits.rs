use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::models::{ChainConfig, Delegator, GovernanceProposal, RemovalSummary, Validator};

#[async_trait]
pub trait ChainConfigRepository: Send + Sync {
    async fn find_by_chain_id(&self, chain_id: &str) -> Result<Option<ChainConfig>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<ChainConfig>>;
    async fn list_chains(&self) -> Result<Vec<ChainConfig>>;
    async fn insert_chain(&self, chain: &ChainConfig) -> Result<()>;
    async fn update_chain(&self, chain: &ChainConfig) -> Result<()>;
    /// Delete the chain and every row referencing it as one unit: either all of
    /// it goes or nothing does.
    async fn delete_chain_cascade(&self, chain_id: &str) -> Result<RemovalSummary>;
}

#[async_trait]
pub trait ValidatorRepository: Send + Sync {
    async fn find_validator(&self, chain_id: &str, operator_address: &str) -> Result<Option<Validator>>;
    async fn insert_validator(&self, validator: &Validator) -> Result<()>;
    async fn update_validator(&self, validator: &Validator) -> Result<()>;
}

#[async_trait]
pub trait DelegatorRepository: Send + Sync {
    async fn find_delegator(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
    ) -> Result<Option<Delegator>>;
    async fn insert_delegator(&self, delegator: &Delegator) -> Result<()>;
    async fn update_delegator_balance(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
        balance_amount: &BigDecimal,
    ) -> Result<()>;
    async fn list_delegator_addresses(&self, chain_id: &str, validator_address: &str) -> Result<Vec<String>>;
    async fn delete_delegator(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
    ) -> Result<u64>;
}

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    async fn find_proposal(&self, chain_id: &str, proposal_id: &str) -> Result<Option<GovernanceProposal>>;
    async fn insert_proposal(&self, proposal: &GovernanceProposal) -> Result<()>;
    /// Write the mutable fields only. Phase timestamps are never cleared.
    async fn update_proposal(&self, proposal: &GovernanceProposal) -> Result<()>;
}

use std::collections::HashSet;

use anyhow::anyhow;
use tracing::{debug, error, info, warn};

use crate::config::ValidatorPolicy;
use crate::models::{
    ChainConfig, Delegator, GovernanceProposal, ReconcileOutcome, RemovalSummary, Validator,
};
use crate::repositories::Repositories;
use crate::utils::errors::{Result, SyncError};

/// Upserts fetched records against the store.
#[derive(Clone)]
pub struct Reconciler {
    repos: Repositories,
    policy: ValidatorPolicy,
}

/// A reconciler bound to one configured chain.
pub struct ChainScope {
    repos: Repositories,
    policy: ValidatorPolicy,
    chain: ChainConfig,
}

/// Result of one delegator delete pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneOutcome {
    pub deleted: usize,
    pub failed: usize,
}

impl Reconciler {
    pub fn new(repos: Repositories, policy: ValidatorPolicy) -> Self {
        Self { repos, policy }
    }

    /// Bind to `chain_id`, failing with `ConfigNotFound` if it is not configured.
    pub async fn scope(&self, chain_id: &str) -> Result<ChainScope> {
        let chain = self
            .repos
            .chains
            .find_by_chain_id(chain_id)
            .await
            .map_err(|e| SyncError::persist("chain_config", chain_id, chain_id, e))?
            .ok_or_else(|| SyncError::ConfigNotFound(chain_id.to_string()))?;

        Ok(ChainScope {
            repos: self.repos.clone(),
            policy: self.policy,
            chain,
        })
    }

    /// Delete a chain and everything recorded for it in one transaction.
    pub async fn remove_chain(&self, chain_id: &str) -> Result<RemovalSummary> {
        let scope = self.scope(chain_id).await?;
        let chain_id = scope.chain_id();

        let summary = self
            .repos
            .chains
            .delete_chain_cascade(chain_id)
            .await
            .map_err(|e| SyncError::persist("chain_config", chain_id, chain_id, e))?;

        info!(
            chain_id,
            delegators = summary.delegators,
            validators = summary.validators,
            proposals = summary.proposals,
            "Removed chain"
        );
        Ok(summary)
    }
}

impl ChainScope {
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn chain_id(&self) -> &str {
        &self.chain.chain_id
    }

    fn check_chain(&self, entity: &'static str, key: &str, record_chain: &str) -> Result<()> {
        if record_chain == self.chain_id() {
            return Ok(());
        }

        Err(SyncError::persist(
            entity,
            key,
            self.chain_id(),
            anyhow!("record belongs to chain {record_chain}"),
        ))
    }

    pub async fn reconcile_validator(&self, validator: &Validator) -> Result<ReconcileOutcome> {
        let key = validator.operator_address.as_str();
        self.check_chain("validator", key, &validator.chain_id)?;
        let fail = |e| SyncError::persist("validator", key, self.chain_id(), e);

        let existing = self
            .repos
            .validators
            .find_validator(self.chain_id(), key)
            .await
            .map_err(fail)?;

        let outcome = match existing {
            None => {
                self.repos.validators.insert_validator(validator).await.map_err(fail)?;
                ReconcileOutcome::Inserted
            }
            Some(_) if self.policy == ValidatorPolicy::SkipExisting => ReconcileOutcome::Skipped,
            Some(stored) if stored.same_state(validator) => ReconcileOutcome::Unchanged,
            Some(_) => {
                self.repos.validators.update_validator(validator).await.map_err(fail)?;
                ReconcileOutcome::Updated
            }
        };

        debug!(chain_id = %self.chain_id(), operator_address = key, ?outcome, "Reconciled validator");
        Ok(outcome)
    }

    pub async fn reconcile_delegator(&self, delegator: &Delegator) -> Result<ReconcileOutcome> {
        let key = delegator.delegator_address.as_str();
        self.check_chain("delegator", key, &delegator.chain_id)?;
        let fail = |e| SyncError::persist("delegator", key, self.chain_id(), e);

        let existing = self
            .repos
            .delegators
            .find_delegator(self.chain_id(), &delegator.validator_address, key)
            .await
            .map_err(fail)?;

        let outcome = match existing {
            None => {
                self.repos.delegators.insert_delegator(delegator).await.map_err(fail)?;
                ReconcileOutcome::Inserted
            }
            Some(stored) if stored.balance_amount == delegator.balance_amount => {
                ReconcileOutcome::Unchanged
            }
            Some(_) => {
                self.repos
                    .delegators
                    .update_delegator_balance(
                        self.chain_id(),
                        &delegator.validator_address,
                        key,
                        &delegator.balance_amount,
                    )
                    .await
                    .map_err(fail)?;
                ReconcileOutcome::Updated
            }
        };

        debug!(
            chain_id = %self.chain_id(),
            validator_address = %delegator.validator_address,
            delegator_address = key,
            ?outcome,
            "Reconciled delegator"
        );
        Ok(outcome)
    }

    /// Delete stored delegators of `validator_address` that are not in `active`.
    ///
    /// Only call this with the complete active set for the validator.
    pub async fn prune_delegators(
        &self,
        validator_address: &str,
        active: &HashSet<String>,
    ) -> PruneOutcome {
        let mut outcome = PruneOutcome::default();

        let stored = match self
            .repos
            .delegators
            .list_delegator_addresses(self.chain_id(), validator_address)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                error!(
                    chain_id = %self.chain_id(),
                    validator_address,
                    "Failed to list stored delegators: {e:#}"
                );
                outcome.failed += 1;
                return outcome;
            }
        };

        for delegator_address in stored.iter().filter(|a| !active.contains(*a)) {
            match self
                .repos
                .delegators
                .delete_delegator(self.chain_id(), validator_address, delegator_address)
                .await
            {
                Ok(_) => outcome.deleted += 1,
                Err(e) => {
                    warn!(
                        chain_id = %self.chain_id(),
                        validator_address,
                        delegator_address = %delegator_address,
                        "Failed to delete stale delegator: {e:#}"
                    );
                    outcome.failed += 1;
                }
            }
        }

        if outcome.deleted > 0 {
            info!(
                chain_id = %self.chain_id(),
                validator_address,
                deleted = outcome.deleted,
                "Removed delegators no longer delegating"
            );
        }
        outcome
    }

    pub async fn reconcile_proposal(&self, proposal: &GovernanceProposal) -> Result<ReconcileOutcome> {
        let key = proposal.proposal_id.as_str();
        self.check_chain("proposal", key, &proposal.chain_id)?;
        let fail = |e| SyncError::persist("proposal", key, self.chain_id(), e);

        let existing = self
            .repos
            .proposals
            .find_proposal(self.chain_id(), key)
            .await
            .map_err(fail)?;

        let outcome = match existing {
            None => {
                self.repos.proposals.insert_proposal(proposal).await.map_err(fail)?;
                ReconcileOutcome::Inserted
            }
            Some(stored) if stored.same_mutable_state(proposal) => ReconcileOutcome::Unchanged,
            Some(mut stored) => {
                stored.apply_mutable_state(proposal);
                self.repos.proposals.update_proposal(&stored).await.map_err(fail)?;
                ReconcileOutcome::Updated
            }
        };

        debug!(chain_id = %self.chain_id(), proposal_id = key, ?outcome, "Reconciled proposal");
        Ok(outcome)
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::endpoints::{self, DELEGATIONS_KEY, PROPOSALS_KEY, VALIDATORS_KEY};
use crate::api::RestClient;
use crate::config::SyncSettings;
use crate::models::{RemovalSummary, RunStatus, SyncKind, SyncSummary};
use crate::repositories::Repositories;
use crate::services::chain_registry::ChainRegistry;
use crate::services::fetcher::PaginatedFetcher;
use crate::services::negotiator::EndpointNegotiator;
use crate::services::normalizer::{
    decode_proposal, normalize_delegation, normalize_proposal, normalize_validator,
};
use crate::services::reconciler::{ChainScope, Reconciler};
use crate::utils::errors::{Result, SyncError};

/// Runs validator and governance syncs for configured chains.
pub struct SyncService {
    registry: ChainRegistry,
    reconciler: Reconciler,
    fetcher: PaginatedFetcher,
    negotiator: EndpointNegotiator,
}

impl SyncService {
    pub fn new(repos: Repositories, client: Arc<dyn RestClient>, settings: &SyncSettings) -> Self {
        Self {
            registry: ChainRegistry::new(repos.chains.clone()),
            reconciler: Reconciler::new(repos, settings.validator_policy),
            fetcher: PaginatedFetcher::new(client.clone(), settings.page_limit),
            negotiator: EndpointNegotiator::new(client, settings.probe_timeout()),
        }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    async fn resolve(&self, name_or_id: &str) -> Result<ChainScope> {
        let chain = self.registry.get_chain(name_or_id).await?;
        self.reconciler.scope(&chain.chain_id).await
    }

    /// Fetch every validator of `chain` and, for each, its delegator set.
    pub async fn sync_validators(&self, chain: &str) -> SyncSummary {
        let mut summary = SyncSummary::new(SyncKind::Validators, chain);

        let scope = match self.resolve(chain).await {
            Ok(scope) => scope,
            Err(e) => return report(summary.aborted(e.to_string())),
        };
        summary.chain = scope.chain_id().to_string();

        info!(chain_id = %scope.chain_id(), "Syncing validators");
        let url = endpoints::validators(&scope.chain().api_endpoint);
        let fetched = self.fetcher.fetch_all(&url, VALIDATORS_KEY).await;
        if !fetched.is_complete() {
            summary.truncated_fetches += 1;
        }
        summary.fetched += fetched.records.len();

        for record in fetched.records {
            let validator = match normalize_validator(record, scope.chain_id()) {
                Ok(validator) => validator,
                Err(e) => {
                    log_rejected(&e, scope.chain_id());
                    summary.record(&Err(e));
                    continue;
                }
            };

            let result = scope.reconcile_validator(&validator).await;
            if let Err(e) = &result {
                log_rejected(e, scope.chain_id());
                warn!(
                    chain_id = %scope.chain_id(),
                    operator_address = %validator.operator_address,
                    "Skipping delegators of unpersisted validator"
                );
                summary.record(&result);
                continue;
            }
            summary.record(&result);

            self.sync_delegators(&scope, &validator.operator_address, &mut summary)
                .await;
        }

        report(summary.finish())
    }

    async fn sync_delegators(&self, scope: &ChainScope, operator_address: &str, summary: &mut SyncSummary) {
        let url = endpoints::delegations(&scope.chain().api_endpoint, operator_address);
        let fetched = self.fetcher.fetch_all(&url, DELEGATIONS_KEY).await;

        let mut complete = fetched.is_complete();
        if !complete {
            summary.truncated_fetches += 1;
        }
        summary.fetched += fetched.records.len();

        let mut active = HashSet::with_capacity(fetched.records.len());
        for record in fetched.records {
            let result = match normalize_delegation(record, operator_address, scope.chain_id()) {
                Ok(delegator) => {
                    active.insert(delegator.delegator_address.clone());
                    scope.reconcile_delegator(&delegator).await
                }
                Err(e) => {
                    // An unreadable entry may hide a live delegator.
                    complete = false;
                    Err(e)
                }
            };

            if let Err(e) = &result {
                log_rejected(e, scope.chain_id());
            }
            summary.record(&result);
        }

        if !complete {
            warn!(
                chain_id = %scope.chain_id(),
                operator_address,
                "Delegator set incomplete, skipping cleanup"
            );
            return;
        }

        let pruned = scope.prune_delegators(operator_address, &active).await;
        summary.deleted += pruned.deleted;
        summary.failed += pruned.failed;
    }

    /// Negotiate the proposals endpoint of `chain` and reconcile every proposal.
    pub async fn sync_governance(&self, chain: &str) -> SyncSummary {
        let mut summary = SyncSummary::new(SyncKind::Governance, chain);

        let scope = match self.resolve(chain).await {
            Ok(scope) => scope,
            Err(e) => return report(summary.aborted(e.to_string())),
        };
        summary.chain = scope.chain_id().to_string();

        info!(chain_id = %scope.chain_id(), "Syncing governance proposals");
        let candidates = endpoints::proposal_candidates(&scope.chain().api_endpoint);
        let endpoint = match self.negotiator.negotiate(&candidates).await {
            Ok(endpoint) => endpoint,
            Err(e) => return report(summary.aborted(e.to_string())),
        };

        let fetched = self.fetcher.fetch_all(&endpoint.url, PROPOSALS_KEY).await;
        if !fetched.is_complete() {
            summary.truncated_fetches += 1;
        }
        summary.fetched += fetched.records.len();

        for record in fetched.records {
            let result = match decode_proposal(endpoint.version, record)
                .and_then(|raw| normalize_proposal(&raw, scope.chain_id()))
            {
                Ok(proposal) => scope.reconcile_proposal(&proposal).await,
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                log_rejected(e, scope.chain_id());
            }
            summary.record(&result);
        }

        report(summary.finish())
    }

    /// Resolve `name_or_id` and delete the chain with everything stored for it.
    pub async fn remove_chain(&self, name_or_id: &str) -> Result<RemovalSummary> {
        let chain = self.registry.get_chain(name_or_id).await?;
        self.reconciler.remove_chain(&chain.chain_id).await
    }
}

fn log_rejected(e: &SyncError, chain_id: &str) {
    if e.is_malformed() {
        warn!(chain_id, "Skipping record: {e}");
    } else {
        error!(chain_id, "Record not persisted: {e}");
    }
}

fn report(summary: SyncSummary) -> SyncSummary {
    match &summary.status {
        RunStatus::Success => info!(
            chain_id = %summary.chain,
            changes = summary.changes(),
            unchanged = summary.unchanged,
            "{summary}"
        ),
        RunStatus::Warning(_) => warn!(chain_id = %summary.chain, "{summary}"),
        RunStatus::Aborted(_) => error!(chain_id = %summary.chain, "{summary}"),
    }
    summary
}


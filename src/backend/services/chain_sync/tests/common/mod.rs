#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde_json::{json, Value};

use chain_sync::{
    api::{PageRequest, RestClient},
    models::{ChainConfig, Delegator, GovernanceProposal, RemovalSummary, Validator},
    repositories::traits::*,
    Repositories, SyncError, SyncService, SyncSettings, ValidatorPolicy,
};

pub const API: &str = "https://lcd.explorebitsong.com";
pub const CHAIN_ID: &str = "bitsong-2b";

#[derive(Default, Clone)]
struct Tables {
    chains: BTreeMap<String, ChainConfig>,
    validators: BTreeMap<(String, String), Validator>,
    delegators: BTreeMap<(String, String, String), Delegator>,
    proposals: BTreeMap<(String, String), GovernanceProposal>,
    writes: usize,
    failing_delete: Option<&'static str>,
}

impl Tables {
    fn check_delete(&self, table: &str) -> Result<()> {
        if self.failing_delete == Some(table) {
            bail!("delete from {table} failed");
        }
        Ok(())
    }
}

/// Store with the same keys and foreign keys as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn with_chains(chains: Vec<ChainConfig>) -> Arc<Self> {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().unwrap();
            for chain in chains {
                tables.chains.insert(chain.chain_id.clone(), chain);
            }
        }
        Arc::new(store)
    }

    /// Make every later delete from `table` fail.
    pub fn fail_deletes_from(&self, table: &'static str) {
        self.tables.lock().unwrap().failing_delete = Some(table);
    }

    pub fn chain_count(&self) -> usize {
        self.tables.lock().unwrap().chains.len()
    }

    pub fn writes(&self) -> usize {
        self.tables.lock().unwrap().writes
    }

    pub fn validators(&self, chain_id: &str) -> Vec<Validator> {
        let tables = self.tables.lock().unwrap();
        tables
            .validators
            .values()
            .filter(|v| v.chain_id == chain_id)
            .cloned()
            .collect()
    }

    pub fn all_validators(&self) -> Vec<Validator> {
        self.tables.lock().unwrap().validators.values().cloned().collect()
    }

    pub fn delegators(&self, chain_id: &str, validator_address: &str) -> Vec<Delegator> {
        let tables = self.tables.lock().unwrap();
        tables
            .delegators
            .values()
            .filter(|d| d.chain_id == chain_id && d.validator_address == validator_address)
            .cloned()
            .collect()
    }

    pub fn proposal(&self, chain_id: &str, proposal_id: &str) -> Option<GovernanceProposal> {
        let tables = self.tables.lock().unwrap();
        tables
            .proposals
            .get(&(chain_id.to_string(), proposal_id.to_string()))
            .cloned()
    }

    pub fn proposal_count(&self) -> usize {
        self.tables.lock().unwrap().proposals.len()
    }
}

#[async_trait]
impl ChainConfigRepository for MemoryStore {
    async fn find_by_chain_id(&self, chain_id: &str) -> Result<Option<ChainConfig>> {
        Ok(self.tables.lock().unwrap().chains.get(chain_id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ChainConfig>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.chains.values().find(|c| c.name == name).cloned())
    }

    async fn list_chains(&self) -> Result<Vec<ChainConfig>> {
        Ok(self.tables.lock().unwrap().chains.values().cloned().collect())
    }

    async fn insert_chain(&self, chain: &ChainConfig) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if tables.chains.contains_key(&chain.chain_id) {
            bail!("duplicate chain_id {}", chain.chain_id);
        }
        tables.chains.insert(chain.chain_id.clone(), chain.clone());
        tables.writes += 1;
        Ok(())
    }

    async fn update_chain(&self, chain: &ChainConfig) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .chains
            .get_mut(&chain.chain_id)
            .ok_or_else(|| anyhow!("chain {} not found", chain.chain_id))?;
        *stored = chain.clone();
        tables.writes += 1;
        Ok(())
    }

    async fn delete_chain_cascade(&self, chain_id: &str) -> Result<RemovalSummary> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.chains.contains_key(chain_id) {
            bail!("chain {chain_id} not found");
        }

        // Stage on a copy; only a fully successful cascade replaces the tables.
        let mut staged = tables.clone();

        staged.check_delete("delegators")?;
        let before = staged.delegators.len();
        staged.delegators.retain(|(chain, _, _), _| chain != chain_id);
        let delegators = (before - staged.delegators.len()) as u64;

        staged.check_delete("validators")?;
        let before = staged.validators.len();
        staged.validators.retain(|(chain, _), _| chain != chain_id);
        let validators = (before - staged.validators.len()) as u64;

        staged.check_delete("governance_proposals")?;
        let before = staged.proposals.len();
        staged.proposals.retain(|(chain, _), _| chain != chain_id);
        let proposals = (before - staged.proposals.len()) as u64;

        staged.check_delete("chain_config")?;
        staged.chains.remove(chain_id);
        staged.writes += 1;

        *tables = staged;
        Ok(RemovalSummary {
            delegators,
            validators,
            proposals,
        })
    }
}

#[async_trait]
impl ValidatorRepository for MemoryStore {
    async fn find_validator(&self, chain_id: &str, operator_address: &str) -> Result<Option<Validator>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .validators
            .get(&(chain_id.to_string(), operator_address.to_string()))
            .cloned())
    }

    async fn insert_validator(&self, validator: &Validator) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.chains.contains_key(&validator.chain_id) {
            bail!("chain {} does not exist", validator.chain_id);
        }
        let key = (validator.chain_id.clone(), validator.operator_address.clone());
        if tables.validators.contains_key(&key) {
            bail!("duplicate validator {}", validator.operator_address);
        }
        tables.validators.insert(key, validator.clone());
        tables.writes += 1;
        Ok(())
    }

    async fn update_validator(&self, validator: &Validator) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let key = (validator.chain_id.clone(), validator.operator_address.clone());
        let stored = tables
            .validators
            .get_mut(&key)
            .ok_or_else(|| anyhow!("validator {} not found", validator.operator_address))?;
        *stored = validator.clone();
        tables.writes += 1;
        Ok(())
    }
}

#[async_trait]
impl DelegatorRepository for MemoryStore {
    async fn find_delegator(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
    ) -> Result<Option<Delegator>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .delegators
            .get(&(
                chain_id.to_string(),
                validator_address.to_string(),
                delegator_address.to_string(),
            ))
            .cloned())
    }

    async fn insert_delegator(&self, delegator: &Delegator) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let parent = (delegator.chain_id.clone(), delegator.validator_address.clone());
        if !tables.validators.contains_key(&parent) {
            bail!("validator {} does not exist", delegator.validator_address);
        }
        let key = (
            delegator.chain_id.clone(),
            delegator.validator_address.clone(),
            delegator.delegator_address.clone(),
        );
        if tables.delegators.contains_key(&key) {
            bail!("duplicate delegator {}", delegator.delegator_address);
        }
        tables.delegators.insert(key, delegator.clone());
        tables.writes += 1;
        Ok(())
    }

    async fn update_delegator_balance(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
        balance_amount: &BigDecimal,
    ) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let key = (
            chain_id.to_string(),
            validator_address.to_string(),
            delegator_address.to_string(),
        );
        let stored = tables
            .delegators
            .get_mut(&key)
            .ok_or_else(|| anyhow!("delegator {delegator_address} not found"))?;
        stored.balance_amount = balance_amount.clone();
        tables.writes += 1;
        Ok(())
    }

    async fn list_delegator_addresses(&self, chain_id: &str, validator_address: &str) -> Result<Vec<String>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .delegators
            .keys()
            .filter(|(chain, validator, _)| chain == chain_id && validator == validator_address)
            .map(|(_, _, delegator)| delegator.clone())
            .collect())
    }

    async fn delete_delegator(
        &self,
        chain_id: &str,
        validator_address: &str,
        delegator_address: &str,
    ) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let key = (
            chain_id.to_string(),
            validator_address.to_string(),
            delegator_address.to_string(),
        );
        tables.writes += 1;
        Ok(tables.delegators.remove(&key).map_or(0, |_| 1))
    }
}

#[async_trait]
impl ProposalRepository for MemoryStore {
    async fn find_proposal(&self, chain_id: &str, proposal_id: &str) -> Result<Option<GovernanceProposal>> {
        Ok(self.proposal(chain_id, proposal_id))
    }

    async fn insert_proposal(&self, proposal: &GovernanceProposal) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.chains.contains_key(&proposal.chain_id) {
            bail!("chain {} does not exist", proposal.chain_id);
        }
        let key = (proposal.chain_id.clone(), proposal.proposal_id.clone());
        if tables.proposals.contains_key(&key) {
            bail!("duplicate proposal {}", proposal.proposal_id);
        }
        tables.proposals.insert(key, proposal.clone());
        tables.writes += 1;
        Ok(())
    }

    async fn update_proposal(&self, proposal: &GovernanceProposal) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let key = (proposal.chain_id.clone(), proposal.proposal_id.clone());
        let stored = tables
            .proposals
            .get_mut(&key)
            .ok_or_else(|| anyhow!("proposal {} not found", proposal.proposal_id))?;
        stored.apply_mutable_state(proposal);
        tables.writes += 1;
        Ok(())
    }
}

#[derive(Default)]
struct Routes {
    pages: HashMap<String, Vec<Value>>,
    failing: HashMap<String, usize>,
    requests: Vec<PageRequest>,
}

/// Scripted REST API. Unknown URLs answer 404; cursors are `page-N`.
#[derive(Default)]
pub struct FakeApi {
    routes: Mutex<Routes>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `pages` under `collection_key`, chained by `pagination.next_key`.
    pub fn serve(&self, url: &str, collection_key: &str, pages: Vec<Vec<Value>>) {
        let count = pages.len();
        let bodies = pages
            .into_iter()
            .enumerate()
            .map(|(i, records)| {
                let next_key = if i + 1 < count {
                    Value::String(format!("page-{}", i + 1))
                } else {
                    Value::Null
                };
                json!({
                    collection_key: records,
                    "pagination": { "next_key": next_key, "total": "0" }
                })
            })
            .collect();
        self.routes.lock().unwrap().pages.insert(url.to_string(), bodies);
    }

    /// Make page `index` of `url` answer 502.
    pub fn fail_page(&self, url: &str, index: usize) {
        self.routes.lock().unwrap().failing.insert(url.to_string(), index);
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.routes.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.routes.lock().unwrap().requests.clear();
    }
}

#[async_trait]
impl RestClient for FakeApi {
    async fn get_page(&self, request: &PageRequest) -> chain_sync::utils::errors::Result<Value> {
        let mut routes = self.routes.lock().unwrap();
        routes.requests.push(request.clone());

        let failure = |reason: &str| SyncError::TransientFetchFailure {
            url: request.url.clone(),
            reason: reason.to_string(),
        };

        let index = match request.key.as_deref() {
            None => 0,
            Some(key) => key
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| failure("status 400 Bad Request"))?,
        };

        if routes.failing.get(&request.url) == Some(&index) {
            return Err(failure("status 502 Bad Gateway"));
        }

        routes
            .pages
            .get(&request.url)
            .and_then(|pages| pages.get(index))
            .cloned()
            .ok_or_else(|| failure("status 404 Not Found"))
    }
}

pub fn bitsong() -> ChainConfig {
    ChainConfig {
        name: "BitSong".to_string(),
        chain_id: CHAIN_ID.to_string(),
        address_prefix: "bitsong".to_string(),
        rpc_endpoint: "https://rpc.explorebitsong.com".to_string(),
        api_endpoint: API.to_string(),
        grpc_endpoint: None,
    }
}

pub fn chain(name: &str, chain_id: &str, api_endpoint: &str) -> ChainConfig {
    ChainConfig {
        name: name.to_string(),
        chain_id: chain_id.to_string(),
        address_prefix: name.to_lowercase(),
        rpc_endpoint: format!("https://rpc.{chain_id}.example.org"),
        api_endpoint: api_endpoint.to_string(),
        grpc_endpoint: None,
    }
}

pub fn validators_url(api: &str) -> String {
    format!("{api}/cosmos/staking/v1beta1/validators")
}

pub fn delegations_url(api: &str, operator_address: &str) -> String {
    format!("{api}/cosmos/staking/v1beta1/validators/{operator_address}/delegations")
}

pub fn proposals_url(api: &str, version: &str) -> String {
    format!("{api}/cosmos/gov/{version}/proposals")
}

pub fn validator_json(operator_address: &str, status: &str) -> Value {
    json!({
        "operator_address": operator_address,
        "consensus_pubkey": { "@type": "/cosmos.crypto.ed25519.PubKey", "key": "AAAA" },
        "jailed": false,
        "status": status,
        "tokens": "5000000000",
        "delegator_shares": "5000000000.000000000000000000",
        "description": { "moniker": format!("moniker-{operator_address}") },
        "commission": {
            "commission_rates": {
                "rate": "0.050000000000000000",
                "max_rate": "0.200000000000000000",
                "max_change_rate": "0.010000000000000000"
            }
        },
        "min_self_delegation": "1"
    })
}

pub fn delegation_json(delegator_address: &str, validator_address: &str, amount: &str) -> Value {
    json!({
        "delegation": {
            "delegator_address": delegator_address,
            "validator_address": validator_address,
            "shares": format!("{amount}.000000000000000000")
        },
        "balance": { "denom": "ubtsg", "amount": amount }
    })
}

pub fn v1beta1_proposal_json(id: &str, status: &str, yes: &str) -> Value {
    json!({
        "proposal_id": id,
        "content": {
            "@type": "/cosmos.gov.v1beta1.TextProposal",
            "title": format!("Proposal {id}"),
            "description": "Signal support",
            "proposer": "bitsong1proposer"
        },
        "status": status,
        "final_tally_result": { "yes": yes, "abstain": "0", "no": "0", "no_with_veto": "0" },
        "submit_time": "2024-03-01T10:00:00Z",
        "deposit_end_time": "2024-03-15T10:00:00Z",
        "total_deposit": [{ "denom": "ubtsg", "amount": "512000000" }],
        "voting_start_time": "2024-03-02T10:00:00Z",
        "voting_end_time": "2024-03-16T10:00:00Z"
    })
}

pub fn v1_proposal_json(id: &str, status: &str, yes: &str) -> Value {
    json!({
        "id": id,
        "messages": [{
            "@type": "/cosmos.gov.v1.MsgExecLegacyContent",
            "content": { "@type": "/cosmos.gov.v1beta1.TextProposal" }
        }],
        "status": status,
        "final_tally_result": {
            "yes_count": yes,
            "abstain_count": "0",
            "no_count": "0",
            "no_with_veto_count": "0"
        },
        "submit_time": "2024-03-01T10:00:00Z",
        "deposit_end_time": "2024-03-15T10:00:00Z",
        "total_deposit": [{ "denom": "ubtsg", "amount": "512000000" }],
        "voting_start_time": "2024-03-02T10:00:00Z",
        "voting_end_time": "2024-03-16T10:00:00Z",
        "metadata": "",
        "title": format!("Proposal {id}"),
        "summary": "Signal support",
        "proposer": "bitsong1proposer"
    })
}

pub fn service(store: &Arc<MemoryStore>, api: &Arc<FakeApi>, policy: ValidatorPolicy) -> SyncService {
    let settings = SyncSettings {
        validator_policy: policy,
        ..SyncSettings::default()
    };
    SyncService::new(Repositories::from_shared(store.clone()), api.clone(), &settings)
}

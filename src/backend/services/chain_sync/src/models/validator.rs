use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A validator as persisted. Keyed by `(operator_address, chain_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    pub chain_id: String,
    pub consensus_pubkey: String,
    pub jailed: bool,
    pub status: String,
    pub tokens: BigDecimal,
    pub delegator_shares: BigDecimal,
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
    pub commission_rate: BigDecimal,
    pub commission_max_rate: BigDecimal,
    pub commission_max_change_rate: BigDecimal,
    pub min_self_delegation: BigDecimal,
}

impl Validator {
    /// Whether every field a refresh would overwrite already matches `other`.
    pub fn same_state(&self, other: &Validator) -> bool {
        self.consensus_pubkey == other.consensus_pubkey
            && self.jailed == other.jailed
            && self.status == other.status
            && self.tokens == other.tokens
            && self.delegator_shares == other.delegator_shares
            && self.moniker == other.moniker
            && self.identity == other.identity
            && self.website == other.website
            && self.security_contact == other.security_contact
            && self.details == other.details
            && self.commission_rate == other.commission_rate
            && self.commission_max_rate == other.commission_max_rate
            && self.commission_max_change_rate == other.commission_max_change_rate
            && self.min_self_delegation == other.min_self_delegation
    }
}

/// `/cosmos/staking/v1beta1/validators` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawValidator {
    pub operator_address: String,
    pub consensus_pubkey: serde_json::Value,
    pub jailed: bool,
    pub status: String,
    pub tokens: String,
    pub delegator_shares: String,
    pub description: RawDescription,
    pub commission: RawCommission,
    pub min_self_delegation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDescription {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCommission {
    pub commission_rates: RawCommissionRates,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCommissionRates {
    pub rate: String,
    pub max_rate: String,
    pub max_change_rate: String,
}

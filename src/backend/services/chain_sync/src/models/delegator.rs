use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// A delegation as persisted. Keyed by `(delegator_address, validator_address, chain_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegator {
    pub delegator_address: String,
    pub validator_address: String,
    pub chain_id: String,
    pub shares: BigDecimal,
    pub balance_amount: BigDecimal,
    pub balance_denom: String,
}

/// `/cosmos/staking/v1beta1/validators/{addr}/delegations` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDelegationResponse {
    pub delegation: RawDelegation,
    pub balance: RawCoin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDelegation {
    pub delegator_address: String,
    #[serde(default)]
    pub validator_address: String,
    #[serde(default)]
    pub shares: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCoin {
    pub denom: String,
    pub amount: String,
}

//! Fetch-boundary decoding: raw API JSON in, canonical records out.
//!
//! Everything downstream of this module is independent of the API generation
//! a record came from.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::delegator::RawDelegationResponse;
use crate::models::proposal::{V1Beta1Proposal, V1Proposal};
use crate::models::validator::RawValidator;
use crate::models::{ApiVersion, Delegator, GovernanceProposal, RawProposal, Validator, VoteTally};
use crate::utils::errors::{Result, SyncError};
use crate::utils::numeric::{parse_decimal, parse_integer};

const PROPOSAL: &str = "proposal";
const VALIDATOR: &str = "validator";
const DELEGATOR: &str = "delegator";

/// Decode one proposal list entry according to the negotiated API version.
pub fn decode_proposal(version: ApiVersion, value: Value) -> Result<RawProposal> {
    let decoded = match version {
        ApiVersion::V1 => serde_json::from_value::<V1Proposal>(value).map(RawProposal::V1),
        ApiVersion::V1Beta1 => {
            serde_json::from_value::<V1Beta1Proposal>(value).map(RawProposal::V1Beta1)
        }
    };

    decoded.map_err(|e| SyncError::malformed(PROPOSAL, format!("{version} payload: {e}")))
}

/// Map either proposal shape onto `GovernanceProposal`.
pub fn normalize_proposal(raw: &RawProposal, chain_id: &str) -> Result<GovernanceProposal> {
    match raw {
        RawProposal::V1(p) => normalize_v1(p, chain_id),
        RawProposal::V1Beta1(p) => normalize_v1beta1(p, chain_id),
    }
}

fn normalize_v1(p: &V1Proposal, chain_id: &str) -> Result<GovernanceProposal> {
    let proposal_id = required_id(p.id.as_deref(), "id")?;

    let tally = p
        .final_tally_result
        .as_ref()
        .ok_or_else(|| missing(&proposal_id, "final_tally_result"))?;

    // An empty message list leaves the legacy content empty.
    let message = p.messages.first().cloned().unwrap_or_else(|| Value::Object(Default::default()));
    let content = message.get("content").cloned().unwrap_or_else(|| Value::Object(Default::default()));

    let proposal_type = string_at(&content, "@type").or_else(|| string_at(&message, "@type"));
    let title = non_empty(p.title.as_deref()).or_else(|| string_at(&content, "title"));
    let description = non_empty(p.summary.as_deref()).or_else(|| string_at(&content, "description"));

    Ok(GovernanceProposal {
        tally: VoteTally {
            yes: tally_value(&proposal_id, "yes_count", &tally.yes_count)?,
            abstain: tally_value(&proposal_id, "abstain_count", &tally.abstain_count)?,
            no: tally_value(&proposal_id, "no_count", &tally.no_count)?,
            no_with_veto: tally_value(&proposal_id, "no_with_veto_count", &tally.no_with_veto_count)?,
        },
        submit_time: required_time(&proposal_id, "submit_time", p.submit_time.as_deref())?,
        deposit_end_time: optional_time(&proposal_id, "deposit_end_time", p.deposit_end_time.as_deref())?,
        voting_start_time: optional_time(&proposal_id, "voting_start_time", p.voting_start_time.as_deref())?,
        voting_end_time: optional_time(&proposal_id, "voting_end_time", p.voting_end_time.as_deref())?,
        chain_id: chain_id.to_string(),
        title,
        description,
        proposal_type,
        status: p.status.clone(),
        total_deposit: p.total_deposit.clone(),
        proposer: non_empty(p.proposer.as_deref()),
        metadata: non_empty(p.metadata.as_deref()),
        proposal_id,
    })
}

fn normalize_v1beta1(p: &V1Beta1Proposal, chain_id: &str) -> Result<GovernanceProposal> {
    let proposal_id = required_id(p.proposal_id.as_deref(), "proposal_id")?;

    let tally = p
        .final_tally_result
        .as_ref()
        .ok_or_else(|| missing(&proposal_id, "final_tally_result"))?;

    let content = &p.content;
    let description =
        non_empty(content.summary.as_deref()).or_else(|| non_empty(content.description.as_deref()));

    Ok(GovernanceProposal {
        tally: VoteTally {
            yes: tally_value(&proposal_id, "yes", &tally.yes)?,
            abstain: tally_value(&proposal_id, "abstain", &tally.abstain)?,
            no: tally_value(&proposal_id, "no", &tally.no)?,
            no_with_veto: tally_value(&proposal_id, "no_with_veto", &tally.no_with_veto)?,
        },
        submit_time: required_time(&proposal_id, "submit_time", p.submit_time.as_deref())?,
        deposit_end_time: optional_time(&proposal_id, "deposit_end_time", p.deposit_end_time.as_deref())?,
        voting_start_time: optional_time(&proposal_id, "voting_start_time", p.voting_start_time.as_deref())?,
        voting_end_time: optional_time(&proposal_id, "voting_end_time", p.voting_end_time.as_deref())?,
        chain_id: chain_id.to_string(),
        title: non_empty(content.title.as_deref()),
        description,
        proposal_type: non_empty(content.type_url.as_deref()),
        status: p.status.clone(),
        total_deposit: p.total_deposit.clone(),
        proposer: non_empty(content.proposer.as_deref()),
        metadata: non_empty(content.metadata.as_deref()),
        proposal_id,
    })
}

/// Decode a `/validators` entry into a `Validator` for `chain_id`.
pub fn normalize_validator(value: Value, chain_id: &str) -> Result<Validator> {
    let raw: RawValidator = serde_json::from_value(value)
        .map_err(|e| SyncError::malformed(VALIDATOR, e.to_string()))?;

    let operator_address = raw.operator_address.trim().to_string();
    if operator_address.is_empty() {
        return Err(SyncError::malformed(VALIDATOR, "missing operator_address"));
    }

    let consensus_pubkey = match &raw.consensus_pubkey {
        Value::Null => "{}".to_string(),
        key => key.to_string(),
    };
    let rates = &raw.commission.commission_rates;
    let zero = || BigDecimal::from(0);

    Ok(Validator {
        chain_id: chain_id.to_string(),
        consensus_pubkey,
        jailed: raw.jailed,
        status: raw.status,
        tokens: parse_integer(VALIDATOR, "tokens", &raw.tokens, zero())?,
        delegator_shares: parse_decimal(VALIDATOR, "delegator_shares", &raw.delegator_shares, zero())?,
        moniker: raw.description.moniker,
        identity: raw.description.identity,
        website: raw.description.website,
        security_contact: raw.description.security_contact,
        details: raw.description.details,
        commission_rate: parse_decimal(VALIDATOR, "commission_rate", &rates.rate, zero())?,
        commission_max_rate: parse_decimal(VALIDATOR, "commission_max_rate", &rates.max_rate, zero())?,
        commission_max_change_rate: parse_decimal(
            VALIDATOR,
            "commission_max_change_rate",
            &rates.max_change_rate,
            zero(),
        )?,
        min_self_delegation: parse_integer(
            VALIDATOR,
            "min_self_delegation",
            &raw.min_self_delegation,
            BigDecimal::from(1),
        )?,
        operator_address,
    })
}

/// Decode a `/delegations` entry for the validator it was fetched under.
pub fn normalize_delegation(value: Value, validator_address: &str, chain_id: &str) -> Result<Delegator> {
    let raw: RawDelegationResponse = serde_json::from_value(value)
        .map_err(|e| SyncError::malformed(DELEGATOR, e.to_string()))?;

    let delegator_address = raw.delegation.delegator_address.trim().to_string();
    if delegator_address.is_empty() {
        return Err(SyncError::malformed(DELEGATOR, "missing delegator_address"));
    }

    let listed_under = raw.delegation.validator_address.trim();
    if !listed_under.is_empty() && listed_under != validator_address {
        return Err(SyncError::malformed(
            DELEGATOR,
            format!("{delegator_address} delegates to {listed_under}, not {validator_address}"),
        ));
    }

    Ok(Delegator {
        validator_address: validator_address.to_string(),
        chain_id: chain_id.to_string(),
        shares: parse_decimal(DELEGATOR, "shares", &raw.delegation.shares, BigDecimal::from(0))?,
        balance_amount: parse_integer(DELEGATOR, "balance.amount", &raw.balance.amount, BigDecimal::from(0))?,
        balance_denom: raw.balance.denom,
        delegator_address,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    non_empty(value.get(key).and_then(Value::as_str))
}

fn missing(proposal_id: &str, field: &str) -> SyncError {
    SyncError::malformed(PROPOSAL, format!("proposal {proposal_id} has no {field}"))
}

fn required_id(id: Option<&str>, field: &str) -> Result<String> {
    non_empty(id).ok_or_else(|| SyncError::malformed(PROPOSAL, format!("missing {field}")))
}

fn tally_value(proposal_id: &str, field: &str, raw: &str) -> Result<BigDecimal> {
    parse_integer(PROPOSAL, &format!("{proposal_id}.{field}"), raw, BigDecimal::from(0))
}

fn optional_time(proposal_id: &str, field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| {
                SyncError::malformed(PROPOSAL, format!("proposal {proposal_id} {field} = {raw:?}: {e}"))
            }),
    }
}

fn required_time(proposal_id: &str, field: &str, raw: Option<&str>) -> Result<DateTime<Utc>> {
    optional_time(proposal_id, field, raw)?.ok_or_else(|| missing(proposal_id, field))
}

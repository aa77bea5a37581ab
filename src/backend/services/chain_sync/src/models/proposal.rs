use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Governance REST API generations, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1,
    V1Beta1,
}

impl ApiVersion {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V1Beta1 => "v1beta1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Canonical vote tally, whatever field names the API used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    pub yes: BigDecimal,
    pub abstain: BigDecimal,
    pub no: BigDecimal,
    pub no_with_veto: BigDecimal,
}

/// A governance proposal as persisted. Keyed by `(proposal_id, chain_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceProposal {
    pub proposal_id: String,
    pub chain_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub proposal_type: Option<String>,
    pub status: String,
    pub tally: VoteTally,
    pub submit_time: DateTime<Utc>,
    pub deposit_end_time: Option<DateTime<Utc>>,
    pub voting_start_time: Option<DateTime<Utc>>,
    pub voting_end_time: Option<DateTime<Utc>>,
    pub total_deposit: serde_json::Value,
    pub proposer: Option<String>,
    pub metadata: Option<String>,
}

impl GovernanceProposal {
    /// Whether the fields that change over a proposal's lifetime already match `fresh`.
    pub fn same_mutable_state(&self, fresh: &GovernanceProposal) -> bool {
        let mut merged = self.clone();
        merged.apply_mutable_state(fresh);
        merged == *self
    }

    /// Copy the mutable fields from `fresh`, leaving creation-time fields alone.
    ///
    /// Phase timestamps only move forward: a time the chain has not reported
    /// yet keeps whatever was stored.
    pub fn apply_mutable_state(&mut self, fresh: &GovernanceProposal) {
        self.status = fresh.status.clone();
        self.tally = fresh.tally.clone();
        self.title = fresh.title.clone();
        self.description = fresh.description.clone();
        self.metadata = fresh.metadata.clone();
        self.total_deposit = fresh.total_deposit.clone();
        self.deposit_end_time = fresh.deposit_end_time.or(self.deposit_end_time);
        self.voting_start_time = fresh.voting_start_time.or(self.voting_start_time);
        self.voting_end_time = fresh.voting_end_time.or(self.voting_end_time);
    }
}

/// A proposal exactly as one API generation returned it.
///
/// Decoded at the fetch boundary and immediately normalized; nothing past the
/// normalizer looks at the variant.
#[derive(Debug, Clone)]
pub enum RawProposal {
    V1(V1Proposal),
    V1Beta1(V1Beta1Proposal),
}

/// `/cosmos/gov/v1/proposals` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct V1Proposal {
    pub id: Option<String>,
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
    #[serde(default)]
    pub status: String,
    pub final_tally_result: Option<V1Tally>,
    pub submit_time: Option<String>,
    pub deposit_end_time: Option<String>,
    #[serde(default)]
    pub total_deposit: serde_json::Value,
    pub voting_start_time: Option<String>,
    pub voting_end_time: Option<String>,
    pub metadata: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub proposer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V1Tally {
    pub yes_count: String,
    pub abstain_count: String,
    pub no_count: String,
    pub no_with_veto_count: String,
}

/// `/cosmos/gov/v1beta1/proposals` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct V1Beta1Proposal {
    pub proposal_id: Option<String>,
    #[serde(default)]
    pub content: V1Beta1Content,
    #[serde(default)]
    pub status: String,
    pub final_tally_result: Option<V1Beta1Tally>,
    pub submit_time: Option<String>,
    pub deposit_end_time: Option<String>,
    #[serde(default)]
    pub total_deposit: serde_json::Value,
    pub voting_start_time: Option<String>,
    pub voting_end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct V1Beta1Content {
    #[serde(rename = "@type")]
    pub type_url: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub proposer: Option<String>,
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct V1Beta1Tally {
    pub yes: String,
    pub abstain: String,
    pub no: String,
    pub no_with_veto: String,
}

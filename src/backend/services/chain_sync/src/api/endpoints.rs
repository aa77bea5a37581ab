//! REST paths of the Cosmos SDK staking and gov modules.

use crate::models::ApiVersion;

/// Page size for every list request.
pub const PAGE_LIMIT: u32 = 100;
/// Page size used when probing whether an endpoint exists.
pub const PROBE_LIMIT: u32 = 1;

pub const VALIDATORS_KEY: &str = "validators";
pub const DELEGATIONS_KEY: &str = "delegation_responses";
pub const PROPOSALS_KEY: &str = "proposals";

/// One way of reaching the proposals list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub url: String,
    pub version: ApiVersion,
}

fn base(api_endpoint: &str) -> &str {
    api_endpoint.trim_end_matches('/')
}

pub fn validators(api_endpoint: &str) -> String {
    format!("{}/cosmos/staking/v1beta1/validators", base(api_endpoint))
}

pub fn delegations(api_endpoint: &str, operator_address: &str) -> String {
    format!(
        "{}/cosmos/staking/v1beta1/validators/{}/delegations",
        base(api_endpoint),
        operator_address
    )
}

pub fn proposals(api_endpoint: &str, version: ApiVersion) -> String {
    format!("{}/cosmos/gov/{}/proposals", base(api_endpoint), version)
}

/// Proposal endpoints, newest first.
pub fn proposal_candidates(api_endpoint: &str) -> Vec<EndpointCandidate> {
    [ApiVersion::V1, ApiVersion::V1Beta1]
        .into_iter()
        .map(|version| EndpointCandidate {
            url: proposals(api_endpoint, version),
            version,
        })
        .collect()
}

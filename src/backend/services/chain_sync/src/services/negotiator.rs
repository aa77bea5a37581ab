use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::endpoints::{EndpointCandidate, PROBE_LIMIT};
use crate::api::{PageRequest, RestClient};
use crate::utils::errors::{Result, SyncError};

/// Picks the first endpoint variant that answers a one-record probe.
pub struct EndpointNegotiator {
    client: Arc<dyn RestClient>,
    probe_timeout: Duration,
}

impl EndpointNegotiator {
    pub fn new(client: Arc<dyn RestClient>, probe_timeout: Duration) -> Self {
        Self {
            client,
            probe_timeout,
        }
    }

    /// Probe `candidates` in order and return the first that responds with 200.
    pub async fn negotiate(&self, candidates: &[EndpointCandidate]) -> Result<EndpointCandidate> {
        for candidate in candidates {
            debug!(url = %candidate.url, version = %candidate.version, "Probing endpoint");

            let probe = PageRequest::first(candidate.url.clone(), PROBE_LIMIT)
                .with_timeout(self.probe_timeout);

            match self.client.get_page(&probe).await {
                Ok(_) => {
                    info!(url = %candidate.url, version = %candidate.version, "Using endpoint");
                    return Ok(candidate.clone());
                }
                Err(e) => warn!(url = %candidate.url, "Endpoint unavailable, trying next: {e}"),
            }
        }

        let tried: Vec<String> = candidates.iter().map(|c| c.url.clone()).collect();
        error!(?tried, "No endpoint variant responded");
        Err(SyncError::EndpointUnavailable { tried })
    }
}

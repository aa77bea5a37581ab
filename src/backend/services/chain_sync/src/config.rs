use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::endpoints::PAGE_LIMIT;

/// What to do when a fetched validator is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorPolicy {
    /// Insert if absent, otherwise leave the stored row alone.
    #[default]
    SkipExisting,
    /// Insert if absent, otherwise overwrite fields that changed upstream.
    Refresh,
}

/// Knobs for one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub page_limit: u32,
    /// Seconds allowed for each endpoint probe.
    pub probe_timeout_secs: u64,
    /// Seconds allowed for each page request.
    pub request_timeout_secs: u64,
    pub validator_policy: ValidatorPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            page_limit: PAGE_LIMIT,
            probe_timeout_secs: 10,
            request_timeout_secs: 30,
            validator_policy: ValidatorPolicy::SkipExisting,
        }
    }
}

impl SyncSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

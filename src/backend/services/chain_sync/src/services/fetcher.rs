use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api::{PageRequest, RestClient};
use crate::utils::errors::SyncError;

/// Records accumulated by one `fetch_all`.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<Value>,
    pub pages: usize,
    /// Why the loop stopped before the last page, if it did.
    pub truncated: Option<SyncError>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.truncated.is_none()
    }
}

/// Follows `pagination.next_key` cursors until the API reports no more pages.
pub struct PaginatedFetcher {
    client: Arc<dyn RestClient>,
    page_limit: u32,
}

impl PaginatedFetcher {
    pub fn new(client: Arc<dyn RestClient>, page_limit: u32) -> Self {
        Self { client, page_limit }
    }

    /// Fetch every page of `url`, collecting the array under `collection_key`.
    ///
    /// A failed page ends the loop; whatever was collected so far is returned
    /// together with the failure.
    pub async fn fetch_all(&self, url: &str, collection_key: &str) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = PageRequest::first(url, self.page_limit);
            if let Some(key) = &cursor {
                request = request.with_key(key.clone());
            }

            let mut body = match self.client.get_page(&request).await {
                Ok(body) => body,
                Err(e) => {
                    error!(
                        url,
                        page = outcome.pages,
                        fetched = outcome.records.len(),
                        "Stopping pagination: {e}"
                    );
                    outcome.truncated = Some(e);
                    break;
                }
            };

            let records = match body.get_mut(collection_key).map(Value::take) {
                Some(Value::Array(records)) => records,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    warn!(url, collection_key, "Expected an array, got {other}");
                    Vec::new()
                }
            };

            outcome.pages += 1;
            debug!(
                url,
                page = outcome.pages,
                count = records.len(),
                total = outcome.records.len() + records.len(),
                "Fetched page"
            );
            outcome.records.extend(records);

            match next_key(&body) {
                None => break,
                Some(key) if cursor.as_deref() == Some(key.as_str()) => {
                    warn!(url, key = %key, "Cursor did not advance, stopping pagination");
                    outcome.truncated = Some(SyncError::TransientFetchFailure {
                        url: url.to_string(),
                        reason: format!("next_key {key} repeated"),
                    });
                    break;
                }
                Some(key) => cursor = Some(key),
            }
        }

        info!(
            url,
            records = outcome.records.len(),
            pages = outcome.pages,
            complete = outcome.is_complete(),
            "Fetched {}",
            collection_key
        );
        outcome
    }
}

/// `pagination.next_key`, treating null, absent and empty as "no more pages".
fn next_key(body: &Value) -> Option<String> {
    body.pointer("/pagination/next_key")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
}

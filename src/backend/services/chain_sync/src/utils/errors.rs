use thiserror::Error;

/// Failures the sync pipeline distinguishes between.
///
/// None of these terminate the process: each one either aborts a single
/// operation, truncates a single fetch or skips a single record.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No chain configuration found for {0}")]
    ConfigNotFound(String),

    #[error("No proposal endpoint available, tried: {}", .tried.join(", "))]
    EndpointUnavailable { tried: Vec<String> },

    #[error("Fetch from {url} failed: {reason}")]
    TransientFetchFailure { url: String, reason: String },

    #[error("Failed to persist {entity} {key} on chain {chain_id}: {source:#}")]
    ReconciliationFailure {
        entity: &'static str,
        key: String,
        chain_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Malformed {entity} record: {reason}")]
    MalformedRecord { entity: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn malformed(entity: &'static str, reason: impl Into<String>) -> Self {
        SyncError::MalformedRecord {
            entity,
            reason: reason.into(),
        }
    }

    pub fn persist(
        entity: &'static str,
        key: impl Into<String>,
        chain_id: &str,
        source: anyhow::Error,
    ) -> Self {
        SyncError::ReconciliationFailure {
            entity,
            key: key.into(),
            chain_id: chain_id.to_string(),
            source,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SyncError::MalformedRecord { .. })
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

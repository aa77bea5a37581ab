use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::models::{ChainConfig, ChainDescriptor, ChainsFile};
use crate::repositories::ChainConfigRepository;
use crate::utils::errors::{Result, SyncError};

/// Counts from one `ChainRegistry::import`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Lookup and maintenance of configured chains.
#[derive(Clone)]
pub struct ChainRegistry {
    repository: Arc<dyn ChainConfigRepository>,
}

impl ChainRegistry {
    pub fn new(repository: Arc<dyn ChainConfigRepository>) -> Self {
        Self { repository }
    }

    /// Resolve a chain by name, falling back to chain_id.
    pub async fn get_chain(&self, name_or_id: &str) -> Result<ChainConfig> {
        let lookup = |e: anyhow::Error| SyncError::Config(format!("chain lookup for {name_or_id} failed: {e:#}"));

        if let Some(chain) = self.repository.find_by_name(name_or_id).await.map_err(lookup)? {
            return Ok(chain);
        }

        match self.repository.find_by_chain_id(name_or_id).await.map_err(lookup)? {
            Some(chain) => Ok(chain),
            None => {
                error!(chain = name_or_id, "No configuration found for chain");
                Err(SyncError::ConfigNotFound(name_or_id.to_string()))
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<ChainConfig>> {
        let mut chains = self
            .repository
            .list_chains()
            .await
            .map_err(|e| SyncError::Config(format!("listing chains failed: {e:#}")))?;
        chains.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(chains)
    }

    /// Every configured chain in import-file shape.
    pub async fn display(&self) -> Result<ChainsFile> {
        let chains = self.list().await?;
        Ok(ChainsFile {
            chains: chains.into_iter().map(ChainDescriptor::from).collect(),
        })
    }

    /// Insert new chains and update changed ones. Invalid descriptors are skipped.
    pub async fn import(&self, file: ChainsFile) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for descriptor in file.chains {
            let label = descriptor
                .name
                .clone()
                .or_else(|| descriptor.chain_id.clone())
                .unwrap_or_else(|| "<unnamed>".to_string());

            let chain = match descriptor.into_config() {
                Ok(chain) => chain,
                Err(missing) => {
                    warn!(chain = %label, ?missing, "Skipping chain with missing required fields");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.import_one(&chain).await {
                Ok(ImportAction::Added) => summary.added += 1,
                Ok(ImportAction::Updated) => summary.updated += 1,
                Ok(ImportAction::Unchanged) => summary.unchanged += 1,
                Ok(ImportAction::NameTaken(other)) => {
                    warn!(
                        name = %chain.name,
                        chain_id = %chain.chain_id,
                        existing_chain_id = %other,
                        "Skipping chain whose name is already used"
                    );
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(chain_id = %chain.chain_id, "Failed to import chain: {e:#}");
                    summary.failed += 1;
                }
            }
        }

        info!(
            added = summary.added,
            updated = summary.updated,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            failed = summary.failed,
            "Imported chain configuration"
        );
        summary
    }

    async fn import_one(&self, chain: &ChainConfig) -> anyhow::Result<ImportAction> {
        if let Some(owner) = self.repository.find_by_name(&chain.name).await? {
            if owner.chain_id != chain.chain_id {
                return Ok(ImportAction::NameTaken(owner.chain_id));
            }
        }

        match self.repository.find_by_chain_id(&chain.chain_id).await? {
            None => {
                self.repository.insert_chain(chain).await?;
                info!(name = %chain.name, chain_id = %chain.chain_id, "Added chain");
                Ok(ImportAction::Added)
            }
            Some(stored) if stored == *chain => {
                debug!(chain_id = %chain.chain_id, "Chain configuration unchanged");
                Ok(ImportAction::Unchanged)
            }
            Some(_) => {
                self.repository.update_chain(chain).await?;
                info!(name = %chain.name, chain_id = %chain.chain_id, "Updated chain");
                Ok(ImportAction::Updated)
            }
        }
    }
}

enum ImportAction {
    Added,
    Updated,
    Unchanged,
    NameTaken(String),
}

/// Read a `{"chains": [...]}` descriptor file.
pub fn load_chains_file(path: &Path) -> Result<ChainsFile> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SyncError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| SyncError::Config(format!("invalid chain file {}: {e}", path.display())))
}

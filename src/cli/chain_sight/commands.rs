use anyhow::Result;
use chain_sync::{
    models::SyncSummary,
    services::{load_chains_file, ImportSummary},
    SyncService,
};
use std::path::Path;

/// Command handlers. Each returns whether the command succeeded.
pub struct Commands {
    service: SyncService,
}

impl Commands {
    pub fn new(service: SyncService) -> Self {
        Self { service }
    }

    /// Import chain descriptors from a JSON file
    pub async fn import_config(&self, path: &Path) -> Result<bool> {
        let file = load_chains_file(path)?;
        let summary = self.service.registry().import(file).await;
        println!("{}", format_import(&summary));
        Ok(summary.failed == 0)
    }

    /// Print every configured chain as JSON
    pub async fn display_config(&self) -> Result<bool> {
        let chains = self.service.registry().display().await?;
        println!("{}", serde_json::to_string_pretty(&chains)?);
        Ok(true)
    }

    /// Remove a chain and all of its records
    pub async fn remove_chain(&self, chain: &str) -> Result<bool> {
        let removed = self.service.remove_chain(chain).await?;
        println!(
            "Removed {}: {} delegators, {} validators, {} proposals",
            chain, removed.delegators, removed.validators, removed.proposals
        );
        Ok(true)
    }

    pub async fn fetch_validators(&self, chain: &str) -> Result<bool> {
        Ok(print_summary(self.service.sync_validators(chain).await))
    }

    pub async fn fetch_governance(&self, chain: &str) -> Result<bool> {
        Ok(print_summary(self.service.sync_governance(chain).await))
    }
}

fn format_import(summary: &ImportSummary) -> String {
    format!(
        "Chains imported: added={} updated={} unchanged={} skipped={} failed={}",
        summary.added, summary.updated, summary.unchanged, summary.skipped, summary.failed
    )
}

fn print_summary(summary: SyncSummary) -> bool {
    println!("{summary}");
    !summary.has_failures()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_import() {
        let summary = ImportSummary {
            added: 2,
            updated: 1,
            unchanged: 0,
            skipped: 1,
            failed: 0,
        };
        assert_eq!(
            format_import(&summary),
            "Chains imported: added=2 updated=1 unchanged=0 skipped=1 failed=0"
        );
    }
}

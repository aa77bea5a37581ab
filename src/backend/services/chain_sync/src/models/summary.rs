use std::fmt;

use serde::Serialize;

use crate::utils::errors::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    Validators,
    Governance,
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncKind::Validators => f.write_str("validators"),
            SyncKind::Governance => f.write_str("governance"),
        }
    }
}

/// What reconciling a single record did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Inserted,
    Updated,
    /// Present and identical.
    Unchanged,
    /// Present and left alone by policy.
    Skipped,
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    /// Completed, but upstream returned nothing or a fetch was cut short.
    Warning(String),
    /// Stopped before reconciling anything.
    Aborted(String),
}

/// Per-run counters, returned by every sync operation.
/// Rows deleted by a chain removal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemovalSummary {
    pub delegators: u64,
    pub validators: u64,
    pub proposals: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub kind: SyncKind,
    pub chain: String,
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub failed: usize,
    pub malformed: usize,
    pub truncated_fetches: usize,
    pub status: RunStatus,
}

impl SyncSummary {
    pub fn new(kind: SyncKind, chain: impl Into<String>) -> Self {
        Self {
            kind,
            chain: chain.into(),
            fetched: 0,
            inserted: 0,
            updated: 0,
            unchanged: 0,
            skipped: 0,
            deleted: 0,
            failed: 0,
            malformed: 0,
            truncated_fetches: 0,
            status: RunStatus::Success,
        }
    }

    /// Count the result of reconciling one record.
    pub fn record(&mut self, result: &Result<ReconcileOutcome, SyncError>) {
        match result {
            Ok(ReconcileOutcome::Inserted) => self.inserted += 1,
            Ok(ReconcileOutcome::Updated) => self.updated += 1,
            Ok(ReconcileOutcome::Unchanged) => self.unchanged += 1,
            Ok(ReconcileOutcome::Skipped) => self.skipped += 1,
            Err(e) if e.is_malformed() => self.malformed += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn aborted(mut self, reason: impl Into<String>) -> Self {
        self.status = RunStatus::Aborted(reason.into());
        self
    }

    /// Settle the terminal status from the counters.
    pub fn finish(mut self) -> Self {
        if matches!(self.status, RunStatus::Aborted(_)) {
            return self;
        }

        self.status = if self.fetched == 0 {
            RunStatus::Warning(format!("no {} found upstream", self.kind))
        } else if self.truncated_fetches > 0 {
            RunStatus::Warning(format!("{} fetch(es) ended early", self.truncated_fetches))
        } else {
            RunStatus::Success
        };
        self
    }

    /// Inserts, updates and deletes combined.
    pub fn changes(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }

    /// Whether the caller should treat the run as failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || matches!(self.status, RunStatus::Aborted(_))
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sync for {}: fetched={} inserted={} updated={} unchanged={} skipped={} deleted={} failed={} malformed={}",
            self.kind,
            self.chain,
            self.fetched,
            self.inserted,
            self.updated,
            self.unchanged,
            self.skipped,
            self.deleted,
            self.failed,
            self.malformed,
        )?;
        match &self.status {
            RunStatus::Success => Ok(()),
            RunStatus::Warning(reason) => write!(f, " (warning: {reason})"),
            RunStatus::Aborted(reason) => write!(f, " (aborted: {reason})"),
        }
    }
}

pub mod chain;
pub mod delegator;
pub mod proposal;
pub mod summary;
pub mod validator;

pub use chain::{ChainConfig, ChainDescriptor, ChainsFile};
pub use delegator::Delegator;
pub use proposal::{ApiVersion, GovernanceProposal, RawProposal, VoteTally};
pub use summary::{ReconcileOutcome, RemovalSummary, RunStatus, SyncKind, SyncSummary};
pub use validator::Validator;

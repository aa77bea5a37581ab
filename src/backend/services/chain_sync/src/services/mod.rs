pub mod chain_registry;
pub mod fetcher;
pub mod negotiator;
pub mod normalizer;
pub mod reconciler;
pub mod sync_service;

pub use chain_registry::{load_chains_file, ChainRegistry, ImportSummary};
pub use fetcher::{FetchOutcome, PaginatedFetcher};
pub use negotiator::EndpointNegotiator;
pub use reconciler::{ChainScope, PruneOutcome, Reconciler};
pub use sync_service::SyncService;

//! Synchronizes validators, delegators and governance proposals of Cosmos SDK
//! chains from their REST API into PostgreSQL.

pub mod api;
pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use config::{SyncSettings, ValidatorPolicy};
pub use repositories::Repositories;
pub use services::{ChainRegistry, Reconciler, SyncService};
pub use utils::errors::SyncError;

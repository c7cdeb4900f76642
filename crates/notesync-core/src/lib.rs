//! notesync-core - Account synchronization engine for notesync
//!
//! This crate contains the sync data model, the merge rules for partial
//! download and send results, conflict resolution, stale data expunging and
//! the account synchronizer state machine. Talking to the remote service and
//! persisting data locally are left to the collaborator traits it defines.

pub mod auth;
pub mod config;
pub mod conflict;
pub mod downloader;
pub mod error;
pub mod expunger;
pub mod local_store;
pub mod models;
pub mod sender;
pub mod storage;
pub mod sync;
pub mod synchronizer;
mod util;

#[cfg(test)]
mod test_support;

pub use config::SyncEngineConfig;
pub use conflict::{ConflictResolution, SimpleSyncConflictResolver, SyncConflictResolver};
pub use error::{Error, Result};
pub use expunger::{FullSyncStaleDataExpunger, PreservedGuids};
pub use synchronizer::{AccountSynchronizer, AccountSynchronizerCallback};

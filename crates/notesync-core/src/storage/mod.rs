//! Storage abstractions for sync watermarks and downloaded sync chunks.

use crate::models::{Account, SyncChunk};
use crate::sync::SyncState;
use crate::Result;

/// Durable storage of per-account sync watermarks
pub trait SyncStateStorage: Send + Sync {
    fn get_sync_state(&self, account: &Account) -> Result<Option<SyncState>>;
    fn set_sync_state(&self, account: &Account, sync_state: &SyncState) -> Result<()>;
}

/// Durable holding area for sync chunks that were downloaded but not yet
/// fully applied, so a crashed or interrupted pass need not download them again
pub trait SyncChunksStorage: Send + Sync {
    fn put_user_own_sync_chunks(&self, sync_chunks: Vec<SyncChunk>) -> Result<()>;

    fn put_linked_notebook_sync_chunks(
        &self,
        linked_notebook_guid: &str,
        sync_chunks: Vec<SyncChunk>,
    ) -> Result<()>;

    /// Make previously put chunks durable
    fn flush(&self) -> Result<()>;
}

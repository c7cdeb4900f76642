//! Sync result types and their merge rules

mod counters;
mod download_status;
mod item_error;
mod send_status;
mod stop_error;
mod sync_result;
mod sync_state;

pub use counters::SyncChunksDataCounters;
pub use download_status::{DownloadNotesStatus, DownloadResourcesStatus};
pub use item_error::{merge_by_guid, ItemWithError};
pub use send_status::SendStatus;
pub use stop_error::StopSynchronizationError;
pub use sync_result::{DownloadScopeStatus, SyncResult};
pub use sync_state::SyncState;

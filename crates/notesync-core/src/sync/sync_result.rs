//! Accumulated outcome of one synchronization pass

use std::collections::HashMap;

use crate::downloader::{DownloadResult, DownloadScopeResult};
use crate::models::Guid;
use crate::sender::SendResult;

use super::{
    DownloadNotesStatus, DownloadResourcesStatus, SendStatus, StopSynchronizationError,
    SyncChunksDataCounters, SyncState,
};

/// Download outcome accumulated for one scope
#[derive(Debug, Clone, Default)]
pub struct DownloadScopeStatus {
    pub sync_chunks_data_counters: SyncChunksDataCounters,
    pub download_notes_status: DownloadNotesStatus,
    pub download_resources_status: DownloadResourcesStatus,
}

impl DownloadScopeStatus {
    fn merge(&mut self, result: DownloadScopeResult) {
        if let Some(counters) = result.sync_chunks_data_counters {
            self.sync_chunks_data_counters.merge(&counters);
        }
        if let Some(status) = result.download_notes_status {
            self.download_notes_status.merge(status);
        }
        if let Some(status) = result.download_resources_status {
            self.download_resources_status.merge(status);
        }
    }
}

/// Everything a `synchronize()` call achieved, across all of its restarts.
///
/// Merging always folds into existing counters and maps, so a retry never
/// loses progress accumulated by an earlier attempt.
#[derive(Debug, Clone, Default)]
pub struct SyncResult {
    pub sync_state: SyncState,
    pub user_account_download: DownloadScopeStatus,
    pub linked_notebook_downloads: HashMap<Guid, DownloadScopeStatus>,
    pub user_account_send_status: SendStatus,
    pub linked_notebook_send_statuses: HashMap<Guid, SendStatus>,
    pub stop_synchronization_error: StopSynchronizationError,
}

impl SyncResult {
    pub fn merge_download_result(&mut self, result: DownloadResult) {
        if let Some(sync_state) = result.sync_state {
            self.sync_state.merge(sync_state);
        }

        self.user_account_download.merge(result.user_own_result);
        for (guid, scope_result) in result.linked_notebook_results {
            self.linked_notebook_downloads
                .entry(guid)
                .or_default()
                .merge(scope_result);
        }
    }

    pub fn merge_send_result(&mut self, result: SendResult) {
        if let Some(sync_state) = result.sync_state {
            self.sync_state.merge(sync_state);
        }

        if let Some(status) = result.user_own_result {
            self.user_account_send_status.merge(status);
        }
        for (guid, status) in result.linked_notebook_results {
            self.linked_notebook_send_statuses
                .entry(guid)
                .or_default()
                .merge(status);
        }
    }

    /// Fold progress counters captured outside of a structured download result
    pub fn merge_user_own_counters(&mut self, counters: &SyncChunksDataCounters) {
        self.user_account_download
            .sync_chunks_data_counters
            .merge(counters);
    }

    pub fn merge_linked_notebook_counters(
        &mut self,
        linked_notebook_guid: Guid,
        counters: &SyncChunksDataCounters,
    ) {
        self.linked_notebook_downloads
            .entry(linked_notebook_guid)
            .or_default()
            .sync_chunks_data_counters
            .merge(counters);
    }
}

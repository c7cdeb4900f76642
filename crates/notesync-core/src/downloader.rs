//! Downloader collaborator interface
//!
//! The downloader pulls sync chunks and note/resource bodies for the user's
//! own data and for every linked notebook, applies them to the local store and
//! reports a per-scope result. It owns its internal concurrency; the
//! synchronizer only sees one aggregated [`DownloadResult`] per call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::models::{Guid, LinkedNotebook, SyncChunk};
use crate::sync::{
    DownloadNotesStatus, DownloadResourcesStatus, StopSynchronizationError,
    SyncChunksDataCounters, SyncState,
};
use crate::Result;

/// Result of downloading one scope (user-own data or one linked notebook)
#[derive(Debug, Clone, Default)]
pub struct DownloadScopeResult {
    pub sync_chunks_data_counters: Option<SyncChunksDataCounters>,
    pub sync_chunks_downloaded: bool,
    pub download_notes_status: Option<DownloadNotesStatus>,
    pub download_resources_status: Option<DownloadResourcesStatus>,
}

impl DownloadScopeResult {
    fn stop_synchronization_errors(&self) -> impl Iterator<Item = StopSynchronizationError> + '_ {
        let notes_error = self
            .download_notes_status
            .as_ref()
            .map(|status| status.stop_synchronization_error);
        let resources_error = self
            .download_resources_status
            .as_ref()
            .map(|status| status.stop_synchronization_error);
        notes_error.into_iter().chain(resources_error)
    }

    /// Whether either the notes or the resources status reports expired
    /// authentication
    #[must_use]
    pub fn is_authentication_expired(&self) -> bool {
        self.stop_synchronization_errors()
            .any(|error| error.is_authentication_expired())
    }

    /// Rate limit reported by the notes status, else by the resources status
    #[must_use]
    pub fn rate_limit(&self) -> Option<StopSynchronizationError> {
        self.stop_synchronization_errors()
            .find(StopSynchronizationError::is_rate_limit_reached)
    }

    /// Whether this scope brought in any data at all
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.sync_chunks_downloaded
            || self
                .download_notes_status
                .as_ref()
                .is_some_and(DownloadNotesStatus::has_data)
            || self
                .download_resources_status
                .as_ref()
                .is_some_and(DownloadResourcesStatus::has_data)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DownloadResult {
    pub user_own_result: DownloadScopeResult,
    pub linked_notebook_results: HashMap<Guid, DownloadScopeResult>,
    pub sync_state: Option<SyncState>,
}

impl DownloadResult {
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.user_own_result.has_data()
            || self
                .linked_notebook_results
                .values()
                .any(DownloadScopeResult::has_data)
    }
}

/// Progress notifications emitted while downloading.
///
/// May be invoked from any thread; implementations must not block.
#[allow(unused_variables)]
pub trait DownloaderCallback: Send + Sync {
    fn on_sync_chunks_download_progress(
        &self,
        highest_downloaded_usn: i32,
        highest_server_usn: i32,
        last_previous_usn: i32,
    ) {
    }

    fn on_sync_chunks_downloaded(&self, sync_chunks: &[SyncChunk]) {}

    fn on_sync_chunks_data_processing_progress(&self, counters: &SyncChunksDataCounters) {}

    fn on_start_linked_notebooks_data_downloading(&self, linked_notebooks: &[LinkedNotebook]) {}

    fn on_linked_notebook_sync_chunks_download_progress(
        &self,
        highest_downloaded_usn: i32,
        highest_server_usn: i32,
        last_previous_usn: i32,
        linked_notebook: &LinkedNotebook,
    ) {
    }

    fn on_linked_notebook_sync_chunks_downloaded(
        &self,
        linked_notebook: &LinkedNotebook,
        sync_chunks: &[SyncChunk],
    ) {
    }

    fn on_linked_notebook_sync_chunks_data_processing_progress(
        &self,
        counters: &SyncChunksDataCounters,
        linked_notebook: &LinkedNotebook,
    ) {
    }

    fn on_notes_download_progress(&self, notes_downloaded: u32, total_notes_to_download: u32) {}

    fn on_linked_notebook_notes_download_progress(
        &self,
        notes_downloaded: u32,
        total_notes_to_download: u32,
        linked_notebook: &LinkedNotebook,
    ) {
    }

    fn on_resources_download_progress(
        &self,
        resources_downloaded: u32,
        total_resources_to_download: u32,
    ) {
    }

    fn on_linked_notebook_resources_download_progress(
        &self,
        resources_downloaded: u32,
        total_resources_to_download: u32,
        linked_notebook: &LinkedNotebook,
    ) {
    }
}

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download everything new for the user's own data and all linked notebooks.
    ///
    /// Per-item failures and stop conditions are reported inside the result.
    /// An `Err` means sync chunk downloading itself failed.
    async fn download(
        &self,
        canceler: CancellationToken,
        callback: Arc<dyn DownloaderCallback>,
    ) -> Result<DownloadResult>;
}

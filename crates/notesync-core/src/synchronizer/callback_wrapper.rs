//! Adapter between the collaborators' progress callbacks and the caller's
//! callback

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::downloader::DownloaderCallback;
use crate::models::{Guid, LinkedNotebook, SyncChunk};
use crate::sender::SenderCallback;
use crate::sync::{SendStatus, SyncChunksDataCounters};
use crate::util::lock;

/// Progress notifications for a whole synchronization pass
#[allow(unused_variables)]
pub trait AccountSynchronizerCallback: DownloaderCallback + SenderCallback {
    /// Downloading finished with a structured result
    fn on_download_finished(&self, data_downloaded: bool) {}
}

/// Sync chunks downloaded during the current pass and not yet persisted
#[derive(Debug, Default)]
pub(crate) struct DownloadedSyncChunks {
    pub user_own: Vec<SyncChunk>,
    pub linked_notebooks: HashMap<Guid, Vec<SyncChunk>>,
}

impl DownloadedSyncChunks {
    pub fn is_empty(&self) -> bool {
        self.user_own.is_empty() && self.linked_notebooks.values().all(Vec::is_empty)
    }
}

/// Latest data processing counters reported per scope
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct CachedCounters {
    pub user_own: Option<SyncChunksDataCounters>,
    pub linked_notebooks: HashMap<Guid, SyncChunksDataCounters>,
}

/// Forwards every notification to the caller's callback while it is alive,
/// caching the counters and buffering the sync chunks on the way.
pub(crate) struct CallbackWrapper {
    callback: Weak<dyn AccountSynchronizerCallback>,
    counters: Mutex<CachedCounters>,
    sync_chunks: Arc<Mutex<DownloadedSyncChunks>>,
}

impl CallbackWrapper {
    pub fn new(
        callback: Weak<dyn AccountSynchronizerCallback>,
        sync_chunks: Arc<Mutex<DownloadedSyncChunks>>,
    ) -> Self {
        Self {
            callback,
            counters: Mutex::new(CachedCounters::default()),
            sync_chunks,
        }
    }

    fn forward(&self, notify: impl FnOnce(&dyn AccountSynchronizerCallback)) {
        if let Some(callback) = self.callback.upgrade() {
            notify(callback.as_ref());
        }
    }

    pub fn reset_counters(&self) {
        *lock(&self.counters) = CachedCounters::default();
    }

    pub fn counters(&self) -> CachedCounters {
        lock(&self.counters).clone()
    }

    pub fn notify_download_finished(&self, data_downloaded: bool) {
        self.forward(|callback| callback.on_download_finished(data_downloaded));
    }
}

impl DownloaderCallback for CallbackWrapper {
    fn on_sync_chunks_download_progress(
        &self,
        highest_downloaded_usn: i32,
        highest_server_usn: i32,
        last_previous_usn: i32,
    ) {
        self.forward(|callback| {
            callback.on_sync_chunks_download_progress(
                highest_downloaded_usn,
                highest_server_usn,
                last_previous_usn,
            );
        });
    }

    fn on_sync_chunks_downloaded(&self, sync_chunks: &[SyncChunk]) {
        lock(&self.sync_chunks)
            .user_own
            .extend_from_slice(sync_chunks);
        self.forward(|callback| callback.on_sync_chunks_downloaded(sync_chunks));
    }

    fn on_sync_chunks_data_processing_progress(&self, counters: &SyncChunksDataCounters) {
        lock(&self.counters).user_own = Some(counters.clone());
        self.forward(|callback| callback.on_sync_chunks_data_processing_progress(counters));
    }

    fn on_start_linked_notebooks_data_downloading(&self, linked_notebooks: &[LinkedNotebook]) {
        self.forward(|callback| {
            callback.on_start_linked_notebooks_data_downloading(linked_notebooks);
        });
    }

    fn on_linked_notebook_sync_chunks_download_progress(
        &self,
        highest_downloaded_usn: i32,
        highest_server_usn: i32,
        last_previous_usn: i32,
        linked_notebook: &LinkedNotebook,
    ) {
        self.forward(|callback| {
            callback.on_linked_notebook_sync_chunks_download_progress(
                highest_downloaded_usn,
                highest_server_usn,
                last_previous_usn,
                linked_notebook,
            );
        });
    }

    fn on_linked_notebook_sync_chunks_downloaded(
        &self,
        linked_notebook: &LinkedNotebook,
        sync_chunks: &[SyncChunk],
    ) {
        if let Some(guid) = linked_notebook.guid.as_ref() {
            lock(&self.sync_chunks)
                .linked_notebooks
                .entry(guid.clone())
                .or_default()
                .extend_from_slice(sync_chunks);
        } else {
            tracing::warn!(
                share_name = ?linked_notebook.share_name,
                "Dropping sync chunks of linked notebook without guid"
            );
        }
        self.forward(|callback| {
            callback.on_linked_notebook_sync_chunks_downloaded(linked_notebook, sync_chunks);
        });
    }

    fn on_linked_notebook_sync_chunks_data_processing_progress(
        &self,
        counters: &SyncChunksDataCounters,
        linked_notebook: &LinkedNotebook,
    ) {
        if let Some(guid) = linked_notebook.guid.as_ref() {
            lock(&self.counters)
                .linked_notebooks
                .insert(guid.clone(), counters.clone());
        }
        self.forward(|callback| {
            callback.on_linked_notebook_sync_chunks_data_processing_progress(
                counters,
                linked_notebook,
            );
        });
    }

    fn on_notes_download_progress(&self, notes_downloaded: u32, total_notes_to_download: u32) {
        self.forward(|callback| {
            callback.on_notes_download_progress(notes_downloaded, total_notes_to_download);
        });
    }

    fn on_linked_notebook_notes_download_progress(
        &self,
        notes_downloaded: u32,
        total_notes_to_download: u32,
        linked_notebook: &LinkedNotebook,
    ) {
        self.forward(|callback| {
            callback.on_linked_notebook_notes_download_progress(
                notes_downloaded,
                total_notes_to_download,
                linked_notebook,
            );
        });
    }

    fn on_resources_download_progress(
        &self,
        resources_downloaded: u32,
        total_resources_to_download: u32,
    ) {
        self.forward(|callback| {
            callback.on_resources_download_progress(
                resources_downloaded,
                total_resources_to_download,
            );
        });
    }

    fn on_linked_notebook_resources_download_progress(
        &self,
        resources_downloaded: u32,
        total_resources_to_download: u32,
        linked_notebook: &LinkedNotebook,
    ) {
        self.forward(|callback| {
            callback.on_linked_notebook_resources_download_progress(
                resources_downloaded,
                total_resources_to_download,
                linked_notebook,
            );
        });
    }
}

impl SenderCallback for CallbackWrapper {
    fn on_user_own_send_status_update(&self, send_status: &SendStatus) {
        self.forward(|callback| callback.on_user_own_send_status_update(send_status));
    }

    fn on_linked_notebook_send_status_update(
        &self,
        linked_notebook_guid: &str,
        send_status: &SendStatus,
    ) {
        self.forward(|callback| {
            callback.on_linked_notebook_send_status_update(linked_notebook_guid, send_status);
        });
    }
}

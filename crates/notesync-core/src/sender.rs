//! Sender collaborator interface

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::models::Guid;
use crate::sync::{SendStatus, SyncState};
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct SendResult {
    pub user_own_result: Option<SendStatus>,
    pub linked_notebook_results: HashMap<Guid, SendStatus>,
    pub sync_state: Option<SyncState>,
}

impl SendResult {
    /// Whether any scope asked for another incremental download
    #[must_use]
    pub fn need_to_repeat_incremental_sync(&self) -> bool {
        self.user_own_result
            .as_ref()
            .is_some_and(|status| status.need_to_repeat_incremental_sync)
            || self
                .linked_notebook_results
                .values()
                .any(|status| status.need_to_repeat_incremental_sync)
    }
}

/// Progress notifications emitted while sending
#[allow(unused_variables)]
pub trait SenderCallback: Send + Sync {
    fn on_user_own_send_status_update(&self, send_status: &SendStatus) {}

    fn on_linked_notebook_send_status_update(
        &self,
        linked_notebook_guid: &str,
        send_status: &SendStatus,
    ) {
    }
}

#[async_trait]
pub trait Sender: Send + Sync {
    /// Push locally modified and new notebooks, tags, notes and saved
    /// searches upstream, per scope.
    async fn send(
        &self,
        canceler: CancellationToken,
        callback: Arc<dyn SenderCallback>,
    ) -> Result<SendResult>;
}

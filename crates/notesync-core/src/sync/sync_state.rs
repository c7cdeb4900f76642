//! Per-account sync watermarks

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Guid;

/// Update counters and last sync times for the user's own data and for each
/// linked notebook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub user_data_update_count: i32,
    /// Unix ms
    pub user_data_last_sync_time: i64,
    #[serde(default)]
    pub linked_notebook_update_counts: HashMap<Guid, i32>,
    /// Unix ms per linked notebook
    #[serde(default)]
    pub linked_notebook_last_sync_times: HashMap<Guid, i64>,
}

impl SyncState {
    /// Fold a more recently produced state into this one.
    ///
    /// User-own values are taken from `newer`; linked notebook entries are
    /// overwritten per key and entries `newer` does not mention are kept.
    pub fn merge(&mut self, newer: Self) {
        self.user_data_update_count = newer.user_data_update_count;
        self.user_data_last_sync_time = newer.user_data_last_sync_time;
        self.linked_notebook_update_counts
            .extend(newer.linked_notebook_update_counts);
        self.linked_notebook_last_sync_times
            .extend(newer.linked_notebook_last_sync_times);
    }
}

//! Outcome of sending local changes for one scope

use crate::models::{Note, Notebook, SavedSearch, Tag};

use super::item_error::{merge_by_guid, ItemWithError};
use super::StopSynchronizationError;

#[derive(Debug, Clone, Default)]
pub struct SendStatus {
    pub total_attempted_to_send_notes: u64,
    pub total_attempted_to_send_notebooks: u64,
    pub total_attempted_to_send_saved_searches: u64,
    pub total_attempted_to_send_tags: u64,

    pub total_successfully_sent_notes: u64,
    pub total_successfully_sent_notebooks: u64,
    pub total_successfully_sent_saved_searches: u64,
    pub total_successfully_sent_tags: u64,

    pub failed_to_send_notes: Vec<ItemWithError<Note>>,
    pub failed_to_send_notebooks: Vec<ItemWithError<Notebook>>,
    pub failed_to_send_saved_searches: Vec<ItemWithError<SavedSearch>>,
    pub failed_to_send_tags: Vec<ItemWithError<Tag>>,

    pub stop_synchronization_error: StopSynchronizationError,

    /// Set when the server's update counter moved past what the sender
    /// expected, meaning someone else changed data concurrently
    pub need_to_repeat_incremental_sync: bool,
}

impl SendStatus {
    /// Fold a later status for the same scope into this one
    pub fn merge(&mut self, other: Self) {
        self.total_attempted_to_send_notes += other.total_attempted_to_send_notes;
        self.total_attempted_to_send_notebooks += other.total_attempted_to_send_notebooks;
        self.total_attempted_to_send_saved_searches +=
            other.total_attempted_to_send_saved_searches;
        self.total_attempted_to_send_tags += other.total_attempted_to_send_tags;

        self.total_successfully_sent_notes += other.total_successfully_sent_notes;
        self.total_successfully_sent_notebooks += other.total_successfully_sent_notebooks;
        self.total_successfully_sent_saved_searches +=
            other.total_successfully_sent_saved_searches;
        self.total_successfully_sent_tags += other.total_successfully_sent_tags;

        merge_by_guid(&mut self.failed_to_send_notes, other.failed_to_send_notes);
        merge_by_guid(
            &mut self.failed_to_send_notebooks,
            other.failed_to_send_notebooks,
        );
        merge_by_guid(
            &mut self.failed_to_send_saved_searches,
            other.failed_to_send_saved_searches,
        );
        merge_by_guid(&mut self.failed_to_send_tags, other.failed_to_send_tags);

        self.stop_synchronization_error = other.stop_synchronization_error;
        self.need_to_repeat_incremental_sync |= other.need_to_repeat_incremental_sync;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn tag_with_guid(guid: &str) -> Tag {
        let mut tag = Tag::new(guid);
        tag.guid = Some(guid.to_string());
        tag
    }

    #[test]
    fn merging_twice_sums_counts_and_dedupes_failures() {
        let status = SendStatus {
            total_attempted_to_send_tags: 3,
            total_successfully_sent_tags: 2,
            total_attempted_to_send_notes: 1,
            failed_to_send_tags: vec![ItemWithError::new(
                tag_with_guid("t1"),
                Error::Remote("conflict".to_string()),
            )],
            ..Default::default()
        };

        let mut accumulated = SendStatus::default();
        accumulated.merge(status.clone());
        accumulated.merge(status);

        assert_eq!(accumulated.total_attempted_to_send_tags, 6);
        assert_eq!(accumulated.total_successfully_sent_tags, 4);
        assert_eq!(accumulated.total_attempted_to_send_notes, 2);
        assert_eq!(accumulated.failed_to_send_tags.len(), 1);
    }

    #[test]
    fn repeat_incremental_sync_flag_is_sticky() {
        let mut accumulated = SendStatus {
            need_to_repeat_incremental_sync: true,
            ..Default::default()
        };
        accumulated.merge(SendStatus::default());
        assert!(accumulated.need_to_repeat_incremental_sync);
    }
}

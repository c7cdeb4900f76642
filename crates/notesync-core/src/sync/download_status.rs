//! Outcome of downloading note and resource bodies for one scope

use std::collections::{HashMap, HashSet};

use crate::models::{Guid, Note, Resource};

use super::item_error::{merge_by_guid, ItemWithError};
use super::StopSynchronizationError;

#[derive(Debug, Clone, Default)]
pub struct DownloadNotesStatus {
    pub total_new_notes: u64,
    pub total_updated_notes: u64,
    pub total_expunged_notes: u64,

    pub notes_which_failed_to_download: Vec<ItemWithError<Note>>,
    pub notes_which_failed_to_process: Vec<ItemWithError<Note>>,
    pub note_guids_which_failed_to_expunge: Vec<ItemWithError<Guid>>,

    pub processed_note_guids_and_usns: HashMap<Guid, i32>,
    pub cancelled_note_guids_and_usns: HashMap<Guid, i32>,
    pub expunged_note_guids: HashSet<Guid>,

    pub stop_synchronization_error: StopSynchronizationError,
}

impl DownloadNotesStatus {
    /// Fold a later status for the same scope into this one
    pub fn merge(&mut self, other: Self) {
        self.total_new_notes += other.total_new_notes;
        self.total_updated_notes += other.total_updated_notes;
        self.total_expunged_notes += other.total_expunged_notes;

        merge_by_guid(
            &mut self.notes_which_failed_to_download,
            other.notes_which_failed_to_download,
        );
        merge_by_guid(
            &mut self.notes_which_failed_to_process,
            other.notes_which_failed_to_process,
        );
        merge_by_guid(
            &mut self.note_guids_which_failed_to_expunge,
            other.note_guids_which_failed_to_expunge,
        );

        self.processed_note_guids_and_usns
            .extend(other.processed_note_guids_and_usns);
        self.cancelled_note_guids_and_usns
            .extend(other.cancelled_note_guids_and_usns);
        self.expunged_note_guids.extend(other.expunged_note_guids);

        self.stop_synchronization_error = other.stop_synchronization_error;
    }

    /// Whether any note body was downloaded or expunged
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.total_new_notes > 0 || self.total_updated_notes > 0 || self.total_expunged_notes > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DownloadResourcesStatus {
    pub total_new_resources: u64,
    pub total_updated_resources: u64,

    pub resources_which_failed_to_download: Vec<ItemWithError<Resource>>,
    pub resources_which_failed_to_process: Vec<ItemWithError<Resource>>,

    pub processed_resource_guids_and_usns: HashMap<Guid, i32>,
    pub cancelled_resource_guids_and_usns: HashMap<Guid, i32>,

    pub stop_synchronization_error: StopSynchronizationError,
}

impl DownloadResourcesStatus {
    /// Fold a later status for the same scope into this one
    pub fn merge(&mut self, other: Self) {
        self.total_new_resources += other.total_new_resources;
        self.total_updated_resources += other.total_updated_resources;

        merge_by_guid(
            &mut self.resources_which_failed_to_download,
            other.resources_which_failed_to_download,
        );
        merge_by_guid(
            &mut self.resources_which_failed_to_process,
            other.resources_which_failed_to_process,
        );

        self.processed_resource_guids_and_usns
            .extend(other.processed_resource_guids_and_usns);
        self.cancelled_resource_guids_and_usns
            .extend(other.cancelled_resource_guids_and_usns);

        self.stop_synchronization_error = other.stop_synchronization_error;
    }

    /// Whether any resource body was downloaded
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.total_new_resources > 0 || self.total_updated_resources > 0
    }
}

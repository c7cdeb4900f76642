//! Sync chunk model

use serde::{Deserialize, Serialize};

use super::{Guid, LinkedNotebook, Note, Notebook, Resource, SavedSearch, Tag};

/// A batch of changed records plus the update counter watermark it brings
/// its scope up to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncChunk {
    /// Server time the chunk was produced (Unix ms)
    pub current_time: i64,
    /// Highest update sequence number contained in this chunk
    pub chunk_high_usn: Option<i32>,
    /// Update counter of the whole scope at the time of the request
    pub update_count: i32,
    pub notes: Vec<Note>,
    pub notebooks: Vec<Notebook>,
    pub tags: Vec<Tag>,
    pub searches: Vec<SavedSearch>,
    pub resources: Vec<Resource>,
    pub linked_notebooks: Vec<LinkedNotebook>,
    pub expunged_notes: Vec<Guid>,
    pub expunged_notebooks: Vec<Guid>,
    pub expunged_tags: Vec<Guid>,
    pub expunged_searches: Vec<Guid>,
    pub expunged_linked_notebooks: Vec<Guid>,
}

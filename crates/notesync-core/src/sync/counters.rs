//! Sync chunk processing counters

use serde::{Deserialize, Serialize};

/// Running totals of what the sync chunks of one scope contained and how much
/// of it has been applied locally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncChunksDataCounters {
    pub total_saved_searches: u64,
    pub total_expunged_saved_searches: u64,
    pub added_saved_searches: u64,
    pub updated_saved_searches: u64,
    pub expunged_saved_searches: u64,

    pub total_tags: u64,
    pub total_expunged_tags: u64,
    pub added_tags: u64,
    pub updated_tags: u64,
    pub expunged_tags: u64,

    pub total_linked_notebooks: u64,
    pub total_expunged_linked_notebooks: u64,
    pub added_linked_notebooks: u64,
    pub updated_linked_notebooks: u64,
    pub expunged_linked_notebooks: u64,

    pub total_notebooks: u64,
    pub total_expunged_notebooks: u64,
    pub added_notebooks: u64,
    pub updated_notebooks: u64,
    pub expunged_notebooks: u64,
}

impl SyncChunksDataCounters {
    /// Field-wise addition
    pub fn merge(&mut self, other: &Self) {
        self.total_saved_searches += other.total_saved_searches;
        self.total_expunged_saved_searches += other.total_expunged_saved_searches;
        self.added_saved_searches += other.added_saved_searches;
        self.updated_saved_searches += other.updated_saved_searches;
        self.expunged_saved_searches += other.expunged_saved_searches;

        self.total_tags += other.total_tags;
        self.total_expunged_tags += other.total_expunged_tags;
        self.added_tags += other.added_tags;
        self.updated_tags += other.updated_tags;
        self.expunged_tags += other.expunged_tags;

        self.total_linked_notebooks += other.total_linked_notebooks;
        self.total_expunged_linked_notebooks += other.total_expunged_linked_notebooks;
        self.added_linked_notebooks += other.added_linked_notebooks;
        self.updated_linked_notebooks += other.updated_linked_notebooks;
        self.expunged_linked_notebooks += other.expunged_linked_notebooks;

        self.total_notebooks += other.total_notebooks;
        self.total_expunged_notebooks += other.total_expunged_notebooks;
        self.added_notebooks += other.added_notebooks;
        self.updated_notebooks += other.updated_notebooks;
        self.expunged_notebooks += other.expunged_notebooks;
    }
}

//! Saved search model

use serde::{Deserialize, Serialize};

use super::{Guid, HasGuid, LocalId};

/// A named search query. Saved searches only exist in the user's own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSearch {
    pub local_id: LocalId,
    pub guid: Option<Guid>,
    pub update_sequence_num: Option<i32>,
    pub name: Option<String>,
    pub query: Option<String>,
    pub locally_modified: bool,
    pub local_only: bool,
    pub locally_favorited: bool,
}

impl SavedSearch {
    /// Create a new local saved search
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            local_id: LocalId::new(),
            guid: None,
            update_sequence_num: None,
            name: Some(name.into()),
            query: Some(query.into()),
            locally_modified: false,
            local_only: false,
            locally_favorited: false,
        }
    }
}

impl HasGuid for SavedSearch {
    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

//! Tag model

use serde::{Deserialize, Serialize};

use super::{Guid, HasGuid, LocalId};

/// A tag for organizing notes, optionally nested under a parent tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Local identifier
    pub local_id: LocalId,
    /// Server identifier, present once synced
    pub guid: Option<Guid>,
    /// Update sequence number of the last synced revision
    pub update_sequence_num: Option<i32>,
    /// Tag name, unique within its scope
    pub name: Option<String>,
    /// Server identifier of the parent tag
    pub parent_guid: Option<Guid>,
    /// Local identifier of the parent tag
    pub parent_local_id: Option<LocalId>,
    /// Guid of the linked notebook this tag belongs to
    pub linked_notebook_guid: Option<Guid>,
    pub locally_modified: bool,
    pub local_only: bool,
    pub locally_favorited: bool,
}

impl Tag {
    /// Create a new local tag with the given name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            local_id: LocalId::new(),
            guid: None,
            update_sequence_num: None,
            name: Some(name.into()),
            parent_guid: None,
            parent_local_id: None,
            linked_notebook_guid: None,
            locally_modified: false,
            local_only: false,
            locally_favorited: false,
        }
    }
}

impl HasGuid for Tag {
    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

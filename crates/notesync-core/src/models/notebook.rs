//! Notebook model

use serde::{Deserialize, Serialize};

use super::{Guid, HasGuid, LocalId};

/// Server-imposed restrictions on what the user may do with a notebook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotebookRestrictions {
    pub no_read_notes: bool,
    pub no_create_notes: bool,
    pub no_update_notes: bool,
    pub no_expunge_notes: bool,
    pub no_update_notebook: bool,
}

/// A notebook, either owned by the user or belonging to a linked notebook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Notebook {
    /// Local identifier
    pub local_id: LocalId,
    /// Server identifier, present once synced
    pub guid: Option<Guid>,
    /// Update sequence number of the last synced revision
    pub update_sequence_num: Option<i32>,
    /// Display name, unique within its scope
    pub name: Option<String>,
    /// Guid of the linked notebook this notebook belongs to
    pub linked_notebook_guid: Option<Guid>,
    pub default_notebook: bool,
    /// Server-only: published state
    pub published: Option<bool>,
    /// Server-only: restrictions
    pub restrictions: Option<NotebookRestrictions>,
    pub locally_modified: bool,
    pub local_only: bool,
    pub locally_favorited: bool,
}

impl Notebook {
    /// Create a new local notebook with the given name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            local_id: LocalId::new(),
            guid: None,
            update_sequence_num: None,
            name: Some(name.into()),
            linked_notebook_guid: None,
            default_notebook: false,
            published: None,
            restrictions: None,
            locally_modified: false,
            local_only: false,
            locally_favorited: false,
        }
    }

    /// Drop everything the server assigned, leaving a local-only record
    pub fn strip_server_fields(&mut self) {
        self.guid = None;
        self.update_sequence_num = None;
        self.published = None;
        self.restrictions = None;
    }
}

impl HasGuid for Notebook {
    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

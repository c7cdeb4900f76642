//! Note and resource models

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Guid, HasGuid, LocalId};

/// Attributes attached to a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAttributes {
    pub source_url: Option<String>,
    pub author: Option<String>,
    /// Guid of the remote note this note was split off from during conflict resolution
    pub conflict_source_note_guid: Option<Guid>,
    /// Server-only: timestamp the note was shared (Unix ms)
    pub share_date: Option<i64>,
}

/// Server-imposed restrictions on a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NoteRestrictions {
    pub no_update_title: bool,
    pub no_update_content: bool,
    pub no_email: bool,
    pub no_share: bool,
}

/// Server-imposed size limits on a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteLimits {
    pub note_resource_count_max: Option<i32>,
    pub upload_limit: Option<i64>,
    pub note_size_max: Option<i64>,
}

/// A binary attachment of a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub local_id: LocalId,
    pub guid: Option<Guid>,
    pub update_sequence_num: Option<i32>,
    pub note_guid: Option<Guid>,
    pub note_local_id: LocalId,
    pub mime: Option<String>,
    /// Hex MD5 of the resource body
    pub data_hash: Option<String>,
    pub data_size: Option<i32>,
    pub locally_modified: bool,
}

impl Resource {
    /// Create a new local resource attached to the given note
    #[must_use]
    pub fn new(note_local_id: LocalId) -> Self {
        Self {
            local_id: LocalId::new(),
            guid: None,
            update_sequence_num: None,
            note_guid: None,
            note_local_id,
            mime: None,
            data_hash: None,
            data_size: None,
            locally_modified: false,
        }
    }
}

impl HasGuid for Resource {
    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Note {
    /// Local identifier
    pub local_id: LocalId,
    /// Server identifier, present once synced
    pub guid: Option<Guid>,
    /// Update sequence number of the last synced revision
    pub update_sequence_num: Option<i32>,
    pub title: Option<String>,
    /// Note body as markup
    pub content: Option<String>,
    /// Local identifier of the containing notebook
    pub notebook_local_id: LocalId,
    /// Server identifier of the containing notebook
    pub notebook_guid: Option<Guid>,
    pub tag_local_ids: Vec<LocalId>,
    pub tag_guids: Vec<Guid>,
    pub resources: Vec<Resource>,
    pub attributes: NoteAttributes,
    /// Server-only: restrictions
    pub restrictions: Option<NoteRestrictions>,
    /// Server-only: limits
    pub limits: Option<NoteLimits>,
    pub locally_modified: bool,
    pub local_only: bool,
    pub locally_favorited: bool,
}

impl Note {
    /// Create a new local note in the given notebook
    #[must_use]
    pub fn new(notebook_local_id: LocalId, title: impl Into<String>) -> Self {
        Self {
            local_id: LocalId::new(),
            guid: None,
            update_sequence_num: None,
            title: Some(title.into()),
            content: None,
            notebook_local_id,
            notebook_guid: None,
            tag_local_ids: Vec::new(),
            tag_guids: Vec::new(),
            resources: Vec::new(),
            attributes: NoteAttributes::default(),
            restrictions: None,
            limits: None,
            locally_modified: false,
            local_only: false,
            locally_favorited: false,
        }
    }

    /// Get the plain text of the content, truncated to `max_len` characters
    #[must_use]
    pub fn content_preview(&self, max_len: usize) -> String {
        self.content
            .as_deref()
            .map(content_to_plain_text)
            .unwrap_or_default()
            .chars()
            .take(max_len)
            .collect()
    }
}

impl HasGuid for Note {
    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

/// Strip markup tags from note content and collapse whitespace
///
/// # Examples
///
/// ```
/// use notesync_core::models::content_to_plain_text;
///
/// let text = content_to_plain_text("<en-note><div>Hello</div><div>world</div></en-note>");
/// assert_eq!(text, "Hello world");
/// ```
#[must_use]
pub fn content_to_plain_text(content: &str) -> String {
    let re = Regex::new(r"<[^>]*>").expect("Invalid regex");
    re.replace_all(content, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

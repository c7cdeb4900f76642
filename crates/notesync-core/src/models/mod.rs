//! Data models for notesync

mod account;
mod linked_notebook;
mod local_id;
mod note;
mod notebook;
mod saved_search;
mod sync_chunk;
mod tag;

pub use account::Account;
pub use linked_notebook::LinkedNotebook;
pub use local_id::{Guid, LocalId, UserId};
pub use note::{
    content_to_plain_text, Note, NoteAttributes, NoteLimits, NoteRestrictions, Resource,
};
pub use notebook::{Notebook, NotebookRestrictions};
pub use saved_search::SavedSearch;
pub use sync_chunk::SyncChunk;
pub use tag::Tag;

/// Access to the server identifier of a record, if it has one
pub trait HasGuid {
    fn guid(&self) -> Option<&str>;
}

impl HasGuid for Guid {
    fn guid(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

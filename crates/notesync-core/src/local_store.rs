//! Local store collaborator interface

use std::collections::HashSet;

use async_trait::async_trait;

use crate::models::{Guid, Note, Notebook, SavedSearch, Tag};
use crate::Result;

/// Include or exclude records with some local flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListObjectsFilter {
    Include,
    Exclude,
}

/// Filters for listing guids of records in the local store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListGuidsFilters {
    pub locally_modified_filter: Option<ListObjectsFilter>,
    pub locally_favorited_filter: Option<ListObjectsFilter>,
}

impl ListGuidsFilters {
    #[must_use]
    pub const fn locally_modified(filter: ListObjectsFilter) -> Self {
        Self {
            locally_modified_filter: Some(filter),
            locally_favorited_filter: None,
        }
    }
}

/// The local persistent store of notebooks, tags, saved searches and notes.
///
/// `linked_notebook_guid` arguments select a scope: `None` is the user's own
/// data, `Some(guid)` the data of that linked notebook. Notes belong to the
/// scope of their notebook. Put operations insert or replace by local id.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn find_notebook_by_guid(&self, guid: &str) -> Result<Option<Notebook>>;
    async fn find_notebook_by_name(
        &self,
        name: &str,
        linked_notebook_guid: Option<&str>,
    ) -> Result<Option<Notebook>>;
    async fn put_notebook(&self, notebook: Notebook) -> Result<()>;
    async fn expunge_notebook_by_guid(&self, guid: &str) -> Result<()>;
    async fn list_notebook_guids(
        &self,
        filters: ListGuidsFilters,
        linked_notebook_guid: Option<&str>,
    ) -> Result<HashSet<Guid>>;

    async fn find_tag_by_guid(&self, guid: &str) -> Result<Option<Tag>>;
    async fn find_tag_by_name(
        &self,
        name: &str,
        linked_notebook_guid: Option<&str>,
    ) -> Result<Option<Tag>>;
    async fn put_tag(&self, tag: Tag) -> Result<()>;
    async fn expunge_tag_by_guid(&self, guid: &str) -> Result<()>;
    async fn list_tag_guids(
        &self,
        filters: ListGuidsFilters,
        linked_notebook_guid: Option<&str>,
    ) -> Result<HashSet<Guid>>;

    async fn find_saved_search_by_guid(&self, guid: &str) -> Result<Option<SavedSearch>>;
    async fn find_saved_search_by_name(&self, name: &str) -> Result<Option<SavedSearch>>;
    async fn put_saved_search(&self, saved_search: SavedSearch) -> Result<()>;
    async fn expunge_saved_search_by_guid(&self, guid: &str) -> Result<()>;
    async fn list_saved_search_guids(&self, filters: ListGuidsFilters) -> Result<HashSet<Guid>>;

    /// Fetch a note together with its resources
    async fn find_note_by_guid(&self, guid: &str) -> Result<Option<Note>>;
    async fn put_note(&self, note: Note) -> Result<()>;
    async fn expunge_note_by_guid(&self, guid: &str) -> Result<()>;
    async fn list_note_guids(
        &self,
        filters: ListGuidsFilters,
        linked_notebook_guid: Option<&str>,
    ) -> Result<HashSet<Guid>>;
}

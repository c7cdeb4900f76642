//! Name-addressable items handled by the generic conflict resolution

use futures::future::BoxFuture;

use crate::local_store::LocalStore;
use crate::models::{HasGuid, Notebook, SavedSearch, Tag};
use crate::Result;

/// A record whose name must be unique within its scope
pub trait ConflictItem: HasGuid + Clone + Send + Sync + Sized + 'static {
    /// Used in log messages
    const TYPE_NAME: &'static str;

    fn name(&self) -> Option<&str>;

    fn set_name(&mut self, name: String);

    /// `None` for the user's own data
    fn linked_notebook_guid(&self) -> Option<&str>;

    /// Look up an item of this type by name within a scope
    fn find_by_name<'a>(
        local_store: &'a dyn LocalStore,
        name: &'a str,
        linked_notebook_guid: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Option<Self>>>;
}

impl ConflictItem for Notebook {
    const TYPE_NAME: &'static str = "notebook";

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    fn linked_notebook_guid(&self) -> Option<&str> {
        self.linked_notebook_guid.as_deref()
    }

    fn find_by_name<'a>(
        local_store: &'a dyn LocalStore,
        name: &'a str,
        linked_notebook_guid: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Option<Self>>> {
        local_store.find_notebook_by_name(name, linked_notebook_guid)
    }
}

impl ConflictItem for Tag {
    const TYPE_NAME: &'static str = "tag";

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    fn linked_notebook_guid(&self) -> Option<&str> {
        self.linked_notebook_guid.as_deref()
    }

    fn find_by_name<'a>(
        local_store: &'a dyn LocalStore,
        name: &'a str,
        linked_notebook_guid: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Option<Self>>> {
        local_store.find_tag_by_name(name, linked_notebook_guid)
    }
}

impl ConflictItem for SavedSearch {
    const TYPE_NAME: &'static str = "saved search";

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    // Saved searches never belong to a linked notebook.
    fn linked_notebook_guid(&self) -> Option<&str> {
        None
    }

    fn find_by_name<'a>(
        local_store: &'a dyn LocalStore,
        name: &'a str,
        _linked_notebook_guid: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Option<Self>>> {
        local_store.find_saved_search_by_name(name)
    }
}

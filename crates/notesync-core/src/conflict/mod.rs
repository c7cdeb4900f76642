//! Resolution of update conflicts between remote and local records

mod item;
mod note;

use std::sync::Arc;

use async_trait::async_trait;

pub use item::ConflictItem;

use crate::config::SyncEngineConfig;
use crate::local_store::LocalStore;
use crate::models::{Note, Notebook, SavedSearch, Tag};
use crate::{Error, Result};

/// Outcome of a conflict between a remote ("theirs") and a local ("mine") record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResolution<T> {
    /// Overwrite the local record with the remote one
    UseTheirs,
    /// Keep the local record
    UseMine,
    /// The local record is unrelated; apply the remote one alongside it
    IgnoreMine,
    /// Persist the given modified local record, then apply the remote one
    MoveMine(T),
}

/// Resolves conflicts found while applying downloaded data
#[async_trait]
pub trait SyncConflictResolver: Send + Sync {
    async fn resolve_notebook_conflict(
        &self,
        theirs: Notebook,
        mine: Notebook,
    ) -> Result<ConflictResolution<Notebook>>;

    async fn resolve_tag_conflict(&self, theirs: Tag, mine: Tag) -> Result<ConflictResolution<Tag>>;

    async fn resolve_saved_search_conflict(
        &self,
        theirs: SavedSearch,
        mine: SavedSearch,
    ) -> Result<ConflictResolution<SavedSearch>>;

    async fn resolve_note_conflict(
        &self,
        theirs: Note,
        mine: Note,
    ) -> Result<ConflictResolution<Note>>;
}

/// Conflict resolver that renames clashing local items, consulting the local
/// store for free names
#[derive(Clone)]
pub struct SimpleSyncConflictResolver {
    local_store: Arc<dyn LocalStore>,
    config: SyncEngineConfig,
}

impl SimpleSyncConflictResolver {
    pub fn new(local_store: Arc<dyn LocalStore>, config: SyncEngineConfig) -> Self {
        Self {
            local_store,
            config,
        }
    }

    async fn resolve<T: ConflictItem>(&self, theirs: &T, mine: T) -> Result<ConflictResolution<T>> {
        let Some(their_guid) = theirs.guid() else {
            return Err(Error::invalid_argument(format!(
                "remote {} has no guid",
                T::TYPE_NAME
            )));
        };
        let Some(their_name) = theirs.name() else {
            return Err(Error::invalid_argument(format!(
                "remote {} {their_guid} has no name",
                T::TYPE_NAME
            )));
        };
        if mine.guid().is_none() && mine.name().is_none() {
            return Err(Error::invalid_argument(format!(
                "local {} has neither guid nor name",
                T::TYPE_NAME
            )));
        }

        if mine.name() == Some(their_name) {
            return self.resolve_name_clash(theirs, mine).await;
        }

        if mine.guid() == Some(their_guid) {
            // Renamed remotely: the new name may already be taken locally.
            let clashing = T::find_by_name(
                self.local_store.as_ref(),
                their_name,
                theirs.linked_notebook_guid(),
            )
            .await?;
            return match clashing {
                None => Ok(ConflictResolution::UseTheirs),
                Some(clashing) => self.resolve_name_clash(theirs, clashing).await,
            };
        }

        Ok(ConflictResolution::IgnoreMine)
    }

    async fn resolve_name_clash<T: ConflictItem>(
        &self,
        theirs: &T,
        mut mine: T,
    ) -> Result<ConflictResolution<T>> {
        if mine.guid().is_some() && mine.guid() == theirs.guid() {
            return Ok(ConflictResolution::UseTheirs);
        }
        if mine.linked_notebook_guid() != theirs.linked_notebook_guid() {
            return Ok(ConflictResolution::IgnoreMine);
        }

        let name = theirs.name().unwrap_or_default();
        let new_name = self
            .free_conflicting_name::<T>(name, mine.linked_notebook_guid())
            .await?;
        tracing::info!(
            item_type = T::TYPE_NAME,
            name,
            new_name = %new_name,
            "Renaming conflicting local item"
        );
        mine.set_name(new_name);
        Ok(ConflictResolution::MoveMine(mine))
    }

    async fn free_conflicting_name<T: ConflictItem>(
        &self,
        name: &str,
        linked_notebook_guid: Option<&str>,
    ) -> Result<String> {
        let base = format!("{name} - conflicting");
        let attempts = self.config.max_conflicting_name_probes;
        for attempt in 1..=attempts {
            let candidate = if attempt == 1 {
                base.clone()
            } else {
                format!("{base} ({attempt})")
            };
            let existing =
                T::find_by_name(self.local_store.as_ref(), &candidate, linked_notebook_guid)
                    .await?;
            if existing.is_none() {
                return Ok(candidate);
            }
        }

        Err(Error::ConflictingNameExhausted {
            name: name.to_string(),
            attempts,
        })
    }
}

#[async_trait]
impl SyncConflictResolver for SimpleSyncConflictResolver {
    async fn resolve_notebook_conflict(
        &self,
        theirs: Notebook,
        mine: Notebook,
    ) -> Result<ConflictResolution<Notebook>> {
        self.resolve(&theirs, mine).await
    }

    async fn resolve_tag_conflict(
        &self,
        theirs: Tag,
        mine: Tag,
    ) -> Result<ConflictResolution<Tag>> {
        self.resolve(&theirs, mine).await
    }

    async fn resolve_saved_search_conflict(
        &self,
        theirs: SavedSearch,
        mine: SavedSearch,
    ) -> Result<ConflictResolution<SavedSearch>> {
        self.resolve(&theirs, mine).await
    }

    async fn resolve_note_conflict(
        &self,
        theirs: Note,
        mine: Note,
    ) -> Result<ConflictResolution<Note>> {
        note::resolve_note_conflict(&theirs, mine)
    }
}

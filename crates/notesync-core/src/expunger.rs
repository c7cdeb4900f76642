//! Removal of local records the server no longer knows about after a full sync.
//!
//! A full sync re-downloads everything, so any synced local record whose guid
//! did not show up in the downloaded data is stale. Unmodified stale records
//! are simply expunged. Locally modified ones would lose the user's work, so
//! they are re-inserted as new local-only records first and only then is the
//! original expunged; the next send uploads them as new items.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;

use crate::local_store::{ListGuidsFilters, ListObjectsFilter, LocalStore};
use crate::models::{Guid, LocalId, Note, Notebook, SavedSearch, Tag};
use crate::{Error, Result};

/// Guids seen during the full sync; these are never touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreservedGuids {
    pub notebook_guids: HashSet<Guid>,
    pub tag_guids: HashSet<Guid>,
    pub note_guids: HashSet<Guid>,
    pub saved_search_guids: HashSet<Guid>,
}

#[derive(Debug, Default)]
struct StaleGuids {
    modified: HashSet<Guid>,
    unmodified: HashSet<Guid>,
}

impl StaleGuids {
    fn new(modified: HashSet<Guid>, unmodified: HashSet<Guid>, preserved: &HashSet<Guid>) -> Self {
        Self {
            modified: modified.difference(preserved).cloned().collect(),
            unmodified: unmodified.difference(preserved).cloned().collect(),
        }
    }

    fn promote(&mut self, guid: &str) -> bool {
        if self.unmodified.remove(guid) {
            self.modified.insert(guid.to_string());
            true
        } else {
            false
        }
    }
}

/// Local ids of the copies made in one pass, keyed by the original's guid
#[derive(Debug, Default)]
struct CopiedIds {
    notebooks: HashMap<Guid, LocalId>,
    tags: HashMap<Guid, LocalId>,
    /// Local ids of the copied tags' originals
    original_tags: HashMap<Guid, LocalId>,
}

/// Expunges stale local data after a full sync, preserving local changes
#[derive(Clone)]
pub struct FullSyncStaleDataExpunger {
    local_store: Arc<dyn LocalStore>,
}

impl FullSyncStaleDataExpunger {
    pub fn new(local_store: Arc<dyn LocalStore>) -> Self {
        Self { local_store }
    }

    /// Expunge stale records of the user's own data (`linked_notebook_guid`
    /// is `None`) or of one linked notebook.
    ///
    /// Cancellation leaves already completed writes in place.
    pub async fn expunge_stale_data(
        &self,
        preserved_guids: &PreservedGuids,
        canceler: CancellationToken,
        linked_notebook_guid: Option<&str>,
    ) -> Result<()> {
        check_canceled(&canceler)?;

        let modified_filter = ListGuidsFilters::locally_modified(ListObjectsFilter::Include);
        let unmodified_filter = ListGuidsFilters::locally_modified(ListObjectsFilter::Exclude);
        let store = self.local_store.as_ref();

        let (modified_notebooks, unmodified_notebooks, modified_tags, unmodified_tags) =
            futures::try_join!(
                store.list_notebook_guids(modified_filter, linked_notebook_guid),
                store.list_notebook_guids(unmodified_filter, linked_notebook_guid),
                store.list_tag_guids(modified_filter, linked_notebook_guid),
                store.list_tag_guids(unmodified_filter, linked_notebook_guid),
            )?;
        let (modified_notes, unmodified_notes) = futures::try_join!(
            store.list_note_guids(modified_filter, linked_notebook_guid),
            store.list_note_guids(unmodified_filter, linked_notebook_guid),
        )?;

        let mut notebooks = StaleGuids::new(
            modified_notebooks,
            unmodified_notebooks,
            &preserved_guids.notebook_guids,
        );
        let tags = StaleGuids::new(modified_tags, unmodified_tags, &preserved_guids.tag_guids);
        let notes = StaleGuids::new(modified_notes, unmodified_notes, &preserved_guids.note_guids);
        let saved_searches = if linked_notebook_guid.is_none() {
            let (modified, unmodified) = futures::try_join!(
                store.list_saved_search_guids(modified_filter),
                store.list_saved_search_guids(unmodified_filter),
            )?;
            StaleGuids::new(modified, unmodified, &preserved_guids.saved_search_guids)
        } else {
            StaleGuids::default()
        };
        check_canceled(&canceler)?;

        let mut notes_to_copy = Vec::with_capacity(notes.modified.len());
        for guid in &notes.modified {
            if let Some(note) = store.find_note_by_guid(guid).await? {
                notes_to_copy.push(note);
            }
        }

        // A stale notebook holding a stale modified note must survive as a
        // copy, otherwise the note copy would have no parent.
        for note in &notes_to_copy {
            if let Some(notebook_guid) = note.notebook_guid.as_deref() {
                if notebooks.promote(notebook_guid) {
                    tracing::debug!(
                        notebook_guid,
                        "Copying unmodified stale notebook that holds a modified note"
                    );
                }
            }
        }

        tracing::info!(
            linked_notebook_guid,
            notebooks_to_expunge = notebooks.unmodified.len(),
            notebooks_to_copy = notebooks.modified.len(),
            tags_to_expunge = tags.unmodified.len(),
            tags_to_copy = tags.modified.len(),
            notes_to_expunge = notes.unmodified.len(),
            notes_to_copy = notes.modified.len(),
            saved_searches_to_expunge = saved_searches.unmodified.len(),
            saved_searches_to_copy = saved_searches.modified.len(),
            "Expunging stale data after full sync"
        );

        // Copies go in parent-first.
        let mut copied = CopiedIds::default();
        self.copy_notebooks(&notebooks.modified, &mut copied, &canceler)
            .await?;
        let ordered_tag_guids = self
            .copy_tags(&tags, &mut copied, &canceler)
            .await?;
        self.copy_saved_searches(&saved_searches.modified, &canceler)
            .await?;
        self.copy_notes(notes_to_copy, &tags, &copied, &canceler)
            .await?;

        // Originals go out children-first.
        self.expunge_notes(&notes).await?;
        check_canceled(&canceler)?;
        for guid in ordered_tag_guids.iter().rev() {
            store.expunge_tag_by_guid(guid).await?;
        }
        try_join_all(tags.unmodified.iter().map(|guid| store.expunge_tag_by_guid(guid))).await?;
        check_canceled(&canceler)?;
        try_join_all(
            saved_searches
                .modified
                .iter()
                .chain(&saved_searches.unmodified)
                .map(|guid| store.expunge_saved_search_by_guid(guid)),
        )
        .await?;
        check_canceled(&canceler)?;
        try_join_all(
            notebooks
                .modified
                .iter()
                .chain(&notebooks.unmodified)
                .map(|guid| store.expunge_notebook_by_guid(guid)),
        )
        .await?;

        Ok(())
    }

    async fn copy_notebooks(
        &self,
        guids: &HashSet<Guid>,
        copied: &mut CopiedIds,
        canceler: &CancellationToken,
    ) -> Result<()> {
        for guid in guids {
            check_canceled(canceler)?;
            let Some(mut notebook) = self.local_store.find_notebook_by_guid(guid).await? else {
                continue;
            };
            notebook.strip_server_fields();
            notebook.local_id = LocalId::new();
            notebook.locally_modified = true;
            copied.notebooks.insert(guid.clone(), notebook.local_id);
            self.local_store.put_notebook(notebook).await?;
        }
        Ok(())
    }

    /// Copy modified stale tags, returning their guids in the order the copies
    /// were inserted
    async fn copy_tags(
        &self,
        tags: &StaleGuids,
        copied: &mut CopiedIds,
        canceler: &CancellationToken,
    ) -> Result<Vec<Guid>> {
        let mut pending = Vec::with_capacity(tags.modified.len());
        for guid in &tags.modified {
            check_canceled(canceler)?;
            if let Some(tag) = self.local_store.find_tag_by_guid(guid).await? {
                copied.tags.insert(guid.clone(), LocalId::new());
                copied.original_tags.insert(guid.clone(), tag.local_id);
                pending.push(tag);
            }
        }

        let mut inserted = Vec::with_capacity(pending.len());
        for mut tag in order_parents_first(pending) {
            check_canceled(canceler)?;
            let Some((guid, local_id)) = tag
                .guid
                .take()
                .and_then(|guid| copied.tags.get(&guid).map(|local_id| (guid, *local_id)))
            else {
                continue;
            };
            if let Some(parent_guid) = tag.parent_guid.clone() {
                if let Some(parent_local_id) = copied.tags.get(&parent_guid) {
                    tag.parent_guid = None;
                    tag.parent_local_id = Some(*parent_local_id);
                } else if tags.unmodified.contains(&parent_guid) {
                    tag.parent_guid = None;
                    tag.parent_local_id = None;
                }
            }
            tag.update_sequence_num = None;
            tag.local_id = local_id;
            tag.locally_modified = true;
            self.local_store.put_tag(tag).await?;
            inserted.push(guid);
        }
        Ok(inserted)
    }

    async fn copy_saved_searches(
        &self,
        guids: &HashSet<Guid>,
        canceler: &CancellationToken,
    ) -> Result<()> {
        for guid in guids {
            check_canceled(canceler)?;
            let Some(saved_search) = self.local_store.find_saved_search_by_guid(guid).await? else {
                continue;
            };
            self.local_store
                .put_saved_search(SavedSearch {
                    local_id: LocalId::new(),
                    guid: None,
                    update_sequence_num: None,
                    locally_modified: true,
                    ..saved_search
                })
                .await?;
        }
        Ok(())
    }

    async fn copy_notes(
        &self,
        notes: Vec<Note>,
        tags: &StaleGuids,
        copied: &CopiedIds,
        canceler: &CancellationToken,
    ) -> Result<()> {
        let mut expunged_tag_local_ids: HashMap<Guid, Option<LocalId>> = HashMap::new();

        for mut note in notes {
            check_canceled(canceler)?;

            if let Some(notebook_local_id) = note
                .notebook_guid
                .as_ref()
                .and_then(|guid| copied.notebooks.get(guid))
            {
                note.notebook_local_id = *notebook_local_id;
                note.notebook_guid = None;
            }

            let mut dropped_local_ids = HashSet::new();
            let mut tag_guids = Vec::with_capacity(note.tag_guids.len());
            for tag_guid in std::mem::take(&mut note.tag_guids) {
                if let Some(copy_local_id) = copied.tags.get(&tag_guid) {
                    note.tag_local_ids.push(*copy_local_id);
                    dropped_local_ids.extend(copied.original_tags.get(&tag_guid).copied());
                } else if tags.unmodified.contains(&tag_guid) {
                    dropped_local_ids.extend(
                        self.expunged_tag_local_id(&tag_guid, &mut expunged_tag_local_ids)
                            .await?,
                    );
                } else {
                    tag_guids.push(tag_guid);
                }
            }
            note.tag_guids = tag_guids;
            note.tag_local_ids
                .retain(|local_id| !dropped_local_ids.contains(local_id));
            note.tag_local_ids.dedup();

            note.local_id = LocalId::new();
            note.guid = None;
            note.update_sequence_num = None;
            note.restrictions = None;
            note.limits = None;
            note.attributes.share_date = None;
            note.locally_modified = true;
            for resource in &mut note.resources {
                resource.local_id = LocalId::new();
                resource.guid = None;
                resource.note_guid = None;
                resource.update_sequence_num = None;
                resource.note_local_id = note.local_id;
                resource.locally_modified = true;
            }

            self.local_store.put_note(note).await?;
        }
        Ok(())
    }

    /// Local id of a tag expunged without a copy, looked up once per pass
    async fn expunged_tag_local_id(
        &self,
        guid: &str,
        cache: &mut HashMap<Guid, Option<LocalId>>,
    ) -> Result<Option<LocalId>> {
        if let Some(local_id) = cache.get(guid) {
            return Ok(*local_id);
        }
        let local_id = self
            .local_store
            .find_tag_by_guid(guid)
            .await?
            .map(|tag| tag.local_id);
        cache.insert(guid.to_string(), local_id);
        Ok(local_id)
    }

    async fn expunge_notes(&self, notes: &StaleGuids) -> Result<()> {
        let store = self.local_store.as_ref();
        try_join_all(
            notes
                .modified
                .iter()
                .chain(&notes.unmodified)
                .map(|guid| store.expunge_note_by_guid(guid)),
        )
        .await?;
        Ok(())
    }
}

fn check_canceled(canceler: &CancellationToken) -> Result<()> {
    if canceler.is_cancelled() {
        Err(Error::OperationCanceled)
    } else {
        Ok(())
    }
}

/// Order tags so that each one comes after its parent when both are present
fn order_parents_first(mut pending: Vec<Tag>) -> Vec<Tag> {
    let mut ordered = Vec::with_capacity(pending.len());
    let mut placed: HashSet<Guid> = HashSet::new();
    while !pending.is_empty() {
        let pending_guids: HashSet<Guid> =
            pending.iter().filter_map(|tag| tag.guid.clone()).collect();
        let (ready, blocked): (Vec<Tag>, Vec<Tag>) = pending.into_iter().partition(|tag| {
            tag.parent_guid
                .as_ref()
                .is_none_or(|parent| placed.contains(parent) || !pending_guids.contains(parent))
        });
        if ready.is_empty() {
            // Parent cycle: keep the remaining order as is.
            ordered.extend(blocked);
            break;
        }
        placed.extend(ready.iter().filter_map(|tag| tag.guid.clone()));
        ordered.extend(ready);
        pending = blocked;
    }
    ordered
}

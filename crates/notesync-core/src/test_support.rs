//! Test doubles shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::auth::{
    AuthenticationInfo, AuthenticationInfoProvider, AuthenticationMode, ClearCacheOptions,
};
use crate::downloader::{DownloadResult, Downloader, DownloaderCallback};
use crate::local_store::{ListGuidsFilters, ListObjectsFilter, LocalStore};
use crate::models::{
    Account, Guid, LinkedNotebook, LocalId, Note, Notebook, SavedSearch, SyncChunk, Tag,
};
use crate::sender::{SendResult, Sender, SenderCallback};
use crate::storage::{SyncChunksStorage, SyncStateStorage};
use crate::sync::SyncState;
use crate::util::lock;
use crate::{Error, Result};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn flag_matches(filter: Option<ListObjectsFilter>, value: bool) -> bool {
    match filter {
        None => true,
        Some(ListObjectsFilter::Include) => value,
        Some(ListObjectsFilter::Exclude) => !value,
    }
}

fn names_equal(lhs: Option<&str>, rhs: &str) -> bool {
    lhs.is_some_and(|lhs| lhs.to_lowercase() == rhs.to_lowercase())
}

#[derive(Default)]
struct LocalStoreState {
    notebooks: HashMap<LocalId, Notebook>,
    tags: HashMap<LocalId, Tag>,
    saved_searches: HashMap<LocalId, SavedSearch>,
    notes: HashMap<LocalId, Note>,
    operations: Vec<String>,
}

impl LocalStoreState {
    fn note_scope(&self, note: &Note) -> Option<Guid> {
        self.notebooks
            .get(&note.notebook_local_id)
            .and_then(|notebook| notebook.linked_notebook_guid.clone())
    }
}

/// In-memory [`LocalStore`] recording every write in an operation log
#[derive(Default)]
pub struct InMemoryLocalStore {
    state: Mutex<LocalStoreState>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_notebook(&self, notebook: Notebook) {
        lock(&self.state).notebooks.insert(notebook.local_id, notebook);
    }

    pub fn insert_tag(&self, tag: Tag) {
        lock(&self.state).tags.insert(tag.local_id, tag);
    }

    pub fn insert_saved_search(&self, saved_search: SavedSearch) {
        lock(&self.state)
            .saved_searches
            .insert(saved_search.local_id, saved_search);
    }

    pub fn insert_note(&self, note: Note) {
        lock(&self.state).notes.insert(note.local_id, note);
    }

    pub fn notebooks(&self) -> Vec<Notebook> {
        lock(&self.state).notebooks.values().cloned().collect()
    }

    pub fn tags(&self) -> Vec<Tag> {
        lock(&self.state).tags.values().cloned().collect()
    }

    pub fn saved_searches(&self) -> Vec<SavedSearch> {
        lock(&self.state).saved_searches.values().cloned().collect()
    }

    pub fn notes(&self) -> Vec<Note> {
        lock(&self.state).notes.values().cloned().collect()
    }

    pub fn operations(&self) -> Vec<String> {
        lock(&self.state).operations.clone()
    }
}

#[async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn find_notebook_by_guid(&self, guid: &str) -> Result<Option<Notebook>> {
        Ok(lock(&self.state)
            .notebooks
            .values()
            .find(|notebook| notebook.guid.as_deref() == Some(guid))
            .cloned())
    }

    async fn find_notebook_by_name(
        &self,
        name: &str,
        linked_notebook_guid: Option<&str>,
    ) -> Result<Option<Notebook>> {
        Ok(lock(&self.state)
            .notebooks
            .values()
            .find(|notebook| {
                names_equal(notebook.name.as_deref(), name)
                    && notebook.linked_notebook_guid.as_deref() == linked_notebook_guid
            })
            .cloned())
    }

    async fn put_notebook(&self, notebook: Notebook) -> Result<()> {
        let mut state = lock(&self.state);
        state.operations.push(format!(
            "put_notebook:{}",
            notebook.name.clone().unwrap_or_default()
        ));
        state.notebooks.insert(notebook.local_id, notebook);
        Ok(())
    }

    async fn expunge_notebook_by_guid(&self, guid: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.operations.push(format!("expunge_notebook:{guid}"));
        state
            .notebooks
            .retain(|_, notebook| notebook.guid.as_deref() != Some(guid));
        Ok(())
    }

    async fn list_notebook_guids(
        &self,
        filters: ListGuidsFilters,
        linked_notebook_guid: Option<&str>,
    ) -> Result<HashSet<Guid>> {
        Ok(lock(&self.state)
            .notebooks
            .values()
            .filter(|notebook| notebook.linked_notebook_guid.as_deref() == linked_notebook_guid)
            .filter(|notebook| {
                flag_matches(filters.locally_modified_filter, notebook.locally_modified)
                    && flag_matches(filters.locally_favorited_filter, notebook.locally_favorited)
            })
            .filter_map(|notebook| notebook.guid.clone())
            .collect())
    }

    async fn find_tag_by_guid(&self, guid: &str) -> Result<Option<Tag>> {
        Ok(lock(&self.state)
            .tags
            .values()
            .find(|tag| tag.guid.as_deref() == Some(guid))
            .cloned())
    }

    async fn find_tag_by_name(
        &self,
        name: &str,
        linked_notebook_guid: Option<&str>,
    ) -> Result<Option<Tag>> {
        Ok(lock(&self.state)
            .tags
            .values()
            .find(|tag| {
                names_equal(tag.name.as_deref(), name)
                    && tag.linked_notebook_guid.as_deref() == linked_notebook_guid
            })
            .cloned())
    }

    async fn put_tag(&self, tag: Tag) -> Result<()> {
        let mut state = lock(&self.state);
        state
            .operations
            .push(format!("put_tag:{}", tag.name.clone().unwrap_or_default()));
        state.tags.insert(tag.local_id, tag);
        Ok(())
    }

    async fn expunge_tag_by_guid(&self, guid: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.operations.push(format!("expunge_tag:{guid}"));
        state.tags.retain(|_, tag| tag.guid.as_deref() != Some(guid));
        Ok(())
    }

    async fn list_tag_guids(
        &self,
        filters: ListGuidsFilters,
        linked_notebook_guid: Option<&str>,
    ) -> Result<HashSet<Guid>> {
        Ok(lock(&self.state)
            .tags
            .values()
            .filter(|tag| tag.linked_notebook_guid.as_deref() == linked_notebook_guid)
            .filter(|tag| {
                flag_matches(filters.locally_modified_filter, tag.locally_modified)
                    && flag_matches(filters.locally_favorited_filter, tag.locally_favorited)
            })
            .filter_map(|tag| tag.guid.clone())
            .collect())
    }

    async fn find_saved_search_by_guid(&self, guid: &str) -> Result<Option<SavedSearch>> {
        Ok(lock(&self.state)
            .saved_searches
            .values()
            .find(|search| search.guid.as_deref() == Some(guid))
            .cloned())
    }

    async fn find_saved_search_by_name(&self, name: &str) -> Result<Option<SavedSearch>> {
        Ok(lock(&self.state)
            .saved_searches
            .values()
            .find(|search| names_equal(search.name.as_deref(), name))
            .cloned())
    }

    async fn put_saved_search(&self, saved_search: SavedSearch) -> Result<()> {
        let mut state = lock(&self.state);
        state.operations.push(format!(
            "put_saved_search:{}",
            saved_search.name.clone().unwrap_or_default()
        ));
        state
            .saved_searches
            .insert(saved_search.local_id, saved_search);
        Ok(())
    }

    async fn expunge_saved_search_by_guid(&self, guid: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.operations.push(format!("expunge_saved_search:{guid}"));
        state
            .saved_searches
            .retain(|_, search| search.guid.as_deref() != Some(guid));
        Ok(())
    }

    async fn list_saved_search_guids(&self, filters: ListGuidsFilters) -> Result<HashSet<Guid>> {
        Ok(lock(&self.state)
            .saved_searches
            .values()
            .filter(|search| {
                flag_matches(filters.locally_modified_filter, search.locally_modified)
                    && flag_matches(filters.locally_favorited_filter, search.locally_favorited)
            })
            .filter_map(|search| search.guid.clone())
            .collect())
    }

    async fn find_note_by_guid(&self, guid: &str) -> Result<Option<Note>> {
        Ok(lock(&self.state)
            .notes
            .values()
            .find(|note| note.guid.as_deref() == Some(guid))
            .cloned())
    }

    async fn put_note(&self, note: Note) -> Result<()> {
        let mut state = lock(&self.state);
        state
            .operations
            .push(format!("put_note:{}", note.title.clone().unwrap_or_default()));
        state.notes.insert(note.local_id, note);
        Ok(())
    }

    async fn expunge_note_by_guid(&self, guid: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.operations.push(format!("expunge_note:{guid}"));
        state.notes.retain(|_, note| note.guid.as_deref() != Some(guid));
        Ok(())
    }

    async fn list_note_guids(
        &self,
        filters: ListGuidsFilters,
        linked_notebook_guid: Option<&str>,
    ) -> Result<HashSet<Guid>> {
        let state = lock(&self.state);
        Ok(state
            .notes
            .values()
            .filter(|note| state.note_scope(note).as_deref() == linked_notebook_guid)
            .filter(|note| {
                flag_matches(filters.locally_modified_filter, note.locally_modified)
                    && flag_matches(filters.locally_favorited_filter, note.locally_favorited)
            })
            .filter_map(|note| note.guid.clone())
            .collect())
    }
}

/// What a scripted downloader does on one call
pub enum DownloadStep {
    Result(DownloadResult),
    ResultAfter(Box<dyn Fn(&dyn DownloaderCallback) + Send + Sync>, DownloadResult),
    Error(Box<dyn Fn(&dyn DownloaderCallback) + Send + Sync>, Error),
}

/// [`Downloader`] replaying a fixed sequence of steps; extra calls fail
#[derive(Default)]
pub struct ScriptedDownloader {
    steps: Mutex<VecDeque<DownloadStep>>,
    calls: Mutex<u32>,
}

impl ScriptedDownloader {
    pub fn new(steps: Vec<DownloadStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *lock(&self.calls)
    }
}

#[async_trait]
impl Downloader for ScriptedDownloader {
    async fn download(
        &self,
        _canceler: CancellationToken,
        callback: Arc<dyn DownloaderCallback>,
    ) -> Result<DownloadResult> {
        *lock(&self.calls) += 1;
        let step = lock(&self.steps).pop_front();
        match step {
            Some(DownloadStep::Result(result)) => Ok(result),
            Some(DownloadStep::ResultAfter(progress, result)) => {
                progress(callback.as_ref());
                Ok(result)
            }
            Some(DownloadStep::Error(progress, error)) => {
                progress(callback.as_ref());
                Err(error)
            }
            None => Err(Error::runtime("unexpected download call")),
        }
    }
}

/// [`Sender`] replaying a fixed sequence of results; extra calls fail
#[derive(Default)]
pub struct ScriptedSender {
    steps: Mutex<VecDeque<Result<SendResult>>>,
    calls: Mutex<u32>,
}

impl ScriptedSender {
    pub fn new(steps: Vec<Result<SendResult>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *lock(&self.calls)
    }
}

#[async_trait]
impl Sender for ScriptedSender {
    async fn send(
        &self,
        _canceler: CancellationToken,
        _callback: Arc<dyn SenderCallback>,
    ) -> Result<SendResult> {
        *lock(&self.calls) += 1;
        let step = lock(&self.steps).pop_front();
        step.unwrap_or_else(|| Err(Error::runtime("unexpected send call")))
    }
}

/// [`AuthenticationInfoProvider`] recording which caches were cleared
#[derive(Default)]
pub struct RecordingAuthenticationInfoProvider {
    cleared: Mutex<Vec<ClearCacheOptions>>,
}

impl RecordingAuthenticationInfoProvider {
    pub fn cleared(&self) -> Vec<ClearCacheOptions> {
        lock(&self.cleared).clone()
    }
}

#[async_trait]
impl AuthenticationInfoProvider for RecordingAuthenticationInfoProvider {
    async fn authenticate_account(
        &self,
        _account: &Account,
        _mode: AuthenticationMode,
    ) -> Result<Arc<AuthenticationInfo>> {
        Err(Error::runtime("not used in tests"))
    }

    async fn authenticate_to_linked_notebook(
        &self,
        _account: &Account,
        _linked_notebook: &LinkedNotebook,
        _mode: AuthenticationMode,
    ) -> Result<Arc<AuthenticationInfo>> {
        Err(Error::runtime("not used in tests"))
    }

    fn clear_caches(&self, options: &ClearCacheOptions) {
        lock(&self.cleared).push(options.clone());
    }
}

/// [`SyncStateStorage`] keeping every state it was given
#[derive(Default)]
pub struct RecordingSyncStateStorage {
    states: Mutex<Vec<SyncState>>,
}

impl RecordingSyncStateStorage {
    pub fn states(&self) -> Vec<SyncState> {
        lock(&self.states).clone()
    }
}

impl SyncStateStorage for RecordingSyncStateStorage {
    fn get_sync_state(&self, _account: &Account) -> Result<Option<SyncState>> {
        Ok(lock(&self.states).last().cloned())
    }

    fn set_sync_state(&self, _account: &Account, sync_state: &SyncState) -> Result<()> {
        lock(&self.states).push(sync_state.clone());
        Ok(())
    }
}

/// [`SyncChunksStorage`] keeping every chunk it was given
#[derive(Default)]
pub struct RecordingSyncChunksStorage {
    user_own: Mutex<Vec<SyncChunk>>,
    linked_notebooks: Mutex<HashMap<Guid, Vec<SyncChunk>>>,
    flushes: Mutex<u32>,
}

impl RecordingSyncChunksStorage {
    pub fn user_own_chunks(&self) -> Vec<SyncChunk> {
        lock(&self.user_own).clone()
    }

    pub fn linked_notebook_chunks(&self, guid: &str) -> Vec<SyncChunk> {
        lock(&self.linked_notebooks)
            .get(guid)
            .cloned()
            .unwrap_or_default()
    }

    pub fn flushes(&self) -> u32 {
        *lock(&self.flushes)
    }
}

impl SyncChunksStorage for RecordingSyncChunksStorage {
    fn put_user_own_sync_chunks(&self, sync_chunks: Vec<SyncChunk>) -> Result<()> {
        lock(&self.user_own).extend(sync_chunks);
        Ok(())
    }

    fn put_linked_notebook_sync_chunks(
        &self,
        linked_notebook_guid: &str,
        sync_chunks: Vec<SyncChunk>,
    ) -> Result<()> {
        lock(&self.linked_notebooks)
            .entry(linked_notebook_guid.to_string())
            .or_default()
            .extend(sync_chunks);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        *lock(&self.flushes) += 1;
        Ok(())
    }
}

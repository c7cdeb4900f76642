//! The account synchronizer: downloads, sends and retries until one
//! synchronization pass reaches a final result.

mod callback_wrapper;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio_util::sync::CancellationToken;

pub use callback_wrapper::AccountSynchronizerCallback;

use self::callback_wrapper::{CallbackWrapper, DownloadedSyncChunks};
use crate::auth::{AuthenticationInfoProvider, ClearCacheOptions};
use crate::config::SyncEngineConfig;
use crate::downloader::{DownloadResult, DownloadScopeResult, Downloader, DownloaderCallback};
use crate::models::{Account, Guid};
use crate::sender::{SendResult, Sender, SenderCallback};
use crate::storage::{SyncChunksStorage, SyncStateStorage};
use crate::sync::{StopSynchronizationError, SyncResult, SyncState};
use crate::util::lock;
use crate::{Error, Result};

/// Whether a download phase is followed by sending local changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendAfterDownload {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Download(SendAfterDownload),
    Send,
    Finish,
}

/// State of one `synchronize()` call
struct Context {
    callback_wrapper: Arc<CallbackWrapper>,
    canceler: CancellationToken,
    sync_result: SyncResult,
    sync_chunks: Arc<Mutex<DownloadedSyncChunks>>,
    authentication_restarts: u32,
}

impl Context {
    fn new(
        callback: Weak<dyn AccountSynchronizerCallback>,
        canceler: CancellationToken,
        sync_state: SyncState,
    ) -> Self {
        let sync_chunks = Arc::new(Mutex::new(DownloadedSyncChunks::default()));
        Self {
            callback_wrapper: Arc::new(CallbackWrapper::new(callback, Arc::clone(&sync_chunks))),
            canceler,
            sync_result: SyncResult {
                sync_state,
                ..SyncResult::default()
            },
            sync_chunks,
            authentication_restarts: 0,
        }
    }

    fn check_canceled(&self) -> Result<()> {
        if self.canceler.is_cancelled() {
            Err(Error::OperationCanceled)
        } else {
            Ok(())
        }
    }
}

/// Synchronizes one account with the remote service.
///
/// Cheap to clone; concurrent `synchronize()` calls are independent and not
/// serialized against each other.
#[derive(Clone)]
pub struct AccountSynchronizer {
    account: Arc<Account>,
    downloader: Arc<dyn Downloader>,
    sender: Arc<dyn Sender>,
    authentication_info_provider: Arc<dyn AuthenticationInfoProvider>,
    sync_state_storage: Arc<dyn SyncStateStorage>,
    sync_chunks_storage: Arc<dyn SyncChunksStorage>,
    config: SyncEngineConfig,
}

impl AccountSynchronizer {
    pub fn new(
        account: Account,
        downloader: Arc<dyn Downloader>,
        sender: Arc<dyn Sender>,
        authentication_info_provider: Arc<dyn AuthenticationInfoProvider>,
        sync_state_storage: Arc<dyn SyncStateStorage>,
        sync_chunks_storage: Arc<dyn SyncChunksStorage>,
        config: SyncEngineConfig,
    ) -> Result<Self> {
        if account.is_empty() {
            return Err(Error::invalid_argument("account is empty"));
        }

        Ok(Self {
            account: Arc::new(account),
            downloader,
            sender,
            authentication_info_provider,
            sync_state_storage,
            sync_chunks_storage,
            config,
        })
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Run one synchronization pass.
    ///
    /// Authentication expiry restarts downloading a bounded number of times.
    /// Rate limiting ends the pass successfully with the stop error recorded
    /// in the result. Other failures end the pass with `Err`.
    pub async fn synchronize(
        &self,
        callback: Weak<dyn AccountSynchronizerCallback>,
        canceler: CancellationToken,
    ) -> Result<SyncResult> {
        tracing::info!(
            user_id = self.account.user_id,
            account = %self.account.name,
            "Starting account synchronization"
        );

        let mut context = Context::new(callback, canceler, self.stored_sync_state());
        let mut step = Step::Download(SendAfterDownload::Yes);
        loop {
            step = match step {
                Step::Download(send_after_download) => {
                    self.download(&mut context, send_after_download).await?
                }
                Step::Send => self.send(&mut context).await?,
                Step::Finish => break,
            };
        }

        let sync_result = context.sync_result;
        tracing::info!(
            user_id = self.account.user_id,
            stop_synchronization_error = ?sync_result.stop_synchronization_error,
            "Account synchronization finished"
        );
        Ok(sync_result)
    }

    async fn download(
        &self,
        context: &mut Context,
        send_after_download: SendAfterDownload,
    ) -> Result<Step> {
        context.check_canceled()?;
        context.callback_wrapper.reset_counters();
        tracing::debug!(user_id = self.account.user_id, "Downloading");

        let callback: Arc<dyn DownloaderCallback> = context.callback_wrapper.clone();
        match self
            .downloader
            .download(context.canceler.clone(), callback)
            .await
        {
            Ok(result) => Ok(self.on_download_result(context, result, send_after_download)),
            Err(error) => self.on_download_error(context, error, send_after_download),
        }
    }

    fn on_download_result(
        &self,
        context: &mut Context,
        result: DownloadResult,
        send_after_download: SendAfterDownload,
    ) -> Step {
        context
            .callback_wrapper
            .notify_download_finished(result.has_data());

        let expired_scopes = self.download_scopes_with_expired_authentication(&result);
        if !expired_scopes.is_empty() {
            tracing::info!(
                scopes = ?expired_scopes,
                "Authentication expired while downloading"
            );
            context.sync_result.merge_download_result(result);
            self.persist_sync_chunks(context);
            for scope in &expired_scopes {
                self.authentication_info_provider.clear_caches(scope);
            }
            return self.restart_after_authentication_expiry(context, send_after_download);
        }

        if let Some(stop_error) = download_rate_limit(&result) {
            tracing::warn!(?stop_error, "Rate limit reached while downloading");
            context.sync_result.merge_download_result(result);
            self.persist_sync_chunks(context);
            context.sync_result.stop_synchronization_error = stop_error;
            return Step::Finish;
        }

        context.sync_result.merge_download_result(result);
        // Everything downloaded has been applied locally.
        *lock(&context.sync_chunks) = DownloadedSyncChunks::default();
        self.persist_sync_state(context);

        match send_after_download {
            SendAfterDownload::Yes => Step::Send,
            SendAfterDownload::No => Step::Finish,
        }
    }

    fn on_download_error(
        &self,
        context: &mut Context,
        error: Error,
        send_after_download: SendAfterDownload,
    ) -> Result<Step> {
        self.persist_sync_chunks(context);

        match error {
            Error::AuthenticationExpired => {
                tracing::info!("Authentication expired while downloading sync chunks");
                self.authentication_info_provider
                    .clear_caches(&ClearCacheOptions::All);
                Ok(self.restart_after_authentication_expiry(context, send_after_download))
            }
            Error::RateLimitReached {
                rate_limit_duration,
            } => {
                tracing::warn!(
                    ?rate_limit_duration,
                    "Rate limit reached while downloading sync chunks"
                );
                let counters = context.callback_wrapper.counters();
                let sync_result = &mut context.sync_result;
                if let Some(user_own) = counters.user_own.as_ref() {
                    sync_result.merge_user_own_counters(user_own);
                }
                for (guid, linked_notebook_counters) in counters.linked_notebooks {
                    sync_result.merge_linked_notebook_counters(guid, &linked_notebook_counters);
                }
                sync_result.stop_synchronization_error =
                    StopSynchronizationError::RateLimitReached {
                        rate_limit_duration,
                    };
                Ok(Step::Finish)
            }
            error => {
                tracing::warn!(%error, "Downloading failed");
                Err(error)
            }
        }
    }

    async fn send(&self, context: &mut Context) -> Result<Step> {
        context.check_canceled()?;
        tracing::debug!(user_id = self.account.user_id, "Sending");

        let callback: Arc<dyn SenderCallback> = context.callback_wrapper.clone();
        let result = self
            .sender
            .send(context.canceler.clone(), callback)
            .await
            .inspect_err(|error| tracing::warn!(%error, "Sending failed"))?;

        let expired_scopes = self.send_scopes_with_expired_authentication(&result);
        if !expired_scopes.is_empty() {
            tracing::info!(scopes = ?expired_scopes, "Authentication expired while sending");
            context.sync_result.merge_send_result(result);
            for scope in &expired_scopes {
                self.authentication_info_provider.clear_caches(scope);
            }
            return Ok(self.restart_after_authentication_expiry(context, SendAfterDownload::Yes));
        }

        if let Some(stop_error) = send_rate_limit(&result) {
            tracing::warn!(?stop_error, "Rate limit reached while sending");
            context.sync_result.merge_send_result(result);
            self.persist_sync_state(context);
            context.sync_result.stop_synchronization_error = stop_error;
            return Ok(Step::Finish);
        }

        let repeat_incremental_sync = result.need_to_repeat_incremental_sync();
        context.sync_result.merge_send_result(result);
        self.persist_sync_state(context);

        if repeat_incremental_sync {
            tracing::info!("Server data changed while sending, repeating incremental sync");
            Ok(Step::Download(SendAfterDownload::No))
        } else {
            Ok(Step::Finish)
        }
    }

    fn restart_after_authentication_expiry(
        &self,
        context: &mut Context,
        send_after_download: SendAfterDownload,
    ) -> Step {
        context.authentication_restarts += 1;
        if context.authentication_restarts > self.config.max_authentication_restarts {
            tracing::warn!(
                restarts = context.authentication_restarts - 1,
                "Authentication keeps expiring, giving up"
            );
            context.sync_result.stop_synchronization_error =
                StopSynchronizationError::AuthenticationExpired;
            return Step::Finish;
        }

        tracing::debug!(
            restart = context.authentication_restarts,
            "Restarting download after authentication expiry"
        );
        Step::Download(send_after_download)
    }

    fn download_scopes_with_expired_authentication(
        &self,
        result: &DownloadResult,
    ) -> Vec<ClearCacheOptions> {
        let mut scopes = Vec::new();
        if result.user_own_result.is_authentication_expired() {
            scopes.push(ClearCacheOptions::User(self.account.user_id));
        }
        scopes.extend(
            sorted_scopes(&result.linked_notebook_results)
                .filter(|(_, scope)| scope.is_authentication_expired())
                .map(|(guid, _)| ClearCacheOptions::LinkedNotebook(guid.clone())),
        );
        scopes
    }

    fn send_scopes_with_expired_authentication(
        &self,
        result: &SendResult,
    ) -> Vec<ClearCacheOptions> {
        let mut scopes = Vec::new();
        if result
            .user_own_result
            .as_ref()
            .is_some_and(|status| status.stop_synchronization_error.is_authentication_expired())
        {
            scopes.push(ClearCacheOptions::User(self.account.user_id));
        }
        scopes.extend(
            sorted_scopes(&result.linked_notebook_results)
                .filter(|(_, status)| status.stop_synchronization_error.is_authentication_expired())
                .map(|(guid, _)| ClearCacheOptions::LinkedNotebook(guid.clone())),
        );
        scopes
    }

    /// Hand buffered sync chunks to durable storage so a later pass can reuse
    /// them. Failures are logged and do not abort the pass.
    fn persist_sync_chunks(&self, context: &Context) {
        let sync_chunks = std::mem::take(&mut *lock(&context.sync_chunks));
        if sync_chunks.is_empty() {
            return;
        }

        let mut persisted = true;
        if !sync_chunks.user_own.is_empty() {
            let count = sync_chunks.user_own.len();
            if let Err(error) = self
                .sync_chunks_storage
                .put_user_own_sync_chunks(sync_chunks.user_own)
            {
                tracing::warn!(%error, count, "Failed to persist user own sync chunks");
                persisted = false;
            }
        }
        for (guid, chunks) in sync_chunks.linked_notebooks {
            if chunks.is_empty() {
                continue;
            }
            let count = chunks.len();
            if let Err(error) = self
                .sync_chunks_storage
                .put_linked_notebook_sync_chunks(&guid, chunks)
            {
                tracing::warn!(
                    %error,
                    linked_notebook_guid = %guid,
                    count,
                    "Failed to persist linked notebook sync chunks"
                );
                persisted = false;
            }
        }

        if let Err(error) = self.sync_chunks_storage.flush() {
            tracing::warn!(%error, "Failed to flush sync chunks storage");
        } else if persisted {
            tracing::debug!("Persisted downloaded sync chunks");
        }
    }

    /// Watermarks left by earlier passes; downloaded and sent states are
    /// merged on top of them
    fn stored_sync_state(&self) -> SyncState {
        match self.sync_state_storage.get_sync_state(&self.account) {
            Ok(sync_state) => sync_state.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(
                    %error,
                    user_id = self.account.user_id,
                    "Failed to read stored sync state"
                );
                SyncState::default()
            }
        }
    }

    fn persist_sync_state(&self, context: &Context) {
        let sync_state = &context.sync_result.sync_state;
        if let Err(error) = self
            .sync_state_storage
            .set_sync_state(&self.account, sync_state)
        {
            tracing::warn!(%error, user_id = self.account.user_id, "Failed to persist sync state");
        }
    }
}

fn sorted_scopes<T>(scopes: &HashMap<Guid, T>) -> impl Iterator<Item = (&Guid, &T)> {
    let mut scopes: Vec<_> = scopes.iter().collect();
    scopes.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
    scopes.into_iter()
}

fn download_rate_limit(result: &DownloadResult) -> Option<StopSynchronizationError> {
    std::iter::once(&result.user_own_result)
        .chain(sorted_scopes(&result.linked_notebook_results).map(|(_, scope)| scope))
        .find_map(DownloadScopeResult::rate_limit)
}

fn send_rate_limit(result: &SendResult) -> Option<StopSynchronizationError> {
    result
        .user_own_result
        .iter()
        .chain(sorted_scopes(&result.linked_notebook_results).map(|(_, status)| status))
        .map(|status| status.stop_synchronization_error)
        .find(StopSynchronizationError::is_rate_limit_reached)
}

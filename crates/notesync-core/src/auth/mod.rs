//! Authentication info for the user's account and for linked notebooks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Account, Guid, LinkedNotebook, UserId};
use crate::util::{lock, unix_timestamp_now};
use crate::{Error, Result};

const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Token and endpoints needed to talk to the remote service for one scope
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationInfo {
    pub user_id: UserId,
    pub auth_token: String,
    /// Unix seconds
    pub auth_token_expiration_time: i64,
    /// Unix seconds
    pub authentication_time: i64,
    pub shard_id: String,
    pub note_store_url: String,
    pub web_api_url_prefix: String,
}

impl AuthenticationInfo {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.auth_token_expiration_time <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthenticationInfo {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthenticationInfo")
            .field("user_id", &self.user_id)
            .field("auth_token", &"[REDACTED]")
            .field(
                "auth_token_expiration_time",
                &self.auth_token_expiration_time,
            )
            .field("authentication_time", &self.authentication_time)
            .field("shard_id", &self.shard_id)
            .field("note_store_url", &self.note_store_url)
            .field("web_api_url_prefix", &self.web_api_url_prefix)
            .finish()
    }
}

/// Whether a cached token may be returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationMode {
    Cache,
    NoCache,
}

/// Which cached authentication entries to drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearCacheOptions {
    User(UserId),
    LinkedNotebook(Guid),
    All,
}

/// Supplies and caches authentication info per account and per linked notebook
#[async_trait]
pub trait AuthenticationInfoProvider: Send + Sync {
    async fn authenticate_account(
        &self,
        account: &Account,
        mode: AuthenticationMode,
    ) -> Result<Arc<AuthenticationInfo>>;

    async fn authenticate_to_linked_notebook(
        &self,
        account: &Account,
        linked_notebook: &LinkedNotebook,
        mode: AuthenticationMode,
    ) -> Result<Arc<AuthenticationInfo>>;

    fn clear_caches(&self, options: &ClearCacheOptions);
}

/// Performs a fresh authentication against the remote service
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate_account(&self, account: &Account) -> Result<AuthenticationInfo>;

    async fn authenticate_to_linked_notebook(
        &self,
        account: &Account,
        linked_notebook: &LinkedNotebook,
    ) -> Result<AuthenticationInfo>;
}

#[derive(Default)]
struct AuthenticationCache {
    accounts: HashMap<UserId, Arc<AuthenticationInfo>>,
    linked_notebooks: HashMap<Guid, Arc<AuthenticationInfo>>,
}

/// In-memory cache in front of an [`Authenticator`].
///
/// Expired entries are refreshed transparently; the cache lock is never held
/// while the authenticator runs.
pub struct CachingAuthenticationInfoProvider<A: Authenticator> {
    authenticator: A,
    cache: Mutex<AuthenticationCache>,
}

impl<A: Authenticator> CachingAuthenticationInfoProvider<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            cache: Mutex::new(AuthenticationCache::default()),
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, AuthenticationCache> {
        lock(&self.cache)
    }
}

#[async_trait]
impl<A: Authenticator> AuthenticationInfoProvider for CachingAuthenticationInfoProvider<A> {
    async fn authenticate_account(
        &self,
        account: &Account,
        mode: AuthenticationMode,
    ) -> Result<Arc<AuthenticationInfo>> {
        if account.is_empty() {
            return Err(Error::invalid_argument("account is empty"));
        }

        if mode == AuthenticationMode::Cache {
            let cached = self.lock_cache().accounts.get(&account.user_id).cloned();
            if let Some(info) = cached.filter(|info| !info.is_expired()) {
                return Ok(info);
            }
        }

        tracing::debug!(user_id = account.user_id, "Authenticating account");
        let info = Arc::new(self.authenticator.authenticate_account(account).await?);
        self.lock_cache()
            .accounts
            .insert(account.user_id, Arc::clone(&info));
        Ok(info)
    }

    async fn authenticate_to_linked_notebook(
        &self,
        account: &Account,
        linked_notebook: &LinkedNotebook,
        mode: AuthenticationMode,
    ) -> Result<Arc<AuthenticationInfo>> {
        let guid = linked_notebook
            .guid
            .clone()
            .ok_or_else(|| Error::invalid_argument("linked notebook has no guid"))?;

        if mode == AuthenticationMode::Cache {
            let cached = self.lock_cache().linked_notebooks.get(&guid).cloned();
            if let Some(info) = cached.filter(|info| !info.is_expired()) {
                return Ok(info);
            }
        }

        tracing::debug!(linked_notebook_guid = %guid, "Authenticating to linked notebook");
        let info = Arc::new(
            self.authenticator
                .authenticate_to_linked_notebook(account, linked_notebook)
                .await?,
        );
        self.lock_cache()
            .linked_notebooks
            .insert(guid, Arc::clone(&info));
        Ok(info)
    }

    fn clear_caches(&self, options: &ClearCacheOptions) {
        let mut cache = self.lock_cache();
        match options {
            ClearCacheOptions::User(user_id) => {
                cache.accounts.remove(user_id);
            }
            ClearCacheOptions::LinkedNotebook(guid) => {
                cache.linked_notebooks.remove(guid);
            }
            ClearCacheOptions::All => {
                cache.accounts.clear();
                cache.linked_notebooks.clear();
            }
        }
        tracing::debug!(?options, "Cleared authentication caches");
    }
}

//! Account model

use serde::{Deserialize, Serialize};

use super::UserId;

/// The remote service account being synchronized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account username
    pub name: String,
    /// Remote user identifier
    pub user_id: UserId,
    /// Remote service host
    pub host: String,
    pub shard_id: Option<String>,
}

impl Account {
    #[must_use]
    pub fn new(name: impl Into<String>, user_id: UserId, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_id,
            host: host.into(),
            shard_id: None,
        }
    }

    /// An account without a name cannot be synchronized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

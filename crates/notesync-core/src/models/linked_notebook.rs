//! Linked notebook model

use serde::{Deserialize, Serialize};

use super::{Guid, HasGuid};

/// A notebook shared into the account from another account.
///
/// Synchronized under its own update counter and authentication token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedNotebook {
    pub guid: Option<Guid>,
    pub update_sequence_num: Option<i32>,
    pub share_name: Option<String>,
    pub username: Option<String>,
    pub shard_id: Option<String>,
    pub shared_notebook_global_id: Option<String>,
    pub uri: Option<String>,
    pub note_store_url: Option<String>,
    pub web_api_url_prefix: Option<String>,
}

impl LinkedNotebook {
    /// Create a linked notebook with the given guid
    #[must_use]
    pub fn with_guid(guid: impl Into<Guid>) -> Self {
        Self {
            guid: Some(guid.into()),
            ..Self::default()
        }
    }
}

impl HasGuid for LinkedNotebook {
    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }
}

//! Sync engine configuration.
//!
//! Limits that bound the retry state machine and the conflict resolver. Values
//! can come from a JSON document or from environment variables; both fall back
//! to the defaults for anything left unset.

use std::env;

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;
use crate::{Error, Result};

const ENV_MAX_AUTH_RESTARTS: &str = "NOTESYNC_MAX_AUTH_RESTARTS";
const ENV_MAX_CONFLICTING_NAME_PROBES: &str = "NOTESYNC_MAX_CONFLICTING_NAME_PROBES";

const DEFAULT_MAX_AUTHENTICATION_RESTARTS: u32 = 3;
const DEFAULT_MAX_CONFLICTING_NAME_PROBES: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncEngineConfig {
    /// How many times one `synchronize()` call may restart downloading after
    /// an authentication expiry before giving up
    pub max_authentication_restarts: u32,
    /// How many `"<name> - conflicting (N)"` candidates the conflict resolver
    /// probes before failing
    pub max_conflicting_name_probes: u32,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            max_authentication_restarts: DEFAULT_MAX_AUTHENTICATION_RESTARTS,
            max_conflicting_name_probes: DEFAULT_MAX_CONFLICTING_NAME_PROBES,
        }
    }
}

impl SyncEngineConfig {
    /// Parse configuration from a JSON document.
    pub fn from_json_str(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }

    fn validate(self) -> Result<Self> {
        if self.max_conflicting_name_probes == 0 {
            return Err(Error::invalid_argument(
                "max_conflicting_name_probes must be at least 1",
            ));
        }
        Ok(self)
    }
}

fn parse_config<F>(mut lookup: F) -> Result<SyncEngineConfig>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = SyncEngineConfig::default();
    if let Some(value) = parse_u32(&mut lookup, ENV_MAX_AUTH_RESTARTS)? {
        config.max_authentication_restarts = value;
    }
    if let Some(value) = parse_u32(&mut lookup, ENV_MAX_CONFLICTING_NAME_PROBES)? {
        config.max_conflicting_name_probes = value;
    }
    config.validate()
}

fn parse_u32<F>(lookup: &mut F, key: &str) -> Result<Option<u32>>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(raw) = normalize_text_option(lookup(key)) else {
        return Ok(None);
    };
    raw.parse::<u32>()
        .map(Some)
        .map_err(|error| Error::invalid_argument(format!("{key}={raw}: {error}")))
}

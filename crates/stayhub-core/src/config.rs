//! Client configuration model.
//!
//! Loaded from `config.toml` by `stayhub-infrastructure`; every field has a
//! default so an absent or partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://api.stayhub.app/graphql";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How concurrent stale-token failures share the refresh exchange.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// One exchange in flight at a time; concurrent operations await it.
    #[default]
    SingleFlight,
    /// Every stale operation runs its own exchange.
    Independent,
}

/// Whether a read may be answered from the normalized cache.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Serve from cache when every referenced entity is present.
    #[default]
    CacheFirst,
    /// Always hit the network, then write the result into the cache.
    NetworkOnly,
    /// Always hit the network and leave the cache untouched.
    NoCache,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Fixed GraphQL endpoint.
    pub endpoint: String,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout_secs: Option<u64>,
    pub refresh_policy: RefreshPolicy,
    pub default_fetch_policy: FetchPolicy,
    /// Mirror the normalized cache into device storage.
    pub persist_cache: bool,
    /// Directory holding `storage.json`. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            refresh_policy: RefreshPolicy::default(),
            default_fetch_policy: FetchPolicy::default(),
            persist_cache: true,
            data_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }
}

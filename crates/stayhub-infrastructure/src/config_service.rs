//! Configuration loading.
//!
//! Priority: environment variables > config.toml > built-in defaults.

use crate::paths::StayhubPaths;
use stayhub_core::config::ClientConfig;
use stayhub_core::{Result, StayhubError};
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_API_URL: &str = "STAYHUB_API_URL";
pub const ENV_DATA_DIR: &str = "STAYHUB_DATA_DIR";
pub const ENV_LOG: &str = "STAYHUB_LOG";

/// Loads [`ClientConfig`] from disk and the environment.
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the platform config file (`~/.config/stayhub/config.toml`).
    pub fn new_default() -> Result<Self> {
        Ok(Self {
            path: StayhubPaths::config_file()?,
        })
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file (a missing file yields defaults), then applies
    /// environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let mut config = self.load_file()?;
        apply_overrides(&mut config, |name| env::var(name).ok());
        Ok(config)
    }

    fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            StayhubError::config(format!(
                "Failed to parse configuration file at {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

fn apply_overrides(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
        config.endpoint = url;
    }
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
        config.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
        config.log_level = level;
    }
}

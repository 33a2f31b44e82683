//! Unified path management for stayhub files.
//!
//! ```text
//! ~/.config/stayhub/           # Config directory
//! └── config.toml              # Client configuration
//!
//! ~/.local/share/stayhub/      # Data directory
//! └── storage.json             # Device key-value storage (session, cache)
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "stayhub";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for stayhub_core::StayhubError {
    fn from(err: PathError) -> Self {
        stayhub_core::StayhubError::config(err.to_string())
    }
}

pub struct StayhubPaths;

impl StayhubPaths {
    /// Returns the stayhub configuration directory (e.g. `~/.config/stayhub/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the stayhub data directory (e.g. `~/.local/share/stayhub/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Storage document inside `data_dir`, or inside the platform data
    /// directory when no override is given.
    pub fn storage_file(data_dir: Option<&PathBuf>) -> Result<PathBuf, PathError> {
        let dir = match data_dir {
            Some(dir) => dir.clone(),
            None => Self::data_dir()?,
        };
        Ok(dir.join("storage.json"))
    }
}

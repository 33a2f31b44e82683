//! Atomic JSON file operations.
//!
//! Provides a thin layer for safe concurrent access to a JSON document shared
//! between processes (the app and, for example, a CLI run against the same
//! data directory).

use serde::{Serialize, de::DeserializeOwned};
use stayhub_core::{Result, StayhubError};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A handle to a JSON file with atomic replace semantics.
///
/// - Updates are all-or-nothing via a uniquely named tmp file + rename
/// - `update` holds an exclusive lock across read-modify-write
/// - Data is fsynced before the rename
///
/// The lock lives in a sibling `<name>.lock` file that is never removed:
/// deleting it would let a waiter lock an unlinked inode while a newcomer
/// locks a fresh one.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)
            .map_err(|e| StayhubError::json(self.path.display(), e))?;
        Ok(Some(data))
    }

    /// Saves data to the file atomically.
    ///
    /// Concurrent savers each write their own tmp file; the last rename wins.
    pub fn save(&self, data: &T) -> Result<()> {
        let parent = self.parent_dir()?;
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(data)?;

        let mut tmp_file = NamedTempFile::new_in(parent)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.as_file().sync_all()?;
        tmp_file.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// `f` receives the current contents (or `default_value` when the file is
    /// missing); whatever it returns is handed back to the caller after the
    /// data has been written.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let out = f(&mut data);
        self.save(&data)?;

        Ok(out)
    }

    fn parent_dir(&self) -> Result<&Path> {
        self.path
            .parent()
            .ok_or_else(|| StayhubError::io("Path has no parent directory"))
    }
}

/// Exclusive lock guard, released when the handle closes.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        fs2::FileExt::lock_exclusive(&file)
            .map_err(|e| StayhubError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { _file: file })
    }
}

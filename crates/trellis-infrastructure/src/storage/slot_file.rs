//! Atomic single-slot TOML storage.
//!
//! A thin layer for one durably stored value per file. Writes go through a
//! temporary file with an explicit fsync and an atomic rename, guarded by
//! an advisory file lock, so a crash mid-write can never leave a torn slot.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use trellis_core::error::{Result, TrellisError};

/// A handle to one atomically written TOML slot.
pub struct SlotFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> SlotFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a slot handle for `path`. The file may not exist yet.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the slot.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: slot present and parseable
    /// - `Ok(None)`: file absent or empty
    /// - `Err`: read or parse failure
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let value: T = toml::from_str(&content)?;
        Ok(Some(value))
    }

    /// Serializes `value` into the slot atomically.
    pub fn save(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let _lock = FileLock::acquire(&self.path)?;

        let toml_string = toml::to_string_pretty(value)?;

        // Write to a temporary file in the same directory, then rename.
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Removes the slot. Absent files are a no-op.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| TrellisError::storage("Slot path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| TrellisError::storage("Slot path has no file name"))?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// An advisory file lock released on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| TrellisError::storage(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped; removing the
        // lock file is best effort.
        let _ = fs::remove_file(&self.lock_path);
    }
}

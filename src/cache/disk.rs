//! On-disk cache tier: one PNG file per key.
//!
//! Entries are kept indefinitely: imagery for a past date never changes, so
//! there is no TTL and no size-based eviction. The directory is created
//! lazily on the first write. Reads and writes for the same key are
//! serialized through a per-key mutex so concurrent fetch tasks can never
//! interleave a partial write with a read.

use crate::cache::types::{CacheError, CacheKey};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tracing::debug;

/// Disk cache for persistent storage of raw tile responses.
pub struct DiskCache {
    /// Cache directory root
    cache_dir: PathBuf,
    /// Per-key locks guarding file reads/writes
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DiskCache {
    /// Create a new disk cache rooted at `cache_dir`.
    ///
    /// The directory is not created here; it appears on the first write.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Root directory of this cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the on-disk entry for a key.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.file_name())
    }

    /// Lock handle for one key's file.
    fn lock_for(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            locks
                .entry(key.composite())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Read a cached response from disk.
    ///
    /// Returns `Ok(None)` when the entry does not exist.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        match fs::read(self.entry_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    /// Write a response to disk, creating the cache directory if needed.
    pub async fn put(&self, key: &CacheKey, data: &[u8]) -> Result<(), CacheError> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        fs::create_dir_all(&self.cache_dir).await?;
        fs::write(self.entry_path(key), data).await?;
        debug!(key = %key.composite(), bytes = data.len(), "Disk cache write");
        Ok(())
    }

    /// Check whether an entry exists on disk.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        fs::try_exists(self.entry_path(key)).await.unwrap_or(false)
    }

    /// Remove every cached file under the cache root.
    ///
    /// The cache is otherwise never invalidated; this exists for external
    /// wipes (tests, disk pressure handled by an operator).
    pub async fn clear(&self) -> Result<(), CacheError> {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(CacheError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("png") {
                fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}

//! Key-value store adapter.
//!
//! Implements [`StoragePort`] for the lock console.
//!
//! - File backend: the whole store is a postcard-encoded map written to a
//!   temporary file and renamed over the old one on every mutation, so a
//!   crash never leaves a half-written store.
//! - Memory backend: same semantics without a file (tests, `--memory`).
//! - Namespace isolation: keys are stored as `<namespace>::<key>`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};

pub struct KvStoreAdapter {
    path: Option<PathBuf>,
    store: BTreeMap<String, Vec<u8>>,
}

impl KvStoreAdapter {
    /// Open (or create on first write) the store file at `path`.
    ///
    /// A missing file is an empty store.  An undecodable file is an error;
    /// it is never silently overwritten.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let store = match fs::read(&path) {
            Ok(bytes) => postcard::from_bytes(&bytes).map_err(|_| {
                warn!("KvStore: {} is corrupted", path.display());
                StorageError::Corrupted
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("KvStore: cannot read {}: {}", path.display(), e);
                return Err(StorageError::IoError);
            }
        };
        info!("KvStore: opened {} ({} keys)", path.display(), store.len());
        Ok(Self {
            path: Some(path),
            store,
        })
    }

    /// Volatile store with no backing file.
    pub fn in_memory() -> Self {
        info!("KvStore: memory backend");
        Self {
            path: None,
            store: BTreeMap::new(),
        }
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    fn prefix(namespace: &str) -> String {
        format!("{}::", namespace)
    }

    /// Write the current map to disk (no-op for the memory backend).
    ///
    /// Returns only once the new contents and the rename are on stable
    /// storage.
    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = postcard::to_allocvec(&self.store).map_err(|_| StorageError::IoError)?;
        write_durably(path, &bytes).map_err(|e| {
            warn!("KvStore: write to {} failed: {}", path.display(), e);
            StorageError::IoError
        })
    }
}

/// Write `bytes` to a sibling tmp file, fsync it, rename it over `path`,
/// then fsync the directory so the rename itself survives a power cut.
fn write_durably(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, path)?;
    sync_parent_dir(path)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl StoragePort for KvStoreAdapter {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.store
            .get(&Self::composite_key(namespace, key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store.insert(Self::composite_key(namespace, key), data.to_vec());
        self.flush()
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
        let prefix = Self::prefix(namespace);
        Ok(self
            .store
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_owned))
            .collect())
    }

    fn erase_namespace(&mut self, namespace: &str) -> Result<(), StorageError> {
        let prefix = Self::prefix(namespace);
        self.store.retain(|k, _| !k.starts_with(&prefix));
        self.flush()
    }
}

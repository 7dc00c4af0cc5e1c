//! Snapshot stores.

use pricecache_core::error::SnapshotError;
use pricecache_core::traits::SnapshotStore;
use pricecache_core::types::Snapshot;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Snapshot stored as a single JSON file.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot in place.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn restore(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        Ok(Some(snapshot))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes =
            serde_json::to_vec(snapshot).map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        let tmp = self.temp_path();
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }
}

/// In-process snapshot store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Option<Snapshot>,
    writes: usize,
}

impl MemorySnapshotStore {
    /// Create an empty store (restore reports nothing stored).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(MemoryState {
                snapshot: Some(snapshot),
                writes: 0,
            }),
        }
    }

    /// Copy of the last persisted snapshot.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.lock().snapshot.clone()
    }

    /// Number of `persist` calls so far.
    pub fn persist_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn restore(&self) -> Result<Option<Snapshot>, SnapshotError> {
        Ok(self.lock().snapshot.clone())
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let mut state = self.lock();
        state.snapshot = Some(snapshot.clone());
        state.writes += 1;
        Ok(())
    }
}

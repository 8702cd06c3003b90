//! Durable history persistence as a single JSON snapshot.

use crate::types::ChatMessage;
use log::{debug, info};
use lorebase_protocol::ChatMode;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current snapshot schema version.
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

/// Persisted log for one mode, already truncated to the retention cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeLogRecord {
    /// Mode owning the log.
    pub mode: ChatMode,
    /// Retained messages, oldest first.
    pub messages: Vec<ChatMessage>,
}

/// Full per-mode history snapshot written on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySnapshot {
    /// Snapshot schema version.
    pub version: u32,
    /// One record per non-empty mode.
    pub modes: Vec<ModeLogRecord>,
}

/// Errors returned by the history state store.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported schema version: {0}")]
    UnsupportedSchema(u32),
}

/// Persistent store abstraction for mode history snapshots.
///
/// Calls are fire-and-forget from the orchestrator's perspective; callers
/// log failures and continue from memory.
pub trait HistoryStateStore: Send + Sync {
    /// Replace the persisted snapshot.
    fn save_history(&self, snapshot: &HistorySnapshot) -> Result<(), StateError>;
    /// Load the persisted snapshot, if any.
    fn load_history(&self) -> Result<Option<HistorySnapshot>, StateError>;
}

/// JSON-file-backed history store implementation.
pub struct JsonHistoryStore {
    /// Root directory holding the snapshot file.
    root: PathBuf,
    /// Serialize write access to the snapshot file.
    write_lock: Mutex<()>,
}

impl JsonHistoryStore {
    /// Create a new store under the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StateError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!("initialized history store (root={})", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the snapshot file.
    fn snapshot_path(&self) -> PathBuf {
        self.root.join("history.json")
    }

    /// Path of the staging file used for atomic replacement.
    fn staging_path(&self) -> PathBuf {
        self.root.join("history.json.tmp")
    }
}

impl HistoryStateStore for JsonHistoryStore {
    /// Write the snapshot to a staging file, then rename it into place.
    fn save_history(&self, snapshot: &HistorySnapshot) -> Result<(), StateError> {
        let _guard = self.write_lock.lock();
        let staging = self.staging_path();
        let encoded = serde_json::to_vec(snapshot)?;
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&staging)?;
        file.write_all(&encoded)?;
        fs::rename(&staging, self.snapshot_path())?;
        debug!(
            "persisted history snapshot (modes={}, bytes={})",
            snapshot.modes.len(),
            encoded.len()
        );
        Ok(())
    }

    fn load_history(&self) -> Result<Option<HistorySnapshot>, StateError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read(&path)?;
        let snapshot: HistorySnapshot = serde_json::from_slice(&raw)?;
        if snapshot.version > HISTORY_SCHEMA_VERSION {
            return Err(StateError::UnsupportedSchema(snapshot.version));
        }
        debug!(
            "loaded history snapshot (modes={})",
            snapshot.modes.len()
        );
        Ok(Some(snapshot))
    }
}

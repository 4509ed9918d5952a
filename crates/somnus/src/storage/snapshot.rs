use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SomnusError};
use crate::memory::types::{EpisodicEvent, Message};

/// Full persisted state of an agent.
///
/// `working_memory` is written for inspection but never restored into a
/// live session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub semantic_memory: Vec<String>,
    #[serde(default)]
    pub episodic_memory: Vec<EpisodicEvent>,
    #[serde(default)]
    pub working_memory: Vec<Message>,
}

/// Reads and writes whole snapshots as a single JSON file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot, or an empty one if the file does not exist yet
    pub fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            debug!("No snapshot at {}, starting empty", self.path.display());
            return Ok(Snapshot::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            SomnusError::Storage(format!(
                "Failed to read snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        info!(
            "Loaded snapshot from {} ({} facts, {} events)",
            self.path.display(),
            snapshot.semantic_memory.len(),
            snapshot.episodic_memory.len()
        );
        Ok(snapshot)
    }

    /// Write the snapshot, creating parent directories as needed.
    ///
    /// The file is replaced atomically so an interrupted save never leaves a
    /// truncated snapshot behind.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SomnusError::Storage(format!(
                    "Failed to create snapshot directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(SomnusError::Storage(format!(
                "Failed to replace snapshot {}: {}",
                self.path.display(),
                e
            )));
        }

        info!(
            "Saved snapshot to {} ({} facts, {} events)",
            self.path.display(),
            snapshot.semantic_memory.len(),
            snapshot.episodic_memory.len()
        );
        Ok(())
    }
}

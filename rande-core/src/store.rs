//! Local slot persistence.
//!
//! One JSON file per collection under the data directory holds that
//! collection's full record sequence. Reconciliation markers live in a
//! state subdirectory next to them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::collection::Collection;
use crate::error::{RandeError, RandeResult};

const STATE_DIR: &str = ".rande/state";

/// Durable key-value persistence, one slot per collection.
#[derive(Debug, Clone)]
pub struct LocalStore {
    data_dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        LocalStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub(crate) fn state_dir(&self) -> PathBuf {
        self.data_dir.join(STATE_DIR)
    }

    fn slot_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    fn marker_path(&self, collection: Collection) -> PathBuf {
        self.state_dir().join(collection.marker_file_name())
    }

    /// Load the persisted sequence for a collection.
    ///
    /// An absent or malformed slot is treated as an empty collection; this
    /// never fails.
    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let path = self.slot_path(collection);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&content) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    error = %e,
                    "malformed local data, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Replace the persisted sequence for a collection.
    ///
    /// Writes to a temp file and renames over the slot, so a reader never
    /// observes a partial write.
    pub fn save<T: Serialize>(&self, collection: Collection, items: &[T]) -> RandeResult<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let path = self.slot_path(collection);
        let temp = self
            .data_dir
            .join(format!("{}.tmp", collection.file_name()));

        let content = serde_json::to_string_pretty(items)
            .map_err(|e| RandeError::Serialization(e.to_string()))?;

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    /// When reconciliation last ran for this collection, if ever.
    pub fn last_synced_at(&self, collection: Collection) -> Option<DateTime<Utc>> {
        let content = std::fs::read_to_string(self.marker_path(collection)).ok()?;
        DateTime::parse_from_rfc3339(content.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Record that reconciliation ran for this collection at `at`.
    pub fn record_synced_at(&self, collection: Collection, at: DateTime<Utc>) -> RandeResult<()> {
        std::fs::create_dir_all(self.state_dir())?;
        std::fs::write(self.marker_path(collection), at.to_rfc3339())?;
        Ok(())
    }
}

//! Snapshot persistence
//!
//! The controller only needs "read/write a named blob of session state":
//! - `MemoryStore` keeps it in process (tests, embedded use)
//! - `JsonFileStore` writes pretty JSON to disk

use std::fs;
use std::path::{Path, PathBuf};

use gf_core::{GfError, GfResult};

use crate::snapshot::SessionSnapshot;

/// Persistence collaborator
pub trait SnapshotStore {
    /// Load the stored snapshot; `None` when nothing has been saved yet
    fn load(&mut self) -> GfResult<Option<SessionSnapshot>>;

    /// Replace the stored snapshot
    fn save(&mut self, snapshot: &SessionSnapshot) -> GfResult<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Option<SessionSnapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            saves: 0,
        }
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self) -> GfResult<Option<SessionSnapshot>> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> GfResult<()> {
        self.snapshot = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the platform default location
    pub fn at_default_path() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default session file path
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("gachaforge"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("session.json")
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&mut self) -> GfResult<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| GfError::Persistence(format!("{}: {e}", self.path.display())))?;
        let snapshot = serde_json::from_str(&content)
            .map_err(|e| GfError::Persistence(format!("{}: {e}", self.path.display())))?;
        Ok(Some(snapshot))
    }

    fn save(&mut self, snapshot: &SessionSnapshot) -> GfResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GfError::Persistence(format!("{}: {e}", parent.display())))?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)
            .map_err(|e| GfError::Persistence(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_gacha::Rarity;

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&SessionSnapshot::new()).unwrap();
        store.save(&SessionSnapshot::new()).unwrap();
        assert_eq!(store.saves(), 2);
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested/session.json"));
        assert!(store.load().unwrap().is_none());

        let mut snapshot = SessionSnapshot::new();
        snapshot.active_pool_id = Some("limited_01".into());
        snapshot.stats.count_draw(Rarity::Sr);
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.session_id, snapshot.session_id);
        assert_eq!(loaded.active_pool_id.as_deref(), Some("limited_01"));
        assert_eq!(loaded.stats.count(Rarity::Sr), 1);
    }

    #[test]
    fn test_file_store_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, GfError::Persistence(_)));
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(JsonFileStore::default_path().ends_with("gachaforge/session.json"));
    }
}

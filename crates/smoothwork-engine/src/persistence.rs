//! Workflow persistence adapters
//!
//! The editor only depends on the `WorkflowStore` contract: one load at
//! startup, one save after every committed mutation once hydrated. Two
//! adapters ship with the crate, a JSON file store and an in-memory store
//! for tests and embedding.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{EngineError, Result};
use crate::types::Workflow;

/// Load/save contract for the persisted workflow
pub trait WorkflowStore: Send + Sync {
    /// Namespaced key the workflow is stored under
    fn storage_key(&self) -> &str;

    /// Load the stored workflow
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Workflow>>;

    /// Persist `workflow`, replacing any previous value
    fn save(&self, workflow: &Workflow) -> Result<()>;
}

/// Stores the workflow as `<dir>/<key>.json`
///
/// The directory is created on first save.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    key: String,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    /// Full path of the backing file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

impl WorkflowStore for FileStore {
    fn storage_key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Workflow>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let workflow: Workflow = serde_json::from_str(&content)?;
        log::info!(
            "Loaded workflow '{}' from {:?} ({} nodes, {} edges)",
            self.key,
            path,
            workflow.nodes.len(),
            workflow.edges.len()
        );
        Ok(Some(workflow))
    }

    fn save(&self, workflow: &Workflow) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path();
        let content = serde_json::to_string(workflow)?;
        std::fs::write(&path, content)?;
        log::debug!("Saved workflow '{}' to {:?}", self.key, path);
        Ok(())
    }
}

/// Keeps the serialized workflow in memory
#[derive(Debug)]
pub struct MemoryStore {
    key: String,
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Mutex::new(None),
        }
    }

    /// Create a store pre-seeded with raw stored text
    pub fn with_raw(key: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Mutex::new(Some(raw.into())),
        }
    }

    /// The raw stored text, if any
    pub fn raw(&self) -> Option<String> {
        self.value.lock().ok().and_then(|v| v.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(crate::constants::storage::KEY)
    }
}

impl WorkflowStore for MemoryStore {
    fn storage_key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Workflow>> {
        let guard = self
            .value
            .lock()
            .map_err(|e| EngineError::persistence(e.to_string()))?;
        match guard.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, workflow: &Workflow) -> Result<()> {
        let serialized = serde_json::to_string(workflow)?;
        let mut guard = self
            .value
            .lock()
            .map_err(|e| EngineError::persistence(e.to_string()))?;
        *guard = Some(serialized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WorkflowBuilder;
    use crate::types::NodeKind;
    use tempfile::TempDir;

    fn sample() -> Workflow {
        WorkflowBuilder::new()
            .add_node("a", NodeKind::Start, (0.0, 0.0))
            .add_node("b", NodeKind::End, (0.0, 140.0))
            .add_edge("a", "b")
            .build()
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested"), "smoothwork-workflow");

        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        assert!(store.path().ends_with("smoothwork-workflow.json"));

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_file_store_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path(), "wf");
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(EngineError::Serialization(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::default();
        assert_eq!(store.storage_key(), "smoothwork-workflow");
        assert!(store.load().unwrap().is_none());

        store.save(&sample()).unwrap();
        assert!(store.raw().unwrap().contains("\"nodes\""));
        assert_eq!(store.load().unwrap().unwrap(), sample());

        let broken = MemoryStore::with_raw("wf", "[1, 2");
        assert!(broken.load().is_err());
    }
}

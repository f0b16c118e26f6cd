use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::store::traits::KeyValueStore;

/// JSON-file-backed key-value store. The full map lives in memory and
/// is rewritten on every mutation; with no path configured the store
/// is purely in-memory (useful for development and tests).
pub struct FileStore {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, Value>>,
}

impl FileStore {
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let entries = match &path {
            Some(file) if file.exists() => {
                let raw = std::fs::read_to_string(file)
                    .with_context(|| format!("reading metadata store {}", file.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing metadata store {}", file.display()))?
            }
            _ => HashMap::new(),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn persist(&self, entries: &HashMap<String, Value>) -> Result<()> {
        if let Some(file) = &self.path {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let raw = serde_json::to_string_pretty(entries)?;
            std::fs::write(file, raw)
                .with_context(|| format!("writing metadata store {}", file.display()))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.remove(key);
        self.persist(&entries)
    }
}

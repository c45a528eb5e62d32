use fs_err as fs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::errors::MobiusError;
use crate::model::GenerationResult;

/// Slot holding the serialized history list.
pub const HISTORY_KEY: &str = "mobius_history";

/// Minimal string key-value persistence.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, MobiusError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), MobiusError>;
    fn remove(&mut self, key: &str) -> Result<(), MobiusError>;
}

/// One `<key>.json` file per key under `dir`.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn storage(e: impl std::fmt::Display) -> MobiusError {
    MobiusError::Storage(e.to_string())
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, MobiusError> {
        let p = self.path_for(key);
        if !p.exists() {
            return Ok(None);
        }
        fs::read_to_string(&p).map(Some).map_err(storage)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), MobiusError> {
        fs::create_dir_all(&self.dir).map_err(storage)?;
        // Write beside the target and rename so a crash never leaves half a list.
        let tmp = NamedTempFile::new_in(&self.dir).map_err(storage)?;
        fs::write(tmp.path(), value).map_err(storage)?;
        tmp.persist(self.path_for(key)).map_err(storage)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), MobiusError> {
        let p = self.path_for(key);
        if p.exists() {
            fs::remove_file(&p).map_err(storage)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    slots: HashMap<String, String>,
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, MobiusError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), MobiusError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), MobiusError> {
        self.slots.remove(key);
        Ok(())
    }
}

fn parse_history(raw: &str) -> Result<Vec<GenerationResult>, MobiusError> {
    serde_json::from_str(raw).map_err(|e| MobiusError::PersistenceCorrupt(e.to_string()))
}

/// Newest-first list of generation results, read once and rewritten whole.
pub struct HistoryStore {
    kv: Box<dyn KvStore>,
    items: Vec<GenerationResult>,
}

impl HistoryStore {
    /// Load the stored list. Unreadable or corrupt data yields an empty
    /// history; the slot is left as is until the next append overwrites it.
    pub fn open(kv: Box<dyn KvStore>) -> Self {
        let items = match kv.get(HISTORY_KEY) {
            Ok(Some(raw)) => parse_history(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "failed to parse history; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read history; starting empty");
                Vec::new()
            }
        };
        Self { kv, items }
    }

    pub fn open_dir(dir: &Path) -> Self {
        Self::open(Box::new(FileKvStore::new(dir)))
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryKvStore::default()))
    }

    /// Prepend and persist. On a write failure the in-memory list is unchanged.
    pub fn append(&mut self, result: GenerationResult) -> Result<(), MobiusError> {
        let mut updated = Vec::with_capacity(self.items.len() + 1);
        updated.push(result);
        updated.extend(self.items.iter().cloned());

        let raw = serde_json::to_string(&updated).map_err(storage)?;
        self.kv.set(HISTORY_KEY, &raw)?;
        info!(id = %updated[0].id, total = updated.len(), "history saved");
        self.items = updated;
        Ok(())
    }

    pub fn load_all(&self) -> &[GenerationResult] {
        &self.items
    }

    pub fn load_one(&self, id: &str) -> Result<&GenerationResult, MobiusError> {
        self.items
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| MobiusError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Delete every stored result.
    pub fn clear(&mut self) -> Result<(), MobiusError> {
        self.kv.remove(HISTORY_KEY)?;
        self.items.clear();
        Ok(())
    }
}

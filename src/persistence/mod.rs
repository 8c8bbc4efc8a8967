//! Player-record persistence
//!
//! The simulation never talks to storage directly; the session controller
//! goes through the `PlayerStore` port. Writes are fire-and-forget from
//! the game's point of view: a failed save is logged and the next
//! state-changing event re-triggers one.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::player::PlayerRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available")]
    NoDataDir,
}

/// Store port for the persisted player record.
pub trait PlayerStore {
    fn load(&self, user_id: &str) -> Result<Option<PlayerRecord>, StoreError>;
    fn save(&self, user_id: &str, record: &PlayerRecord) -> Result<(), StoreError>;
}

/// JSON-file store, one file per player under a root directory.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Store rooted in the user's local data directory.
    pub fn in_data_dir() -> Result<Self, StoreError> {
        dirs::data_local_dir()
            .map(|dir| Self::new(dir.join("candle-wick")))
            .ok_or(StoreError::NoDataDir)
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("player_{user_id}.json"))
    }
}

impl PlayerStore for JsonFileStore {
    fn load(&self, user_id: &str) -> Result<Option<PlayerRecord>, StoreError> {
        let path = self.path_for(user_id);
        if !path.exists() {
            log::info!("no player record at {path:?}, starting fresh");
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let record = serde_json::from_str(&contents)?;
        log::info!("loaded player record from {path:?}");
        Ok(Some(record))
    }

    fn save(&self, user_id: &str, record: &PlayerRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.path_for(user_id), json)?;
        Ok(())
    }
}

/// In-memory store for tests and headless development.
#[derive(Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, PlayerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayerStore for MemoryStore {
    fn load(&self, user_id: &str) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.records.borrow().get(user_id).cloned())
    }

    fn save(&self, user_id: &str, record: &PlayerRecord) -> Result<(), StoreError> {
        self.records
            .borrow_mut()
            .insert(user_id.to_string(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Period;

    #[test]
    fn json_store_round_trip() {
        let root = std::env::temp_dir().join(format!(
            "candle-wick-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let store = JsonFileStore::new(root.clone());

        assert!(store.load("alice").unwrap().is_none());

        let mut record = PlayerRecord::new(Period::from_unix_seconds(123 * 86_400));
        record.total_currency = 777;
        record.best_score = 420;
        store.save("alice", &record).unwrap();

        let loaded = store.load("alice").unwrap().unwrap();
        assert_eq!(loaded, record);

        // Per-user isolation.
        assert!(store.load("bob").unwrap().is_none());

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let record = PlayerRecord::new(Period::from_unix_seconds(0));
        store.save("u", &record).unwrap();
        assert_eq!(store.load("u").unwrap().unwrap(), record);
    }
}

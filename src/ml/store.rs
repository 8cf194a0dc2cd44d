use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::StoreError;

use super::table::TableSnapshot;

/// Injectable persistence boundary for learned tables.
pub trait TableStore {
    /// Returns `None` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<TableSnapshot>, StoreError>;
    fn save(&mut self, snapshot: &TableSnapshot) -> Result<(), StoreError>;
}

/// Stores a snapshot as a single bincode file.
#[derive(Clone, Debug)]
pub struct BincodeFileStore {
    path: PathBuf,
}

impl BincodeFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableStore for BincodeFileStore {
    fn load(&mut self) -> Result<Option<TableSnapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let (snapshot, _): (TableSnapshot, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
        info!(
            "loaded {} table entries from {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    fn save(&mut self, snapshot: &TableSnapshot) -> Result<(), StoreError> {
        let bytes = bincode::serde::encode_to_vec(snapshot, bincode::config::standard())?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, bytes)?;
        info!(
            "saved {} table entries to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the last saved snapshot in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    snapshot: Option<TableSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: TableSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    pub fn snapshot(&self) -> Option<&TableSnapshot> {
        self.snapshot.as_ref()
    }
}

impl TableStore for MemoryStore {
    fn load(&mut self) -> Result<Option<TableSnapshot>, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &TableSnapshot) -> Result<(), StoreError> {
        self.snapshot = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::ml::policy::Algorithm;
    use crate::ml::table::TableEntry;
    use crate::state::State;

    fn snapshot() -> TableSnapshot {
        TableSnapshot {
            algorithm: Algorithm::QLearning,
            entries: vec![TableEntry {
                state: State::new(12, 2, 7, [3, 4, 30]),
                action: Action::Pass,
                value: -4.25,
                visits: 3,
            }],
        }
    }

    #[test]
    fn file_store_round_trips() {
        let path = std::env::temp_dir().join(format!(
            "nothanksbot-store-{}-{}.bin",
            std::process::id(),
            line!()
        ));
        let mut store = BincodeFileStore::new(&path);
        assert!(store.load().expect("load").is_none());
        store.save(&snapshot()).expect("save");
        let loaded = store.load().expect("load").expect("snapshot");
        assert_eq!(loaded, snapshot());
        fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn memory_store_keeps_the_last_save() {
        let mut store = MemoryStore::new();
        assert!(store.load().expect("load").is_none());
        store.save(&snapshot()).expect("save");
        assert_eq!(store.snapshot(), Some(&snapshot()));
    }
}

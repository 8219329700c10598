//! Loading and saving the session's record through a [`SaveStorage`].

use super::reconcile::{reconcile, ReconcileReport};
use super::schema::PersistedGameState;
use super::storage::{SaveStorage, StorageResult};

/// Fixed storage identifier of the save record.
pub const SAVE_KEY: &str = "realm-nexus-save";

/// A loaded state and how it was reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// The state to resume from.
    pub state: PersistedGameState,
    /// Defaulted fields and unreadable/missing flags.
    pub report: ReconcileReport,
}

/// Reads and writes one save slot.
#[derive(Debug)]
pub struct SaveStore {
    storage: Box<dyn SaveStorage>,
    key: String,
}

impl SaveStore {
    /// Store using the default [`SAVE_KEY`].
    pub fn new(storage: impl SaveStorage + 'static) -> Self {
        Self::with_key(storage, SAVE_KEY)
    }

    /// Store using a custom key (one per save slot).
    pub fn with_key(storage: impl SaveStorage + 'static, key: impl Into<String>) -> Self {
        Self {
            storage: Box::new(storage),
            key: key.into(),
        }
    }

    /// Storage key of this slot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load and reconcile the record. Never fails.
    ///
    /// A read error is treated like an unreadable record.
    pub fn load(&self, defaults: &PersistedGameState) -> LoadOutcome {
        let raw = match self.storage.read(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read save; starting fresh");
                let report = ReconcileReport {
                    unreadable: true,
                    ..ReconcileReport::default()
                };
                return LoadOutcome {
                    state: defaults.clone(),
                    report,
                };
            }
        };

        let (state, report) = reconcile(raw.as_deref(), defaults);
        if report.missing {
            tracing::info!(key = %self.key, "No save found; starting a new game");
        } else {
            tracing::info!(
                key = %self.key,
                defaulted = report.defaulted.len(),
                unreadable = report.unreadable,
                "Save loaded"
            );
        }
        LoadOutcome { state, report }
    }

    /// Serialize and write the record.
    pub fn try_save(&mut self, state: &PersistedGameState) -> StorageResult<()> {
        let json = state.to_json()?;
        self.storage.write(&self.key, &json)
    }

    /// Best-effort save: failures are logged and swallowed.
    ///
    /// Returns whether the write succeeded.
    pub fn save(&mut self, state: &PersistedGameState) -> bool {
        match self.try_save(state) {
            Ok(()) => {
                tracing::debug!(key = %self.key, "Game saved");
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to save game; continuing");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::storage::{FileStorage, MemoryStorage};

    #[test]
    fn test_save_then_load() {
        let storage = MemoryStorage::new();
        let mut store = SaveStore::new(storage.clone());
        let mut state = PersistedGameState::default();
        state.nexus_shards = 42.0;

        assert!(store.save(&state));
        let outcome = store.load(&PersistedGameState::default());

        assert_eq!(outcome.state, state);
        assert!(outcome.report.is_clean());
        assert!(storage.get(SAVE_KEY).is_some());
    }

    #[test]
    fn test_failed_save_is_swallowed() {
        let mut store = SaveStore::new(MemoryStorage::failing());
        assert!(!store.save(&PersistedGameState::default()));
        assert!(store.try_save(&PersistedGameState::default()).is_err());
    }

    #[test]
    fn test_unreadable_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the save file should be makes the read fail
        std::fs::create_dir_all(dir.path().join(format!("{SAVE_KEY}.json"))).unwrap();
        let store = SaveStore::new(FileStorage::new(dir.path()));

        let outcome = store.load(&PersistedGameState::default());

        assert!(outcome.report.unreadable);
        assert_eq!(outcome.state, PersistedGameState::default());
    }

    #[test]
    fn test_slots_are_independent() {
        let storage = MemoryStorage::new();
        let mut first = SaveStore::with_key(storage.clone(), "slot-1");
        let second = SaveStore::with_key(storage, "slot-2");

        let mut state = PersistedGameState::default();
        state.mana = 1.0;
        first.save(&state);

        assert!(second.load(&PersistedGameState::default()).report.missing);
    }
}

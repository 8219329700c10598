//! Persistence and reconciliation of save state.
//!
//! - [`schema`] - the JSON save record
//! - [`reconcile`] - field-by-field defensive decoding
//! - [`storage`] - storage backends (memory, files)
//! - [`store`] - load/save of one slot, best-effort writes

pub mod reconcile;
pub mod schema;
pub mod storage;
pub mod store;

pub use reconcile::{reconcile, ReconcileReport, Validated};
pub use schema::{PersistedGameState, SAVE_VERSION};
pub use storage::{FileStorage, MemoryStorage, SaveStorage, StorageError, StorageResult};
pub use store::{LoadOutcome, SaveStore, SAVE_KEY};

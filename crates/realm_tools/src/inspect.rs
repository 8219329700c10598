//! Save record inspection and repair.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use realm_core::data::EconomyConfig;
use realm_core::persistence::{FileStorage, LoadOutcome, PersistedGameState, SaveStore, StorageResult};

/// Result of inspecting one save directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    /// File that was read.
    pub path: PathBuf,
    /// Reconciled state and report.
    pub outcome: LoadOutcome,
    /// Whether the reconciled record was written back.
    pub repaired: bool,
}

/// Load the save in `dir` and optionally write back the reconciled record.
///
/// Only damaged records are rewritten; a clean or missing save is left
/// alone.
///
/// # Errors
///
/// Returns an error if `repair` is set and the write fails.
pub fn inspect_save(dir: &Path, config: &EconomyConfig, now_ms: u64, repair: bool) -> StorageResult<Inspection> {
    let storage = FileStorage::new(dir);
    let mut store = SaveStore::new(storage.clone());
    let defaults = PersistedGameState::initial(&config.starting, now_ms);
    let outcome = store.load(&defaults);

    let damaged = !outcome.report.is_clean() && !outcome.report.missing;
    let repaired = repair && damaged;
    if repaired {
        store.try_save(&outcome.state)?;
        tracing::info!(defaulted = outcome.report.defaulted.len(), "Save repaired");
    }

    Ok(Inspection {
        path: storage.path_for(store.key()),
        outcome,
        repaired,
    })
}

/// Human-readable summary of an inspection.
#[must_use]
pub fn render(inspection: &Inspection) -> String {
    let report = &inspection.outcome.report;
    let state = &inspection.outcome.state;
    let mut out = String::new();

    let _ = writeln!(out, "Save: {}", inspection.path.display());
    if report.missing {
        let _ = writeln!(out, "Status: no save found");
        return out;
    }
    let status = if report.unreadable {
        "unreadable (all defaults)"
    } else if report.is_clean() {
        "clean"
    } else {
        "repairable"
    };
    let _ = writeln!(out, "Status: {status}");
    for field in &report.defaulted {
        let _ = writeln!(out, "  defaulted: {field}");
    }

    let _ = writeln!(out, "Version: {}", state.version);
    let _ = writeln!(
        out,
        "Balances: mana {} | energy {} | shards {}",
        state.mana, state.energy_credits, state.nexus_shards
    );
    let _ = writeln!(
        out,
        "Producers: mana {} | energy {} | nexus {}",
        state.producers.mana, state.producers.energy, state.producers.nexus
    );
    let _ = writeln!(
        out,
        "Convergence: {} (meta-progress {})",
        state.convergence_count, state.convergence_progress
    );
    let _ = writeln!(out, "Realm: {}", state.current_realm.as_str());
    if inspection.repaired {
        let _ = writeln!(out, "Repaired record written back");
    }
    out
}

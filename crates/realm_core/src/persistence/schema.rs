//! The persisted save record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ledger::StartingBalances;
use crate::producer::ProducerLevels;
use crate::resources::Realm;

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Durable mirror of a session's state. May be stale relative to the
/// in-memory ledger, which stays authoritative for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedGameState {
    /// Save format version.
    pub version: u32,
    /// Mana balance.
    pub mana: f64,
    /// Energy credit balance.
    pub energy_credits: f64,
    /// Nexus shard balance.
    pub nexus_shards: f64,
    /// Published mana rate.
    pub mana_per_second: f64,
    /// Published energy rate.
    pub energy_per_second: f64,
    /// Published nexus rate.
    pub nexus_per_second: f64,
    /// Convergences performed.
    pub convergence_count: u64,
    /// Convergence meta-progress in `[0, 100]`.
    pub convergence_progress: f64,
    /// Owned fantasy buildings by id.
    pub fantasy_buildings: BTreeMap<String, u32>,
    /// Owned sci-fi buildings by id.
    pub scifi_buildings: BTreeMap<String, u32>,
    /// Ids of upgrades bought at least once.
    pub purchased_upgrades: BTreeSet<String>,
    /// Level of every bought upgrade.
    pub upgrade_levels: BTreeMap<String, u32>,
    /// Auto-producer levels.
    pub producers: ProducerLevels,
    /// Realm shown when the session resumes.
    pub current_realm: Realm,
    /// Unix milliseconds of the save.
    pub last_save_time: u64,
}

impl PersistedGameState {
    /// The state of a brand-new game.
    #[must_use]
    pub fn initial(start: &StartingBalances, now_ms: u64) -> Self {
        Self {
            version: SAVE_VERSION,
            mana: start.mana,
            energy_credits: start.energy_credits,
            nexus_shards: start.nexus_shards,
            mana_per_second: 0.0,
            energy_per_second: 0.0,
            nexus_per_second: 0.0,
            convergence_count: 0,
            convergence_progress: 0.0,
            fantasy_buildings: BTreeMap::new(),
            scifi_buildings: BTreeMap::new(),
            purchased_upgrades: BTreeSet::new(),
            upgrade_levels: BTreeMap::new(),
            producers: ProducerLevels::default(),
            current_realm: Realm::Fantasy,
            last_save_time: now_ms,
        }
    }

    /// Owned buildings of a realm.
    #[must_use]
    pub const fn buildings(&self, realm: Realm) -> &BTreeMap<String, u32> {
        match realm {
            Realm::Fantasy => &self.fantasy_buildings,
            Realm::SciFi => &self.scifi_buildings,
        }
    }

    /// Serialize to the JSON save format.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for PersistedGameState {
    fn default() -> Self {
        Self::initial(&StartingBalances::default(), 0)
    }
}

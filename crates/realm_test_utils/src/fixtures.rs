//! Test fixtures and helpers.
//!
//! Pre-built sessions and save records for consistent testing. Every
//! session uses in-memory storage and a manual clock, so nothing touches
//! the filesystem or wall time.

use realm_core::clock::ManualClock;
use realm_core::data::EconomyConfig;
use realm_core::persistence::{MemoryStorage, PersistedGameState, SaveStore};
use realm_core::producer::ProducerLevels;
use realm_core::resources::Realm;
use realm_core::session::{GameSession, ResumeReport};

/// Clock start used by fixtures (an arbitrary, non-zero instant).
pub const FIXTURE_EPOCH_MS: u64 = 1_700_000_000_000;

/// Everything a test needs to drive and inspect one session.
#[derive(Debug)]
pub struct Harness {
    /// The session under test.
    pub session: GameSession,
    /// Shared handle to the session's storage.
    pub storage: MemoryStorage,
    /// Shared handle to the session's clock.
    pub clock: ManualClock,
}

impl Harness {
    /// Fresh game with the default economy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EconomyConfig::default())
    }

    /// Fresh game with a custom economy.
    #[must_use]
    pub fn with_config(config: EconomyConfig) -> Self {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(FIXTURE_EPOCH_MS);
        let session = GameSession::new(config, SaveStore::new(storage.clone()), Box::new(clock.clone()));
        Self {
            session,
            storage,
            clock,
        }
    }

    /// Resume from whatever `storage` holds, at the clock's current time.
    #[must_use]
    pub fn resume(storage: MemoryStorage, clock: ManualClock) -> (Self, ResumeReport) {
        let (session, report) = GameSession::resume(
            EconomyConfig::default(),
            SaveStore::new(storage.clone()),
            Box::new(clock.clone()),
        );
        (
            Self {
                session,
                storage,
                clock,
            },
            report,
        )
    }

    /// Save, advance the clock by `away_ms`, and resume into a new session.
    #[must_use]
    pub fn reopen_after(mut self, away_ms: u64) -> (Self, ResumeReport) {
        self.session.save();
        self.clock.advance(away_ms);
        Self::resume(self.storage, self.clock)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage already holding `state` under the default key.
#[must_use]
pub fn storage_with(state: &PersistedGameState) -> MemoryStorage {
    let storage = MemoryStorage::new();
    let mut store = SaveStore::new(storage.clone());
    store.save(state);
    storage
}

/// A mid-game save: some buildings, producers and upgrades.
#[must_use]
pub fn mid_game_state(last_save_time: u64) -> PersistedGameState {
    let mut state = PersistedGameState {
        mana: 12_345.0,
        energy_credits: 6_789.0,
        nexus_shards: 42.0,
        mana_per_second: 5.0,
        energy_per_second: 4.0,
        nexus_per_second: 1.0,
        convergence_count: 2,
        convergence_progress: 20.0,
        producers: ProducerLevels {
            mana: 3,
            energy: 2,
            nexus: 1,
        },
        current_realm: Realm::SciFi,
        last_save_time,
        ..PersistedGameState::default()
    };
    state.fantasy_buildings.insert("crystal_shrine".to_string(), 4);
    state.fantasy_buildings.insert("wizard_tower".to_string(), 1);
    state.scifi_buildings.insert("solar_array".to_string(), 2);
    state.upgrade_levels.insert("sharpened_focus".to_string(), 2);
    state.purchased_upgrades.insert("sharpened_focus".to_string());
    state
}

/// A save record with some fields damaged and others intact.
///
/// `mana` is negative and `currentRealm` names no realm; `energyCredits`
/// and the mana producer level are valid. There is no `lastSaveTime`.
#[must_use]
pub fn damaged_save_blob() -> String {
    serde_json::json!({
        "mana": -5,
        "energyCredits": 300,
        "currentRealm": "void",
        "producers": { "mana": 2 }
    })
    .to_string()
}

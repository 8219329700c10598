//! The game session: one explicitly owned economy.
//!
//! A [`GameSession`] owns the ledger, the three auto-producers, both
//! realms' structures, the upgrade shops, the tick scheduler and the save
//! store. The presentation layer holds the session and calls into it for
//! every event (tap, purchase, upgrade, convert, pause) and reads it back
//! every frame. There is no global state: tests build as many sessions as
//! they like.
//!
//! # Example
//!
//! ```
//! use realm_core::clock::ManualClock;
//! use realm_core::data::EconomyConfig;
//! use realm_core::persistence::{MemoryStorage, SaveStore};
//! use realm_core::resources::ResourceKind;
//! use realm_core::session::GameSession;
//!
//! let clock = ManualClock::new(0);
//! let store = SaveStore::new(MemoryStorage::new());
//! let mut session = GameSession::new(EconomyConfig::default(), store, Box::new(clock));
//!
//! session.tap();
//! assert_eq!(session.ledger().balance(ResourceKind::Mana), 1001.0);
//! ```

use crate::clock::Clock;
use crate::conversion::Conversion;
use crate::convergence::ConvergenceView;
use crate::data::EconomyConfig;
use crate::error::{EconomyError, Result};
use crate::ledger::ResourceLedger;
use crate::offline::OfflineReport;
use crate::persistence::{LoadOutcome, PersistedGameState, ReconcileReport, SaveStore, SAVE_VERSION};
use crate::producer::{AutoProducer, ProducerId, ProducerLevels, ProducerSet, ProducerUpgrade};
use crate::resources::{Realm, ResourceKind};
use crate::scheduler::{TickReport, TickScheduler, TickSource};
use crate::structures::{RealmStructures, StructurePurchase};
use crate::upgrades::{UpgradeBook, UpgradePurchase, UpgradeStatus};

/// What happened while resuming a saved session.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeReport {
    /// Reconciliation of the save record.
    pub load: ReconcileReport,
    /// Production credited for the time away.
    pub offline: OfflineReport,
}

const fn tick_source(id: ProducerId) -> TickSource {
    match id {
        ProducerId::Mana => TickSource::Mana,
        ProducerId::Energy => TickSource::Energy,
        ProducerId::Nexus => TickSource::Nexus,
    }
}

/// A running idle game.
#[derive(Debug)]
pub struct GameSession {
    config: EconomyConfig,
    ledger: ResourceLedger,
    producers: ProducerSet,
    fantasy: RealmStructures,
    scifi: RealmStructures,
    upgrades: UpgradeBook,
    scheduler: TickScheduler,
    realm: Realm,
    store: SaveStore,
    clock: Box<dyn Clock>,
}

impl GameSession {
    /// Start a brand-new game without reading the store.
    pub fn new(config: EconomyConfig, store: SaveStore, clock: Box<dyn Clock>) -> Self {
        let state = PersistedGameState::initial(&config.starting, clock.now_ms());
        Self::from_state(config, &state, store, clock)
    }

    /// Load the saved game (or start fresh), credit offline production and
    /// republish rates.
    pub fn resume(config: EconomyConfig, store: SaveStore, clock: Box<dyn Clock>) -> (Self, ResumeReport) {
        let now = clock.now_ms();
        let defaults = PersistedGameState::initial(&config.starting, now);
        let LoadOutcome { state, report } = store.load(&defaults);

        let mut session = Self::from_state(config, &state, store, clock);

        // Credit the rates that were in effect when the player left
        session.restore_saved_rates(&state);
        let offline = session
            .config
            .offline
            .accumulate(&mut session.ledger, state.last_save_time, now);
        session.refresh_rates();

        (
            session,
            ResumeReport {
                load: report,
                offline,
            },
        )
    }

    fn from_state(
        config: EconomyConfig,
        state: &PersistedGameState,
        store: SaveStore,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut ledger = ResourceLedger::new(config.starting);
        ledger.restore_balance(ResourceKind::Mana, state.mana);
        ledger.restore_balance(ResourceKind::EnergyCredits, state.energy_credits);
        ledger.restore_balance(ResourceKind::NexusShards, state.nexus_shards);
        ledger.restore_convergence(state.convergence_count, state.convergence_progress);

        let scheduler = Self::fresh_scheduler(config.tick_period_ms);

        let mut session = Self {
            producers: ProducerSet::new(&config.producers, state.producers),
            fantasy: RealmStructures::new(
                Realm::Fantasy,
                config.fantasy_structures.clone(),
                state.fantasy_buildings.clone(),
            ),
            scifi: RealmStructures::new(
                Realm::SciFi,
                config.scifi_structures.clone(),
                state.scifi_buildings.clone(),
            ),
            upgrades: UpgradeBook::new(config.shops.clone(), state.upgrade_levels.clone()),
            ledger,
            scheduler,
            realm: state.current_realm,
            config,
            store,
            clock,
        };
        session.refresh_rates();
        session.ledger.mark_clean();
        session
    }

    fn fresh_scheduler(period_ms: u64) -> TickScheduler {
        let mut scheduler = TickScheduler::new(period_ms);
        for source in TickSource::ALL {
            scheduler.register(source);
        }
        scheduler
    }

    fn restore_saved_rates(&mut self, state: &PersistedGameState) {
        self.ledger.set_rate(ResourceKind::Mana, state.mana_per_second);
        self.ledger.set_rate(ResourceKind::EnergyCredits, state.energy_per_second);
        self.ledger.set_rate(ResourceKind::NexusShards, state.nexus_per_second);
    }

    /// Economy configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// The ledger, for display.
    #[must_use]
    pub const fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Active realm.
    #[must_use]
    pub const fn realm(&self) -> Realm {
        self.realm
    }

    /// An auto-producer.
    #[must_use]
    pub const fn producer(&self, id: ProducerId) -> &AutoProducer {
        self.producers.get(id)
    }

    /// A realm's structures.
    #[must_use]
    pub const fn structures(&self, realm: Realm) -> &RealmStructures {
        match realm {
            Realm::Fantasy => &self.fantasy,
            Realm::SciFi => &self.scifi,
        }
    }

    fn structures_mut(&mut self, realm: Realm) -> &mut RealmStructures {
        match realm {
            Realm::Fantasy => &mut self.fantasy,
            Realm::SciFi => &mut self.scifi,
        }
    }

    /// The upgrade shops.
    #[must_use]
    pub const fn upgrades(&self) -> &UpgradeBook {
        &self.upgrades
    }

    /// The tick scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    // ------------------------------------------------------------------
    // Production
    // ------------------------------------------------------------------

    /// Recompute every resource's rate and publish it to the ledger.
    ///
    /// Rate = auto-producer rate + owned structure production + upgrade
    /// production bonuses.
    pub fn refresh_rates(&mut self) {
        for resource in ResourceKind::ALL {
            let structures = match resource {
                ResourceKind::Mana => self.fantasy.production_rate(),
                ResourceKind::EnergyCredits => self.scifi.production_rate(),
                ResourceKind::NexusShards => 0.0,
            };
            let rate = self.producers.rate_for(resource)
                + structures
                + self.upgrades.production_bonus(resource);
            self.ledger.set_rate(resource, rate);
        }
    }

    /// Overwrite a published rate until the next [`refresh_rates`](Self::refresh_rates).
    pub fn set_rate(&mut self, resource: ResourceKind, rate: f64) {
        self.ledger.set_rate(resource, rate);
    }

    /// Amount one tap yields in the active realm.
    #[must_use]
    pub fn tap_yield(&self) -> f64 {
        self.config.tap_yield + self.upgrades.tap_bonus(self.realm.resource())
    }

    /// Tap: credit the active realm's resource. Returns the amount credited.
    pub fn tap(&mut self) -> f64 {
        let amount = self.tap_yield();
        self.ledger.add(self.realm.resource(), amount);
        amount
    }

    /// Apply exactly one scheduler tick.
    pub fn tick(&mut self) -> TickReport {
        self.scheduler.tick(&mut self.ledger)
    }

    /// Feed elapsed wall time to the scheduler.
    pub fn advance(&mut self, elapsed_ms: u64) -> TickReport {
        self.scheduler.advance(elapsed_ms, &mut self.ledger)
    }

    /// Pause or resume passive production (editor mode).
    pub fn set_paused(&mut self, paused: bool) {
        tracing::debug!(paused, "Production pause toggled");
        self.scheduler.set_paused(paused);
    }

    /// Whether passive production is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// Stop a producer's ticks.
    pub fn stop_producer(&mut self, id: ProducerId) -> bool {
        self.scheduler.deregister(tick_source(id))
    }

    /// Restart a stopped producer's ticks.
    pub fn start_producer(&mut self, id: ProducerId) {
        self.scheduler.register(tick_source(id));
    }

    // ------------------------------------------------------------------
    // Purchases
    // ------------------------------------------------------------------

    /// Atomically pay for and apply one producer level.
    pub fn upgrade_producer(&mut self, id: ProducerId) -> Result<ProducerUpgrade> {
        let receipt = self.producers.get_mut(id).try_upgrade(&mut self.ledger)?;
        self.refresh_rates();
        Ok(receipt)
    }

    /// Whether a producer's next level is affordable.
    #[must_use]
    pub fn can_upgrade_producer(&self, id: ProducerId) -> bool {
        self.producers.get(id).can_afford(&self.ledger)
    }

    /// Buy a structure in the active realm.
    pub fn purchase(&mut self, building_id: &str) -> Result<StructurePurchase> {
        self.purchase_structure(self.realm, building_id)
    }

    /// Buy a structure in a specific realm.
    pub fn purchase_structure(&mut self, realm: Realm, building_id: &str) -> Result<StructurePurchase> {
        let receipt = {
            let Self { fantasy, scifi, ledger, .. } = self;
            let structures = match realm {
                Realm::Fantasy => fantasy,
                Realm::SciFi => scifi,
            };
            structures.try_purchase(building_id, ledger)?
        };
        self.refresh_rates();
        Ok(receipt)
    }

    /// Price of a structure's next unit.
    pub fn structure_cost(&self, realm: Realm, building_id: &str) -> Result<f64> {
        self.structures(realm).next_cost(building_id)
    }

    /// Buy the next level of a shop upgrade.
    pub fn purchase_upgrade(&mut self, shop_id: &str, upgrade_id: &str) -> Result<UpgradePurchase> {
        let receipt = self.upgrades.try_purchase(shop_id, upgrade_id, &mut self.ledger)?;
        self.refresh_rates();
        Ok(receipt)
    }

    /// Button state of a shop upgrade.
    pub fn upgrade_status(&self, shop_id: &str, upgrade_id: &str) -> Result<UpgradeStatus> {
        self.upgrades.status(shop_id, upgrade_id, &self.ledger)
    }

    /// Convert a primary resource into nexus shards.
    pub fn convert(&mut self, source: ResourceKind, amount: f64) -> Result<Conversion> {
        self.config.conversion.convert(&mut self.ledger, source, amount)
    }

    /// Spend from any balance if affordable. Returns false and changes
    /// nothing otherwise.
    pub fn spend(&mut self, resource: ResourceKind, amount: f64) -> bool {
        self.ledger.spend(resource, amount)
    }

    /// Debit shards for the Nexus World sandbox.
    pub fn spend_shards(&mut self, amount: f64) -> Result<()> {
        self.ledger.try_spend(ResourceKind::NexusShards, amount)
    }

    // ------------------------------------------------------------------
    // Realms and convergence
    // ------------------------------------------------------------------

    /// Switch to the other realm. Returns the new realm.
    pub fn switch_realm(&mut self) -> Realm {
        self.set_realm(self.realm.other());
        self.realm
    }

    /// Make a realm active.
    pub fn set_realm(&mut self, realm: Realm) {
        if self.realm != realm {
            self.realm = realm;
            self.ledger.mark_dirty();
            tracing::debug!(realm = realm.as_str(), "Realm switched");
        }
    }

    /// Convergence gate, recomputed from current balances.
    #[must_use]
    pub fn convergence(&self) -> ConvergenceView {
        self.config.convergence.view(&self.ledger)
    }

    /// Record a convergence unconditionally (count +1, meta-progress +10).
    pub fn increment_convergence(&mut self) {
        self.ledger.increment_convergence();
    }

    /// Converge if the gate is open. Returns the new convergence count.
    pub fn converge(&mut self) -> Result<u64> {
        let view = self.convergence();
        if !view.can_converge {
            return Err(EconomyError::ConvergenceLocked {
                total: view.total,
                threshold: self.config.convergence.threshold,
            });
        }
        self.ledger.increment_convergence();
        tracing::info!(count = self.ledger.convergence_count(), "Convergence performed");
        Ok(self.ledger.convergence_count())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// The full save record as of now.
    #[must_use]
    pub fn snapshot(&self) -> PersistedGameState {
        let upgrade_levels = self.upgrades.levels().clone();
        PersistedGameState {
            version: SAVE_VERSION,
            mana: self.ledger.balance(ResourceKind::Mana),
            energy_credits: self.ledger.balance(ResourceKind::EnergyCredits),
            nexus_shards: self.ledger.balance(ResourceKind::NexusShards),
            mana_per_second: self.ledger.rate(ResourceKind::Mana),
            energy_per_second: self.ledger.rate(ResourceKind::EnergyCredits),
            nexus_per_second: self.ledger.rate(ResourceKind::NexusShards),
            convergence_count: self.ledger.convergence_count(),
            convergence_progress: self.ledger.convergence_progress(),
            fantasy_buildings: self.fantasy.counts().clone(),
            scifi_buildings: self.scifi.counts().clone(),
            purchased_upgrades: self.upgrades.purchased(),
            upgrade_levels,
            producers: self.producers.levels(),
            current_realm: self.realm,
            last_save_time: self.clock.now_ms(),
        }
    }

    /// Whether unsaved changes exist.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.ledger.is_dirty()
    }

    /// Best-effort save. A failed write keeps the session dirty.
    pub fn save(&mut self) -> bool {
        let state = self.snapshot();
        let saved = self.store.save(&state);
        if saved {
            self.ledger.mark_clean();
        }
        saved
    }

    /// Save only if something changed since the last successful save.
    pub fn autosave(&mut self) -> bool {
        self.is_dirty() && self.save()
    }

    /// Restore the starting state and save it.
    pub fn reset(&mut self) {
        tracing::info!("Resetting game session");
        self.ledger = ResourceLedger::new(self.config.starting);
        self.producers = ProducerSet::new(&self.config.producers, ProducerLevels::default());
        for realm in [Realm::Fantasy, Realm::SciFi] {
            let catalog = self.config.structures(realm).to_vec();
            *self.structures_mut(realm) = RealmStructures::new(realm, catalog, Default::default());
        }
        self.upgrades = UpgradeBook::new(self.config.shops.clone(), Default::default());
        self.realm = Realm::Fantasy;
        self.scheduler = Self::fresh_scheduler(self.config.tick_period_ms);
        self.refresh_rates();
        self.ledger.mark_dirty();
        self.save();
    }

    /// Stop every tick source and write a final save.
    pub fn shutdown(&mut self) -> bool {
        self.scheduler.shutdown();
        tracing::info!("Game session shut down");
        self.save()
    }
}

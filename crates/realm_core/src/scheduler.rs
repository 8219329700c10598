//! The coalesced tick scheduler.
//!
//! A session owns exactly one scheduler. The host feeds it elapsed wall
//! time through [`TickScheduler::advance`]; the scheduler turns that into
//! whole fixed-period ticks and applies them one after another, so ticks
//! can never overlap or double count. Within a tick every registered
//! source credits the ledger's published rate for its resource.
//!
//! # Example
//!
//! ```
//! use realm_core::ledger::ResourceLedger;
//! use realm_core::resources::ResourceKind;
//! use realm_core::scheduler::{TickScheduler, TickSource};
//!
//! let mut ledger = ResourceLedger::default();
//! ledger.set_rate(ResourceKind::Mana, 5.0);
//!
//! let mut scheduler = TickScheduler::new(1000);
//! scheduler.register(TickSource::Mana);
//!
//! let report = scheduler.advance(2500, &mut ledger);
//! assert_eq!(report.ticks, 2);
//! assert_eq!(ledger.balance(ResourceKind::Mana), 1010.0);
//! ```

use std::collections::BTreeSet;


use crate::ledger::ResourceLedger;
use crate::resources::{ResourceAmounts, ResourceKind};

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

/// A passive income stream driven by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TickSource {
    /// Mana per second.
    Mana,
    /// Energy credits per second.
    Energy,
    /// Nexus shards per second.
    Nexus,
}

impl TickSource {
    /// All sources.
    pub const ALL: [Self; 3] = [Self::Mana, Self::Energy, Self::Nexus];

    /// Resource this source credits.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        match self {
            Self::Mana => ResourceKind::Mana,
            Self::Energy => ResourceKind::EnergyCredits,
            Self::Nexus => ResourceKind::NexusShards,
        }
    }
}

/// What one call to [`TickScheduler::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// Whole ticks that elapsed.
    pub ticks: u64,
    /// Ticks skipped because the scheduler was paused.
    pub paused_ticks: u64,
    /// Amount credited per resource.
    pub produced: ResourceAmounts,
}

/// Fixed-period tick driver shared by all producers of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickScheduler {
    period_ms: u64,
    accumulated_ms: u64,
    registered: BTreeSet<TickSource>,
    paused: bool,
    total_ticks: u64,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD_MS)
    }
}

impl TickScheduler {
    /// Create a scheduler with no registered sources.
    ///
    /// A zero period is treated as one millisecond.
    #[must_use]
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            accumulated_ms: 0,
            registered: BTreeSet::new(),
            paused: false,
            total_ticks: 0,
        }
    }

    /// Tick period in milliseconds.
    #[must_use]
    pub const fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Ticks processed since creation (including paused ticks).
    #[must_use]
    pub const fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Start driving a source.
    pub fn register(&mut self, source: TickSource) {
        if self.registered.insert(source) {
            tracing::debug!(?source, "Tick source registered");
        }
    }

    /// Stop driving a source. Returns false if it was not registered.
    pub fn deregister(&mut self, source: TickSource) -> bool {
        let removed = self.registered.remove(&source);
        if removed {
            tracing::debug!(?source, "Tick source deregistered");
        }
        removed
    }

    /// Whether a source is currently driven.
    #[must_use]
    pub fn is_registered(&self, source: TickSource) -> bool {
        self.registered.contains(&source)
    }

    /// Deregister every source and drop any partial tick.
    pub fn shutdown(&mut self) {
        self.registered.clear();
        self.accumulated_ms = 0;
    }

    /// Pause or resume production.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether production is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Milliseconds carried toward the next tick.
    #[must_use]
    pub const fn pending_ms(&self) -> u64 {
        self.accumulated_ms
    }

    /// Apply exactly one tick.
    pub fn tick(&mut self, ledger: &mut ResourceLedger) -> TickReport {
        let mut report = TickReport {
            ticks: 1,
            ..TickReport::default()
        };
        self.total_ticks += 1;

        if self.paused {
            report.paused_ticks = 1;
            return report;
        }

        for source in &self.registered {
            let resource = source.resource();
            let rate = ledger.rate(resource);
            if rate > 0.0 {
                ledger.add(resource, rate);
                report.produced.add(resource, rate);
            }
        }
        report
    }

    /// Feed elapsed wall time and apply every whole tick it completes.
    pub fn advance(&mut self, elapsed_ms: u64, ledger: &mut ResourceLedger) -> TickReport {
        self.accumulated_ms = self.accumulated_ms.saturating_add(elapsed_ms);
        let mut report = TickReport::default();

        while self.accumulated_ms >= self.period_ms {
            self.accumulated_ms -= self.period_ms;
            let step = self.tick(ledger);
            report.ticks += step.ticks;
            report.paused_ticks += step.paused_ticks;
            for resource in ResourceKind::ALL {
                report.produced.add(resource, step.produced.get(resource));
            }
        }

        if report.ticks > 0 {
            tracing::trace!(ticks = report.ticks, paused = report.paused_ticks, "Scheduler advanced");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_rates() -> ResourceLedger {
        let mut ledger = ResourceLedger::default();
        ledger.set_rate(ResourceKind::Mana, 5.0);
        ledger.set_rate(ResourceKind::EnergyCredits, 2.0);
        ledger.set_rate(ResourceKind::NexusShards, 1.0);
        ledger
    }

    fn scheduler_with_all() -> TickScheduler {
        let mut scheduler = TickScheduler::default();
        for source in TickSource::ALL {
            scheduler.register(source);
        }
        scheduler
    }

    #[test]
    fn test_single_tick_credits_each_source() {
        let mut ledger = ledger_with_rates();
        let mut scheduler = scheduler_with_all();

        let report = scheduler.tick(&mut ledger);

        assert_eq!(ledger.balance(ResourceKind::Mana), 1005.0);
        assert_eq!(ledger.balance(ResourceKind::EnergyCredits), 802.0);
        assert_eq!(ledger.balance(ResourceKind::NexusShards), 1.0);
        assert_eq!(report.produced.mana, 5.0);
    }

    #[test]
    fn test_partial_time_carries_over() {
        let mut ledger = ledger_with_rates();
        let mut scheduler = scheduler_with_all();

        assert_eq!(scheduler.advance(600, &mut ledger).ticks, 0);
        assert_eq!(ledger.balance(ResourceKind::Mana), 1000.0);
        assert_eq!(scheduler.advance(600, &mut ledger).ticks, 1);
        assert_eq!(scheduler.pending_ms(), 200);
        assert_eq!(ledger.balance(ResourceKind::Mana), 1005.0);
    }

    #[test]
    fn test_paused_ticks_produce_nothing() {
        let mut ledger = ledger_with_rates();
        let mut scheduler = scheduler_with_all();
        scheduler.set_paused(true);

        let report = scheduler.advance(3000, &mut ledger);

        assert_eq!(report.ticks, 3);
        assert_eq!(report.paused_ticks, 3);
        assert!(report.produced.is_zero());
        assert_eq!(ledger.balance(ResourceKind::Mana), 1000.0);
    }

    #[test]
    fn test_deregistered_source_stops() {
        let mut ledger = ledger_with_rates();
        let mut scheduler = scheduler_with_all();

        assert!(scheduler.deregister(TickSource::Mana));
        assert!(!scheduler.deregister(TickSource::Mana));
        scheduler.tick(&mut ledger);

        assert_eq!(ledger.balance(ResourceKind::Mana), 1000.0);
        assert_eq!(ledger.balance(ResourceKind::EnergyCredits), 802.0);
    }

    #[test]
    fn test_shutdown_stops_everything() {
        let mut ledger = ledger_with_rates();
        let mut scheduler = scheduler_with_all();
        scheduler.advance(500, &mut ledger);
        scheduler.shutdown();

        let report = scheduler.advance(10_000, &mut ledger);

        assert!(report.produced.is_zero());
        assert_eq!(ledger.balance(ResourceKind::Mana), 1000.0);
        assert!(TickSource::ALL.iter().all(|s| !scheduler.is_registered(*s)));
    }

    #[test]
    fn test_zero_rate_does_not_dirty() {
        let mut ledger = ResourceLedger::default();
        let mut scheduler = scheduler_with_all();
        scheduler.tick(&mut ledger);
        assert!(!ledger.is_dirty());
    }
}

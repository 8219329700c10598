//! Offline accumulation: crediting production for time spent away.
//!
//! Elapsed wall time between the last save and now is converted to whole
//! seconds, capped, scaled by the offline efficiency and credited once per
//! resource at the ledger's published rates. A save stamped in the future
//! (clock skew) credits nothing.

use serde::{Deserialize, Serialize};

use crate::ledger::ResourceLedger;
use crate::resources::{ResourceAmounts, ResourceKind};

/// Default cap on creditable offline time: eight hours.
pub const DEFAULT_MAX_OFFLINE_SECS: u64 = 8 * 60 * 60;

/// Offline accumulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// Longest absence that is credited, in seconds.
    pub max_offline_secs: u64,
    /// Fraction of the online rate earned while away.
    pub efficiency: f64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            max_offline_secs: DEFAULT_MAX_OFFLINE_SECS,
            efficiency: 1.0,
        }
    }
}

/// What was credited for an absence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OfflineReport {
    /// Raw wall time since the last save.
    pub elapsed_ms: u64,
    /// Whole seconds actually credited (after the cap).
    pub credited_secs: u64,
    /// Whether the cap cut the absence short.
    pub capped: bool,
    /// Amount credited per resource.
    pub earned: ResourceAmounts,
}

impl OfflineConfig {
    /// Seconds that would be credited for an absence of `elapsed_ms`.
    #[must_use]
    pub fn creditable_secs(&self, elapsed_ms: u64) -> u64 {
        (elapsed_ms / 1000).min(self.max_offline_secs)
    }

    /// Credit the ledger for the time between `last_save_ms` and `now_ms`.
    pub fn accumulate(&self, ledger: &mut ResourceLedger, last_save_ms: u64, now_ms: u64) -> OfflineReport {
        let Some(elapsed_ms) = now_ms.checked_sub(last_save_ms) else {
            tracing::warn!(last_save_ms, now_ms, "Save time is in the future; skipping offline credit");
            return OfflineReport::default();
        };

        let whole_secs = elapsed_ms / 1000;
        let credited_secs = self.creditable_secs(elapsed_ms);
        let mut report = OfflineReport {
            elapsed_ms,
            credited_secs,
            capped: whole_secs > credited_secs,
            earned: ResourceAmounts::default(),
        };

        let efficiency = if self.efficiency.is_finite() { self.efficiency.max(0.0) } else { 0.0 };
        for resource in ResourceKind::ALL {
            let amount = ledger.rate(resource) * credited_secs as f64 * efficiency;
            if amount > 0.0 {
                ledger.add(resource, amount);
                report.earned.add(resource, amount);
            }
        }

        tracing::info!(
            elapsed_ms,
            credited_secs,
            capped = report.capped,
            mana = report.earned.mana,
            energy = report.earned.energy_credits,
            shards = report.earned.nexus_shards,
            "Offline production credited"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> ResourceLedger {
        let mut ledger = ResourceLedger::default();
        ledger.set_rate(ResourceKind::Mana, 2.0);
        ledger.set_rate(ResourceKind::EnergyCredits, 0.5);
        ledger
    }

    #[test]
    fn test_whole_seconds_credited() {
        let mut ledger = ledger();
        let report = OfflineConfig::default().accumulate(&mut ledger, 10_000, 70_999);

        assert_eq!(report.credited_secs, 60);
        assert!(!report.capped);
        assert_eq!(ledger.balance(ResourceKind::Mana), 1120.0);
        assert_eq!(ledger.balance(ResourceKind::EnergyCredits), 830.0);
    }

    #[test]
    fn test_absence_is_capped() {
        let mut ledger = ledger();
        let config = OfflineConfig {
            max_offline_secs: 100,
            efficiency: 1.0,
        };
        let report = config.accumulate(&mut ledger, 0, 1_000_000);

        assert!(report.capped);
        assert_eq!(report.credited_secs, 100);
        assert_eq!(report.earned.mana, 200.0);
    }

    #[test]
    fn test_efficiency_scales_earnings() {
        let mut ledger = ledger();
        let config = OfflineConfig {
            efficiency: 0.5,
            ..OfflineConfig::default()
        };
        config.accumulate(&mut ledger, 0, 10_000);
        assert_eq!(ledger.balance(ResourceKind::Mana), 1010.0);
    }

    #[test]
    fn test_future_save_credits_nothing() {
        let mut ledger = ledger();
        let report = OfflineConfig::default().accumulate(&mut ledger, 50_000, 10_000);
        assert_eq!(report, OfflineReport::default());
        assert_eq!(ledger.balance(ResourceKind::Mana), 1000.0);
    }
}

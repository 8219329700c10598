//! The convergence gate: a view over the ledger, recomputed on every read.
//!
//! The gate's `progress` (combined balances toward the threshold) is a
//! different metric from the ledger's stored convergence meta-progress,
//! which only moves when a convergence is actually performed.

use serde::{Deserialize, Serialize};

use crate::ledger::ResourceLedger;
use crate::resources::ResourceKind;

/// Combined primary balance needed to converge.
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1000.0;

/// Snapshot of the gate for one read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceView {
    /// `mana + energy_credits`.
    pub total: f64,
    /// `total >= threshold`.
    pub can_converge: bool,
    /// `min(total / threshold * 100, 100)`.
    pub progress: f64,
}

/// Gate configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceGate {
    /// Combined balance required.
    pub threshold: f64,
}

impl Default for ConvergenceGate {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONVERGENCE_THRESHOLD,
        }
    }
}

impl ConvergenceGate {
    /// Combined primary resources.
    #[must_use]
    pub fn total(ledger: &ResourceLedger) -> f64 {
        ledger.balance(ResourceKind::Mana) + ledger.balance(ResourceKind::EnergyCredits)
    }

    /// Whether convergence is available.
    #[must_use]
    pub fn can_converge(&self, ledger: &ResourceLedger) -> bool {
        Self::total(ledger) >= self.threshold
    }

    /// Percentage toward the threshold, capped at 100.
    #[must_use]
    pub fn progress(&self, ledger: &ResourceLedger) -> f64 {
        if self.threshold <= 0.0 {
            return 100.0;
        }
        (Self::total(ledger) / self.threshold * 100.0).min(100.0)
    }

    /// All derived values at once.
    #[must_use]
    pub fn view(&self, ledger: &ResourceLedger) -> ConvergenceView {
        ConvergenceView {
            total: Self::total(ledger),
            can_converge: self.can_converge(ledger),
            progress: self.progress(ledger),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StartingBalances;

    fn ledger(mana: f64, energy: f64) -> ResourceLedger {
        ResourceLedger::new(StartingBalances {
            mana,
            energy_credits: energy,
            nexus_shards: 0.0,
        })
    }

    #[test]
    fn test_gate_below_threshold() {
        let view = ConvergenceGate::default().view(&ledger(300.0, 200.0));
        assert_eq!(view.total, 500.0);
        assert!(!view.can_converge);
        assert_eq!(view.progress, 50.0);
    }

    #[test]
    fn test_gate_at_and_above_threshold() {
        let gate = ConvergenceGate::default();
        assert!(gate.can_converge(&ledger(600.0, 400.0)));
        assert_eq!(gate.progress(&ledger(600.0, 400.0)), 100.0);
        assert_eq!(gate.progress(&ledger(1000.0, 800.0)), 100.0);
    }

    #[test]
    fn test_gate_ignores_shards() {
        let mut l = ledger(0.0, 0.0);
        l.add(ResourceKind::NexusShards, 5000.0);
        assert!(!ConvergenceGate::default().can_converge(&l));
    }

    #[test]
    fn test_gate_does_not_touch_meta_progress() {
        let l = ledger(1000.0, 800.0);
        let _ = ConvergenceGate::default().view(&l);
        assert_eq!(l.convergence_progress(), 0.0);
    }
}

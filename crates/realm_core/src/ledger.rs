//! The resource ledger: the single authoritative store of balances.
//!
//! Every debit in the economy goes through [`ResourceLedger::spend`] (or
//! its `Result`-returning twin [`ResourceLedger::try_spend`]). No other
//! code path decrements a balance, which is what keeps every field
//! non-negative.

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::resources::ResourceKind;

/// Convergence meta-progress gained per convergence.
pub const CONVERGENCE_PROGRESS_STEP: f64 = 10.0;

/// Upper bound of the convergence meta-progress.
pub const CONVERGENCE_PROGRESS_MAX: f64 = 100.0;

/// Starting balances restored on first launch and on reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingBalances {
    /// Initial mana.
    pub mana: f64,
    /// Initial energy credits.
    pub energy_credits: f64,
    /// Initial nexus shards.
    pub nexus_shards: f64,
}

impl Default for StartingBalances {
    fn default() -> Self {
        Self {
            mana: 1000.0,
            energy_credits: 800.0,
            nexus_shards: 0.0,
        }
    }
}

/// Balances, published production rates and the convergence meta-stats.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLedger {
    mana: f64,
    energy_credits: f64,
    nexus_shards: f64,
    mana_per_second: f64,
    energy_per_second: f64,
    nexus_per_second: f64,
    convergence_count: u64,
    convergence_progress: f64,
    dirty: bool,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(StartingBalances::default())
    }
}

/// Treat NaN, infinities and negatives as nothing.
fn sanitize(amount: f64) -> Option<f64> {
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

impl ResourceLedger {
    /// Create a ledger holding the starting balances and zero rates.
    #[must_use]
    pub fn new(start: StartingBalances) -> Self {
        Self {
            mana: sanitize(start.mana).unwrap_or(0.0),
            energy_credits: sanitize(start.energy_credits).unwrap_or(0.0),
            nexus_shards: sanitize(start.nexus_shards).unwrap_or(0.0),
            mana_per_second: 0.0,
            energy_per_second: 0.0,
            nexus_per_second: 0.0,
            convergence_count: 0,
            convergence_progress: 0.0,
            dirty: false,
        }
    }

    /// Current balance of a resource.
    #[must_use]
    pub const fn balance(&self, resource: ResourceKind) -> f64 {
        match resource {
            ResourceKind::Mana => self.mana,
            ResourceKind::EnergyCredits => self.energy_credits,
            ResourceKind::NexusShards => self.nexus_shards,
        }
    }

    fn balance_mut(&mut self, resource: ResourceKind) -> &mut f64 {
        match resource {
            ResourceKind::Mana => &mut self.mana,
            ResourceKind::EnergyCredits => &mut self.energy_credits,
            ResourceKind::NexusShards => &mut self.nexus_shards,
        }
    }

    /// Published per-second production rate of a resource.
    #[must_use]
    pub const fn rate(&self, resource: ResourceKind) -> f64 {
        match resource {
            ResourceKind::Mana => self.mana_per_second,
            ResourceKind::EnergyCredits => self.energy_per_second,
            ResourceKind::NexusShards => self.nexus_per_second,
        }
    }

    fn rate_mut(&mut self, resource: ResourceKind) -> &mut f64 {
        match resource {
            ResourceKind::Mana => &mut self.mana_per_second,
            ResourceKind::EnergyCredits => &mut self.energy_per_second,
            ResourceKind::NexusShards => &mut self.nexus_per_second,
        }
    }

    /// Credit a resource. Never fails.
    ///
    /// Negative or non-finite amounts are ignored rather than allowed to
    /// drive a balance below zero.
    pub fn add(&mut self, resource: ResourceKind, amount: f64) {
        let Some(amount) = sanitize(amount) else {
            tracing::warn!(%resource, amount, "Ignoring invalid credit");
            return;
        };
        if amount == 0.0 {
            return;
        }
        let balance = self.balance_mut(resource);
        *balance = (*balance + amount).min(f64::MAX);
        self.dirty = true;
        self.check_invariants();
    }

    /// Spend a resource if the balance covers it.
    ///
    /// Returns true if the transaction succeeded. On failure nothing changes.
    pub fn spend(&mut self, resource: ResourceKind, amount: f64) -> bool {
        self.try_spend(resource, amount).is_ok()
    }

    /// Spend a resource, reporting why a rejected spend failed.
    ///
    /// # Errors
    ///
    /// [`EconomyError::InvalidAmount`] for negative or non-finite amounts,
    /// [`EconomyError::InsufficientFunds`] when the balance is too low.
    pub fn try_spend(&mut self, resource: ResourceKind, amount: f64) -> Result<()> {
        let amount = sanitize(amount).ok_or(EconomyError::InvalidAmount(amount))?;
        let available = self.balance(resource);
        if available < amount {
            return Err(EconomyError::InsufficientFunds {
                resource,
                required: amount,
                available,
            });
        }
        *self.balance_mut(resource) = available - amount;
        self.dirty = true;
        self.check_invariants();
        Ok(())
    }

    #[inline]
    fn check_invariants(&self) {
        #[cfg(feature = "debug-validation")]
        for resource in ResourceKind::ALL {
            let balance = self.balance(resource);
            assert!(
                balance.is_finite() && balance >= 0.0,
                "{resource} balance out of range: {balance}"
            );
        }
    }

    /// Check if the balance covers a cost.
    #[must_use]
    pub fn can_afford(&self, resource: ResourceKind, cost: f64) -> bool {
        self.balance(resource) >= cost
    }

    /// Overwrite the published per-second rate of a resource.
    pub fn set_rate(&mut self, resource: ResourceKind, rate: f64) {
        let rate = sanitize(rate).unwrap_or(0.0);
        let slot = self.rate_mut(resource);
        if *slot != rate {
            *slot = rate;
            self.dirty = true;
        }
    }

    /// Number of convergences performed.
    #[must_use]
    pub const fn convergence_count(&self) -> u64 {
        self.convergence_count
    }

    /// Convergence meta-progress in `[0, 100]`.
    ///
    /// Distinct from [`ConvergenceGate::progress`](crate::convergence::ConvergenceGate::progress),
    /// which is derived from current balances.
    #[must_use]
    pub const fn convergence_progress(&self) -> f64 {
        self.convergence_progress
    }

    /// Record a convergence: count +1, meta-progress +10 capped at 100.
    pub fn increment_convergence(&mut self) {
        self.convergence_count = self.convergence_count.saturating_add(1);
        self.convergence_progress = (self.convergence_progress + CONVERGENCE_PROGRESS_STEP)
            .min(CONVERGENCE_PROGRESS_MAX);
        self.dirty = true;
    }

    /// Restore convergence stats from a save record.
    pub(crate) fn restore_convergence(&mut self, count: u64, progress: f64) {
        self.convergence_count = count;
        self.convergence_progress = progress.clamp(0.0, CONVERGENCE_PROGRESS_MAX);
    }

    /// Restore a balance from a save record, bypassing dirty tracking.
    pub(crate) fn restore_balance(&mut self, resource: ResourceKind, amount: f64) {
        *self.balance_mut(resource) = sanitize(amount).unwrap_or(0.0);
    }

    /// Whether anything changed since the last [`mark_clean`](Self::mark_clean).
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the ledger dirty (e.g. after a non-ledger state change).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag after a successful save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

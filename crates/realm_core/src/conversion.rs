//! Exchange of primary resources into nexus shards.

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::ledger::ResourceLedger;
use crate::resources::ResourceKind;

/// Fixed exchange: `source_per_shard` source units buy one shard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Source units per shard (10 means a 0.1 rate).
    pub source_per_shard: f64,
    /// Smallest amount the UI offers.
    pub min_amount: f64,
    /// UI step between offered amounts.
    pub step: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_per_shard: 10.0,
            min_amount: 10.0,
            step: 10.0,
        }
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Resource spent.
    pub source: ResourceKind,
    /// Amount spent.
    pub spent: f64,
    /// Shards credited.
    pub shards: f64,
}

impl ConversionConfig {
    /// Shards produced by converting `amount`, truncated toward zero.
    #[must_use]
    pub fn shards_for(&self, amount: f64) -> f64 {
        (amount / self.source_per_shard).floor()
    }

    /// Whether `amount` is one of the amounts the UI offers.
    #[must_use]
    pub fn is_offered_amount(&self, amount: f64) -> bool {
        amount >= self.min_amount && (self.step <= 0.0 || (amount % self.step) == 0.0)
    }

    /// Convert `amount` of a primary resource into shards.
    ///
    /// Any positive amount is accepted; the UI restriction to multiples of
    /// the step is advisory (see [`is_offered_amount`](Self::is_offered_amount)).
    ///
    /// # Errors
    ///
    /// [`EconomyError::InvalidAmount`] for non-positive amounts or a
    /// non-primary source; [`EconomyError::InsufficientFunds`] otherwise.
    /// Nothing changes on error.
    pub fn convert(
        &self,
        ledger: &mut ResourceLedger,
        source: ResourceKind,
        amount: f64,
    ) -> Result<Conversion> {
        if !source.is_primary() || !amount.is_finite() || amount <= 0.0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        ledger.try_spend(source, amount)?;
        let shards = self.shards_for(amount);
        ledger.add(ResourceKind::NexusShards, shards);

        tracing::debug!(%source, amount, shards, "Converted to nexus shards");

        Ok(Conversion {
            source,
            spent: amount,
            shards,
        })
    }
}

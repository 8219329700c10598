//! Leveled auto-producers.
//!
//! One parametrized [`AutoProducer`] is instantiated per resource
//! (mana, energy, nexus). Each differs only in its [`ProducerConfig`];
//! the growth constants are deliberately per-instance.
//!
//! Upgrading is atomic: [`AutoProducer::try_upgrade`] debits the ledger and
//! grants the level in one step, or changes nothing.

use serde::{Deserialize, Serialize};

use crate::cost::cost;
use crate::error::Result;
use crate::ledger::ResourceLedger;
use crate::resources::ResourceKind;

/// Identifies one of the three auto-producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProducerId {
    /// Auto-mana.
    Mana,
    /// Auto-energy.
    Energy,
    /// Nexus-auto.
    Nexus,
}

impl ProducerId {
    /// All producers.
    pub const ALL: [Self; 3] = [Self::Mana, Self::Energy, Self::Nexus];

    /// Resource this producer generates.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        match self {
            Self::Mana => ResourceKind::Mana,
            Self::Energy => ResourceKind::EnergyCredits,
            Self::Nexus => ResourceKind::NexusShards,
        }
    }
}

/// Constants that distinguish one producer from another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Resource paid to upgrade.
    pub cost_resource: ResourceKind,
    /// Cost of the first upgrade.
    pub base_cost: f64,
    /// Cost multiplier per level.
    pub growth: f64,
    /// Per-second production granted per level.
    pub per_level_rate: f64,
}

impl ProducerConfig {
    /// Default auto-mana: paid in mana, growth 1.15, 1/s per level.
    pub const MANA: Self = Self {
        cost_resource: ResourceKind::Mana,
        base_cost: 50.0,
        growth: 1.15,
        per_level_rate: 1.0,
    };

    /// Default auto-energy: paid in energy, growth 1.25, 2/s per level.
    pub const ENERGY: Self = Self {
        cost_resource: ResourceKind::EnergyCredits,
        base_cost: 50.0,
        growth: 1.25,
        per_level_rate: 2.0,
    };

    /// Default nexus-auto: paid in shards, growth 1.5, 1/s per level.
    pub const NEXUS: Self = Self {
        cost_resource: ResourceKind::NexusShards,
        base_cost: 50.0,
        growth: 1.5,
        per_level_rate: 1.0,
    };
}

/// Result of a successful upgrade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProducerUpgrade {
    /// Amount debited.
    pub paid: f64,
    /// Level after the upgrade.
    pub new_level: u32,
    /// Rate after the upgrade.
    pub new_rate: f64,
    /// Price of the next upgrade.
    pub next_cost: f64,
}

/// A leveled passive generator of one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoProducer {
    id: ProducerId,
    config: ProducerConfig,
    level: u32,
    rate_per_second: f64,
    upgrade_cost: f64,
}

impl AutoProducer {
    /// Create a producer at level 0.
    #[must_use]
    pub fn new(id: ProducerId, config: ProducerConfig) -> Self {
        Self::with_level(id, config, 0)
    }

    /// Create a producer at a saved level, deriving rate and cost.
    #[must_use]
    pub fn with_level(id: ProducerId, config: ProducerConfig, level: u32) -> Self {
        let mut producer = Self {
            id,
            config,
            level,
            rate_per_second: 0.0,
            upgrade_cost: 0.0,
        };
        producer.recompute();
        producer
    }

    fn recompute(&mut self) {
        self.rate_per_second = f64::from(self.level) * self.config.per_level_rate;
        self.upgrade_cost = cost(self.config.base_cost, self.config.growth, self.level);
    }

    /// Which producer this is.
    #[must_use]
    pub const fn id(&self) -> ProducerId {
        self.id
    }

    /// Producer constants.
    #[must_use]
    pub const fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current production per second.
    #[must_use]
    pub const fn rate_per_second(&self) -> f64 {
        self.rate_per_second
    }

    /// Cost to go from the current level to the next.
    #[must_use]
    pub const fn upgrade_cost(&self) -> f64 {
        self.upgrade_cost
    }

    /// Whether the ledger can pay for the next level.
    #[must_use]
    pub fn can_afford(&self, ledger: &ResourceLedger) -> bool {
        ledger.can_afford(self.config.cost_resource, self.upgrade_cost)
    }

    /// Pay for and apply one level.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientFunds`](crate::error::EconomyError::InsufficientFunds)
    /// if the ledger cannot pay; the producer and ledger are left untouched.
    pub fn try_upgrade(&mut self, ledger: &mut ResourceLedger) -> Result<ProducerUpgrade> {
        let paid = self.upgrade_cost;
        ledger.try_spend(self.config.cost_resource, paid)?;

        self.level = self.level.saturating_add(1);
        self.recompute();

        tracing::debug!(
            producer = ?self.id,
            level = self.level,
            rate = self.rate_per_second,
            next_cost = self.upgrade_cost,
            "Producer upgraded"
        );

        Ok(ProducerUpgrade {
            paid,
            new_level: self.level,
            new_rate: self.rate_per_second,
            next_cost: self.upgrade_cost,
        })
    }
}

/// The three auto-producers of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerSet {
    mana: AutoProducer,
    energy: AutoProducer,
    nexus: AutoProducer,
}

impl ProducerSet {
    /// Create all producers at the given levels.
    #[must_use]
    pub fn new(configs: &ProducerConfigs, levels: ProducerLevels) -> Self {
        Self {
            mana: AutoProducer::with_level(ProducerId::Mana, configs.mana, levels.mana),
            energy: AutoProducer::with_level(ProducerId::Energy, configs.energy, levels.energy),
            nexus: AutoProducer::with_level(ProducerId::Nexus, configs.nexus, levels.nexus),
        }
    }

    /// Borrow a producer.
    #[must_use]
    pub const fn get(&self, id: ProducerId) -> &AutoProducer {
        match id {
            ProducerId::Mana => &self.mana,
            ProducerId::Energy => &self.energy,
            ProducerId::Nexus => &self.nexus,
        }
    }

    /// Mutably borrow a producer.
    pub fn get_mut(&mut self, id: ProducerId) -> &mut AutoProducer {
        match id {
            ProducerId::Mana => &mut self.mana,
            ProducerId::Energy => &mut self.energy,
            ProducerId::Nexus => &mut self.nexus,
        }
    }

    /// Iterate over all producers.
    pub fn iter(&self) -> impl Iterator<Item = &AutoProducer> {
        [&self.mana, &self.energy, &self.nexus].into_iter()
    }

    /// Current levels, for persistence.
    #[must_use]
    pub const fn levels(&self) -> ProducerLevels {
        ProducerLevels {
            mana: self.mana.level,
            energy: self.energy.level,
            nexus: self.nexus.level,
        }
    }

    /// Sum of producer rates for a resource.
    #[must_use]
    pub fn rate_for(&self, resource: ResourceKind) -> f64 {
        self.iter()
            .filter(|p| p.id.resource() == resource)
            .map(AutoProducer::rate_per_second)
            .sum()
    }
}

/// Configuration for all three producers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfigs {
    /// Auto-mana.
    pub mana: ProducerConfig,
    /// Auto-energy.
    pub energy: ProducerConfig,
    /// Nexus-auto.
    pub nexus: ProducerConfig,
}

impl Default for ProducerConfigs {
    fn default() -> Self {
        Self {
            mana: ProducerConfig::MANA,
            energy: ProducerConfig::ENERGY,
            nexus: ProducerConfig::NEXUS,
        }
    }
}

impl ProducerConfigs {
    /// Borrow the config for a producer.
    #[must_use]
    pub const fn get(&self, id: ProducerId) -> &ProducerConfig {
        match id {
            ProducerId::Mana => &self.mana,
            ProducerId::Energy => &self.energy,
            ProducerId::Nexus => &self.nexus,
        }
    }
}

/// Saved producer levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProducerLevels {
    /// Auto-mana level.
    pub mana: u32,
    /// Auto-energy level.
    pub energy: u32,
    /// Nexus-auto level.
    pub nexus: u32,
}

//! Economy configuration loaded from RON.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::conversion::ConversionConfig;
use crate::convergence::ConvergenceGate;
use crate::error::{EconomyError, Result};
use crate::ledger::StartingBalances;
use crate::offline::OfflineConfig;
use crate::producer::{ProducerConfigs, ProducerId};
use crate::resources::{Realm, ResourceKind};
use crate::scheduler::DEFAULT_TICK_PERIOD_MS;
use crate::structures::StructureDefinition;
use crate::upgrades::{UpgradeDefinition, UpgradeEffect, UpgradeShop};

/// Every tunable number of the economy.
///
/// Missing fields fall back to the built-in defaults, so a data file only
/// needs to list what it changes.
///
/// # Example RON
///
/// ```ron
/// (
///     tap_yield: 1.0,
///     producers: (
///         mana: (cost_resource: mana, base_cost: 50.0, growth: 1.15, per_level_rate: 1.0),
///     ),
///     tick_period_ms: 1000,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balances at first launch and after reset.
    pub starting: StartingBalances,
    /// Base amount credited per tap.
    pub tap_yield: f64,
    /// The three auto-producers.
    pub producers: ProducerConfigs,
    /// Fantasy realm structure catalog.
    pub fantasy_structures: Vec<StructureDefinition>,
    /// Sci-fi realm structure catalog.
    pub scifi_structures: Vec<StructureDefinition>,
    /// Upgrade shops.
    pub shops: Vec<UpgradeShop>,
    /// Shard exchange.
    pub conversion: ConversionConfig,
    /// Convergence gate.
    pub convergence: ConvergenceGate,
    /// Scheduler period.
    pub tick_period_ms: u64,
    /// Offline accumulation.
    pub offline: OfflineConfig,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting: StartingBalances::default(),
            tap_yield: 1.0,
            producers: ProducerConfigs::default(),
            fantasy_structures: default_fantasy_structures(),
            scifi_structures: default_scifi_structures(),
            shops: default_shops(),
            conversion: ConversionConfig::default(),
            convergence: ConvergenceGate::default(),
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            offline: OfflineConfig::default(),
        }
    }
}

fn default_fantasy_structures() -> Vec<StructureDefinition> {
    vec![
        StructureDefinition::new("crystal_shrine", "Crystal Shrine", 15.0, 1.15, 0.1),
        StructureDefinition::new("wizard_tower", "Wizard Tower", 100.0, 1.15, 1.0),
        StructureDefinition::new("enchanted_grove", "Enchanted Grove", 1100.0, 1.15, 8.0),
        StructureDefinition::new("arcane_citadel", "Arcane Citadel", 12_000.0, 1.15, 47.0),
    ]
}

fn default_scifi_structures() -> Vec<StructureDefinition> {
    vec![
        StructureDefinition::new("solar_array", "Solar Array", 15.0, 1.15, 0.1),
        StructureDefinition::new("fusion_reactor", "Fusion Reactor", 100.0, 1.15, 1.0),
        StructureDefinition::new("quantum_lab", "Quantum Lab", 1100.0, 1.15, 8.0),
        StructureDefinition::new("dyson_ring", "Dyson Ring", 12_000.0, 1.15, 47.0),
    ]
}

fn upgrade(
    id: &str,
    name: &str,
    base_cost: f64,
    max_level: u32,
    effect_per_level: f64,
    effect: UpgradeEffect,
) -> UpgradeDefinition {
    UpgradeDefinition {
        id: id.to_string(),
        name: name.to_string(),
        base_cost,
        max_level,
        effect_per_level,
        effect,
    }
}

fn default_shops() -> Vec<UpgradeShop> {
    vec![
        UpgradeShop {
            id: "attack".to_string(),
            currency: ResourceKind::Mana,
            growth: 1.5,
            upgrades: vec![
                upgrade("sharpened_focus", "Sharpened Focus", 100.0, 10, 1.0, UpgradeEffect::TapBonus),
                upgrade("arcane_bolt", "Arcane Bolt", 250.0, 5, 0.5, UpgradeEffect::ProductionBonus),
            ],
        },
        UpgradeShop {
            id: "weapon".to_string(),
            currency: ResourceKind::EnergyCredits,
            growth: 1.8,
            upgrades: vec![
                upgrade("plasma_edge", "Plasma Edge", 150.0, 10, 2.0, UpgradeEffect::TapBonus),
                upgrade("drone_swarm", "Drone Swarm", 400.0, 5, 1.0, UpgradeEffect::ProductionBonus),
            ],
        },
    ]
}

impl EconomyConfig {
    /// Parse a configuration from RON text.
    ///
    /// `origin` only labels errors.
    pub fn from_ron_str(text: &str, origin: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| EconomyError::DataParse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and parse a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EconomyError::DataParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_ron_str(&text, &path.display().to_string())?;
        tracing::info!(path = %path.display(), "Loaded economy configuration");
        Ok(config)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            EconomyError::DataParse {
                path: "<memory>".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Structure catalog of a realm.
    #[must_use]
    pub fn structures(&self, realm: Realm) -> &[StructureDefinition] {
        match realm {
            Realm::Fantasy => &self.fantasy_structures,
            Realm::SciFi => &self.scifi_structures,
        }
    }

    /// Check the configuration for balancing mistakes.
    ///
    /// Returns a list of human-readable problems (empty if valid).
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (label, amount) in [
            ("starting.mana", self.starting.mana),
            ("starting.energy_credits", self.starting.energy_credits),
            ("starting.nexus_shards", self.starting.nexus_shards),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                errors.push(format!("{label} must be a non-negative number, got {amount}"));
            }
        }

        if !(self.tap_yield.is_finite() && self.tap_yield > 0.0) {
            errors.push(format!("tap_yield must be positive, got {}", self.tap_yield));
        }

        for id in ProducerId::ALL {
            let producer = self.producers.get(id);
            if producer.growth <= 1.0 {
                errors.push(format!("Producer {id:?} growth must be > 1, got {}", producer.growth));
            }
            if producer.base_cost <= 0.0 {
                errors.push(format!("Producer {id:?} base_cost must be positive"));
            }
            if producer.per_level_rate < 0.0 {
                errors.push(format!("Producer {id:?} per_level_rate must not be negative"));
            }
        }

        for realm in [Realm::Fantasy, Realm::SciFi] {
            let mut seen = HashSet::new();
            for def in self.structures(realm) {
                if !seen.insert(def.id.as_str()) {
                    errors.push(format!("Duplicate {} structure '{}'", realm.as_str(), def.id));
                }
                if def.cost_multiplier <= 1.0 {
                    errors.push(format!(
                        "Structure '{}' cost_multiplier must be > 1, got {}",
                        def.id, def.cost_multiplier
                    ));
                }
                if def.base_cost <= 0.0 {
                    errors.push(format!("Structure '{}' base_cost must be positive", def.id));
                }
                if def.production_per_unit < 0.0 {
                    errors.push(format!("Structure '{}' production must not be negative", def.id));
                }
            }
        }

        let mut shop_ids = HashSet::new();
        let mut upgrade_ids = HashSet::new();
        for shop in &self.shops {
            if !shop_ids.insert(shop.id.as_str()) {
                errors.push(format!("Duplicate shop '{}'", shop.id));
            }
            if shop.growth <= 1.0 {
                errors.push(format!("Shop '{}' growth must be > 1, got {}", shop.id, shop.growth));
            }
            for def in &shop.upgrades {
                // Save records hold a flat set of upgrade ids, so ids must be unique across shops
                if !upgrade_ids.insert(def.id.as_str()) {
                    errors.push(format!("Duplicate upgrade '{}'", def.id));
                }
                if def.max_level == 0 {
                    errors.push(format!("Upgrade '{}' max_level must be at least 1", def.id));
                }
                if def.base_cost <= 0.0 {
                    errors.push(format!("Upgrade '{}' base_cost must be positive", def.id));
                }
            }
        }

        if self.conversion.source_per_shard <= 0.0 {
            errors.push("conversion.source_per_shard must be positive".to_string());
        }
        if self.convergence.threshold <= 0.0 {
            errors.push("convergence.threshold must be positive".to_string());
        }
        if self.tick_period_ms == 0 {
            errors.push("tick_period_ms must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.offline.efficiency) {
            errors.push(format!(
                "offline.efficiency must be within [0, 1], got {}",
                self.offline.efficiency
            ));
        }

        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EconomyError::InvalidConfig(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EconomyConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
    }

    #[test]
    fn test_default_growth_constants_are_distinct() {
        let config = EconomyConfig::default();
        assert_eq!(config.producers.mana.growth, 1.15);
        assert_eq!(config.producers.energy.growth, 1.25);
        assert_eq!(config.producers.nexus.growth, 1.5);
        let growths: Vec<f64> = config.shops.iter().map(|s| s.growth).collect();
        assert_eq!(growths, vec![1.5, 1.8]);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = EconomyConfig::from_ron_str("(tap_yield: 3.0, tick_period_ms: 500)", "inline").unwrap();
        assert_eq!(config.tap_yield, 3.0);
        assert_eq!(config.tick_period_ms, 500);
        assert_eq!(config.producers, ProducerConfigs::default());
        assert_eq!(config.fantasy_structures.len(), 4);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EconomyConfig::default();
        let text = config.to_ron_string().unwrap();
        let parsed = EconomyConfig::from_ron_str(&text, "round-trip").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_bad_ron_is_a_parse_error() {
        let err = EconomyConfig::from_ron_str("(tap_yield: \"lots\")", "bad.ron").unwrap_err();
        assert!(matches!(err, EconomyError::DataParse { ref path, .. } if path == "bad.ron"));
    }

    #[test]
    fn test_validate_catches_flat_growth_and_duplicates() {
        let mut config = EconomyConfig::default();
        config.producers.energy.growth = 1.0;
        config.shops[1].upgrades[0].id = "sharpened_focus".to_string();
        config.tick_period_ms = 0;

        let errors = config.validate();

        assert!(errors.iter().any(|e| e.contains("Energy growth")));
        assert!(errors.iter().any(|e| e.contains("Duplicate upgrade 'sharpened_focus'")));
        assert!(errors.iter().any(|e| e.contains("tick_period_ms")));
        assert!(config.ensure_valid().is_err());
    }
}

//! Bounded upgrade shops (attack and weapon upgrades).
//!
//! Unlike auto-producers, shop upgrades have a terminal state: once
//! `level == max_level` the upgrade is [`UpgradeStatus::Maxed`] and can
//! never be bought again, regardless of funds.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::cost::cost;
use crate::error::{EconomyError, Result};
use crate::ledger::ResourceLedger;
use crate::resources::ResourceKind;

/// What one level of an upgrade does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Adds to the tap yield of the shop's resource.
    TapBonus,
    /// Adds to the per-second rate of the shop's resource.
    ProductionBonus,
}

/// Data-driven upgrade definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    /// Unique identifier (unique across all shops).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price of the first level.
    pub base_cost: f64,
    /// Terminal level.
    pub max_level: u32,
    /// Effect magnitude gained per level.
    pub effect_per_level: f64,
    /// Kind of effect.
    pub effect: UpgradeEffect,
}

/// A shop: a currency, a growth factor and its upgrades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeShop {
    /// Shop identifier ("attack", "weapon").
    pub id: String,
    /// Resource the shop charges and whose tap/rate its effects raise.
    pub currency: ResourceKind,
    /// Cost growth factor shared by the shop's upgrades.
    pub growth: f64,
    /// Upgrades on sale.
    #[serde(default)]
    pub upgrades: Vec<UpgradeDefinition>,
}

impl UpgradeShop {
    /// Look up an upgrade in this shop.
    #[must_use]
    pub fn upgrade(&self, upgrade_id: &str) -> Option<&UpgradeDefinition> {
        self.upgrades.iter().find(|u| u.id == upgrade_id)
    }
}

/// Button state of an upgrade as seen by the shop UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStatus {
    /// Not affordable right now.
    Locked,
    /// Affordable.
    Available,
    /// At max level; permanently disabled.
    Maxed,
}

/// Result of a successful upgrade purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradePurchase {
    /// Upgrade bought.
    pub upgrade_id: String,
    /// Amount debited.
    pub paid: f64,
    /// Level after the purchase.
    pub new_level: u32,
    /// Whether this purchase reached max level.
    pub maxed: bool,
}

/// All shops plus the owned level of every upgrade.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeBook {
    shops: Vec<UpgradeShop>,
    levels: BTreeMap<String, u32>,
}

impl UpgradeBook {
    /// Create from shop definitions and saved levels.
    ///
    /// Saved levels above an upgrade's max are clamped.
    #[must_use]
    pub fn new(shops: Vec<UpgradeShop>, mut levels: BTreeMap<String, u32>) -> Self {
        for shop in &shops {
            for def in &shop.upgrades {
                if let Some(level) = levels.get_mut(&def.id) {
                    if *level > def.max_level {
                        tracing::warn!(upgrade = %def.id, level = *level, max = def.max_level, "Clamping saved upgrade level");
                        *level = def.max_level;
                    }
                }
            }
        }
        levels.retain(|_, level| *level > 0);
        Self { shops, levels }
    }

    /// Shop definitions.
    #[must_use]
    pub fn shops(&self) -> &[UpgradeShop] {
        &self.shops
    }

    fn shop(&self, shop_id: &str) -> Result<&UpgradeShop> {
        self.shops
            .iter()
            .find(|s| s.id == shop_id)
            .ok_or_else(|| EconomyError::UnknownShop(shop_id.to_string()))
    }

    fn lookup(&self, shop_id: &str, upgrade_id: &str) -> Result<(&UpgradeShop, &UpgradeDefinition)> {
        let shop = self.shop(shop_id)?;
        let def = shop
            .upgrade(upgrade_id)
            .ok_or_else(|| EconomyError::UnknownUpgrade(upgrade_id.to_string()))?;
        Ok((shop, def))
    }

    /// Owned level of an upgrade.
    #[must_use]
    pub fn level(&self, upgrade_id: &str) -> u32 {
        self.levels.get(upgrade_id).copied().unwrap_or(0)
    }

    /// Saved levels (only upgrades with level >= 1).
    #[must_use]
    pub const fn levels(&self) -> &BTreeMap<String, u32> {
        &self.levels
    }

    /// Ids of every upgrade bought at least once.
    #[must_use]
    pub fn purchased(&self) -> BTreeSet<String> {
        self.levels.keys().cloned().collect()
    }

    /// Price of the next level, or `None` when maxed.
    ///
    /// # Errors
    ///
    /// [`EconomyError::UnknownShop`] or [`EconomyError::UnknownUpgrade`].
    pub fn next_cost(&self, shop_id: &str, upgrade_id: &str) -> Result<Option<f64>> {
        let (shop, def) = self.lookup(shop_id, upgrade_id)?;
        let level = self.level(upgrade_id);
        Ok((level < def.max_level).then(|| cost(def.base_cost, shop.growth, level)))
    }

    /// Button state of an upgrade.
    ///
    /// # Errors
    ///
    /// [`EconomyError::UnknownShop`] or [`EconomyError::UnknownUpgrade`].
    pub fn status(&self, shop_id: &str, upgrade_id: &str, ledger: &ResourceLedger) -> Result<UpgradeStatus> {
        let currency = self.shop(shop_id)?.currency;
        Ok(match self.next_cost(shop_id, upgrade_id)? {
            None => UpgradeStatus::Maxed,
            Some(price) if ledger.can_afford(currency, price) => UpgradeStatus::Available,
            Some(_) => UpgradeStatus::Locked,
        })
    }

    /// Buy the next level of an upgrade.
    ///
    /// # Errors
    ///
    /// [`EconomyError::MaxLevelReached`], [`EconomyError::InsufficientFunds`],
    /// or an unknown shop/upgrade. Nothing changes on error.
    pub fn try_purchase(
        &mut self,
        shop_id: &str,
        upgrade_id: &str,
        ledger: &mut ResourceLedger,
    ) -> Result<UpgradePurchase> {
        let (shop, def) = self.lookup(shop_id, upgrade_id)?;
        let currency = shop.currency;
        let max_level = def.max_level;
        let level = self.level(upgrade_id);
        let Some(price) = self.next_cost(shop_id, upgrade_id)? else {
            return Err(EconomyError::MaxLevelReached {
                upgrade: upgrade_id.to_string(),
                max_level,
            });
        };

        ledger.try_spend(currency, price)?;
        let new_level = level + 1;
        self.levels.insert(upgrade_id.to_string(), new_level);

        tracing::debug!(shop = shop_id, upgrade = upgrade_id, level = new_level, paid = price, "Upgrade purchased");

        Ok(UpgradePurchase {
            upgrade_id: upgrade_id.to_string(),
            paid: price,
            new_level,
            maxed: new_level == max_level,
        })
    }

    fn total_effect(&self, resource: ResourceKind, effect: UpgradeEffect) -> f64 {
        self.shops
            .iter()
            .filter(|shop| shop.currency == resource)
            .flat_map(|shop| shop.upgrades.iter())
            .filter(|def| def.effect == effect)
            .map(|def| def.effect_per_level * f64::from(self.level(&def.id)))
            .sum()
    }

    /// Extra tap yield for a resource from owned upgrades.
    #[must_use]
    pub fn tap_bonus(&self, resource: ResourceKind) -> f64 {
        self.total_effect(resource, UpgradeEffect::TapBonus)
    }

    /// Extra per-second rate for a resource from owned upgrades.
    #[must_use]
    pub fn production_bonus(&self, resource: ResourceKind) -> f64 {
        self.total_effect(resource, UpgradeEffect::ProductionBonus)
    }
}

//! Stacking structures (buildings) bought with a realm's resource.
//!
//! Each purchase raises the next price along the structure's cost curve
//! and adds `production_per_unit` to the realm's per-second rate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cost::cost;
use crate::error::{EconomyError, Result};
use crate::ledger::ResourceLedger;
use crate::resources::Realm;

/// Data-driven structure definition.
///
/// # Example RON
///
/// ```ron
/// StructureDefinition(
///     id: "wizard_tower",
///     name: "Wizard Tower",
///     base_cost: 100,
///     cost_multiplier: 1.15,
///     production_per_unit: 1.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDefinition {
    /// Unique identifier within the realm.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price of the first unit.
    pub base_cost: f64,
    /// Price multiplier per owned unit (> 1).
    pub cost_multiplier: f64,
    /// Per-second production of one unit.
    #[serde(default)]
    pub production_per_unit: f64,
}

impl StructureDefinition {
    /// Create a new definition.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_cost: f64,
        cost_multiplier: f64,
        production_per_unit: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_cost,
            cost_multiplier,
            production_per_unit,
        }
    }

    /// Price of the next unit when `count` are owned.
    #[must_use]
    pub fn cost_at(&self, count: u32) -> f64 {
        cost(self.base_cost, self.cost_multiplier, count)
    }
}

/// Owned count plus cost state of one structure type, as shown in the shop.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureInstance<'a> {
    /// The structure's definition.
    pub definition: &'a StructureDefinition,
    /// Units owned.
    pub count: u32,
    /// Price of the next unit.
    pub next_cost: f64,
    /// This structure's share of the realm rate.
    pub production: f64,
}

/// Result of a successful structure purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct StructurePurchase {
    /// Structure bought.
    pub building_id: String,
    /// Amount debited.
    pub paid: f64,
    /// Units owned after the purchase.
    pub new_count: u32,
    /// Price of the next unit.
    pub next_cost: f64,
}

/// One realm's structure catalog and owned counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RealmStructures {
    realm: Realm,
    catalog: Vec<StructureDefinition>,
    counts: BTreeMap<String, u32>,
}

impl RealmStructures {
    /// Create from a catalog and saved counts.
    ///
    /// Counts for ids missing from the catalog are kept (so a later
    /// catalog can pick them up again) but produce nothing.
    #[must_use]
    pub fn new(realm: Realm, catalog: Vec<StructureDefinition>, counts: BTreeMap<String, u32>) -> Self {
        for id in counts.keys() {
            if !catalog.iter().any(|d| &d.id == id) {
                tracing::warn!(realm = realm.as_str(), building = %id, "Saved building not in catalog");
            }
        }
        Self {
            realm,
            catalog,
            counts,
        }
    }

    /// Realm these structures belong to.
    #[must_use]
    pub const fn realm(&self) -> Realm {
        self.realm
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &[StructureDefinition] {
        &self.catalog
    }

    /// Owned counts by building id.
    #[must_use]
    pub const fn counts(&self) -> &BTreeMap<String, u32> {
        &self.counts
    }

    /// Units owned of a building.
    #[must_use]
    pub fn count(&self, building_id: &str) -> u32 {
        self.counts.get(building_id).copied().unwrap_or(0)
    }

    fn definition(&self, building_id: &str) -> Result<&StructureDefinition> {
        self.catalog
            .iter()
            .find(|d| d.id == building_id)
            .ok_or_else(|| EconomyError::UnknownBuilding(building_id.to_string()))
    }

    /// Price of the next unit.
    ///
    /// # Errors
    ///
    /// [`EconomyError::UnknownBuilding`] if the id is not in the catalog.
    pub fn next_cost(&self, building_id: &str) -> Result<f64> {
        let def = self.definition(building_id)?;
        Ok(def.cost_at(self.count(building_id)))
    }

    /// Buy one unit, paying with the realm's resource.
    ///
    /// # Errors
    ///
    /// [`EconomyError::UnknownBuilding`] or [`EconomyError::InsufficientFunds`];
    /// nothing changes in either case.
    pub fn try_purchase(
        &mut self,
        building_id: &str,
        ledger: &mut ResourceLedger,
    ) -> Result<StructurePurchase> {
        let count = self.count(building_id);
        let paid = self.definition(building_id)?.cost_at(count);
        ledger.try_spend(self.realm.resource(), paid)?;

        let new_count = count.saturating_add(1);
        self.counts.insert(building_id.to_string(), new_count);
        let next_cost = self.definition(building_id)?.cost_at(new_count);

        tracing::debug!(
            realm = self.realm.as_str(),
            building = building_id,
            count = new_count,
            paid,
            "Structure purchased"
        );

        Ok(StructurePurchase {
            building_id: building_id.to_string(),
            paid,
            new_count,
            next_cost,
        })
    }

    /// Combined per-second production of all owned structures.
    #[must_use]
    pub fn production_rate(&self) -> f64 {
        self.catalog
            .iter()
            .map(|d| d.production_per_unit * f64::from(self.count(&d.id)))
            .sum()
    }

    /// Shop view of every catalog entry.
    pub fn instances(&self) -> impl Iterator<Item = StructureInstance<'_>> {
        self.catalog.iter().map(|definition| {
            let count = self.count(&definition.id);
            StructureInstance {
                definition,
                count,
                next_cost: definition.cost_at(count),
                production: definition.production_per_unit * f64::from(count),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StartingBalances;
    use crate::resources::ResourceKind;

    fn catalog() -> Vec<StructureDefinition> {
        vec![
            StructureDefinition::new("shrine", "Crystal Shrine", 15.0, 1.15, 0.1),
            StructureDefinition::new("tower", "Wizard Tower", 100.0, 1.15, 1.0),
        ]
    }

    #[test]
    fn test_purchase_raises_cost_and_rate() {
        let mut ledger = ResourceLedger::default();
        let mut structures = RealmStructures::new(Realm::Fantasy, catalog(), BTreeMap::new());

        assert_eq!(structures.next_cost("tower").unwrap(), 100.0);
        let receipt = structures.try_purchase("tower", &mut ledger).unwrap();

        assert_eq!(receipt.paid, 100.0);
        assert_eq!(receipt.new_count, 1);
        assert_eq!(receipt.next_cost, 114.0);
        assert_eq!(ledger.balance(ResourceKind::Mana), 900.0);
        assert_eq!(structures.production_rate(), 1.0);
    }

    #[test]
    fn test_scifi_pays_with_energy() {
        let mut ledger = ResourceLedger::default();
        let mut structures = RealmStructures::new(Realm::SciFi, catalog(), BTreeMap::new());

        structures.try_purchase("shrine", &mut ledger).unwrap();

        assert_eq!(ledger.balance(ResourceKind::EnergyCredits), 785.0);
        assert_eq!(ledger.balance(ResourceKind::Mana), 1000.0);
    }

    #[test]
    fn test_unaffordable_purchase_changes_nothing() {
        let mut ledger = ResourceLedger::new(StartingBalances {
            mana: 99.0,
            ..StartingBalances::default()
        });
        let mut structures = RealmStructures::new(Realm::Fantasy, catalog(), BTreeMap::new());

        let err = structures.try_purchase("tower", &mut ledger).unwrap_err();

        assert!(err.is_insufficient_funds());
        assert_eq!(structures.count("tower"), 0);
        assert_eq!(ledger.balance(ResourceKind::Mana), 99.0);
    }

    #[test]
    fn test_unknown_building() {
        let mut ledger = ResourceLedger::default();
        let mut structures = RealmStructures::new(Realm::Fantasy, catalog(), BTreeMap::new());

        assert_eq!(
            structures.try_purchase("castle", &mut ledger).unwrap_err(),
            EconomyError::UnknownBuilding("castle".to_string())
        );
        assert_eq!(ledger.balance(ResourceKind::Mana), 1000.0);
    }

    #[test]
    fn test_unknown_saved_ids_produce_nothing() {
        let counts = BTreeMap::from([("tower".to_string(), 3), ("retired".to_string(), 9)]);
        let structures = RealmStructures::new(Realm::Fantasy, catalog(), counts);

        assert_eq!(structures.production_rate(), 3.0);
        assert_eq!(structures.count("retired"), 9);
        assert_eq!(structures.instances().count(), 2);
    }
}

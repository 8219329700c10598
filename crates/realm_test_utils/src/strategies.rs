//! Proptest strategies for economy testing.
//!
//! These strategies generate random but reproducible inputs for
//! property-based tests of the ledger, persistence and event handling.

use std::collections::BTreeMap;

use proptest::prelude::*;
use realm_core::data::EconomyConfig;
use realm_core::ledger::CONVERGENCE_PROGRESS_MAX;
use realm_core::persistence::{PersistedGameState, SAVE_VERSION};
use realm_core::producer::{ProducerId, ProducerLevels};
use realm_core::resources::{Realm, ResourceKind};

use crate::determinism::EconomyEvent;

/// Generate a non-negative amount in quarter units.
///
/// Range: 0 to 250 million
pub fn arb_amount() -> impl Strategy<Value = f64> {
    (0u64..1_000_000_000).prop_map(|n| n as f64 / 4.0)
}

/// Generate a per-second rate (0 to 1000, in eighths).
pub fn arb_rate() -> impl Strategy<Value = f64> {
    (0u32..8_000).prop_map(|n| f64::from(n) / 8.0)
}

/// Generate any resource kind.
pub fn arb_resource_kind() -> impl Strategy<Value = ResourceKind> {
    prop_oneof![
        Just(ResourceKind::Mana),
        Just(ResourceKind::EnergyCredits),
        Just(ResourceKind::NexusShards),
    ]
}

/// Generate mana or energy credits.
pub fn arb_primary_resource() -> impl Strategy<Value = ResourceKind> {
    prop_oneof![Just(ResourceKind::Mana), Just(ResourceKind::EnergyCredits)]
}

/// Generate a realm.
pub fn arb_realm() -> impl Strategy<Value = Realm> {
    prop_oneof![Just(Realm::Fantasy), Just(Realm::SciFi)]
}

/// Generate a producer.
pub fn arb_producer() -> impl Strategy<Value = ProducerId> {
    prop_oneof![Just(ProducerId::Mana), Just(ProducerId::Energy), Just(ProducerId::Nexus)]
}

/// Generate producer levels (0-40 each).
pub fn arb_producer_levels() -> impl Strategy<Value = ProducerLevels> {
    (0u32..40, 0u32..40, 0u32..40).prop_map(|(mana, energy, nexus)| ProducerLevels { mana, energy, nexus })
}

fn structure_ids(realm: Realm) -> Vec<String> {
    EconomyConfig::default()
        .structures(realm)
        .iter()
        .map(|def| def.id.clone())
        .collect()
}

fn upgrade_ids() -> Vec<(String, String)> {
    EconomyConfig::default()
        .shops
        .iter()
        .flat_map(|shop| shop.upgrades.iter().map(|def| (shop.id.clone(), def.id.clone())))
        .collect()
}

/// Generate owned-building counts keyed by the realm's default catalog.
pub fn arb_building_counts(realm: Realm) -> impl Strategy<Value = BTreeMap<String, u32>> {
    let ids = structure_ids(realm);
    proptest::collection::vec(0u32..200, ids.len()).prop_map(move |counts| {
        ids.iter()
            .cloned()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .collect()
    })
}

/// Generate upgrade levels (1-5) for a subset of the default upgrades.
pub fn arb_upgrade_levels() -> impl Strategy<Value = BTreeMap<String, u32>> {
    let ids = upgrade_ids();
    proptest::collection::vec(0u32..=5, ids.len()).prop_map(move |levels| {
        ids.iter()
            .map(|(_, id)| id.clone())
            .zip(levels)
            .filter(|(_, level)| *level > 0)
            .collect()
    })
}

/// Generate a well-formed save record.
///
/// Every generated record is one reconciliation leaves untouched: the
/// purchased set equals the upgraded ids and every value is in range.
pub fn arb_persisted_state() -> impl Strategy<Value = PersistedGameState> {
    (
        (arb_amount(), arb_amount(), arb_amount()),
        (arb_rate(), arb_rate(), arb_rate()),
        (0u64..1_000, 0u32..=10),
        (arb_building_counts(Realm::Fantasy), arb_building_counts(Realm::SciFi)),
        arb_upgrade_levels(),
        arb_producer_levels(),
        arb_realm(),
        0u64..4_000_000_000_000,
    )
        .prop_map(
            |(
                (mana, energy_credits, nexus_shards),
                (mana_per_second, energy_per_second, nexus_per_second),
                (convergence_count, progress_steps),
                (fantasy_buildings, scifi_buildings),
                upgrade_levels,
                producers,
                current_realm,
                last_save_time,
            )| PersistedGameState {
                version: SAVE_VERSION,
                mana,
                energy_credits,
                nexus_shards,
                mana_per_second,
                energy_per_second,
                nexus_per_second,
                convergence_count,
                convergence_progress: (f64::from(progress_steps) * 10.0).min(CONVERGENCE_PROGRESS_MAX),
                fantasy_buildings,
                scifi_buildings,
                purchased_upgrades: upgrade_levels.keys().cloned().collect(),
                upgrade_levels,
                producers,
                current_realm,
                last_save_time,
            },
        )
}

/// Generate one inbound economy event.
pub fn arb_event() -> impl Strategy<Value = EconomyEvent> {
    let fantasy = structure_ids(Realm::Fantasy);
    let scifi = structure_ids(Realm::SciFi);
    let upgrades = upgrade_ids();
    prop_oneof![
        5 => prop_oneof![
            3 => Just(EconomyEvent::Tap),
            1 => Just(EconomyEvent::SwitchRealm),
            1 => Just(EconomyEvent::Converge),
        ],
        2 => arb_producer().prop_map(EconomyEvent::UpgradeProducer),
        2 => proptest::sample::select(fantasy)
            .prop_map(|id| EconomyEvent::Purchase(Realm::Fantasy, id)),
        2 => proptest::sample::select(scifi).prop_map(|id| EconomyEvent::Purchase(Realm::SciFi, id)),
        1 => proptest::sample::select(upgrades)
            .prop_map(|(shop, id)| EconomyEvent::BuyUpgrade(shop, id)),
        1 => (arb_primary_resource(), 1u32..50)
            .prop_map(|(source, tens)| EconomyEvent::Convert(source, f64::from(tens) * 10.0)),
        1 => (1u32..20).prop_map(|n| EconomyEvent::SpendShards(f64::from(n))),
        2 => (0u64..30_000).prop_map(EconomyEvent::Advance),
        1 => any::<bool>().prop_map(EconomyEvent::SetPaused),
    ]
}

/// Generate a sequence of events.
pub fn arb_event_script(max_len: usize) -> impl Strategy<Value = Vec<EconomyEvent>> {
    proptest::collection::vec(arb_event(), 0..max_len)
}

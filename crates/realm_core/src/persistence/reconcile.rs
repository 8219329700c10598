//! Defensive decoding of save records.
//!
//! A save blob is decoded field by field against [`PersistedGameState`].
//! Each field validator yields a [`Validated`] value that records whether
//! the default was substituted, and every substitution lands in the
//! [`ReconcileReport`]. A corrupt or half-written save never fails to
//! load: unreadable text yields the full default state, and a bad field
//! only loses that field.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::schema::{PersistedGameState, SAVE_VERSION};
use crate::ledger::CONVERGENCE_PROGRESS_MAX;
use crate::producer::ProducerLevels;
use crate::resources::Realm;

/// A decoded field and whether it had to be defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    /// The value to use.
    pub value: T,
    /// True if `value` is the default rather than what was stored.
    pub defaulted: bool,
}

impl<T> Validated<T> {
    fn ok(value: T) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    fn default_to(value: T) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }
}

/// Audit trail of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    /// The blob was absent, not JSON, or not an object; everything defaulted.
    pub unreadable: bool,
    /// No save existed at all.
    pub missing: bool,
    /// Paths of fields (or map entries) that were replaced by defaults.
    pub defaulted: Vec<String>,
}

impl ReconcileReport {
    /// Whether the stored record was used as-is.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.unreadable && !self.missing && self.defaulted.is_empty()
    }
}

/// Stateful field decoder over one JSON object.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    report: &'a mut ReconcileReport,
}

impl FieldReader<'_> {
    fn note<T>(&mut self, path: &str, field: Validated<T>) -> T {
        if field.defaulted {
            tracing::warn!(field = path, "Save field invalid or missing; using default");
            self.report.defaulted.push(path.to_string());
        }
        field.value
    }

    fn number(&mut self, key: &str, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
        let field = match self.object.get(key).and_then(Value::as_f64) {
            Some(n) if n.is_finite() && valid(n) => Validated::ok(n),
            _ => Validated::default_to(default),
        };
        self.note(key, field)
    }

    fn non_negative(&mut self, key: &str, default: f64) -> f64 {
        self.number(key, default, |n| n >= 0.0)
    }

    fn count(&mut self, key: &str, default: u64) -> u64 {
        let field = match self.object.get(key).and_then(as_count) {
            Some(n) => Validated::ok(n),
            None => Validated::default_to(default),
        };
        self.note(key, field)
    }

    fn count_map(&mut self, key: &str) -> BTreeMap<String, u32> {
        let object = self.object;
        let Some(entries) = object.get(key).and_then(Value::as_object) else {
            self.note(key, Validated::default_to(()));
            return BTreeMap::new();
        };
        let mut map = BTreeMap::new();
        for (id, raw) in entries {
            match as_count(raw).and_then(|n| u32::try_from(n).ok()) {
                Some(n) => {
                    map.insert(id.clone(), n);
                }
                None => {
                    self.note(&format!("{key}.{id}"), Validated::default_to(()));
                }
            }
        }
        map
    }

    fn id_set(&mut self, key: &str) -> BTreeSet<String> {
        let object = self.object;
        let Some(items) = object.get(key).and_then(Value::as_array) else {
            self.note(key, Validated::default_to(()));
            return BTreeSet::new();
        };
        let mut set = BTreeSet::new();
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(id) => {
                    set.insert(id.to_string());
                }
                None => {
                    self.note(&format!("{key}[{index}]"), Validated::default_to(()));
                }
            }
        }
        set
    }

    fn producers(&mut self, key: &str) -> ProducerLevels {
        let object = self.object;
        let Some(levels) = object.get(key).and_then(Value::as_object) else {
            self.note(key, Validated::default_to(()));
            return ProducerLevels::default();
        };
        let mut level = |name: &str| {
            let field = match levels.get(name).and_then(as_count).and_then(|n| u32::try_from(n).ok()) {
                Some(n) => Validated::ok(n),
                None => Validated::default_to(0),
            };
            self.note(&format!("{key}.{name}"), field)
        };
        ProducerLevels {
            mana: level("mana"),
            energy: level("energy"),
            nexus: level("nexus"),
        }
    }

    fn realm(&mut self, key: &str, default: Realm) -> Realm {
        let field = match self.object.get(key).and_then(Value::as_str).and_then(Realm::from_str_id) {
            Some(realm) => Validated::ok(realm),
            None => Validated::default_to(default),
        };
        self.note(key, field)
    }

    fn version(&mut self, key: &str) -> u32 {
        let field = match self.object.get(key).and_then(as_count).and_then(|n| u32::try_from(n).ok()) {
            Some(v) => Validated::ok(v),
            None => Validated::default_to(SAVE_VERSION),
        };
        let version = self.note(key, field);
        if version > SAVE_VERSION {
            tracing::warn!(version, supported = SAVE_VERSION, "Save is from a newer version");
        }
        version
    }
}

/// A non-negative integer, accepting integral floats such as `3.0`.
fn as_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

/// Decode a save blob, substituting `defaults` for anything invalid.
///
/// `None` means no save exists. Never fails.
#[must_use]
pub fn reconcile(raw: Option<&str>, defaults: &PersistedGameState) -> (PersistedGameState, ReconcileReport) {
    let mut report = ReconcileReport::default();

    let Some(raw) = raw else {
        report.missing = true;
        return (defaults.clone(), report);
    };

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Save data is not valid JSON; starting fresh");
            report.unreadable = true;
            return (defaults.clone(), report);
        }
    };
    let Some(object) = parsed.as_object() else {
        tracing::warn!("Save data is not an object; starting fresh");
        report.unreadable = true;
        return (defaults.clone(), report);
    };

    let mut reader = FieldReader {
        object,
        report: &mut report,
    };

    let mut state = PersistedGameState {
        version: reader.version("version"),
        mana: reader.non_negative("mana", defaults.mana),
        energy_credits: reader.non_negative("energyCredits", defaults.energy_credits),
        nexus_shards: reader.non_negative("nexusShards", defaults.nexus_shards),
        mana_per_second: reader.non_negative("manaPerSecond", defaults.mana_per_second),
        energy_per_second: reader.non_negative("energyPerSecond", defaults.energy_per_second),
        nexus_per_second: reader.non_negative("nexusPerSecond", defaults.nexus_per_second),
        convergence_count: reader.count("convergenceCount", defaults.convergence_count),
        convergence_progress: reader.number("convergenceProgress", defaults.convergence_progress, |n| {
            (0.0..=CONVERGENCE_PROGRESS_MAX).contains(&n)
        }),
        fantasy_buildings: reader.count_map("fantasyBuildings"),
        scifi_buildings: reader.count_map("scifiBuildings"),
        purchased_upgrades: reader.id_set("purchasedUpgrades"),
        upgrade_levels: reader.count_map("upgradeLevels"),
        producers: reader.producers("producers"),
        current_realm: reader.realm("currentRealm", defaults.current_realm),
        last_save_time: reader.count("lastSaveTime", defaults.last_save_time),
    };

    // Older saves only recorded the purchased set; treat those as level 1.
    for id in &state.purchased_upgrades {
        state.upgrade_levels.entry(id.clone()).or_insert(1);
    }
    state.upgrade_levels.retain(|_, level| *level > 0);
    state.purchased_upgrades = state.upgrade_levels.keys().cloned().collect();

    (state, report)
}

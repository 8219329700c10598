//! Scripted economy events and replay checks.
//!
//! The economy only changes through inbound events and the injected
//! clock, so the same [`EconomyEvent`] script replayed against fresh
//! sessions has to end in the same save record. [`first_divergence`]
//! replays a script several times and reports the first run whose record
//! differs, naming the save fields that disagree.

use realm_core::persistence::PersistedGameState;
use realm_core::producer::ProducerId;
use realm_core::resources::{Realm, ResourceKind};
use realm_core::session::GameSession;

/// One inbound event from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum EconomyEvent {
    /// Tap in the active realm.
    Tap,
    /// Switch to the other realm.
    SwitchRealm,
    /// Buy a producer level.
    UpgradeProducer(ProducerId),
    /// Buy a structure in a realm.
    Purchase(Realm, String),
    /// Buy a shop upgrade (shop id, upgrade id).
    BuyUpgrade(String, String),
    /// Convert a primary resource to shards.
    Convert(ResourceKind, f64),
    /// Spend shards in the sandbox.
    SpendShards(f64),
    /// Converge if the gate allows.
    Converge,
    /// Let wall time pass.
    Advance(u64),
    /// Enter or leave editor mode.
    SetPaused(bool),
}

/// Apply an event, ignoring rejected purchases.
///
/// Returns whether the event was accepted.
pub fn apply_event(session: &mut GameSession, event: &EconomyEvent) -> bool {
    match event {
        EconomyEvent::Tap => {
            session.tap();
            true
        }
        EconomyEvent::SwitchRealm => {
            session.switch_realm();
            true
        }
        EconomyEvent::UpgradeProducer(id) => session.upgrade_producer(*id).is_ok(),
        EconomyEvent::Purchase(realm, id) => session.purchase_structure(*realm, id).is_ok(),
        EconomyEvent::BuyUpgrade(shop, id) => session.purchase_upgrade(shop, id).is_ok(),
        EconomyEvent::Convert(source, amount) => session.convert(*source, *amount).is_ok(),
        EconomyEvent::SpendShards(amount) => session.spend_shards(*amount).is_ok(),
        EconomyEvent::Converge => session.converge().is_ok(),
        EconomyEvent::Advance(ms) => {
            session.advance(*ms);
            true
        }
        EconomyEvent::SetPaused(paused) => {
            session.set_paused(*paused);
            true
        }
    }
}

/// Apply every event in order. Returns how many were accepted.
pub fn apply_script(session: &mut GameSession, script: &[EconomyEvent]) -> usize {
    script.iter().filter(|event| apply_event(session, event)).count()
}

/// Outcome of replaying one script against one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// Save record after the last event.
    pub state: PersistedGameState,
    /// Events the session accepted.
    pub accepted: usize,
}

/// Run `script` against a session built by `setup`.
pub fn replay<Setup>(setup: Setup, script: &[EconomyEvent]) -> Replay
where
    Setup: FnOnce() -> GameSession,
{
    let mut session = setup();
    let accepted = apply_script(&mut session, script);
    Replay {
        state: session.snapshot(),
        accepted,
    }
}

/// A replay that ended somewhere other than the first one did.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    /// Index of the diverging run (run 0 is the reference).
    pub run: usize,
    /// The reference replay.
    pub expected: Replay,
    /// The diverging replay.
    pub actual: Replay,
}

impl Divergence {
    /// Save-record keys whose values differ, in record order.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let expected = serde_json::to_value(&self.expected.state).unwrap_or_default();
        let actual = serde_json::to_value(&self.actual.state).unwrap_or_default();
        let (Some(expected), Some(actual)) = (expected.as_object(), actual.as_object()) else {
            return Vec::new();
        };
        expected
            .iter()
            .filter(|(key, value)| actual.get(key.as_str()) != Some(value))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Replay `script` `runs` times and return the first run that differs
/// from run 0, or `None` when every run agrees.
///
/// # Example
///
/// ```
/// use realm_test_utils::determinism::{first_divergence, EconomyEvent};
/// use realm_test_utils::fixtures::Harness;
///
/// let script = vec![EconomyEvent::Tap, EconomyEvent::Advance(3_000)];
/// assert!(first_divergence(3, || Harness::new().session, &script).is_none());
/// ```
pub fn first_divergence<Setup>(runs: usize, setup: Setup, script: &[EconomyEvent]) -> Option<Divergence>
where
    Setup: Fn() -> GameSession,
{
    let expected = replay(&setup, script);
    (1..runs).find_map(|run| {
        let actual = replay(&setup, script);
        (actual != expected).then(|| Divergence {
            run,
            expected: expected.clone(),
            actual,
        })
    })
}

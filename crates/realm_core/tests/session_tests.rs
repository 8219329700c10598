//! End-to-end gameplay tests for realm_core.
//!
//! These drive a full [`GameSession`] through the same events the
//! presentation layer would send and check the resulting economy.

use realm_core::persistence::SAVE_KEY;
use realm_core::prelude::*;
use realm_test_utils::determinism::{apply_script, first_divergence};
use realm_test_utils::fixtures::{damaged_save_blob, Harness, FIXTURE_EPOCH_MS};
use realm_test_utils::proptest::prelude::*;
use realm_test_utils::strategies::arb_event_script;

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}

// =============================================================================
// Ledger Flow
// =============================================================================

mod ledger_flow {
    use super::*;

    /// Tap, one producer tick, a paused tick, and an unaffordable spend.
    #[test]
    fn test_first_minute_of_play() {
        let mut h = Harness::new();
        let session = &mut h.session;
        assert_eq!(session.ledger().balance(ResourceKind::Mana), 1000.0);
        assert_eq!(session.ledger().balance(ResourceKind::EnergyCredits), 800.0);

        session.tap();
        assert_eq!(session.ledger().balance(ResourceKind::Mana), 1001.0);

        session.set_rate(ResourceKind::Mana, 5.0);
        session.advance(1_000);
        assert_eq!(session.ledger().balance(ResourceKind::Mana), 1006.0);

        session.set_paused(true);
        let report = session.advance(1_000);
        assert_eq!(report.paused_ticks, 1);
        assert_eq!(session.ledger().balance(ResourceKind::Mana), 1006.0);

        assert!(!session.spend(ResourceKind::Mana, 2000.0));
        assert_eq!(session.ledger().balance(ResourceKind::Mana), 1006.0);
    }

    #[test]
    fn test_ticks_coalesce_partial_periods() {
        let mut h = Harness::new();
        h.session.set_rate(ResourceKind::EnergyCredits, 2.0);

        assert_eq!(h.session.advance(600).ticks, 0);
        assert_eq!(h.session.advance(600).ticks, 1);
        assert_eq!(h.session.advance(2_800).ticks, 3);
        assert_eq!(h.session.ledger().balance(ResourceKind::EnergyCredits), 808.0);
    }

    #[test]
    fn test_shutdown_stops_production() {
        let mut h = Harness::new();
        h.session.set_rate(ResourceKind::Mana, 5.0);
        assert!(h.session.shutdown());

        h.session.advance(10_000);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 1000.0);
        assert!(h.storage.get(SAVE_KEY).is_some());
    }
}

// =============================================================================
// Purchases
// =============================================================================

mod purchases {
    use super::*;

    #[test]
    fn test_producer_cost_curve() {
        let mut h = Harness::new();
        assert_eq!(h.session.producer(ProducerId::Mana).upgrade_cost(), 50.0);

        let first = h.session.upgrade_producer(ProducerId::Mana).unwrap();
        assert_eq!(first.paid, 50.0);
        assert_eq!(first.next_cost, 57.0);

        let second = h.session.upgrade_producer(ProducerId::Mana).unwrap();
        assert_eq!(second.paid, 57.0);
        assert_eq!(second.new_level, 2);
        assert_eq!(h.session.ledger().rate(ResourceKind::Mana), 2.0);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 893.0);
    }

    #[test]
    fn test_nexus_producer_needs_shards() {
        let mut h = Harness::new();
        let err = h.session.upgrade_producer(ProducerId::Nexus).unwrap_err();
        assert!(err.is_insufficient_funds());
        assert_eq!(h.session.producer(ProducerId::Nexus).level(), 0);

        h.session.convert(ResourceKind::Mana, 500.0).unwrap();
        h.session.upgrade_producer(ProducerId::Nexus).unwrap();
        assert_eq!(h.session.ledger().balance(ResourceKind::NexusShards), 0.0);
        assert_eq!(h.session.ledger().rate(ResourceKind::NexusShards), 1.0);
    }

    #[test]
    fn test_structures_pay_with_realm_resource() {
        let mut h = Harness::new();
        h.session.switch_realm();
        let receipt = h.session.purchase("solar_array").unwrap();

        assert_eq!(receipt.paid, 15.0);
        assert_eq!(receipt.next_cost, 17.0);
        assert_eq!(h.session.ledger().balance(ResourceKind::EnergyCredits), 785.0);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 1000.0);
        assert_close(h.session.ledger().rate(ResourceKind::EnergyCredits), 0.1);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let mut h = Harness::new();
        assert!(matches!(
            h.session.purchase("moon_base"),
            Err(EconomyError::UnknownBuilding(_))
        ));
        assert!(matches!(
            h.session.purchase_upgrade("armory", "plasma_edge"),
            Err(EconomyError::UnknownShop(_))
        ));
        assert!(matches!(
            h.session.purchase_upgrade("weapon", "laser"),
            Err(EconomyError::UnknownUpgrade(_))
        ));
        assert!(!h.session.is_dirty());
    }

    #[test]
    fn test_upgrade_shop_walks_to_max() {
        let mut h = Harness::new();
        h.session.switch_realm();
        assert_eq!(
            h.session.upgrade_status("weapon", "drone_swarm").unwrap(),
            UpgradeStatus::Available
        );

        // 400 + floor(400 * 1.8) = 1120 > 800
        h.session.purchase_upgrade("weapon", "drone_swarm").unwrap();
        assert_eq!(
            h.session.upgrade_status("weapon", "drone_swarm").unwrap(),
            UpgradeStatus::Locked
        );
        assert_eq!(h.session.ledger().rate(ResourceKind::EnergyCredits), 1.0);
    }

    #[test]
    fn test_conversion_yields_floor_tenth() {
        let mut h = Harness::new();
        let conversion = h.session.convert(ResourceKind::Mana, 250.0).unwrap();
        assert_eq!(conversion.shards, 25.0);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 750.0);

        h.session.convert(ResourceKind::EnergyCredits, 15.0).unwrap();
        assert_eq!(h.session.ledger().balance(ResourceKind::NexusShards), 26.0);

        assert!(h.session.convert(ResourceKind::Mana, 5000.0).is_err());
        assert!(h.session.convert(ResourceKind::NexusShards, 10.0).is_err());
        assert_eq!(h.session.ledger().balance(ResourceKind::NexusShards), 26.0);
    }

    #[test]
    fn test_spend_shards() {
        let mut h = Harness::new();
        h.session.convert(ResourceKind::Mana, 100.0).unwrap();
        h.session.spend_shards(4.0).unwrap();
        assert_eq!(h.session.ledger().balance(ResourceKind::NexusShards), 6.0);
        assert!(h.session.spend_shards(7.0).unwrap_err().is_insufficient_funds());
    }
}

// =============================================================================
// Convergence
// =============================================================================

mod convergence {
    use super::*;

    #[test]
    fn test_gate_follows_combined_balance() {
        let mut h = Harness::new();
        let view = h.session.convergence();
        assert_eq!(view.total, 1800.0);
        assert!(view.can_converge);
        assert_eq!(view.progress, 100.0);

        h.session.convert(ResourceKind::Mana, 1000.0).unwrap();
        h.session.convert(ResourceKind::EnergyCredits, 300.0).unwrap();
        let view = h.session.convergence();
        assert_eq!(view.total, 500.0);
        assert!(!view.can_converge);
        assert_eq!(view.progress, 50.0);
    }

    #[test]
    fn test_meta_progress_caps_at_100() {
        let mut h = Harness::new();
        for _ in 0..12 {
            h.session.increment_convergence();
        }
        assert_eq!(h.session.ledger().convergence_count(), 12);
        assert_eq!(h.session.ledger().convergence_progress(), 100.0);
    }
}

// =============================================================================
// Offline and Persistence
// =============================================================================

mod lifecycle {
    use super::*;

    fn harness_with_mana_rate_two() -> Harness {
        let mut h = Harness::new();
        h.session.upgrade_producer(ProducerId::Mana).unwrap();
        h.session.upgrade_producer(ProducerId::Mana).unwrap();
        h
    }

    #[test]
    fn test_offline_credit_on_resume() {
        let (h, report) = harness_with_mana_rate_two().reopen_after(100_000);

        assert_eq!(report.offline.credited_secs, 100);
        assert!(!report.offline.capped);
        assert_eq!(report.offline.earned.mana, 200.0);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 1093.0);
        assert_eq!(h.session.producer(ProducerId::Mana).level(), 2);
        assert_eq!(h.session.ledger().rate(ResourceKind::Mana), 2.0);
    }

    #[test]
    fn test_offline_credit_is_capped() {
        let (h, report) = harness_with_mana_rate_two().reopen_after(10 * 3600 * 1000);

        assert!(report.offline.capped);
        assert_eq!(report.offline.credited_secs, 8 * 3600);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 893.0 + 2.0 * 28_800.0);
    }

    #[test]
    fn test_clock_skew_credits_nothing() {
        let mut h = harness_with_mana_rate_two();
        h.session.save();
        h.clock.set(FIXTURE_EPOCH_MS - 60_000);

        let (h, report) = Harness::resume(h.storage, h.clock);
        assert_eq!(report.offline, OfflineReport::default());
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 893.0);
    }

    #[test]
    fn test_resume_restores_everything() {
        let mut h = Harness::new();
        h.session.purchase_structure(Realm::Fantasy, "wizard_tower").unwrap();
        h.session.purchase_upgrade("attack", "sharpened_focus").unwrap();
        h.session.convert(ResourceKind::EnergyCredits, 200.0).unwrap();
        h.session.increment_convergence();
        h.session.switch_realm();
        let before = h.session.snapshot();

        let (h, report) = h.reopen_after(0);

        assert!(report.load.is_clean());
        assert_eq!(h.session.snapshot(), before);
        assert_eq!(h.session.realm(), Realm::SciFi);
        assert_eq!(h.session.structures(Realm::Fantasy).count("wizard_tower"), 1);
        assert_eq!(h.session.upgrades().level("sharpened_focus"), 1);
    }

    #[test]
    fn test_corrupt_fields_fall_back_individually() {
        let h = Harness::new();
        h.storage.insert(SAVE_KEY, &damaged_save_blob());

        let (h, report) = Harness::resume(h.storage, h.clock);

        assert!(report.load.defaulted.iter().any(|f| f == "mana"));
        assert!(report.load.defaulted.iter().any(|f| f == "currentRealm"));
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 1000.0);
        assert_eq!(h.session.ledger().balance(ResourceKind::EnergyCredits), 300.0);
        assert_eq!(h.session.realm(), Realm::Fantasy);
        assert_eq!(h.session.producer(ProducerId::Mana).level(), 2);
        // No timestamp means no offline credit
        assert_eq!(report.offline.credited_secs, 0);
    }

    #[test]
    fn test_garbage_save_starts_fresh() {
        let h = Harness::new();
        h.storage.insert(SAVE_KEY, "not json {");

        let (h, report) = Harness::resume(h.storage, h.clock);
        assert!(report.load.unreadable);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 1000.0);
    }

    #[test]
    fn test_failed_save_stays_dirty() {
        let mut session = GameSession::new(
            EconomyConfig::default(),
            SaveStore::new(MemoryStorage::failing()),
            Box::new(ManualClock::new(0)),
        );
        session.tap();

        assert!(!session.save());
        assert!(session.is_dirty());
        assert!(!session.autosave());
        assert_eq!(session.ledger().balance(ResourceKind::Mana), 1001.0);
    }

    #[test]
    fn test_reset_restores_starting_state() {
        let mut h = harness_with_mana_rate_two();
        h.session.purchase("crystal_shrine").unwrap();
        h.session.purchase_upgrade("attack", "sharpened_focus").unwrap();
        h.session.switch_realm();

        h.session.reset();

        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 1000.0);
        assert_eq!(h.session.ledger().rate(ResourceKind::Mana), 0.0);
        assert_eq!(h.session.producer(ProducerId::Mana).level(), 0);
        assert_eq!(h.session.structures(Realm::Fantasy).count("crystal_shrine"), 0);
        assert_eq!(h.session.upgrades().level("sharpened_focus"), 0);
        assert_eq!(h.session.realm(), Realm::Fantasy);
        assert!(!h.session.is_dirty());

        let (resumed, _) = h.reopen_after(0);
        assert_eq!(resumed.session.ledger().balance(ResourceKind::Mana), 1000.0);
    }

    #[test]
    fn test_reset_restarts_stopped_production() {
        let mut h = Harness::new();
        h.session.stop_producer(ProducerId::Energy);
        h.session.set_paused(true);
        h.session.advance(700);
        h.session.shutdown();

        h.session.reset();
        assert!(!h.session.is_paused());
        assert_eq!(h.session.scheduler().pending_ms(), 0);
        for source in TickSource::ALL {
            assert!(h.session.scheduler().is_registered(source));
        }

        h.session.upgrade_producer(ProducerId::Mana).unwrap();
        h.session.advance(5_000);
        assert_eq!(h.session.ledger().balance(ResourceKind::Mana), 955.0);
    }
}

// =============================================================================
// Property-based invariants
// =============================================================================

proptest! {
    /// No sequence of events can drive a balance negative or non-finite.
    #[test]
    fn prop_balances_stay_non_negative(script in arb_event_script(60)) {
        let mut h = Harness::new();
        apply_script(&mut h.session, &script);

        for resource in ResourceKind::ALL {
            let balance = h.session.ledger().balance(resource);
            prop_assert!(balance.is_finite() && balance >= 0.0, "{resource}: {balance}");
        }
        prop_assert!(h.session.ledger().convergence_progress() <= 100.0);
    }

    /// Whatever happened, saving and resuming reproduces the same record.
    #[test]
    fn prop_resume_reproduces_snapshot(script in arb_event_script(40)) {
        let mut h = Harness::new();
        apply_script(&mut h.session, &script);
        let before = h.session.snapshot();

        let (resumed, report) = h.reopen_after(0);
        prop_assert!(report.load.is_clean());
        prop_assert_eq!(resumed.session.snapshot(), before);
    }

    /// Fresh sessions fed the same events end in the same record.
    #[test]
    fn prop_replayed_scripts_match(script in arb_event_script(40)) {
        let divergence = first_divergence(3, || Harness::new().session, &script);
        prop_assert!(
            divergence.is_none(),
            "run diverged on {:?}",
            divergence.map(|d| d.fields())
        );
    }
}

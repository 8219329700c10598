//! # Realm Core
//!
//! Idle economy core for Realm Nexus.
//!
//! This crate contains **only** economy logic:
//! - No rendering
//! - No input handling
//! - No global state (everything hangs off a [`session::GameSession`])
//!
//! Storage and time are injected ([`persistence::SaveStorage`],
//! [`clock::Clock`]) so the whole economy runs headless in tests, in the
//! `realm-tools` simulator, or behind any presentation layer.
//!
//! ## Crate Structure
//!
//! - [`cost`] - Exponential cost curves
//! - [`ledger`] - Resource balances, rates and convergence counters
//! - [`producer`] - The three leveled auto-producers
//! - [`structures`] - Per-realm buildings
//! - [`upgrades`] - Upgrade shops
//! - [`conversion`] - Primary resources to nexus shards
//! - [`convergence`] - Convergence gate
//! - [`scheduler`] - Coalesced production ticks
//! - [`offline`] - Production credited while away
//! - [`persistence`] - Save record, reconciliation, storage
//! - [`session`] - The game session tying it together

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod clock;
pub mod conversion;
pub mod convergence;
pub mod cost;
pub mod data;
pub mod error;
pub mod ledger;
pub mod offline;
pub mod persistence;
pub mod producer;
pub mod resources;
pub mod scheduler;
pub mod session;
pub mod structures;
pub mod upgrades;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::conversion::{Conversion, ConversionConfig};
    pub use crate::convergence::{ConvergenceGate, ConvergenceView};
    pub use crate::cost::{cost, CostCurve};
    pub use crate::data::EconomyConfig;
    pub use crate::error::{EconomyError, Result};
    pub use crate::ledger::{ResourceLedger, StartingBalances};
    pub use crate::offline::{OfflineConfig, OfflineReport};
    pub use crate::persistence::{
        FileStorage, LoadOutcome, MemoryStorage, PersistedGameState, ReconcileReport, SaveStorage,
        SaveStore,
    };
    pub use crate::producer::{AutoProducer, ProducerId, ProducerLevels, ProducerUpgrade};
    pub use crate::resources::{Realm, ResourceAmounts, ResourceKind};
    pub use crate::scheduler::{TickReport, TickScheduler, TickSource};
    pub use crate::session::{GameSession, ResumeReport};
    pub use crate::structures::{RealmStructures, StructureDefinition, StructurePurchase};
    pub use crate::upgrades::{UpgradeBook, UpgradeEffect, UpgradePurchase, UpgradeShop, UpgradeStatus};
}

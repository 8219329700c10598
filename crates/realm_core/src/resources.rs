//! Resource kinds and the two realms that produce them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every resource tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    /// Fantasy realm primary resource.
    Mana,
    /// Sci-fi realm primary resource.
    EnergyCredits,
    /// Meta-currency, obtained only through conversion (or the nexus producer).
    NexusShards,
}

impl ResourceKind {
    /// All resource kinds in ledger order.
    pub const ALL: [Self; 3] = [Self::Mana, Self::EnergyCredits, Self::NexusShards];

    /// Whether this is a realm primary resource (tappable, convertible).
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Mana | Self::EnergyCredits)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mana => "mana",
            Self::EnergyCredits => "energy credits",
            Self::NexusShards => "nexus shards",
        };
        f.write_str(name)
    }
}

/// An amount per resource kind, used for production reports.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceAmounts {
    /// Mana.
    pub mana: f64,
    /// Energy credits.
    pub energy_credits: f64,
    /// Nexus shards.
    pub nexus_shards: f64,
}

impl ResourceAmounts {
    /// Amount for one resource.
    #[must_use]
    pub const fn get(&self, resource: ResourceKind) -> f64 {
        match resource {
            ResourceKind::Mana => self.mana,
            ResourceKind::EnergyCredits => self.energy_credits,
            ResourceKind::NexusShards => self.nexus_shards,
        }
    }

    /// Add to one resource's amount.
    pub fn add(&mut self, resource: ResourceKind, amount: f64) {
        match resource {
            ResourceKind::Mana => self.mana += amount,
            ResourceKind::EnergyCredits => self.energy_credits += amount,
            ResourceKind::NexusShards => self.nexus_shards += amount,
        }
    }

    /// Whether every amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mana == 0.0 && self.energy_credits == 0.0 && self.nexus_shards == 0.0
    }
}

/// The two alternating realms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Realm {
    /// Mana-producing realm.
    #[default]
    Fantasy,
    /// Energy-producing realm.
    #[serde(rename = "scifi")]
    SciFi,
}

impl Realm {
    /// The primary resource this realm produces.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        match self {
            Self::Fantasy => ResourceKind::Mana,
            Self::SciFi => ResourceKind::EnergyCredits,
        }
    }

    /// The other realm.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Fantasy => Self::SciFi,
            Self::SciFi => Self::Fantasy,
        }
    }

    /// Lowercase identifier as used in save records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fantasy => "fantasy",
            Self::SciFi => "scifi",
        }
    }

    /// Parse the save-record identifier.
    #[must_use]
    pub fn from_str_id(s: &str) -> Option<Self> {
        match s {
            "fantasy" => Some(Self::Fantasy),
            "scifi" => Some(Self::SciFi),
            _ => None,
        }
    }
}

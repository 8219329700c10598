//! Error types for the idle economy.
//!
//! Every gameplay failure here is an expected outcome (most often
//! [`EconomyError::InsufficientFunds`]) and is returned, never panicked.

use thiserror::Error;

use crate::resources::ResourceKind;

/// Result type alias using [`EconomyError`].
pub type Result<T> = std::result::Result<T, EconomyError>;

/// Top-level error type for economy operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    /// Balance too low for the requested spend.
    #[error("Insufficient {resource}: need {required}, have {available}")]
    InsufficientFunds {
        /// Resource that was short.
        resource: ResourceKind,
        /// Amount required.
        required: f64,
        /// Amount available.
        available: f64,
    },

    /// Upgrade is already at its maximum level.
    #[error("Upgrade '{upgrade}' is already at max level {max_level}")]
    MaxLevelReached {
        /// Upgrade identifier.
        upgrade: String,
        /// The terminal level.
        max_level: u32,
    },

    /// Combined balances are below the convergence threshold.
    #[error("Convergence locked: {total} of {threshold} combined resources")]
    ConvergenceLocked {
        /// Current combined primary balance.
        total: f64,
        /// Required combined balance.
        threshold: f64,
    },

    /// No structure with this id in the realm's catalog.
    #[error("Unknown building: {0}")]
    UnknownBuilding(String),

    /// No upgrade with this id in the shop.
    #[error("Unknown upgrade: {0}")]
    UnknownUpgrade(String),

    /// No shop with this id.
    #[error("Unknown upgrade shop: {0}")]
    UnknownShop(String),

    /// Amount was negative, zero where positive is required, or not finite.
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// Economy configuration failed validation.
    #[error("Invalid economy configuration: {0:?}")]
    InvalidConfig(Vec<String>),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParse {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },
}

impl EconomyError {
    /// Whether this is the routine "not enough resources" outcome.
    #[must_use]
    pub const fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }
}

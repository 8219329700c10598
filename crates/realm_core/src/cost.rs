//! Exponential cost curves.
//!
//! Every shop, producer and structure prices its next purchase with the
//! same curve: `floor(base_cost * growth^level)`.

use serde::{Deserialize, Serialize};

/// Cost of the purchase that takes something from `level` to `level + 1`.
///
/// Pure and deterministic. `level == 0` returns `floor(base_cost)`.
/// Costs only increase with level when `growth > 1`; that is the
/// caller's configuration responsibility and is checked by
/// [`EconomyConfig::validate`](crate::data::EconomyConfig::validate),
/// not here.
#[must_use]
pub fn cost(base_cost: f64, growth: f64, level: u32) -> f64 {
    // powi takes i32; levels beyond that are unreachable in play
    let exponent = i32::try_from(level).unwrap_or(i32::MAX);
    (base_cost * growth.powi(exponent)).floor()
}

/// A base cost paired with its growth multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostCurve {
    /// Cost at level 0.
    pub base_cost: f64,
    /// Multiplier applied per level.
    pub growth: f64,
}

impl CostCurve {
    /// Create a new cost curve.
    #[must_use]
    pub const fn new(base_cost: f64, growth: f64) -> Self {
        Self { base_cost, growth }
    }

    /// Cost to go from `level` to `level + 1`.
    #[must_use]
    pub fn at(&self, level: u32) -> f64 {
        cost(self.base_cost, self.growth, level)
    }

    /// Total cost of buying `count` levels starting at `from_level`.
    #[must_use]
    pub fn cumulative(&self, from_level: u32, count: u32) -> f64 {
        (from_level..from_level.saturating_add(count))
            .map(|level| self.at(level))
            .sum()
    }

    /// Whether this curve is strictly increasing.
    #[must_use]
    pub fn is_increasing(&self) -> bool {
        self.growth > 1.0 && self.base_cost > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_zero_is_base_cost() {
        assert_eq!(cost(50.0, 1.15, 0), 50.0);
        assert_eq!(cost(50.0, 1.8, 0), 50.0);
        assert_eq!(cost(12.7, 1.5, 0), 12.0);
    }

    #[test]
    fn test_known_values() {
        // 50 * 1.15 = 57.49999... in binary floating point
        assert_eq!(cost(50.0, 1.15, 1), 57.0);
        assert_eq!(cost(50.0, 1.25, 1), 62.0);
        assert_eq!(cost(50.0, 1.5, 1), 75.0);
        assert_eq!(cost(50.0, 1.5, 2), 112.0);
        assert_eq!(cost(100.0, 1.8, 3), 583.0);
    }

    #[test]
    fn test_cumulative() {
        let curve = CostCurve::new(50.0, 1.5);
        assert_eq!(curve.cumulative(0, 3), 50.0 + 75.0 + 112.0);
        assert_eq!(curve.cumulative(2, 0), 0.0);
    }

    #[test]
    fn test_is_increasing() {
        assert!(CostCurve::new(50.0, 1.15).is_increasing());
        assert!(!CostCurve::new(50.0, 1.0).is_increasing());
        assert!(!CostCurve::new(0.0, 2.0).is_increasing());
    }

    proptest! {
        #[test]
        fn prop_cost_is_monotonic(
            base in 1.0f64..10_000.0,
            growth in 1.0f64..3.0,
            level in 0u32..200,
        ) {
            prop_assert!(cost(base, growth, level + 1) >= cost(base, growth, level));
        }

        #[test]
        fn prop_cost_is_whole_number(
            base in 0.0f64..10_000.0,
            growth in 1.0f64..3.0,
            level in 0u32..100,
        ) {
            let c = cost(base, growth, level);
            prop_assert_eq!(c, c.floor());
        }
    }
}

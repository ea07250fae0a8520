//! # Liquidity Types

use serde::{Deserialize, Serialize};

/// Outcome shares paid to open (or refunded on closing) a position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidityQuote {
    pub required_yes: f64,
    pub required_no: f64,
}

/// A provider's liquidity over `[tick_lower, tick_upper)`.
///
/// The core does not store positions; hosts use this for their own
/// per-owner bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionRange {
    pub fn new(tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            tick_lower,
            tick_upper,
        }
    }

    /// Whether liquidity over this range is active at `tick`
    pub fn contains(&self, tick: i32) -> bool {
        self.tick_lower <= tick && tick < self.tick_upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_half_open() {
        let range = PositionRange::new(-10, 10);
        assert!(range.contains(-10));
        assert!(range.contains(9));
        assert!(!range.contains(10));
        assert!(!range.contains(-11));
    }
}

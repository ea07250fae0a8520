//! Per-owner position bookkeeping
//!
//! The core only sees aggregated boundary effects. The book remembers who
//! provided what so a close can be checked against the owner's holdings
//! before the pool is touched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use swap3_core::PositionRange;

use crate::{SimulationError, SimulationResult};

/// One owner's liquidity over one range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub owner: String,
    pub range: PositionRange,
    pub liquidity: u128,
}

#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: BTreeMap<(String, i32, i32), u128>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Liquidity `owner` holds over exactly `range`
    pub fn held(&self, owner: &str, range: PositionRange) -> u128 {
        self.positions
            .get(&key(owner, range))
            .copied()
            .unwrap_or(0)
    }

    /// Fail unless `owner` holds at least `liquidity` over `range`
    pub fn check_debit(
        &self,
        owner: &str,
        range: PositionRange,
        liquidity: u128,
    ) -> SimulationResult<()> {
        let held = self.held(owner, range);
        if held < liquidity {
            return Err(SimulationError::InsufficientPosition {
                owner: owner.to_string(),
                tick_lower: range.tick_lower,
                tick_upper: range.tick_upper,
                held,
                requested: liquidity,
            });
        }
        Ok(())
    }

    pub fn credit(&mut self, owner: &str, range: PositionRange, liquidity: u128) {
        let held = self.positions.entry(key(owner, range)).or_insert(0);
        *held = held.saturating_add(liquidity);
    }

    pub fn debit(
        &mut self,
        owner: &str,
        range: PositionRange,
        liquidity: u128,
    ) -> SimulationResult<()> {
        self.check_debit(owner, range, liquidity)?;
        let key = key(owner, range);
        let remaining = self.held(owner, range) - liquidity;
        if remaining == 0 {
            self.positions.remove(&key);
        } else {
            self.positions.insert(key, remaining);
        }
        Ok(())
    }

    /// Open positions ordered by owner then range
    pub fn entries(&self) -> Vec<PositionEntry> {
        self.positions
            .iter()
            .map(|((owner, lower, upper), liquidity)| PositionEntry {
                owner: owner.clone(),
                range: PositionRange::new(*lower, *upper),
                liquidity: *liquidity,
            })
            .collect()
    }

    /// Liquidity of every position active at `tick`
    pub fn active_liquidity(&self, tick: i32) -> u128 {
        self.positions
            .iter()
            .filter(|((_, lower, upper), _)| PositionRange::new(*lower, *upper).contains(tick))
            .map(|(_, liquidity)| *liquidity)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn key(owner: &str, range: PositionRange) -> (String, i32, i32) {
    (owner.to_string(), range.tick_lower, range.tick_upper)
}

//! Tick ledger for concentrated liquidity
//!
//! Sparse ordered map from tick index to boundary bookkeeping. Only ticks that
//! bound at least one open position are present; an entry is pruned as soon
//! as its gross liquidity returns to zero.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, Swap3Error};
use crate::math::safe_math::{safe_add_i128, safe_add_u128, safe_sub_i128};

/// Liquidity bookkeeping at one tick boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickBoundary {
    /// Added to active liquidity when the price crosses this tick upward
    pub liquidity_net: i128,
    /// Total liquidity of positions using this tick as a bound
    pub liquidity_gross: u128,
}

impl TickBoundary {
    pub fn is_initialized(&self) -> bool {
        self.liquidity_gross > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickLedger {
    boundaries: BTreeMap<i32, TickBoundary>,
}

impl TickLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of populated boundaries
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn get(&self, tick: i32) -> Option<TickBoundary> {
        self.boundaries.get(&tick).copied()
    }

    /// Boundaries in ascending tick order
    pub fn iter(&self) -> impl Iterator<Item = (i32, TickBoundary)> + '_ {
        self.boundaries.iter().map(|(tick, boundary)| (*tick, *boundary))
    }

    /// First boundary strictly above `tick` (next crossing when the price rises)
    pub fn next_boundary_above(&self, tick: i32) -> Option<(i32, TickBoundary)> {
        self.boundaries
            .range((Excluded(tick), Unbounded))
            .next()
            .map(|(tick, boundary)| (*tick, *boundary))
    }

    /// Last boundary at or below `tick` (next crossing when the price falls)
    pub fn next_boundary_at_or_below(&self, tick: i32) -> Option<(i32, TickBoundary)> {
        self.boundaries
            .range(..=tick)
            .next_back()
            .map(|(tick, boundary)| (*tick, *boundary))
    }

    /// Sum of `liquidity_net` over every boundary
    pub fn net_sum(&self) -> CoreResult<i128> {
        self.boundaries
            .values()
            .try_fold(0i128, |acc, b| safe_add_i128(acc, b.liquidity_net))
    }

    /// Liquidity the ledger implies is active at `tick`
    pub fn liquidity_at(&self, tick: i32) -> CoreResult<i128> {
        self.boundaries
            .range(..=tick)
            .try_fold(0i128, |acc, (_, b)| safe_add_i128(acc, b.liquidity_net))
    }

    /// Every position contributes `+L` and `-L`, so nets must cancel
    pub fn check_balanced(&self) -> CoreResult<()> {
        let sum = self.net_sum()?;
        if sum != 0 {
            return Err(Swap3Error::UnbalancedLedger(sum));
        }
        Ok(())
    }

    /// How many of `ticks` are not yet populated
    pub fn count_new_boundaries(&self, ticks: &[i32]) -> usize {
        ticks
            .iter()
            .filter(|tick| !self.boundaries.contains_key(tick))
            .count()
    }

    /// Compute the boundary at `tick` after a position change without storing it.
    ///
    /// `delta` is positive when liquidity is added and negative when it is
    /// removed; `upper` selects which side of the position this tick bounds.
    pub(crate) fn preview_update(
        &self,
        tick: i32,
        delta: i128,
        upper: bool,
    ) -> CoreResult<TickBoundary> {
        let current = self.get(tick).unwrap_or_default();

        // gross
        let liquidity_gross = if delta >= 0 {
            safe_add_u128(current.liquidity_gross, delta.unsigned_abs())?
        } else {
            current
                .liquidity_gross
                .checked_sub(delta.unsigned_abs())
                .ok_or(Swap3Error::InsufficientPositionLiquidity {
                    tick,
                    available: current.liquidity_gross,
                    requested: delta.unsigned_abs(),
                })?
        };

        // net
        let liquidity_net = if upper {
            safe_sub_i128(current.liquidity_net, delta)?
        } else {
            safe_add_i128(current.liquidity_net, delta)?
        };

        if liquidity_gross == 0 && liquidity_net != 0 {
            return Err(Swap3Error::UnbalancedLedger(liquidity_net));
        }

        Ok(TickBoundary {
            liquidity_net,
            liquidity_gross,
        })
    }

    /// Store a previewed boundary, pruning it once nothing references it
    pub(crate) fn store(&mut self, tick: i32, boundary: TickBoundary) {
        if boundary.is_initialized() {
            self.boundaries.insert(tick, boundary);
        } else {
            self.boundaries.remove(&tick);
        }
    }
}

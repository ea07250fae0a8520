//! Liquidity pool state
//!
//! The pool stores only active liquidity, the current tick and the tick
//! ledger. YES/NO reserves and probability are derived from `(liquidity, tick)`
//! on every query, so there is no stored reserve that could drift from them.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, Swap3Error};
use crate::math::tick_math::{is_tick_valid, prob_of, sqrt_price_at_tick, tick_of};
use crate::state::tick::TickLedger;

/// Implied outcome-share reserves at the current price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedReserves {
    pub yes: f64,
    pub no: f64,
}

impl ImpliedReserves {
    /// `no / (yes + no)`
    pub fn probability(&self) -> f64 {
        self.no / (self.yes + self.no)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    liquidity: u128,
    tick: i32,
    ledger: TickLedger,
}

impl Pool {
    /// Create an empty pool priced at `tick`
    pub fn new(tick: i32) -> CoreResult<Self> {
        if !is_tick_valid(tick) {
            return Err(Swap3Error::TickOutOfRange(tick));
        }
        Ok(Self {
            liquidity: 0,
            tick,
            ledger: TickLedger::new(),
        })
    }

    /// Create an empty pool priced at the tick nearest `prob`
    pub fn from_probability(prob: f64) -> CoreResult<Self> {
        Self::new(tick_of(prob)?)
    }

    /// Active liquidity at the current tick
    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    /// Current price pointer
    pub fn tick(&self) -> i32 {
        self.tick
    }

    pub fn ledger(&self) -> &TickLedger {
        &self.ledger
    }

    pub fn is_empty(&self) -> bool {
        self.liquidity == 0
    }

    /// `sqrt(1.0001^tick)` at the current tick
    pub fn sqrt_price(&self) -> f64 {
        sqrt_price_at_tick(self.tick)
    }

    /// Both implied reserves; fails on an empty pool where price is undefined
    pub fn implied_reserves(&self) -> CoreResult<ImpliedReserves> {
        if self.is_empty() {
            return Err(Swap3Error::EmptyPool);
        }
        let liquidity = self.liquidity as f64;
        let sqrt_price = self.sqrt_price();
        Ok(ImpliedReserves {
            yes: liquidity / sqrt_price,
            no: liquidity * sqrt_price,
        })
    }

    pub fn yes_shares(&self) -> CoreResult<f64> {
        Ok(self.implied_reserves()?.yes)
    }

    pub fn no_shares(&self) -> CoreResult<f64> {
        Ok(self.implied_reserves()?.no)
    }

    /// Implied probability of YES.
    ///
    /// Equal to `no / (yes + no)` of the implied reserves; computed from the
    /// tick directly to avoid the extra rounding.
    pub fn probability(&self) -> CoreResult<f64> {
        if self.is_empty() {
            return Err(Swap3Error::EmptyPool);
        }
        Ok(prob_of(self.tick))
    }

    /// Verify the tick, every ledger entry, ledger balance and that active
    /// liquidity matches the ledger.
    ///
    /// Hosts should run this after deserializing a pool.
    pub fn check_invariants(&self) -> CoreResult<()> {
        if !is_tick_valid(self.tick) {
            return Err(Swap3Error::CorruptTick(self.tick));
        }

        for (tick, boundary) in self.ledger.iter() {
            let well_formed = is_tick_valid(tick)
                && boundary.is_initialized()
                && boundary.liquidity_net.unsigned_abs() <= boundary.liquidity_gross;
            if !well_formed {
                return Err(Swap3Error::CorruptBoundary {
                    tick,
                    net: boundary.liquidity_net,
                    gross: boundary.liquidity_gross,
                });
            }
        }

        self.ledger.check_balanced()?;

        let expected = self.ledger.liquidity_at(self.tick)?;
        if expected < 0 || expected as u128 != self.liquidity {
            return Err(Swap3Error::LiquidityMismatch {
                tick: self.tick,
                stored: self.liquidity,
                expected,
            });
        }
        Ok(())
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut TickLedger {
        &mut self.ledger
    }

    pub(crate) fn set_liquidity(&mut self, liquidity: u128) {
        self.liquidity = liquidity;
    }

    /// Commit the end state of a swap
    pub(crate) fn set_price_state(&mut self, tick: i32, liquidity: u128) {
        self.tick = tick;
        self.liquidity = liquidity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_TICK;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_pool_has_no_price() {
        let pool = Pool::from_probability(0.3).unwrap();
        assert!(pool.is_empty());
        assert_eq!(pool.yes_shares(), Err(Swap3Error::EmptyPool));
        assert_eq!(pool.no_shares(), Err(Swap3Error::EmptyPool));
        assert_eq!(pool.probability(), Err(Swap3Error::EmptyPool));
        assert!(pool.check_invariants().is_ok());
    }

    #[test]
    fn test_pool_rejects_unsupported_tick() {
        assert_eq!(
            Pool::new(MAX_TICK + 1),
            Err(Swap3Error::TickOutOfRange(MAX_TICK + 1))
        );
        assert!(Pool::from_probability(1.0).is_err());
    }

    #[test]
    fn test_implied_reserves_follow_constant_product() {
        let mut pool = Pool::from_probability(0.3).unwrap();
        pool.set_liquidity(100);

        let reserves = pool.implied_reserves().unwrap();
        assert!(reserves.yes > 0.0 && reserves.no > 0.0);
        assert_relative_eq!(reserves.yes * reserves.no, 10_000.0, max_relative = 1e-12);
        assert_relative_eq!(
            reserves.probability(),
            pool.probability().unwrap(),
            max_relative = 1e-12
        );
        assert_relative_eq!(pool.probability().unwrap(), 0.3, epsilon = 1e-4);
    }

    #[test]
    fn test_deserialized_pool_with_bad_tick_rejected() {
        let pool: Pool = serde_json::from_str(
            r#"{ "liquidity": 0, "tick": -2147483648, "ledger": {} }"#,
        )
        .unwrap();
        assert_eq!(
            pool.check_invariants(),
            Err(Swap3Error::CorruptTick(i32::MIN))
        );
    }

    #[test]
    fn test_deserialized_corrupt_boundaries_rejected() {
        // Net larger than gross
        let pool: Pool = serde_json::from_str(
            r#"{
                "liquidity": 0,
                "tick": 0,
                "ledger": {
                    "-10": { "liquidity_net": 50, "liquidity_gross": 10 },
                    "10": { "liquidity_net": -50, "liquidity_gross": 10 }
                }
            }"#,
        )
        .unwrap();
        let err = pool.check_invariants().unwrap_err();
        assert_eq!(
            err,
            Swap3Error::CorruptBoundary { tick: -10, net: 50, gross: 10 }
        );
        assert!(err.is_fatal());

        // Empty entry that should have been pruned
        let pool: Pool = serde_json::from_str(
            r#"{
                "liquidity": 0,
                "tick": 0,
                "ledger": { "5": { "liquidity_net": 0, "liquidity_gross": 0 } }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            pool.check_invariants(),
            Err(Swap3Error::CorruptBoundary { tick: 5, .. })
        ));
    }

    #[test]
    fn test_liquidity_mismatch_detected() {
        let mut pool = Pool::new(0).unwrap();
        pool.set_liquidity(10);
        assert_eq!(
            pool.check_invariants(),
            Err(Swap3Error::LiquidityMismatch {
                tick: 0,
                stored: 10,
                expected: 0
            })
        );
    }
}

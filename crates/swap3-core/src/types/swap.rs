//! # Swap Types
//!
//! Requests and results exchanged with the swap engine.

use serde::{Deserialize, Serialize};

/// Outcome being bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buying YES raises the probability (tick moves up)
    Yes,
    /// Buying NO lowers the probability (tick moves down)
    No,
}

/// A trade of `amount_in` currency for shares of `side`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub side: Side,
    pub amount_in: f64,
    /// Stop once the probability reaches this level (a limit order)
    #[serde(default)]
    pub limit_probability: Option<f64>,
}

impl SwapRequest {
    pub fn new(side: Side, amount_in: f64) -> Self {
        Self {
            side,
            amount_in,
            limit_probability: None,
        }
    }

    pub fn with_limit(mut self, limit_probability: f64) -> Self {
        self.limit_probability = Some(limit_probability);
        self
    }
}

/// Why a swap stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapOutcome {
    /// The amount was consumed down to less than one tick's cost
    Filled,
    /// Active liquidity ran out before the amount was consumed
    InsufficientLiquidity,
    /// The requested price limit was reached
    PriceLimit,
    /// The configured boundary-crossing bound was reached
    CrossingLimit,
}

/// Final swap execution result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    pub side: Side,
    /// Shares of `side` delivered to the trader
    pub shares_out: f64,
    pub amount_in_used: f64,
    /// Unspent input returned to the trader
    pub amount_remaining: f64,
    pub start_tick: i32,
    pub end_tick: i32,
    pub end_liquidity: u128,
    pub ticks_crossed: u32,
    /// False for any partial fill; callers must decide whether to accept it
    pub filled: bool,
    pub outcome: SwapOutcome,
}

impl SwapResult {
    /// Average currency paid per share
    pub fn average_price(&self) -> Option<f64> {
        (self.shares_out > 0.0).then(|| self.amount_in_used / self.shares_out)
    }
}

//! # Swap3 Core - Prediction Market Pricing
//!
//! Tick-indexed concentrated-liquidity market maker for a binary YES/NO
//! market. It provides:
//!
//! - The tick codec mapping probabilities to integer ticks and back
//! - The tick ledger of liquidity boundaries
//! - Pool state with implied reserves and probability
//! - Liquidity provisioning and the swap engine
//!
//! The crate is pure and single-threaded. Hosts own the [`Pool`] value and
//! serialize concurrent access to it.

pub mod config;
pub mod constants;
pub mod errors;
pub mod logic;
pub mod math;
pub mod state;
pub mod types;

pub use config::EngineConfig;
pub use constants::*;
pub use errors::{CoreResult, ErrorClass, Swap3Error};
pub use logic::liquidity::{
    close_position, liquidity_for_amounts, open_position, quote_liquidity, quote_withdrawal,
};
pub use logic::swap::{execute_swap, quote_swap, swap};
pub use math::tick_math::{prob_of, tick_of};
pub use state::{ImpliedReserves, Pool, TickBoundary, TickLedger};
pub use types::{LiquidityQuote, PositionRange, Side, SwapOutcome, SwapRequest, SwapResult};

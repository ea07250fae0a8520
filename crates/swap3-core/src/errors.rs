//! # Core Error Types
//!
//! Every fallible operation in the engine returns [`CoreResult`]. Errors fall
//! into two classes:
//!
//! - **Domain** errors reject an invalid request. The pool is left untouched
//!   and the caller may fix its input and try again.
//! - **Invariant violations** mean the pool state itself is inconsistent. The
//!   host must abort its enclosing transaction and must not persist the pool.
//!
//! Partial fills are not errors; see [`crate::types::SwapOutcome`].

use thiserror::Error;

/// Error class used by hosts to decide between rejecting and aborting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Domain,
    InvariantViolation,
}

/// Errors raised by the pricing core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Swap3Error {
    // ========================================================================
    // Domain Errors
    // ========================================================================
    #[error("Probability {0} is outside the open interval (0, 1)")]
    InvalidProbability(f64),

    #[error("Invalid tick range: lower {lower} must be below upper {upper}")]
    InvalidTickRange { lower: i32, upper: i32 },

    #[error("Tick {0} is outside the supported range")]
    TickOutOfRange(i32),

    #[error("Tick {tick} is not a multiple of tick spacing {spacing}")]
    UnalignedTick { tick: i32, spacing: u16 },

    #[error("Liquidity delta must be positive")]
    ZeroLiquidityDelta,

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Invalid sqrt price: {0}")]
    InvalidPrice(f64),

    #[error("Price limit {limit} cannot be reached from tick {tick}")]
    InvalidPriceLimit { limit: f64, tick: i32 },

    #[error("Pool has no active liquidity; price is undefined")]
    EmptyPool,

    #[error("Boundary at tick {tick} holds {available} liquidity, cannot remove {requested}")]
    InsufficientPositionLiquidity {
        tick: i32,
        available: u128,
        requested: u128,
    },

    #[error("Tick ledger would hold {0} boundaries (max {1})")]
    TooManyBoundaries(usize, usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Math overflow")]
    MathOverflow,

    // ========================================================================
    // Invariant Violations
    // ========================================================================
    #[error("Active liquidity would go negative crossing tick {tick}")]
    NegativeLiquidity { tick: i32 },

    #[error("Tick ledger is unbalanced: liquidity net sums to {0}")]
    UnbalancedLedger(i128),

    #[error("Active liquidity {stored} disagrees with ledger liquidity {expected} at tick {tick}")]
    LiquidityMismatch {
        tick: i32,
        stored: u128,
        expected: i128,
    },

    #[error("No boundary bounds active liquidity {liquidity} beyond tick {tick}")]
    MissingBoundary { tick: i32, liquidity: u128 },

    #[error("Pool tick {0} is outside the supported range")]
    CorruptTick(i32),

    #[error("Boundary at tick {tick} is corrupt: net {net}, gross {gross}")]
    CorruptBoundary { tick: i32, net: i128, gross: u128 },
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, Swap3Error>;

impl Swap3Error {
    /// Which side of the taxonomy this error belongs to
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NegativeLiquidity { .. }
            | Self::UnbalancedLedger(_)
            | Self::LiquidityMismatch { .. }
            | Self::MissingBoundary { .. }
            | Self::CorruptTick(_)
            | Self::CorruptBoundary { .. } => ErrorClass::InvariantViolation,
            _ => ErrorClass::Domain,
        }
    }

    /// True when the affected pool must be discarded
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::InvariantViolation
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

//! # Engine Logic
//!
//! Operations that move a [`Pool`](crate::state::Pool) from one valid state to
//! the next.

pub mod liquidity;
pub mod swap;

pub use liquidity::*;
pub use swap::*;

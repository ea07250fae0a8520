//! # Type Definitions
//!
//! Request and result types shared by the engine and its hosts.

pub mod liquidity;
pub mod swap;

pub use liquidity::*;
pub use swap::*;

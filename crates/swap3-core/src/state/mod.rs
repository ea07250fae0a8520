//! # Pool State
//!
//! Plain data owned by the host: the pool and its tick ledger.

pub mod pool;
pub mod tick;

pub use pool::*;
pub use tick::*;

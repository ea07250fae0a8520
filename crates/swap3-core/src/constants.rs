//! # Engine Constants
//!
//! Fundamental constants for the Swap3 pricing core:
//! - Tick scale (base, bounds)
//! - Configuration defaults

// ============================================================================
// Tick Scale
// ============================================================================

/// Price ratio between adjacent ticks: `P(t) = TICK_BASE^t`
pub const TICK_BASE: f64 = 1.0001;

/// Natural log of [`TICK_BASE`]; one tick is this much movement in log-odds
pub const LN_TICK_BASE: f64 = 9.999_500_033_330_834e-5;

/// Minimum supported tick (probability ~2.1e-9)
pub const MIN_TICK: i32 = -200_000;

/// Maximum supported tick (probability ~1 - 2.1e-9)
pub const MAX_TICK: i32 = 200_000;

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Default tick spacing (every tick is a valid position bound)
pub const DEFAULT_TICK_SPACING: u16 = 1;

/// Maximum tick spacing
pub const MAX_TICK_SPACING: u16 = 10_000;

/// Default cap on boundary crossings per swap (0 = unlimited)
pub const DEFAULT_MAX_TICKS_CROSSED: u32 = 0;

/// Default cap on populated ledger boundaries (0 = unlimited)
pub const DEFAULT_MAX_BOUNDARIES: usize = 0;

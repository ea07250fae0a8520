//! # Engine Configuration
//!
//! Limits a host applies to a pool. The engine itself never reads files or
//! environment; hosts deserialize this from wherever their config lives.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_BOUNDARIES, DEFAULT_MAX_TICKS_CROSSED, DEFAULT_TICK_SPACING, MAX_TICK_SPACING,
};
use crate::errors::{CoreResult, Swap3Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Position bounds must be multiples of this
    pub tick_spacing: u16,

    /// Maximum boundary crossings per swap (0 = unlimited)
    pub max_ticks_crossed: u32,

    /// Maximum populated boundaries in the tick ledger (0 = unlimited)
    pub max_boundaries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_spacing: DEFAULT_TICK_SPACING,
            max_ticks_crossed: DEFAULT_MAX_TICKS_CROSSED,
            max_boundaries: DEFAULT_MAX_BOUNDARIES,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_spacing == 0 {
            return Err(Swap3Error::invalid_config("tick_spacing must be greater than 0"));
        }

        if self.tick_spacing > MAX_TICK_SPACING {
            return Err(Swap3Error::invalid_config(format!(
                "tick_spacing {} exceeds maximum {}",
                self.tick_spacing, MAX_TICK_SPACING
            )));
        }

        // Every position needs two boundaries
        if self.max_boundaries == 1 {
            return Err(Swap3Error::invalid_config(
                "max_boundaries must be 0 (unlimited) or at least 2",
            ));
        }

        Ok(())
    }

    pub fn crossing_limit(&self) -> Option<u32> {
        (self.max_ticks_crossed > 0).then_some(self.max_ticks_crossed)
    }

    pub fn boundary_limit(&self) -> Option<usize> {
        (self.max_boundaries > 0).then_some(self.max_boundaries)
    }
}

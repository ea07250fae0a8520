//! Scenario simulation for the Swap3 pricing core
//!
//! Provides:
//! - TOML scenario files describing provisioning and trading steps
//! - Per-owner position bookkeeping on top of the core pool
//! - A transactional step runner and a serializable report
//!
//! The runner is the host the core expects: it owns the pool, clones it for
//! every step and commits only what succeeded.

use std::path::PathBuf;

use swap3_core::Swap3Error;

pub mod config;
pub mod position_book;
pub mod scenario_runner;

pub use config::{ScenarioConfig, Step};
pub use position_book::{PositionBook, PositionEntry};
pub use scenario_runner::{ScenarioReport, ScenarioRunner, StepReport, StepStatus};

/// Simulation error type
#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    #[error("Failed to read scenario file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(
        "{owner} holds {held} over [{tick_lower}, {tick_upper}), cannot close {requested}"
    )]
    InsufficientPosition {
        owner: String,
        tick_lower: i32,
        tick_upper: i32,
        held: u128,
        requested: u128,
    },

    #[error("Partial fill ({0}) rejected")]
    PartialFill(String),

    #[error(transparent)]
    Core(#[from] Swap3Error),

    #[error("Scenario aborted at step {step}: {source}")]
    Aborted {
        step: usize,
        #[source]
        source: Swap3Error,
    },
}

impl SimulationError {
    /// Whether the error must stop the whole scenario rather than one step
    pub fn is_fatal(&self) -> bool {
        match self {
            SimulationError::Core(err) => err.is_fatal(),
            SimulationError::Aborted { .. } => true,
            _ => false,
        }
    }
}

pub type SimulationResult<T> = std::result::Result<T, SimulationError>;

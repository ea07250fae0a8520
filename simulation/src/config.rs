//! Scenario configuration loaded from TOML
//!
//! ```toml
//! name = "two providers"
//! initial_probability = 0.3
//!
//! [engine]
//! tick_spacing = 10
//!
//! [[steps]]
//! action = "open"
//! owner = "alice"
//! lower_probability = 0.1
//! upper_probability = 0.5
//! liquidity = 100000
//!
//! [[steps]]
//! action = "swap"
//! trader = "bob"
//! side = "yes"
//! amount = 250.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use swap3_core::{tick_of, EngineConfig, PositionRange, Side};

use crate::{SimulationError, SimulationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name for logging and the report
    #[serde(default)]
    pub name: String,

    /// Pool limits
    #[serde(default)]
    pub engine: EngineConfig,

    /// Probability the pool starts at
    pub initial_probability: f64,

    /// Steps applied in order
    pub steps: Vec<Step>,
}

/// One scenario action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Open {
        owner: String,
        lower_probability: f64,
        upper_probability: f64,
        liquidity: u128,
    },
    Close {
        owner: String,
        lower_probability: f64,
        upper_probability: f64,
        liquidity: u128,
    },
    Swap {
        trader: String,
        side: Side,
        amount: f64,
        #[serde(default)]
        limit_probability: Option<f64>,
        /// Accept a fill that stops before the whole amount is spent
        #[serde(default)]
        allow_partial: bool,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Open { .. } => "open",
            Step::Close { .. } => "close",
            Step::Swap { .. } => "swap",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Step::Open {
                owner,
                lower_probability,
                upper_probability,
                liquidity,
            }
            | Step::Close {
                owner,
                lower_probability,
                upper_probability,
                liquidity,
            } => {
                if owner.is_empty() {
                    return Err("owner must not be empty".to_string());
                }
                check_probability("lower_probability", *lower_probability)?;
                check_probability("upper_probability", *upper_probability)?;
                if lower_probability >= upper_probability {
                    return Err(format!(
                        "lower_probability {} must be below upper_probability {}",
                        lower_probability, upper_probability
                    ));
                }
                if *liquidity == 0 {
                    return Err("liquidity must be greater than 0".to_string());
                }
                Ok(())
            }
            Step::Swap {
                trader,
                amount,
                limit_probability,
                ..
            } => {
                if trader.is_empty() {
                    return Err("trader must not be empty".to_string());
                }
                if !amount.is_finite() || *amount < 0.0 {
                    return Err(format!("amount {} must be a finite non-negative number", amount));
                }
                if let Some(limit) = limit_probability {
                    check_probability("limit_probability", *limit)?;
                }
                Ok(())
            }
        }
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), String> {
    if !(value > 0.0 && value < 1.0) {
        return Err(format!("{} {} must be strictly between 0 and 1", field, value));
    }
    Ok(())
}

impl ScenarioConfig {
    /// Load and validate a scenario from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SimulationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ScenarioConfig =
            toml::from_str(&content).map_err(|source| SimulationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> SimulationResult<()> {
        if self.steps.is_empty() {
            return Err(SimulationError::InvalidScenario(
                "scenario has no steps".to_string(),
            ));
        }

        self.engine.validate()?;

        check_probability("initial_probability", self.initial_probability)
            .map_err(SimulationError::InvalidScenario)?;

        for (index, step) in self.steps.iter().enumerate() {
            step.validate().map_err(|reason| {
                SimulationError::InvalidScenario(format!(
                    "step {} ({}): {}",
                    index,
                    step.action(),
                    reason
                ))
            })?;
        }

        Ok(())
    }
}

/// Tick range covering `[lower, upper]` probabilities, widened to the spacing
pub fn resolve_range(
    lower_probability: f64,
    upper_probability: f64,
    tick_spacing: u16,
) -> SimulationResult<PositionRange> {
    let spacing = i32::from(tick_spacing.max(1));
    let lower = tick_of(lower_probability)?.div_euclid(spacing) * spacing;

    let upper = tick_of(upper_probability)?;
    let upper = if upper.rem_euclid(spacing) == 0 {
        upper
    } else {
        (upper.div_euclid(spacing) + 1) * spacing
    };

    Ok(PositionRange::new(lower, upper))
}

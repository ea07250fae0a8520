use serde::Serialize;
use swap3_core::{
    close_position, execute_swap, open_position, EngineConfig, LiquidityQuote, Pool, Swap3Error,
    SwapRequest, SwapResult,
};
use tracing::{debug, error, info, warn};

use crate::config::{resolve_range, ScenarioConfig, Step};
use crate::position_book::{PositionBook, PositionEntry};
use crate::{SimulationError, SimulationResult};

/// Whether a step was committed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Applied,
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    #[serde(flatten)]
    pub status: StepStatus,
    /// Shares paid to open or refunded on close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity_quote: Option<LiquidityQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<SwapResult>,
    pub tick_after: i32,
    pub liquidity_after: u128,
    /// None while the pool has no active liquidity
    pub probability_after: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub applied: usize,
    pub rejected: usize,
    pub steps: Vec<StepReport>,
    pub final_tick: i32,
    pub final_liquidity: u128,
    pub final_probability: Option<f64>,
    pub positions: Vec<PositionEntry>,
    pub pool: Pool,
}

enum StepEffect {
    Liquidity(LiquidityQuote),
    Swap(SwapResult),
}

/// Applies scenario steps to a pool one transaction at a time
pub struct ScenarioRunner {
    engine: EngineConfig,
    pool: Pool,
    book: PositionBook,
}

impl ScenarioRunner {
    /// Create a runner with an empty pool at the scenario's starting price
    pub fn new(scenario: &ScenarioConfig) -> SimulationResult<Self> {
        scenario.validate()?;
        Ok(Self {
            engine: scenario.engine,
            pool: Pool::from_probability(scenario.initial_probability)?,
            book: PositionBook::new(),
        })
    }

    /// Load, run and report in one go
    pub fn run_scenario(scenario: &ScenarioConfig) -> SimulationResult<ScenarioReport> {
        let mut runner = Self::new(scenario)?;
        info!(
            name = %scenario.name,
            steps = scenario.steps.len(),
            start_tick = runner.pool.tick(),
            "Running scenario"
        );
        let steps = runner.run(&scenario.steps)?;
        Ok(runner.finish(&scenario.name, steps))
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn book(&self) -> &PositionBook {
        &self.book
    }

    /// Apply every step, stopping only on an invariant violation
    pub fn run(&mut self, steps: &[Step]) -> SimulationResult<Vec<StepReport>> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.apply(index, step))
            .collect()
    }

    /// Apply one step as a transaction.
    ///
    /// The step runs against copies of the pool and the position book which
    /// replace the originals only on success. A rejected step is reported, an
    /// invariant violation aborts with an error.
    pub fn apply(&mut self, index: usize, step: &Step) -> SimulationResult<StepReport> {
        let mut pool = self.pool.clone();
        let mut book = self.book.clone();

        match self.execute(&mut pool, &mut book, step) {
            Ok(effect) => {
                pool.check_invariants()
                    .map_err(|source| SimulationError::Aborted { step: index, source })?;

                // Owner bookkeeping must account for exactly the active liquidity
                let booked = book.active_liquidity(pool.tick());
                if booked != pool.liquidity() {
                    return Err(SimulationError::Aborted {
                        step: index,
                        source: Swap3Error::LiquidityMismatch {
                            tick: pool.tick(),
                            stored: pool.liquidity(),
                            expected: i128::try_from(booked).unwrap_or(i128::MAX),
                        },
                    });
                }
                self.pool = pool;
                self.book = book;

                debug!(
                    index,
                    action = step.action(),
                    tick = self.pool.tick(),
                    liquidity = self.pool.liquidity(),
                    "Step applied"
                );

                let (liquidity_quote, swap) = match effect {
                    StepEffect::Liquidity(quote) => (Some(quote), None),
                    StepEffect::Swap(result) => (None, Some(result)),
                };
                Ok(self.report(index, step, StepStatus::Applied, liquidity_quote, swap))
            }
            Err(err) if err.is_fatal() => {
                error!(index, action = step.action(), error = %err, "Invariant violation");
                Err(match err {
                    SimulationError::Core(source) => {
                        SimulationError::Aborted { step: index, source }
                    }
                    other => other,
                })
            }
            Err(err) => {
                warn!(index, action = step.action(), error = %err, "Step rejected");
                let status = StepStatus::Rejected {
                    reason: err.to_string(),
                };
                Ok(self.report(index, step, status, None, None))
            }
        }
    }

    fn execute(
        &self,
        pool: &mut Pool,
        book: &mut PositionBook,
        step: &Step,
    ) -> SimulationResult<StepEffect> {
        match step {
            Step::Open {
                owner,
                lower_probability,
                upper_probability,
                liquidity,
            } => {
                let range = resolve_range(
                    *lower_probability,
                    *upper_probability,
                    self.engine.tick_spacing,
                )?;
                let quote = open_position(
                    pool,
                    range.tick_lower,
                    range.tick_upper,
                    *liquidity,
                    &self.engine,
                )?;
                book.credit(owner, range, *liquidity);
                Ok(StepEffect::Liquidity(quote))
            }
            Step::Close {
                owner,
                lower_probability,
                upper_probability,
                liquidity,
            } => {
                let range = resolve_range(
                    *lower_probability,
                    *upper_probability,
                    self.engine.tick_spacing,
                )?;
                book.debit(owner, range, *liquidity)?;
                let refund = close_position(
                    pool,
                    range.tick_lower,
                    range.tick_upper,
                    *liquidity,
                    &self.engine,
                )?;
                Ok(StepEffect::Liquidity(refund))
            }
            Step::Swap {
                trader,
                side,
                amount,
                limit_probability,
                allow_partial,
            } => {
                let request = SwapRequest {
                    side: *side,
                    amount_in: *amount,
                    limit_probability: *limit_probability,
                };
                let result = execute_swap(pool, &request, &self.engine)?;
                if !result.filled && !allow_partial {
                    return Err(SimulationError::PartialFill(format!(
                        "{:?}: {} of {} spent by {}",
                        result.outcome, result.amount_in_used, amount, trader
                    )));
                }
                Ok(StepEffect::Swap(result))
            }
        }
    }

    fn report(
        &self,
        index: usize,
        step: &Step,
        status: StepStatus,
        liquidity_quote: Option<LiquidityQuote>,
        swap: Option<SwapResult>,
    ) -> StepReport {
        StepReport {
            index,
            action: step.action(),
            status,
            liquidity_quote,
            swap,
            tick_after: self.pool.tick(),
            liquidity_after: self.pool.liquidity(),
            probability_after: self.pool.probability().ok(),
        }
    }

    /// Summarize the run
    pub fn finish(self, name: &str, steps: Vec<StepReport>) -> ScenarioReport {
        let applied = steps
            .iter()
            .filter(|step| step.status == StepStatus::Applied)
            .count();

        ScenarioReport {
            name: name.to_string(),
            applied,
            rejected: steps.len() - applied,
            steps,
            final_tick: self.pool.tick(),
            final_liquidity: self.pool.liquidity(),
            final_probability: self.pool.probability().ok(),
            positions: self.book.entries(),
            pool: self.pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swap3_core::{Side, SwapOutcome};

    fn open(owner: &str, lower: f64, upper: f64, liquidity: u128) -> Step {
        Step::Open {
            owner: owner.to_string(),
            lower_probability: lower,
            upper_probability: upper,
            liquidity,
        }
    }

    fn close(owner: &str, lower: f64, upper: f64, liquidity: u128) -> Step {
        Step::Close {
            owner: owner.to_string(),
            lower_probability: lower,
            upper_probability: upper,
            liquidity,
        }
    }

    fn buy(side: Side, amount: f64, allow_partial: bool) -> Step {
        Step::Swap {
            trader: "trader".to_string(),
            side,
            amount,
            limit_probability: None,
            allow_partial,
        }
    }

    fn scenario(steps: Vec<Step>) -> ScenarioConfig {
        ScenarioConfig {
            name: "test".to_string(),
            engine: EngineConfig::default(),
            initial_probability: 0.3,
            steps,
        }
    }

    #[test]
    fn test_basic_scenario() {
        let report = ScenarioRunner::run_scenario(&scenario(vec![
            open("alice", 0.1, 0.5, 100_000),
            buy(Side::Yes, 50.0, false),
            buy(Side::No, 20.0, false),
        ]))
        .unwrap();

        assert_eq!(report.applied, 3);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.final_liquidity, 100_000);
        assert!(report.final_probability.is_some());
        assert_eq!(report.positions.len(), 1);
        assert!(report.steps[0].liquidity_quote.is_some());
        assert!(report.steps[1].swap.is_some_and(|swap| swap.filled));
    }

    #[test]
    fn test_partial_fill_rejected_unless_allowed() {
        let config = scenario(vec![open("alice", 0.25, 0.35, 1_000)]);
        let mut runner = ScenarioRunner::new(&config).unwrap();
        runner.run(&config.steps).unwrap();
        let before = runner.pool().clone();

        let report = runner.apply(1, &buy(Side::Yes, 1e9, false)).unwrap();
        assert!(matches!(report.status, StepStatus::Rejected { .. }));
        assert_eq!(runner.pool(), &before);

        let report = runner.apply(2, &buy(Side::Yes, 1e9, true)).unwrap();
        assert_eq!(report.status, StepStatus::Applied);
        let swap = report.swap.unwrap();
        assert_eq!(swap.outcome, SwapOutcome::InsufficientLiquidity);
        assert!(runner.pool().is_empty());
        assert_eq!(report.probability_after, None);
    }

    #[test]
    fn test_close_requires_ownership() {
        let report = ScenarioRunner::run_scenario(&scenario(vec![
            open("alice", 0.1, 0.5, 1_000),
            close("bob", 0.1, 0.5, 1_000),
            close("alice", 0.1, 0.5, 400),
        ]))
        .unwrap();

        assert_eq!(report.applied, 2);
        assert_eq!(report.rejected, 1);
        assert!(matches!(
            &report.steps[1].status,
            StepStatus::Rejected { reason } if reason.contains("bob")
        ));
        assert_eq!(report.final_liquidity, 600);
        assert_eq!(report.positions[0].liquidity, 600);
    }

    #[test]
    fn test_domain_error_rejects_step_only() {
        let config = ScenarioConfig {
            engine: EngineConfig {
                max_boundaries: 2,
                ..Default::default()
            },
            ..scenario(vec![
                open("alice", 0.1, 0.5, 1_000),
                open("bob", 0.2, 0.4, 1_000),
                buy(Side::No, 1.0, false),
            ])
        };
        let report = ScenarioRunner::run_scenario(&config).unwrap();

        assert_eq!(report.applied, 2);
        assert!(report.steps[1].liquidity_quote.is_none());
        assert!(matches!(report.steps[1].status, StepStatus::Rejected { .. }));
    }

    #[test]
    fn test_report_serializes() {
        let report = ScenarioRunner::run_scenario(&scenario(vec![open("alice", 0.1, 0.5, 10)]))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["status"], "applied");
        assert_eq!(json["steps"][0]["action"], "open");
        assert!(json["steps"][0].get("swap").is_none());
    }
}

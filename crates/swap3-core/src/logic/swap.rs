//! Swap engine
//!
//! Buying YES with `m` currency mints `m` YES and `m` NO, puts the NO into the
//! pool and takes YES out, so the trader receives `m + ΔY`. Buying NO is the
//! mirror image. The price walks the tick ledger one segment at a time:
//!
//! - within a segment the constant-product formulas price the trade
//! - at a boundary the active liquidity changes by the boundary's net
//! - a trade ending mid-segment snaps to a whole tick in the pool's favour
//!   and the input left over below that tick is returned as dust
//!
//! Execution runs against a scratch [`SwapState`]; the pool is written only
//! once the walk has finished without error.

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::constants::MIN_TICK;
use crate::errors::{CoreResult, Swap3Error};
use crate::math::liquidity_math::{
    next_sqrt_price_from_no_input, next_sqrt_price_from_yes_input, no_amount_delta,
    yes_amount_delta,
};
use crate::math::safe_math::apply_liquidity_delta;
use crate::math::tick_math::{
    sqrt_price_at_tick, tick_at_sqrt_price_ceil, tick_at_sqrt_price_floor, tick_of,
};
use crate::state::{Pool, TickLedger};
use crate::types::{Side, SwapOutcome, SwapRequest, SwapResult};

/// Relative slack when an amount lands exactly on a tick
const SETTLE_TOLERANCE: f64 = 1e-12;

/// Running state of a swap walk
#[derive(Debug, Clone)]
struct SwapState {
    amount_remaining: f64,
    /// Shares of the bought side released by the pool so far
    pool_shares_out: f64,
    sqrt_price: f64,
    tick: i32,
    liquidity: u128,
    ticks_crossed: u32,
}

/// Where a single step is headed
#[derive(Debug, Clone, Copy)]
struct StepTarget {
    tick: i32,
    /// Boundary crossed on arrival, if any
    cross: Option<(i32, i128)>,
    /// Why the walk stops on arrival when nothing is crossed
    stop: SwapOutcome,
}

/// Result of a single step
#[derive(Debug, Clone, Copy, PartialEq)]
enum StepOutcome {
    Continue,
    Stop(SwapOutcome),
}

/// Buy `amount` worth of `side` with the default engine configuration
pub fn swap(pool: &mut Pool, side: Side, amount: f64) -> CoreResult<SwapResult> {
    execute_swap(pool, &SwapRequest::new(side, amount), &EngineConfig::default())
}

/// Execute a swap and commit the end state to the pool.
///
/// Partial fills are committed as well; `filled` on the result tells the
/// caller whether the walk ran to completion. A filled swap may still report
/// a small `amount_remaining` worth less than one tick, which the host
/// refunds. On error the pool is left untouched.
pub fn execute_swap(
    pool: &mut Pool,
    request: &SwapRequest,
    config: &EngineConfig,
) -> CoreResult<SwapResult> {
    let result = quote_swap(pool, request, config)?;
    pool.set_price_state(result.end_tick, result.end_liquidity);

    debug!(
        side = ?result.side,
        amount_in = request.amount_in,
        shares_out = result.shares_out,
        start_tick = result.start_tick,
        end_tick = result.end_tick,
        ticks_crossed = result.ticks_crossed,
        outcome = ?result.outcome,
        "swap committed"
    );
    Ok(result)
}

/// Simulate a swap without touching the pool
pub fn quote_swap(
    pool: &Pool,
    request: &SwapRequest,
    config: &EngineConfig,
) -> CoreResult<SwapResult> {
    config.validate()?;

    let amount = request.amount_in;
    if !amount.is_finite() || amount < 0.0 {
        return Err(Swap3Error::InvalidAmount(amount));
    }
    let limit_tick = request
        .limit_probability
        .map(|limit| validate_limit(pool.tick(), request.side, limit))
        .transpose()?;

    let mut state = SwapState {
        amount_remaining: amount,
        pool_shares_out: 0.0,
        sqrt_price: pool.sqrt_price(),
        tick: pool.tick(),
        liquidity: pool.liquidity(),
        ticks_crossed: 0,
    };

    let outcome = loop {
        if state.amount_remaining <= 0.0 {
            break SwapOutcome::Filled;
        }
        if state.liquidity == 0 {
            break SwapOutcome::InsufficientLiquidity;
        }

        let target = match request.side {
            Side::Yes => target_up(pool.ledger(), &state, limit_tick, config)?,
            Side::No => target_down(pool.ledger(), &state, limit_tick, config)?,
        };
        trace!(
            tick = state.tick,
            liquidity = state.liquidity,
            remaining = state.amount_remaining,
            target = target.tick,
            "swap step"
        );

        match step(&mut state, request.side, target)? {
            StepOutcome::Continue => {}
            StepOutcome::Stop(outcome) => break outcome,
        }

        // A boundary crossed onto the limit tick ends the walk there
        if let Some(limit) = limit_tick {
            let reached = match request.side {
                Side::Yes => state.tick >= limit,
                Side::No => state.tick <= limit,
            };
            if reached && state.amount_remaining > 0.0 {
                break SwapOutcome::PriceLimit;
            }
        }
    };

    let amount_remaining = state.amount_remaining.max(0.0);
    let filled = outcome == SwapOutcome::Filled || amount_remaining <= 0.0;
    let amount_in_used = amount - amount_remaining;

    Ok(SwapResult {
        side: request.side,
        shares_out: amount_in_used + state.pool_shares_out,
        amount_in_used,
        amount_remaining,
        start_tick: pool.tick(),
        end_tick: state.tick,
        end_liquidity: state.liquidity,
        ticks_crossed: state.ticks_crossed,
        filled,
        outcome: if filled { SwapOutcome::Filled } else { outcome },
    })
}

fn validate_limit(tick: i32, side: Side, limit: f64) -> CoreResult<i32> {
    let limit_tick = tick_of(limit)?;
    let ahead = match side {
        Side::Yes => limit_tick > tick,
        Side::No => limit_tick < tick,
    };
    if !ahead {
        return Err(Swap3Error::InvalidPriceLimit { limit, tick });
    }
    Ok(limit_tick)
}

fn crossings_exhausted(state: &SwapState, config: &EngineConfig) -> bool {
    config
        .crossing_limit()
        .is_some_and(|max| state.ticks_crossed >= max)
}

/// Next stop when the price is rising
fn target_up(
    ledger: &TickLedger,
    state: &SwapState,
    limit_tick: Option<i32>,
    config: &EngineConfig,
) -> CoreResult<StepTarget> {
    let (boundary, next) =
        ledger
            .next_boundary_above(state.tick)
            .ok_or(Swap3Error::MissingBoundary {
                tick: state.tick,
                liquidity: state.liquidity,
            })?;

    if let Some(limit) = limit_tick.filter(|limit| *limit < boundary) {
        return Ok(StepTarget {
            tick: limit,
            cross: None,
            stop: SwapOutcome::PriceLimit,
        });
    }
    // Parked just below the boundary, still inside the active segment
    if crossings_exhausted(state, config) {
        return Ok(StepTarget {
            tick: boundary - 1,
            cross: None,
            stop: SwapOutcome::CrossingLimit,
        });
    }
    Ok(StepTarget {
        tick: boundary,
        cross: Some((boundary, next.liquidity_net)),
        stop: SwapOutcome::Filled,
    })
}

/// Next stop when the price is falling
fn target_down(
    ledger: &TickLedger,
    state: &SwapState,
    limit_tick: Option<i32>,
    config: &EngineConfig,
) -> CoreResult<StepTarget> {
    let (boundary, next) =
        ledger
            .next_boundary_at_or_below(state.tick)
            .ok_or(Swap3Error::MissingBoundary {
                tick: state.tick,
                liquidity: state.liquidity,
            })?;

    // Sitting on a boundary without crossing it keeps the segment above active
    if let Some(limit) = limit_tick.filter(|limit| *limit >= boundary) {
        return Ok(StepTarget {
            tick: limit,
            cross: None,
            stop: SwapOutcome::PriceLimit,
        });
    }
    if crossings_exhausted(state, config) {
        return Ok(StepTarget {
            tick: boundary,
            cross: None,
            stop: SwapOutcome::CrossingLimit,
        });
    }
    if boundary == MIN_TICK {
        return Ok(StepTarget {
            tick: boundary,
            cross: None,
            stop: SwapOutcome::InsufficientLiquidity,
        });
    }
    Ok(StepTarget {
        tick: boundary,
        cross: Some((boundary, next.liquidity_net)),
        stop: SwapOutcome::Filled,
    })
}

fn step(state: &mut SwapState, side: Side, target: StepTarget) -> CoreResult<StepOutcome> {
    let sqrt_target = sqrt_price_at_tick(target.tick);
    let cost = match side {
        Side::Yes => no_amount_delta(state.sqrt_price, sqrt_target, state.liquidity),
        Side::No => yes_amount_delta(state.sqrt_price, sqrt_target, state.liquidity),
    };

    if state.amount_remaining >= cost {
        state.pool_shares_out += match side {
            Side::Yes => yes_amount_delta(state.sqrt_price, sqrt_target, state.liquidity),
            Side::No => no_amount_delta(state.sqrt_price, sqrt_target, state.liquidity),
        };
        state.amount_remaining -= cost;
        state.sqrt_price = sqrt_target;

        let Some((boundary, liquidity_net)) = target.cross else {
            state.tick = target.tick;
            return Ok(StepOutcome::Stop(target.stop));
        };
        cross(state, side, boundary, liquidity_net)?;
        return Ok(StepOutcome::Continue);
    }

    // The amount runs out inside this segment. Settle on the whole tick the
    // continuous price rounds to in the pool's favour and charge only the
    // cost of reaching it; the rest stays in `amount_remaining` as dust.
    let end_tick = match side {
        Side::Yes => {
            let next = next_sqrt_price_from_no_input(
                state.sqrt_price,
                state.liquidity,
                state.amount_remaining,
            )?;
            let upper = if target.cross.is_some() {
                target.tick - 1
            } else {
                target.tick
            };
            tick_at_sqrt_price_floor(next)?.clamp(state.tick, upper.max(state.tick))
        }
        Side::No => {
            let next = next_sqrt_price_from_yes_input(
                state.sqrt_price,
                state.liquidity,
                state.amount_remaining,
            )?;
            tick_at_sqrt_price_ceil(next)?.clamp(target.tick, state.tick)
        }
    };

    let settle_sqrt_price = sqrt_price_at_tick(end_tick);
    let (settle_cost, settle_shares) = match side {
        Side::Yes => (
            no_amount_delta(state.sqrt_price, settle_sqrt_price, state.liquidity),
            yes_amount_delta(state.sqrt_price, settle_sqrt_price, state.liquidity),
        ),
        Side::No => (
            yes_amount_delta(settle_sqrt_price, state.sqrt_price, state.liquidity),
            no_amount_delta(settle_sqrt_price, state.sqrt_price, state.liquidity),
        ),
    };

    // Just below a downward crossing the nearest whole tick can be out of reach
    if settle_cost <= state.amount_remaining * (1.0 + SETTLE_TOLERANCE) {
        state.pool_shares_out += settle_shares;
        state.amount_remaining = (state.amount_remaining - settle_cost).max(0.0);
        state.sqrt_price = settle_sqrt_price;
    }
    state.tick = end_tick;
    Ok(StepOutcome::Stop(SwapOutcome::Filled))
}

fn cross(state: &mut SwapState, side: Side, boundary: i32, liquidity_net: i128) -> CoreResult<()> {
    let (delta, tick) = match side {
        Side::Yes => (Some(liquidity_net), boundary),
        Side::No => (liquidity_net.checked_neg(), boundary - 1),
    };
    let liquidity = delta
        .and_then(|delta| apply_liquidity_delta(state.liquidity, delta))
        .ok_or(Swap3Error::NegativeLiquidity { tick: boundary })?;

    trace!(
        boundary,
        liquidity_before = state.liquidity,
        liquidity_after = liquidity,
        "crossed boundary"
    );
    state.liquidity = liquidity;
    state.tick = tick;
    state.ticks_crossed += 1;
    Ok(())
}

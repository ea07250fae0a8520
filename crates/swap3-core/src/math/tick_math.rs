//! # Tick Math
//!
//! Conversions between probabilities, ticks and sqrt prices.
//!
//! A tick `t` has price `P(t) = 1.0001^t`, read as the odds ratio
//! `NO reserve / YES reserve = p / (1 - p)`. Probability is therefore the
//! logistic function of `t * ln(1.0001)` and every tick moves the log-odds by
//! the same amount.

use crate::constants::{LN_TICK_BASE, MAX_TICK, MIN_TICK};
use crate::errors::{CoreResult, Swap3Error};

/// Convert a probability in (0, 1) to the nearest tick.
///
/// Probabilities more extreme than the supported tick range clamp to
/// [`MIN_TICK`] / [`MAX_TICK`].
pub fn tick_of(prob: f64) -> CoreResult<i32> {
    if !prob.is_finite() || prob <= 0.0 || prob >= 1.0 {
        return Err(Swap3Error::InvalidProbability(prob));
    }

    // ln(p / (1 - p)) without cancellation near 1
    let log_odds = prob.ln() - (-prob).ln_1p();
    let tick = (log_odds / LN_TICK_BASE).round();

    Ok(tick.clamp(MIN_TICK as f64, MAX_TICK as f64) as i32)
}

/// Convert a tick to its implied probability of YES.
///
/// Total: ticks outside the supported range are clamped first, so the result
/// is always strictly inside (0, 1).
pub fn prob_of(tick: i32) -> f64 {
    let x = tick.clamp(MIN_TICK, MAX_TICK) as f64 * LN_TICK_BASE;
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `sqrt(1.0001^tick)`
pub fn sqrt_price_at_tick(tick: i32) -> f64 {
    (tick as f64 * LN_TICK_BASE * 0.5).exp()
}

/// Greatest tick whose sqrt price is at or below `sqrt_price`
pub fn tick_at_sqrt_price_floor(sqrt_price: f64) -> CoreResult<i32> {
    let mut tick = tick_estimate(sqrt_price)?.floor() as i32;

    // Settle against sqrt_price_at_tick so the result is exact for the engine
    while sqrt_price_at_tick(tick + 1) <= sqrt_price {
        tick += 1;
    }
    while sqrt_price_at_tick(tick) > sqrt_price {
        tick -= 1;
    }

    ensure_tick_valid(tick)
}

/// Least tick whose sqrt price is at or above `sqrt_price`
pub fn tick_at_sqrt_price_ceil(sqrt_price: f64) -> CoreResult<i32> {
    let mut tick = tick_estimate(sqrt_price)?.ceil() as i32;

    while sqrt_price_at_tick(tick - 1) >= sqrt_price {
        tick -= 1;
    }
    while sqrt_price_at_tick(tick) < sqrt_price {
        tick += 1;
    }

    ensure_tick_valid(tick)
}

fn tick_estimate(sqrt_price: f64) -> CoreResult<f64> {
    if !sqrt_price.is_finite() || sqrt_price <= 0.0 {
        return Err(Swap3Error::InvalidPrice(sqrt_price));
    }
    let estimate = 2.0 * sqrt_price.ln() / LN_TICK_BASE;
    if estimate < (MIN_TICK - 1) as f64 || estimate > (MAX_TICK + 1) as f64 {
        return Err(Swap3Error::TickOutOfRange(estimate as i32));
    }
    Ok(estimate)
}

fn ensure_tick_valid(tick: i32) -> CoreResult<i32> {
    if is_tick_valid(tick) {
        Ok(tick)
    } else {
        Err(Swap3Error::TickOutOfRange(tick))
    }
}

/// Check if a tick is within the supported range
pub fn is_tick_valid(tick: i32) -> bool {
    (MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Check if a tick sits on the spacing grid
pub fn is_tick_aligned(tick: i32, tick_spacing: u16) -> bool {
    tick_spacing > 0 && tick.rem_euclid(tick_spacing as i32) == 0
}

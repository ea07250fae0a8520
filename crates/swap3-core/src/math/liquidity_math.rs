//! # Liquidity Math
//!
//! Closed-form constant-product segment formulas. Within one segment the pool
//! holds virtual reserves `Y = L / √P` (YES) and `N = L · √P` (NO), so moving
//! the price between two sqrt prices changes each reserve by a simple
//! difference scaled by `L`.

use crate::errors::{CoreResult, Swap3Error};

/// YES shares held by `liquidity` between two sqrt prices: `L · (1/√a − 1/√b)`
pub fn yes_amount_delta(sqrt_price_a: f64, sqrt_price_b: f64, liquidity: u128) -> f64 {
    if sqrt_price_a > sqrt_price_b {
        return yes_amount_delta(sqrt_price_b, sqrt_price_a, liquidity);
    }
    liquidity as f64 * (1.0 / sqrt_price_a - 1.0 / sqrt_price_b)
}

/// NO shares held by `liquidity` between two sqrt prices: `L · (√b − √a)`
pub fn no_amount_delta(sqrt_price_a: f64, sqrt_price_b: f64, liquidity: u128) -> f64 {
    if sqrt_price_a > sqrt_price_b {
        return no_amount_delta(sqrt_price_b, sqrt_price_a, liquidity);
    }
    liquidity as f64 * (sqrt_price_b - sqrt_price_a)
}

/// Sqrt price after `amount` NO is added to the curve (price rises)
pub fn next_sqrt_price_from_no_input(
    sqrt_price: f64,
    liquidity: u128,
    amount: f64,
) -> CoreResult<f64> {
    if liquidity == 0 {
        return Err(Swap3Error::EmptyPool);
    }
    Ok(sqrt_price + amount / liquidity as f64)
}

/// Sqrt price after `amount` YES is added to the curve (price falls)
pub fn next_sqrt_price_from_yes_input(
    sqrt_price: f64,
    liquidity: u128,
    amount: f64,
) -> CoreResult<f64> {
    if liquidity == 0 {
        return Err(Swap3Error::EmptyPool);
    }
    // 1/√P' = 1/√P + amount/L
    let l = liquidity as f64;
    Ok(l * sqrt_price / (l + amount * sqrt_price))
}

/// Liquidity funded by `amount` YES over `[a, b]`
pub fn liquidity_for_yes(sqrt_price_a: f64, sqrt_price_b: f64, amount: f64) -> f64 {
    let (lo, hi) = ordered(sqrt_price_a, sqrt_price_b);
    if hi == lo {
        return 0.0;
    }
    amount * lo * hi / (hi - lo)
}

/// Liquidity funded by `amount` NO over `[a, b]`
pub fn liquidity_for_no(sqrt_price_a: f64, sqrt_price_b: f64, amount: f64) -> f64 {
    let (lo, hi) = ordered(sqrt_price_a, sqrt_price_b);
    if hi == lo {
        return 0.0;
    }
    amount / (hi - lo)
}

/// YES and NO held by `liquidity` over `[lower, upper]` at the current price.
///
/// Below the range the position is all YES (it sells YES as the price rises
/// into it), above the range it is all NO, inside it holds both.
pub fn amounts_for_liquidity(
    sqrt_price_current: f64,
    sqrt_price_lower: f64,
    sqrt_price_upper: f64,
    liquidity: u128,
) -> (f64, f64) {
    let (lower, upper) = ordered(sqrt_price_lower, sqrt_price_upper);

    if sqrt_price_current <= lower {
        (yes_amount_delta(lower, upper, liquidity), 0.0)
    } else if sqrt_price_current < upper {
        (
            yes_amount_delta(sqrt_price_current, upper, liquidity),
            no_amount_delta(lower, sqrt_price_current, liquidity),
        )
    } else {
        (0.0, no_amount_delta(lower, upper, liquidity))
    }
}

/// Largest liquidity that `yes` and `no` can fund over `[lower, upper]`
pub fn liquidity_for_amounts(
    sqrt_price_current: f64,
    sqrt_price_lower: f64,
    sqrt_price_upper: f64,
    yes: f64,
    no: f64,
) -> f64 {
    let (lower, upper) = ordered(sqrt_price_lower, sqrt_price_upper);

    if sqrt_price_current <= lower {
        liquidity_for_yes(lower, upper, yes)
    } else if sqrt_price_current < upper {
        let from_yes = liquidity_for_yes(sqrt_price_current, upper, yes);
        let from_no = liquidity_for_no(lower, sqrt_price_current, no);
        from_yes.min(from_no)
    } else {
        liquidity_for_no(lower, upper, no)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

//! Liquidity provisioning
//!
//! Prices and commits concentrated liquidity positions. Quotes are pure;
//! `open_position` and `close_position` are the only mutators of the tick
//! ledger and are atomic: every check runs before anything is written.

use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::{CoreResult, Swap3Error};
use crate::math::liquidity_math::{
    amounts_for_liquidity, liquidity_for_amounts as liquidity_from_amounts,
};
use crate::math::safe_math::{apply_liquidity_delta, liquidity_to_delta};
use crate::math::tick_math::{is_tick_aligned, is_tick_valid, sqrt_price_at_tick};
use crate::state::Pool;
use crate::types::{LiquidityQuote, PositionRange};

// ============================================================================
// Quotes
// ============================================================================

/// Cost in YES and NO shares of adding `liquidity_delta` over
/// `[tick_lower, tick_upper)` at the pool's current tick.
///
/// - current tick at or below the range: all YES
/// - current tick at or above the range: all NO
/// - inside the range: both, split at the current price
pub fn quote_liquidity(
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: u128,
) -> CoreResult<LiquidityQuote> {
    let range = validate_position(tick_lower, tick_upper, liquidity_delta)?;
    Ok(amounts_at_current_tick(pool, range, liquidity_delta))
}

/// Shares refunded for removing `liquidity_delta` over the range
pub fn quote_withdrawal(
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: u128,
) -> CoreResult<LiquidityQuote> {
    quote_liquidity(pool, tick_lower, tick_upper, liquidity_delta)
}

/// Largest liquidity `yes` and `no` shares can fund over the range
pub fn liquidity_for_amounts(
    pool: &Pool,
    tick_lower: i32,
    tick_upper: i32,
    yes: f64,
    no: f64,
) -> CoreResult<u128> {
    validate_range(tick_lower, tick_upper)?;
    for amount in [yes, no] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Swap3Error::InvalidAmount(amount));
        }
    }

    let liquidity = liquidity_from_amounts(
        pool.sqrt_price(),
        sqrt_price_at_tick(tick_lower),
        sqrt_price_at_tick(tick_upper),
        yes,
        no,
    )
    .floor();

    if liquidity >= u128::MAX as f64 {
        return Err(Swap3Error::MathOverflow);
    }
    Ok(liquidity as u128)
}

// ============================================================================
// Commits
// ============================================================================

/// Add a position to the pool, returning the shares the provider pays
pub fn open_position(
    pool: &mut Pool,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: u128,
    config: &EngineConfig,
) -> CoreResult<LiquidityQuote> {
    let range = validate_position(tick_lower, tick_upper, liquidity_delta)?;
    validate_alignment(range, config)?;

    if let Some(max) = config.boundary_limit() {
        let after = pool.ledger().len()
            + pool
                .ledger()
                .count_new_boundaries(&[range.tick_lower, range.tick_upper]);
        if after > max {
            return Err(Swap3Error::TooManyBoundaries(after, max));
        }
    }

    let quote = amounts_at_current_tick(pool, range, liquidity_delta);
    apply_position_delta(pool, range, liquidity_to_delta(liquidity_delta)?)?;

    debug!(
        tick_lower,
        tick_upper,
        liquidity_delta,
        required_yes = quote.required_yes,
        required_no = quote.required_no,
        active_liquidity = pool.liquidity(),
        "opened position"
    );
    Ok(quote)
}

/// Remove a position from the pool, returning the shares refunded
pub fn close_position(
    pool: &mut Pool,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: u128,
    config: &EngineConfig,
) -> CoreResult<LiquidityQuote> {
    let range = validate_position(tick_lower, tick_upper, liquidity_delta)?;
    validate_alignment(range, config)?;

    let refund = amounts_at_current_tick(pool, range, liquidity_delta);
    apply_position_delta(pool, range, -liquidity_to_delta(liquidity_delta)?)?;

    debug!(
        tick_lower,
        tick_upper,
        liquidity_delta,
        refund_yes = refund.required_yes,
        refund_no = refund.required_no,
        active_liquidity = pool.liquidity(),
        "closed position"
    );
    Ok(refund)
}

fn apply_position_delta(pool: &mut Pool, range: PositionRange, delta: i128) -> CoreResult<()> {
    let lower = pool.ledger().preview_update(range.tick_lower, delta, false)?;
    let upper = pool.ledger().preview_update(range.tick_upper, delta, true)?;

    let liquidity = if range.contains(pool.tick()) {
        apply_liquidity_delta(pool.liquidity(), delta).ok_or(if delta < 0 {
            Swap3Error::NegativeLiquidity { tick: pool.tick() }
        } else {
            Swap3Error::MathOverflow
        })?
    } else {
        pool.liquidity()
    };

    let ledger = pool.ledger_mut();
    ledger.store(range.tick_lower, lower);
    ledger.store(range.tick_upper, upper);
    pool.set_liquidity(liquidity);
    Ok(())
}

fn amounts_at_current_tick(pool: &Pool, range: PositionRange, liquidity: u128) -> LiquidityQuote {
    let (required_yes, required_no) = amounts_for_liquidity(
        pool.sqrt_price(),
        sqrt_price_at_tick(range.tick_lower),
        sqrt_price_at_tick(range.tick_upper),
        liquidity,
    );
    LiquidityQuote {
        required_yes,
        required_no,
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_range(tick_lower: i32, tick_upper: i32) -> CoreResult<PositionRange> {
    if tick_lower >= tick_upper {
        return Err(Swap3Error::InvalidTickRange {
            lower: tick_lower,
            upper: tick_upper,
        });
    }
    for tick in [tick_lower, tick_upper] {
        if !is_tick_valid(tick) {
            return Err(Swap3Error::TickOutOfRange(tick));
        }
    }
    Ok(PositionRange::new(tick_lower, tick_upper))
}

fn validate_position(
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: u128,
) -> CoreResult<PositionRange> {
    let range = validate_range(tick_lower, tick_upper)?;
    if liquidity_delta == 0 {
        return Err(Swap3Error::ZeroLiquidityDelta);
    }
    Ok(range)
}

fn validate_alignment(range: PositionRange, config: &EngineConfig) -> CoreResult<()> {
    for tick in [range.tick_lower, range.tick_upper] {
        if !is_tick_aligned(tick, config.tick_spacing) {
            return Err(Swap3Error::UnalignedTick {
                tick,
                spacing: config.tick_spacing,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::tick_of;
    use approx::assert_relative_eq;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_quote_validation() {
        let pool = Pool::new(0).unwrap();
        assert_eq!(
            quote_liquidity(&pool, 10, 10, 1),
            Err(Swap3Error::InvalidTickRange { lower: 10, upper: 10 })
        );
        assert_eq!(
            quote_liquidity(&pool, -10, 10, 0),
            Err(Swap3Error::ZeroLiquidityDelta)
        );
        assert!(matches!(
            quote_liquidity(&pool, -10, 300_000, 1),
            Err(Swap3Error::TickOutOfRange(300_000))
        ));
    }

    #[test]
    fn test_quote_sides_by_range_position() {
        let pool = Pool::new(0).unwrap();

        // Range above the price holds YES only
        let quote = quote_liquidity(&pool, 100, 200, 1_000).unwrap();
        assert!(quote.required_yes > 0.0);
        assert_eq!(quote.required_no, 0.0);

        // Range below the price holds NO only
        let quote = quote_liquidity(&pool, -200, -100, 1_000).unwrap();
        assert_eq!(quote.required_yes, 0.0);
        assert!(quote.required_no > 0.0);

        // Range starting exactly at the price is still all YES
        let quote = quote_liquidity(&pool, 0, 100, 1_000).unwrap();
        assert!(quote.required_yes > 0.0);
        assert_eq!(quote.required_no, 0.0);

        // A symmetric range around even odds costs the same of each
        let quote = quote_liquidity(&pool, -100, 100, 1_000).unwrap();
        assert_relative_eq!(quote.required_yes, quote.required_no, max_relative = 1e-12);
    }

    #[test]
    fn test_withdrawal_quote_is_pure() {
        let mut pool = Pool::new(0).unwrap();
        open_position(&mut pool, -500, 500, 2_000, &config()).unwrap();
        let before = pool.clone();

        let quote = quote_withdrawal(&pool, -500, 500, 2_000).unwrap();
        assert_eq!(quote_withdrawal(&pool, -500, 500, 2_000).unwrap(), quote);
        assert_eq!(pool, before);
        assert_eq!(
            quote_withdrawal(&pool, 500, -500, 2_000),
            Err(Swap3Error::InvalidTickRange { lower: 500, upper: -500 })
        );

        let refund = close_position(&mut pool, -500, 500, 2_000, &config()).unwrap();
        assert_eq!(refund, quote);
    }

    #[test]
    fn test_open_in_range_activates_liquidity() {
        let mut pool = Pool::new(0).unwrap();
        open_position(&mut pool, -60, 60, 500, &config()).unwrap();
        assert_eq!(pool.liquidity(), 500);

        // Out of range positions only touch the ledger
        open_position(&mut pool, 60, 120, 300, &config()).unwrap();
        assert_eq!(pool.liquidity(), 500);
        assert_eq!(pool.ledger().get(60).unwrap().liquidity_net, -200);
        assert!(pool.check_invariants().is_ok());
    }

    #[test]
    fn test_open_at_lower_bound_is_active() {
        let mut pool = Pool::new(40).unwrap();
        open_position(&mut pool, 40, 80, 10, &config()).unwrap();
        assert_eq!(pool.liquidity(), 10);

        open_position(&mut pool, 0, 40, 7, &config()).unwrap();
        assert_eq!(pool.liquidity(), 10);
    }

    #[test]
    fn test_close_refunds_what_open_charged() {
        let mut pool = Pool::from_probability(0.4).unwrap();
        let paid = open_position(&mut pool, -2_000, 1_000, 10_000, &config()).unwrap();
        let refund = close_position(&mut pool, -2_000, 1_000, 10_000, &config()).unwrap();

        assert_eq!(paid, refund);
        assert_eq!(pool.liquidity(), 0);
        assert!(pool.ledger().is_empty());
    }

    #[test]
    fn test_close_more_than_open_is_rejected_atomically() {
        let mut pool = Pool::new(0).unwrap();
        open_position(&mut pool, -10, 10, 100, &config()).unwrap();
        let before = pool.clone();

        let err = close_position(&mut pool, -10, 10, 101, &config()).unwrap_err();
        assert!(matches!(err, Swap3Error::InsufficientPositionLiquidity { .. }));
        assert!(!err.is_fatal());
        assert_eq!(pool, before);
    }

    #[test]
    fn test_alignment_and_boundary_limits() {
        let spaced = EngineConfig {
            tick_spacing: 10,
            max_boundaries: 4,
            ..Default::default()
        };
        let mut pool = Pool::new(0).unwrap();

        assert_eq!(
            open_position(&mut pool, -15, 10, 1, &spaced),
            Err(Swap3Error::UnalignedTick { tick: -15, spacing: 10 })
        );

        open_position(&mut pool, -10, 10, 1, &spaced).unwrap();
        open_position(&mut pool, -20, 20, 1, &spaced).unwrap();
        // Reusing existing boundaries stays within the limit
        open_position(&mut pool, -10, 20, 1, &spaced).unwrap();
        assert_eq!(
            open_position(&mut pool, -30, 20, 1, &spaced),
            Err(Swap3Error::TooManyBoundaries(5, 4))
        );
    }

    #[test]
    fn test_liquidity_for_amounts_inverts_quote() {
        let pool = Pool::new(tick_of(0.3).unwrap()).unwrap();
        let (lower, upper) = (tick_of(0.2).unwrap(), tick_of(0.33).unwrap());
        let quote = quote_liquidity(&pool, lower, upper, 1_000_000).unwrap();

        // Pad slightly so flooring cannot land one unit short
        let liquidity = liquidity_for_amounts(
            &pool,
            lower,
            upper,
            quote.required_yes * (1.0 + 1e-9),
            quote.required_no * (1.0 + 1e-9),
        )
        .unwrap();
        assert_eq!(liquidity, 1_000_000);

        assert!(matches!(
            liquidity_for_amounts(&pool, lower, upper, -1.0, 5.0),
            Err(Swap3Error::InvalidAmount(_))
        ));
    }
}

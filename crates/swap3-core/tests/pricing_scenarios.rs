//! # Pricing Scenarios
//!
//! End-to-end checks of the provisioning and swap paths through the public API.

use approx::assert_relative_eq;
use swap3_core::math::liquidity_math::no_amount_delta;
use swap3_core::math::tick_math::sqrt_price_at_tick;
use swap3_core::*;

fn config() -> EngineConfig {
    EngineConfig::default()
}

/// Pool at `prob` with one position over `[lower_prob, upper_prob)`
fn seeded_pool(prob: f64, lower_prob: f64, upper_prob: f64, liquidity: u128) -> Pool {
    let mut pool = Pool::from_probability(prob).unwrap();
    open_position(
        &mut pool,
        tick_of(lower_prob).unwrap(),
        tick_of(upper_prob).unwrap(),
        liquidity,
        &config(),
    )
    .unwrap();
    pool
}

#[test]
fn test_quote_inside_range_needs_both_outcomes() {
    let pool = seeded_pool(0.3, 0.1, 0.5, 100);
    assert_eq!(pool.liquidity(), 100);

    let quote =
        quote_liquidity(&pool, tick_of(0.2).unwrap(), tick_of(0.33).unwrap(), 100).unwrap();
    assert!(quote.required_yes > 0.0);
    assert!(quote.required_no > 0.0);
}

#[test]
fn test_empty_pool_has_undefined_price() {
    let pool = Pool::from_probability(0.6).unwrap();
    assert_eq!(pool.yes_shares(), Err(Swap3Error::EmptyPool));
    assert_eq!(pool.no_shares(), Err(Swap3Error::EmptyPool));
    assert_eq!(pool.probability(), Err(Swap3Error::EmptyPool));
}

#[test]
fn test_zero_swap_leaves_pool_unchanged() {
    let mut pool = seeded_pool(0.3, 0.1, 0.5, 10_000);
    let before = pool.clone();

    let result = swap(&mut pool, Side::Yes, 0.0).unwrap();
    assert_eq!(result.shares_out, 0.0);
    assert!(result.filled);
    assert_eq!(pool, before);
}

#[test]
fn test_swap_past_last_boundary_is_partial() {
    let mut pool = seeded_pool(0.3, 0.1, 0.5, 10_000);
    let upper = tick_of(0.5).unwrap();
    let fillable = no_amount_delta(pool.sqrt_price(), sqrt_price_at_tick(upper), 10_000);

    let result = swap(&mut pool, Side::Yes, fillable * 10.0).unwrap();
    assert!(!result.filled);
    assert_eq!(result.outcome, SwapOutcome::InsufficientLiquidity);
    assert_eq!(result.end_tick, upper);
    assert_relative_eq!(result.amount_in_used, fillable, max_relative = 1e-9);
    assert!(result.shares_out < fillable * 10.0);
    assert!(pool.is_empty());
    assert!(pool.check_invariants().is_ok());
}

#[test]
fn test_opposite_swap_restores_probability() {
    let mut pool = seeded_pool(0.4, 0.05, 0.95, 1_000_000);
    let start = pool.probability().unwrap();
    let yes_before = pool.yes_shares().unwrap();

    swap(&mut pool, Side::Yes, 5_000.0).unwrap();
    assert!(pool.probability().unwrap() > start);

    // Selling back the YES the pool released walks the curve home
    let released = yes_before - pool.yes_shares().unwrap();
    swap(&mut pool, Side::No, released).unwrap();
    assert_relative_eq!(pool.probability().unwrap(), start, epsilon = 1e-3);
    assert!(pool.check_invariants().is_ok());
}

#[test]
fn test_quote_matches_execution() {
    let mut pool = seeded_pool(0.55, 0.3, 0.7, 250_000);
    open_position(
        &mut pool,
        tick_of(0.5).unwrap(),
        tick_of(0.6).unwrap(),
        400_000,
        &config(),
    )
    .unwrap();

    let request = SwapRequest::new(Side::No, 20_000.0);
    let quoted = quote_swap(&pool, &request, &config()).unwrap();
    let executed = execute_swap(&mut pool, &request, &config()).unwrap();

    assert_eq!(quoted, executed);
    assert_eq!(pool.tick(), executed.end_tick);
    assert_eq!(pool.liquidity(), executed.end_liquidity);
}

#[test]
fn test_provision_trade_withdraw_cycle() {
    let mut pool = Pool::from_probability(0.5).unwrap();
    let (lower, upper) = (tick_of(0.2).unwrap(), tick_of(0.8).unwrap());

    let paid = open_position(&mut pool, lower, upper, 50_000, &config()).unwrap();
    assert_relative_eq!(paid.required_yes, paid.required_no, max_relative = 1e-3);

    let bought = swap(&mut pool, Side::Yes, 1_000.0).unwrap();
    assert!(bought.filled);

    // After YES was bought the position holds less YES and more NO
    let refund = close_position(&mut pool, lower, upper, 50_000, &config()).unwrap();
    assert!(refund.required_yes < paid.required_yes);
    assert!(refund.required_no > paid.required_no);

    assert!(pool.is_empty());
    assert!(pool.ledger().is_empty());
}

#[test]
fn test_pool_survives_json_round_trip() {
    let pool = seeded_pool(0.3, 0.1, 0.5, 100);
    let json = serde_json::to_string(&pool).unwrap();
    let restored: Pool = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, pool);
    assert!(restored.check_invariants().is_ok());
}

#[test]
fn test_invariant_errors_are_fatal() {
    assert!(Swap3Error::NegativeLiquidity { tick: 0 }.is_fatal());
    assert!(Swap3Error::MissingBoundary { tick: 0, liquidity: 1 }.is_fatal());
    assert!(!Swap3Error::EmptyPool.is_fatal());
    assert_eq!(Swap3Error::ZeroLiquidityDelta.class(), ErrorClass::Domain);
}

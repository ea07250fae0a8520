//! # Safe Math Operations
//!
//! Overflow-checked integer arithmetic for liquidity accounting.

use crate::errors::{CoreResult, Swap3Error};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    ($fn_name:ident, $type:ty, $checked_method:ident) => {
        /// Checked arithmetic returning `MathOverflow` on wrap
        pub fn $fn_name(a: $type, b: $type) -> CoreResult<$type> {
            a.$checked_method(b).ok_or(Swap3Error::MathOverflow)
        }
    };
}

safe_arith!(safe_add_u128, u128, checked_add);
safe_arith!(safe_sub_u128, u128, checked_sub);
safe_arith!(safe_add_i128, i128, checked_add);
safe_arith!(safe_sub_i128, i128, checked_sub);

/// Convert a liquidity amount to a signed delta
pub fn liquidity_to_delta(liquidity: u128) -> CoreResult<i128> {
    i128::try_from(liquidity).map_err(|_| Swap3Error::MathOverflow)
}

/// Apply a signed delta to active liquidity.
///
/// Returns `None` when the result would be negative or overflow; callers
/// decide which error that is in their context.
pub fn apply_liquidity_delta(liquidity: u128, delta: i128) -> Option<u128> {
    if delta >= 0 {
        liquidity.checked_add(delta.unsigned_abs())
    } else {
        liquidity.checked_sub(delta.unsigned_abs())
    }
}

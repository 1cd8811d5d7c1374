// crates/fluxion-core/src/math.rs
//
// Overflow-safe integer arithmetic for ledger amounts.
//
// Amounts are u128 base units and supply is capped near 10^27, so a product
// of two amounts (fee pool x stake weight) can reach 10^54 and does not fit
// in 128 bits. `mul_div` widens to U256, where any u128 x u128 product fits,
// and narrows the quotient back down.

use primitive_types::U256;

use crate::error::{LedgerError, LedgerResult};

/// Basis-point denominator: 10,000 bps = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// `floor(a * b / denominator)` with a 256-bit intermediate.
///
/// # Errors
/// Returns `LedgerError::Overflow` if `denominator` is zero or the quotient
/// does not fit in a u128.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> LedgerResult<u128> {
    if denominator == 0 {
        return Err(LedgerError::Overflow);
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        return Err(LedgerError::Overflow);
    }
    Ok(quotient.low_u128())
}

/// `floor(amount * bps / 10_000)`.
pub fn apply_bps(amount: u128, bps: u32) -> LedgerResult<u128> {
    mul_div(amount, bps as u128, BPS_DENOMINATOR)
}

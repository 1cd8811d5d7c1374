// crates/fluxion-core/src/amount.rs
//
// $FGT token unit and display type.
//
// The smallest unit of $FGT is 10^-18 FGT (18 decimals, the same scaling as
// an ERC-20 token). All ledger accounting uses integer base units held in a
// u128, so there is never any floating-point precision loss. Every division
// in the ledger rounds toward zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Number of decimal places in one FGT.
pub const TOKEN_DECIMALS: u8 = 18;

/// Number of base units in one FGT. 1 FGT = 10^18 units.
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Type alias for an amount in base units.
pub type TokenAmount = u128;

/// A $FGT amount.
///
/// Wraps an amount in base units. Used where amounts are shown to people
/// (CLI tables, log lines); the ledger itself passes bare `TokenAmount`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fgt {
    /// Amount in base units (1 FGT = 10^18 units).
    pub units: u128,
}

impl Fgt {
    /// Create an amount from base units.
    ///
    /// # Example
    /// ```
    /// use fluxion_core::amount::{tokens, Fgt};
    /// let amount = Fgt::from_units(tokens(3));
    /// assert_eq!(amount.to_string(), "3 FGT");
    /// ```
    pub fn from_units(units: u128) -> Self {
        Self { units }
    }
}

/// Shorthand for `n` whole tokens in base units.
pub const fn tokens(n: u64) -> TokenAmount {
    n as u128 * UNITS_PER_TOKEN
}

impl fmt::Display for Fgt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.units / UNITS_PER_TOKEN;
        let frac = self.units % UNITS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{} FGT", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} FGT", whole, trimmed)
        }
    }
}

/// Parses a decimal token amount such as `"1000"`, `"12.5"` or `"0.25 FGT"`.
///
/// At most 18 fractional digits are accepted; no rounding is applied.
impl FromStr for Fgt {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix("FGT").unwrap_or(trimmed).trim();
        let invalid = || LedgerError::InvalidAmount(s.to_string());

        let (whole, frac) = match number.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (number, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > TOKEN_DECIMALS as usize {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(invalid());
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| invalid())?
                .checked_mul(UNITS_PER_TOKEN)
                .ok_or_else(invalid)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = TOKEN_DECIMALS as usize);
            padded.parse::<u128>().map_err(|_| invalid())?
        };

        whole_units
            .checked_add(frac_units)
            .map(Fgt::from_units)
            .ok_or_else(invalid)
    }
}

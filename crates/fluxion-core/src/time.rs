// crates/fluxion-core/src/time.rs
//
// Time helpers. The ledger never reads a clock: every operation takes `now`
// (unix seconds) from its caller.

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Seconds in one day. Daily transfer limits bucket on this boundary.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Seconds in a 365-day year, the denominator of staking APY accrual.
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

/// Day index of a timestamp: `floor(now / 86400)`.
///
/// Days roll over at UTC midnight, not on a rolling 24h window.
pub fn day_of(now: Timestamp) -> u64 {
    now / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_boundaries() {
        assert_eq!(day_of(0), 0);
        assert_eq!(day_of(SECONDS_PER_DAY - 1), 0);
        assert_eq!(day_of(SECONDS_PER_DAY), 1);
        assert_eq!(day_of(10 * SECONDS_PER_DAY + 5), 10);
    }

    #[test]
    fn test_seconds_per_year() {
        assert_eq!(SECONDS_PER_YEAR, 31_536_000);
    }
}

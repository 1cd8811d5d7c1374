// crates/fluxion-core/src/lib.rs
//
// fluxion-core: Core types, units, arithmetic, and errors for the Fluxion
// governance token ledger.
//
// This is the leaf crate that the ledger and CLI depend on. It defines the
// account address type, the 18-decimal token unit, time helpers for day
// bucketing and yearly accrual, overflow-safe integer arithmetic, and the
// single error type every ledger operation returns.

pub mod address;
pub mod amount;
pub mod error;
pub mod math;
pub mod time;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use fluxion_core::Address;`

pub use address::Address;
pub use amount::{tokens, Fgt, TokenAmount, TOKEN_DECIMALS, UNITS_PER_TOKEN};
pub use error::{LedgerError, LedgerResult};
pub use math::{apply_bps, mul_div, BPS_DENOMINATOR};
pub use time::{day_of, Timestamp, SECONDS_PER_DAY, SECONDS_PER_YEAR};

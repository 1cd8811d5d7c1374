// crates/fluxion-core/src/error.rs
//
// Ledger-wide error type. Every write call on the ledger returns either
// success or exactly one of these kinds, and a failed call leaves no
// partial state behind.

use thiserror::Error;

use crate::address::Address;
use crate::time::Timestamp;

/// Errors returned by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Caller does not hold the role the operation requires.
    #[error("Unauthorized: {account} is missing role {role}")]
    Unauthorized { account: Address, role: String },

    /// The pause switch is on.
    #[error("Ledger is paused")]
    Paused,

    /// Sender or recipient is blacklisted.
    #[error("Address is blacklisted: {0}")]
    Blacklisted(Address),

    /// Whitelist mode is on and sender or recipient is not whitelisted.
    #[error("Address not whitelisted: {0}")]
    NotWhitelisted(Address),

    #[error("Transfer amount {amount} exceeds limit {limit}")]
    ExceedsTransferLimit { amount: u128, limit: u128 },

    #[error("Daily transfer limit exceeded: {attempted} would exceed {limit}")]
    ExceedsDailyLimit { attempted: u128, limit: u128 },

    #[error("Insufficient balance: {account} has {available}, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: u128,
        required: u128,
    },

    #[error("Insufficient staked amount: staked {staked}, requested {requested}")]
    InsufficientStaked { staked: u128, requested: u128 },

    /// Unstake attempted before the lock period expired.
    #[error("Tokens are still locked until {unlock_time}")]
    StillLocked { unlock_time: Timestamp },

    #[error("Amount must be greater than 0")]
    ZeroAmount,

    #[error("Would exceed maximum supply: supply {supply} + {amount} > cap {cap}")]
    SupplyCapExceeded { supply: u128, amount: u128, cap: u128 },

    #[error("Rate {rate_bps} bps exceeds ceiling of {max_bps} bps")]
    RateTooHigh { rate_bps: u32, max_bps: u32 },

    #[error("Quorum {quorum}% cannot exceed {max}%")]
    QuorumTooHigh { quorum: u8, max: u8 },

    #[error("Voting period too short: {period}s is below the {minimum}s floor")]
    VotingPeriodTooShort { period: u64, minimum: u64 },

    #[error("Vesting schedule is not revocable")]
    NotRevocable,

    #[error("No fees to distribute")]
    NoFeesToDistribute,

    #[error("Invalid vesting parameters: {0}")]
    InvalidVestingParameters(String),

    #[error("No vesting schedule {index} for {beneficiary}")]
    ScheduleNotFound { beneficiary: Address, index: usize },

    #[error("Vesting schedule has been revoked")]
    ScheduleRevoked,

    /// Arithmetic would leave the 128-bit range.
    #[error("Arithmetic overflow")]
    Overflow,

    /// A mutating call supplied a timestamp earlier than one already seen.
    #[error("Time went backwards: now {now} is before last seen {last}")]
    TimeWentBackwards { now: Timestamp, last: Timestamp },

    #[error("Cannot remove the last admin")]
    LastAdmin,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// crates/fluxion-token/src/lib.rs
//
// fluxion-token: the $FGT governance token ledger. Role-based access
// control, pause switch, balances and supply cap, transfer compliance,
// treasury fees, staking rewards, vesting, and governance parameters.
//
// All amounts are 18-decimal base units (u128). Callers inject `now`.

pub mod access;
pub mod compliance;
pub mod config;
pub mod events;
pub mod governance;
pub mod ledger;
pub mod pause;
pub mod staking;
pub mod token;
pub mod treasury;
pub mod vesting;

// Re-export key types for ergonomic access from downstream crates.
pub use access::{Role, RoleRegistry};
pub use compliance::{ComplianceGate, ComplianceLimits};
pub use config::TokenConfig;
pub use events::{EventLog, LedgerEvent};
pub use governance::{GovernanceParameterStore, GovernanceParams, MAX_QUORUM_PERCENTAGE};
pub use ledger::AccountLedger;
pub use pause::PauseSwitch;
pub use staking::{StakePosition, StakingEngine, StakingInfo, MAX_REWARD_RATE_BPS};
pub use token::GovernanceToken;
pub use treasury::{FeeDistribution, FeeSplit, TreasuryFeeModule, MAX_FEE_RATE_BPS};
pub use vesting::{Revocation, VestingEngine, VestingSchedule};

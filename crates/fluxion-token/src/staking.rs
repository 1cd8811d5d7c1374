// crates/fluxion-token/src/staking.rs
//
// Stake management: time-locked stakes with linear APY reward accrual.
//
// Staked tokens move from the staker into the ledger's pool address, so they
// stay inside total supply. Each position tracks:
//   - staked amount
//   - lock period and lock start (unstaking is blocked until they elapse)
//   - last accrual time and rewards settled but not yet claimed
//
// Rewards accrue as
//   floor(floor(staked * rate_bps / 10_000) * elapsed / SECONDS_PER_YEAR)
// i.e. simple (non-compounding) APY. Before any change to the staked amount
// the pending reward is settled into the position, so a stake change never
// loses or inflates rewards. Rewards are minted on claim and count against
// the supply cap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::AccountLedger;
use fluxion_core::{
    apply_bps, mul_div, Address, LedgerError, LedgerResult, Timestamp, TokenAmount,
    SECONDS_PER_YEAR,
};

/// Ceiling on the staking reward rate: 5,000 bps (50% APY).
pub const MAX_REWARD_RATE_BPS: u32 = 5_000;

/// Default staking reward rate: 1,000 bps (10% APY).
pub const DEFAULT_REWARD_RATE_BPS: u32 = 1_000;

/// One address's staking position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Amount currently staked, in base units.
    pub staked_amount: TokenAmount,
    /// Lock duration in seconds. 0 means unlocked.
    pub lock_period: u64,
    /// When the current lock started (refreshed on every stake).
    pub lock_start: Timestamp,
    /// Rewards have been settled up to this time.
    pub last_accrual_time: Timestamp,
    /// Rewards settled but not yet claimed.
    pub accrued_rewards: TokenAmount,
}

impl StakePosition {
    /// Time at which the lock expires.
    pub fn unlock_time(&self) -> Timestamp {
        self.lock_start.saturating_add(self.lock_period)
    }

    /// Whether unstaking is blocked at `now`.
    pub fn is_locked(&self, now: Timestamp) -> bool {
        self.lock_period > 0 && now < self.unlock_time()
    }

    fn is_empty(&self) -> bool {
        self.staked_amount == 0 && self.accrued_rewards == 0
    }
}

/// Read-only snapshot of a position for API callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingInfo {
    pub staked_amount: TokenAmount,
    pub lock_period: u64,
    pub lock_start: Timestamp,
    pub unlock_time: Timestamp,
    pub is_locked: bool,
    pub pending_rewards: TokenAmount,
    pub last_accrual_time: Timestamp,
}

/// Reward earned by `staked` at `rate_bps` over `elapsed` seconds.
pub fn accrued_reward(staked: TokenAmount, rate_bps: u32, elapsed: u64) -> LedgerResult<TokenAmount> {
    if staked == 0 || elapsed == 0 || rate_bps == 0 {
        return Ok(0);
    }
    let annual = apply_bps(staked, rate_bps)?;
    mul_div(annual, elapsed as u128, SECONDS_PER_YEAR as u128)
}

/// Tracks every staking position and the aggregate staked amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingEngine {
    positions: BTreeMap<Address, StakePosition>,
    total_staked: TokenAmount,
    reward_rate_bps: u32,
}

impl StakingEngine {
    /// # Errors
    /// Returns `LedgerError::RateTooHigh` above `MAX_REWARD_RATE_BPS`.
    pub fn new(reward_rate_bps: u32) -> LedgerResult<Self> {
        validate_reward_rate(reward_rate_bps)?;
        Ok(Self {
            positions: BTreeMap::new(),
            total_staked: 0,
            reward_rate_bps,
        })
    }

    pub fn total_staked(&self) -> TokenAmount {
        self.total_staked
    }

    pub fn reward_rate_bps(&self) -> u32 {
        self.reward_rate_bps
    }

    pub fn position(&self, account: &Address) -> Option<&StakePosition> {
        self.positions.get(account)
    }

    /// Addresses with a non-zero stake and their staked amounts, in address order.
    pub fn stakers(&self) -> impl Iterator<Item = (&Address, TokenAmount)> {
        self.positions
            .iter()
            .filter(|(_, p)| p.staked_amount > 0)
            .map(|(addr, p)| (addr, p.staked_amount))
    }

    /// Reward accrued since the last settlement, not including `accrued_rewards`.
    fn unsettled(&self, position: &StakePosition, now: Timestamp) -> LedgerResult<TokenAmount> {
        let elapsed = now.saturating_sub(position.last_accrual_time);
        accrued_reward(position.staked_amount, self.reward_rate_bps, elapsed)
    }

    /// Settled plus unsettled rewards for `account` at `now`.
    pub fn pending_rewards(&self, account: &Address, now: Timestamp) -> LedgerResult<TokenAmount> {
        match self.position(account) {
            Some(position) => {
                let fresh = self.unsettled(position, now)?;
                position
                    .accrued_rewards
                    .checked_add(fresh)
                    .ok_or(LedgerError::Overflow)
            }
            None => Ok(0),
        }
    }

    pub fn staking_info(&self, account: &Address, now: Timestamp) -> LedgerResult<StakingInfo> {
        let Some(position) = self.position(account) else {
            return Ok(StakingInfo::default());
        };
        Ok(StakingInfo {
            staked_amount: position.staked_amount,
            lock_period: position.lock_period,
            lock_start: position.lock_start,
            unlock_time: position.unlock_time(),
            is_locked: position.is_locked(now),
            pending_rewards: self.pending_rewards(account, now)?,
            last_accrual_time: position.last_accrual_time,
        })
    }

    /// Lock `amount` of `account`'s balance into the pool.
    ///
    /// The lock start is refreshed to `now`. If the previous lock is still
    /// running, the longer of the old and new lock periods applies; an
    /// expired lock is simply replaced.
    ///
    /// # Errors
    /// Returns `LedgerError::ZeroAmount` for a zero stake and
    /// `LedgerError::InsufficientBalance` if the account cannot cover it.
    pub fn stake(
        &mut self,
        ledger: &mut AccountLedger,
        pool: Address,
        account: Address,
        amount: TokenAmount,
        lock_period: u64,
        now: Timestamp,
    ) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        ledger.ensure_balance(&account, amount)?;

        let mut position = self.positions.get(&account).cloned().unwrap_or_default();
        let settled = position
            .accrued_rewards
            .checked_add(self.unsettled(&position, now)?)
            .ok_or(LedgerError::Overflow)?;
        let staked_amount = position
            .staked_amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        ledger.transfer(&account, pool, amount)?;

        position.lock_period = if position.is_locked(now) {
            position.lock_period.max(lock_period)
        } else {
            lock_period
        };
        position.lock_start = now;
        position.last_accrual_time = now;
        position.accrued_rewards = settled;
        position.staked_amount = staked_amount;
        self.positions.insert(account, position);
        self.total_staked += amount;
        Ok(())
    }

    /// Release `amount` from the pool back to `account`.
    ///
    /// # Errors
    /// Returns `LedgerError::ZeroAmount`, `LedgerError::InsufficientStaked` if
    /// more than the staked amount is requested, or `LedgerError::StillLocked`
    /// before the lock expires.
    pub fn unstake(
        &mut self,
        ledger: &mut AccountLedger,
        pool: Address,
        account: Address,
        amount: TokenAmount,
        now: Timestamp,
    ) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut position = self.positions.get(&account).cloned().unwrap_or_default();
        if amount > position.staked_amount {
            return Err(LedgerError::InsufficientStaked {
                staked: position.staked_amount,
                requested: amount,
            });
        }
        if position.is_locked(now) {
            return Err(LedgerError::StillLocked {
                unlock_time: position.unlock_time(),
            });
        }
        let settled = position
            .accrued_rewards
            .checked_add(self.unsettled(&position, now)?)
            .ok_or(LedgerError::Overflow)?;

        ledger.transfer(&pool, account, amount)?;

        position.accrued_rewards = settled;
        position.last_accrual_time = now;
        position.staked_amount -= amount;
        if position.staked_amount == 0 {
            position.lock_period = 0;
            position.lock_start = 0;
        }
        self.total_staked -= amount;
        if position.is_empty() {
            self.positions.remove(&account);
        } else {
            self.positions.insert(account, position);
        }
        Ok(())
    }

    /// Mint every reward owed to `account` and reset its accrual clock.
    ///
    /// Returns the amount paid. Zero rewards are a no-op, not an error.
    ///
    /// # Errors
    /// Returns `LedgerError::SupplyCapExceeded` if minting the reward would
    /// breach the cap.
    pub fn claim_rewards(
        &mut self,
        ledger: &mut AccountLedger,
        account: Address,
        now: Timestamp,
    ) -> LedgerResult<TokenAmount> {
        let reward = self.pending_rewards(&account, now)?;
        if reward == 0 {
            return Ok(0);
        }
        ledger.mint(account, reward)?;

        if let Some(position) = self.positions.get_mut(&account) {
            position.accrued_rewards = 0;
            position.last_accrual_time = now;
            if position.is_empty() {
                self.positions.remove(&account);
            }
        }
        Ok(reward)
    }

    /// # Errors
    /// Returns `LedgerError::RateTooHigh` above `MAX_REWARD_RATE_BPS`.
    pub fn set_reward_rate(&mut self, reward_rate_bps: u32) -> LedgerResult<()> {
        validate_reward_rate(reward_rate_bps)?;
        self.reward_rate_bps = reward_rate_bps;
        Ok(())
    }
}

fn validate_reward_rate(reward_rate_bps: u32) -> LedgerResult<()> {
    if reward_rate_bps > MAX_REWARD_RATE_BPS {
        return Err(LedgerError::RateTooHigh {
            rate_bps: reward_rate_bps,
            max_bps: MAX_REWARD_RATE_BPS,
        });
    }
    Ok(())
}

// crates/fluxion-token/src/compliance.rs
//
// Transfer compliance gate: blacklist, whitelist mode, per-transfer cap, and
// a daily cap per sender.
//
// Checks run in a fixed order and the first failure wins:
//   1. paused
//   2. sender or recipient blacklisted
//   3. whitelist enabled and either side not whitelisted
//   4. amount above the per-transfer cap (0 = no cap)
//   5. sender's total for the current UTC day above the daily cap (0 = no cap)
//
// Only user-initiated transfers go through the gate. Staking, vesting and
// fee distribution are internal moves and bypass it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use fluxion_core::{day_of, Address, LedgerError, LedgerResult, Timestamp, TokenAmount};

/// The two numeric transfer limits. Zero disables a limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceLimits {
    pub max_transfer_amount: TokenAmount,
    pub max_daily_transfer_amount: TokenAmount,
}

/// Compliance state and the transfer check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceGate {
    blacklist: BTreeSet<Address>,
    whitelist_enabled: bool,
    whitelist: BTreeSet<Address>,
    limits: ComplianceLimits,
    /// Gross amount sent per sender per UTC day. Never evicted.
    daily_transferred: BTreeMap<Address, BTreeMap<u64, TokenAmount>>,
}

impl ComplianceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a proposed transfer without recording anything.
    ///
    /// # Errors
    /// Returns the first failing check as `Paused`, `Blacklisted`,
    /// `NotWhitelisted`, `ExceedsTransferLimit` or `ExceedsDailyLimit`.
    pub fn check(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
        now: Timestamp,
        paused: bool,
    ) -> LedgerResult<()> {
        if paused {
            return Err(LedgerError::Paused);
        }

        for party in [from, to] {
            if self.blacklist.contains(party) {
                return Err(LedgerError::Blacklisted(*party));
            }
        }

        if self.whitelist_enabled {
            for party in [from, to] {
                if !self.whitelist.contains(party) {
                    return Err(LedgerError::NotWhitelisted(*party));
                }
            }
        }

        let limit = self.limits.max_transfer_amount;
        if limit > 0 && amount > limit {
            return Err(LedgerError::ExceedsTransferLimit { amount, limit });
        }

        let daily_limit = self.limits.max_daily_transfer_amount;
        if daily_limit > 0 {
            let attempted = self
                .daily_transfer_amount(from, day_of(now))
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
            if attempted > daily_limit {
                return Err(LedgerError::ExceedsDailyLimit {
                    attempted,
                    limit: daily_limit,
                });
            }
        }

        Ok(())
    }

    /// Add `amount` to the sender's running total for the day of `now`.
    pub fn record_transfer(&mut self, from: Address, amount: TokenAmount, now: Timestamp) {
        let entry = self
            .daily_transferred
            .entry(from)
            .or_default()
            .entry(day_of(now))
            .or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn daily_transfer_amount(&self, account: &Address, day: u64) -> TokenAmount {
        self.daily_transferred
            .get(account)
            .and_then(|days| days.get(&day))
            .copied()
            .unwrap_or(0)
    }

    /// Returns `true` if the entry changed.
    pub fn set_blacklisted(&mut self, account: Address, blacklisted: bool) -> bool {
        if blacklisted {
            self.blacklist.insert(account)
        } else {
            self.blacklist.remove(&account)
        }
    }

    /// Returns `true` if the entry changed.
    pub fn set_whitelisted(&mut self, account: Address, whitelisted: bool) -> bool {
        if whitelisted {
            self.whitelist.insert(account)
        } else {
            self.whitelist.remove(&account)
        }
    }

    pub fn set_whitelist_enabled(&mut self, enabled: bool) {
        self.whitelist_enabled = enabled;
    }

    pub fn set_limits(&mut self, limits: ComplianceLimits) {
        self.limits = limits;
    }

    pub fn is_blacklisted(&self, account: &Address) -> bool {
        self.blacklist.contains(account)
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.contains(account)
    }

    pub fn whitelist_enabled(&self) -> bool {
        self.whitelist_enabled
    }

    pub fn limits(&self) -> ComplianceLimits {
        self.limits
    }
}

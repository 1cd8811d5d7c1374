// crates/fluxion-token/src/treasury.rs
//
// Treasury fee module.
//
// Every user transfer pays `floor(amount * fee_rate_bps / 10_000)` to the
// treasury address; the recipient gets the rest, so recipient gain plus
// treasury gain always equals the gross amount. Collected fees are also
// counted as undistributed until the Treasury role distributes them pro-rata
// to stakers. Floor division leaves any remainder undistributed for the
// next round.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use fluxion_core::{apply_bps, mul_div, Address, LedgerError, LedgerResult, TokenAmount};

/// Ceiling on the treasury fee: 1,000 bps (10%).
pub const MAX_FEE_RATE_BPS: u32 = 1_000;

/// Default treasury fee: 500 bps (5%).
pub const DEFAULT_FEE_RATE_BPS: u32 = 500;

/// A gross transfer amount split into recipient and treasury shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub net: TokenAmount,
    pub fee: TokenAmount,
}

/// The outcome of one fee distribution round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    /// Amount credited to each staker, in staker address order.
    pub payouts: Vec<(Address, TokenAmount)>,
    /// Sum of `payouts`.
    pub distributed: TokenAmount,
    /// Fees left undistributed after the round (rounding dust).
    pub remaining: TokenAmount,
}

/// Treasury address, fee rate, and fee accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryFeeModule {
    treasury: Address,
    fee_rate_bps: u32,
    undistributed_fees: TokenAmount,
    fee_exempt: BTreeSet<Address>,
}

impl TreasuryFeeModule {
    /// Create a fee module routing to `treasury` at `fee_rate_bps`.
    ///
    /// # Errors
    /// Returns `LedgerError::RateTooHigh` if the rate exceeds `MAX_FEE_RATE_BPS`.
    pub fn new(treasury: Address, fee_rate_bps: u32) -> LedgerResult<Self> {
        validate_fee_rate(fee_rate_bps)?;
        Ok(Self {
            treasury,
            fee_rate_bps,
            undistributed_fees: 0,
            fee_exempt: BTreeSet::new(),
        })
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn fee_rate_bps(&self) -> u32 {
        self.fee_rate_bps
    }

    pub fn undistributed_fees(&self) -> TokenAmount {
        self.undistributed_fees
    }

    pub fn is_fee_exempt(&self, account: &Address) -> bool {
        self.fee_exempt.contains(account)
    }

    /// Split a gross transfer into net and fee.
    ///
    /// Transfers touching the treasury itself, or an exempt address on either
    /// side, carry no fee.
    pub fn split(&self, from: &Address, to: &Address, amount: TokenAmount) -> LedgerResult<FeeSplit> {
        let exempt = *from == self.treasury
            || *to == self.treasury
            || self.is_fee_exempt(from)
            || self.is_fee_exempt(to);
        let fee = if exempt {
            0
        } else {
            apply_bps(amount, self.fee_rate_bps)?
        };
        Ok(FeeSplit {
            net: amount - fee,
            fee,
        })
    }

    /// Count a collected fee as undistributed.
    pub fn record_fee(&mut self, fee: TokenAmount) {
        self.undistributed_fees = self.undistributed_fees.saturating_add(fee);
    }

    pub fn set_treasury(&mut self, treasury: Address) {
        self.treasury = treasury;
    }

    /// # Errors
    /// Returns `LedgerError::RateTooHigh` above `MAX_FEE_RATE_BPS`.
    pub fn set_fee_rate(&mut self, fee_rate_bps: u32) -> LedgerResult<()> {
        validate_fee_rate(fee_rate_bps)?;
        self.fee_rate_bps = fee_rate_bps;
        Ok(())
    }

    /// Returns `true` if the entry changed.
    pub fn set_fee_exempt(&mut self, account: Address, exempt: bool) -> bool {
        if exempt {
            self.fee_exempt.insert(account)
        } else {
            self.fee_exempt.remove(&account)
        }
    }

    /// Compute each staker's share of the undistributed fees.
    ///
    /// Each staker gets `floor(undistributed * staked / total_staked)`.
    /// Does not mutate; apply the result with `commit_distribution` once the
    /// ledger moves have succeeded.
    ///
    /// # Errors
    /// Returns `LedgerError::NoFeesToDistribute` if nothing has been collected.
    pub fn plan_distribution<'a, I>(
        &self,
        stakers: I,
        total_staked: TokenAmount,
    ) -> LedgerResult<FeeDistribution>
    where
        I: IntoIterator<Item = (&'a Address, TokenAmount)>,
    {
        if self.undistributed_fees == 0 {
            return Err(LedgerError::NoFeesToDistribute);
        }
        if total_staked == 0 {
            return Ok(FeeDistribution {
                payouts: Vec::new(),
                distributed: 0,
                remaining: self.undistributed_fees,
            });
        }

        let mut payouts = Vec::new();
        let mut distributed: TokenAmount = 0;
        for (staker, staked) in stakers {
            if staked == 0 {
                continue;
            }
            let share = mul_div(self.undistributed_fees, staked, total_staked)?;
            if share > 0 {
                payouts.push((*staker, share));
                distributed += share;
            }
        }

        Ok(FeeDistribution {
            payouts,
            distributed,
            remaining: self.undistributed_fees - distributed,
        })
    }

    /// Remove the distributed portion from the undistributed counter.
    pub fn commit_distribution(&mut self, distribution: &FeeDistribution) {
        self.undistributed_fees = self.undistributed_fees.saturating_sub(distribution.distributed);
    }
}

fn validate_fee_rate(fee_rate_bps: u32) -> LedgerResult<()> {
    if fee_rate_bps > MAX_FEE_RATE_BPS {
        return Err(LedgerError::RateTooHigh {
            rate_bps: fee_rate_bps,
            max_bps: MAX_FEE_RATE_BPS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_core::amount::tokens;

    fn treasury_addr() -> Address {
        Address::from_low_u64(0x7)
    }

    fn a() -> Address {
        Address::from_low_u64(0xa)
    }

    fn b() -> Address {
        Address::from_low_u64(0xb)
    }

    fn module() -> TreasuryFeeModule {
        TreasuryFeeModule::new(treasury_addr(), DEFAULT_FEE_RATE_BPS).unwrap()
    }

    #[test]
    fn test_split_five_percent() {
        let split = module().split(&a(), &b(), tokens(1_000)).unwrap();
        assert_eq!(split.fee, tokens(50));
        assert_eq!(split.net, tokens(950));
    }

    #[test]
    fn test_split_conserves_amount_with_rounding() {
        let m = module();
        for amount in [1u128, 19, 20, 21, 199, 12_345_678_901] {
            let split = m.split(&a(), &b(), amount).unwrap();
            assert_eq!(split.net + split.fee, amount);
        }
        assert_eq!(m.split(&a(), &b(), 19).unwrap().fee, 0);
    }

    #[test]
    fn test_split_exemptions() {
        let mut m = module();
        assert_eq!(m.split(&treasury_addr(), &b(), 1_000).unwrap().fee, 0);
        assert_eq!(m.split(&a(), &treasury_addr(), 1_000).unwrap().fee, 0);

        assert!(m.set_fee_exempt(a(), true));
        assert_eq!(m.split(&a(), &b(), 1_000).unwrap().fee, 0);
        assert_eq!(m.split(&b(), &a(), 1_000).unwrap().fee, 0);
        m.set_fee_exempt(a(), false);
        assert_eq!(m.split(&a(), &b(), 1_000).unwrap().fee, 50);
    }

    #[test]
    fn test_fee_rate_ceiling() {
        let mut m = module();
        assert!(m.set_fee_rate(750).is_ok());
        assert_eq!(m.fee_rate_bps(), 750);
        assert_eq!(
            m.set_fee_rate(1_500),
            Err(LedgerError::RateTooHigh {
                rate_bps: 1_500,
                max_bps: MAX_FEE_RATE_BPS
            })
        );
        assert_eq!(m.fee_rate_bps(), 750);
        assert!(TreasuryFeeModule::new(treasury_addr(), 1_001).is_err());
    }

    #[test]
    fn test_plan_requires_fees() {
        let m = module();
        let stakers = vec![(a(), tokens(10))];
        let result = m.plan_distribution(stakers.iter().map(|(k, v)| (k, *v)), tokens(10));
        assert_eq!(result, Err(LedgerError::NoFeesToDistribute));
    }

    #[test]
    fn test_plan_pro_rata_with_remainder() {
        let mut m = module();
        m.record_fee(100);
        let stakers = vec![(a(), 1u128), (b(), 2u128)];
        let plan = m
            .plan_distribution(stakers.iter().map(|(k, v)| (k, *v)), 3)
            .unwrap();
        assert_eq!(plan.payouts, vec![(a(), 33), (b(), 66)]);
        assert_eq!(plan.distributed, 99);
        assert_eq!(plan.remaining, 1);

        m.commit_distribution(&plan);
        assert_eq!(m.undistributed_fees(), 1);
    }

    #[test]
    fn test_plan_without_stakers_keeps_fees() {
        let mut m = module();
        m.record_fee(tokens(5));
        let plan = m.plan_distribution(std::iter::empty(), 0).unwrap();
        assert!(plan.payouts.is_empty());
        assert_eq!(plan.remaining, tokens(5));
    }
}

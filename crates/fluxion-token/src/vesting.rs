// crates/fluxion-token/src/vesting.rs
//
// Cliff + linear vesting schedules.
//
// Creating a schedule mints its full amount into the ledger's escrow address.
// Tokens vest linearly from `start` over `duration`, but nothing is
// releasable before `start + cliff_duration`:
//
//   now <  start + cliff     -> 0
//   now >= start + duration  -> total
//   otherwise                -> floor(total * (now - start) / duration)
//
// A revocable schedule can be revoked once: the vested-but-unreleased part
// goes to the beneficiary, the unvested part to the treasury, and the
// schedule becomes terminal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::AccountLedger;
use fluxion_core::{mul_div, Address, LedgerError, LedgerResult, Timestamp, TokenAmount};

/// One vesting grant for one beneficiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingSchedule {
    pub total_amount: TokenAmount,
    pub released: TokenAmount,
    pub start: Timestamp,
    pub duration: u64,
    pub cliff_duration: u64,
    pub revocable: bool,
    pub revoked: bool,
}

impl VestingSchedule {
    /// Amount vested at `now`, ignoring what has been released.
    ///
    /// A revoked schedule is frozen at what it had released.
    pub fn vested_amount(&self, now: Timestamp) -> LedgerResult<TokenAmount> {
        if self.revoked {
            return Ok(self.released);
        }
        if now < self.start.saturating_add(self.cliff_duration) {
            return Ok(0);
        }
        if now >= self.start.saturating_add(self.duration) {
            return Ok(self.total_amount);
        }
        mul_div(
            self.total_amount,
            (now - self.start) as u128,
            self.duration as u128,
        )
    }

    /// Vested minus released. Never negative.
    pub fn releasable_amount(&self, now: Timestamp) -> LedgerResult<TokenAmount> {
        Ok(self.vested_amount(now)?.saturating_sub(self.released))
    }

    /// Whether the schedule can no longer release anything.
    pub fn is_terminal(&self) -> bool {
        self.revoked || self.released == self.total_amount
    }
}

/// Outcome of a revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// Vested-but-unreleased amount paid to the beneficiary.
    pub released_to_beneficiary: TokenAmount,
    /// Unvested amount returned to the treasury.
    pub returned_to_treasury: TokenAmount,
}

/// Every beneficiary's ordered list of schedules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VestingEngine {
    schedules: BTreeMap<Address, Vec<VestingSchedule>>,
    /// Escrowed and not yet released or returned.
    total_vesting_amount: TokenAmount,
}

impl VestingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_vesting_amount(&self) -> TokenAmount {
        self.total_vesting_amount
    }

    pub fn schedule_count(&self, beneficiary: &Address) -> usize {
        self.schedules.get(beneficiary).map(Vec::len).unwrap_or(0)
    }

    pub fn schedules(&self, beneficiary: &Address) -> &[VestingSchedule] {
        self.schedules
            .get(beneficiary)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// # Errors
    /// Returns `LedgerError::ScheduleNotFound` for an unknown index.
    pub fn schedule(&self, beneficiary: &Address, index: usize) -> LedgerResult<&VestingSchedule> {
        self.schedules
            .get(beneficiary)
            .and_then(|list| list.get(index))
            .ok_or(LedgerError::ScheduleNotFound {
                beneficiary: *beneficiary,
                index,
            })
    }

    fn schedule_mut(
        &mut self,
        beneficiary: &Address,
        index: usize,
    ) -> LedgerResult<&mut VestingSchedule> {
        self.schedules
            .get_mut(beneficiary)
            .and_then(|list| list.get_mut(index))
            .ok_or(LedgerError::ScheduleNotFound {
                beneficiary: *beneficiary,
                index,
            })
    }

    pub fn releasable_amount(
        &self,
        beneficiary: &Address,
        index: usize,
        now: Timestamp,
    ) -> LedgerResult<TokenAmount> {
        self.schedule(beneficiary, index)?.releasable_amount(now)
    }

    /// Mint `amount` into escrow and append a schedule for `beneficiary`.
    ///
    /// Returns the new schedule's index.
    ///
    /// # Errors
    /// Returns `LedgerError::ZeroAmount`, `LedgerError::InvalidVestingParameters`
    /// for a zero duration or a cliff longer than the duration, or
    /// `LedgerError::SupplyCapExceeded` if the mint would breach the cap.
    #[allow(clippy::too_many_arguments)]
    pub fn create_schedule(
        &mut self,
        ledger: &mut AccountLedger,
        escrow: Address,
        beneficiary: Address,
        amount: TokenAmount,
        start: Timestamp,
        duration: u64,
        cliff_duration: u64,
        revocable: bool,
    ) -> LedgerResult<usize> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if duration == 0 {
            return Err(LedgerError::InvalidVestingParameters(
                "duration must be greater than 0".to_string(),
            ));
        }
        if cliff_duration > duration {
            return Err(LedgerError::InvalidVestingParameters(format!(
                "cliff {}s exceeds duration {}s",
                cliff_duration, duration
            )));
        }
        let total_vesting = self
            .total_vesting_amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        ledger.mint(escrow, amount)?;

        let list = self.schedules.entry(beneficiary).or_default();
        list.push(VestingSchedule {
            total_amount: amount,
            released: 0,
            start,
            duration,
            cliff_duration,
            revocable,
            revoked: false,
        });
        self.total_vesting_amount = total_vesting;
        Ok(list.len() - 1)
    }

    /// Pay out whatever has vested and not yet been released.
    ///
    /// Returns the amount released; zero is a no-op.
    ///
    /// # Errors
    /// Returns `LedgerError::ScheduleNotFound` or `LedgerError::ScheduleRevoked`.
    pub fn release(
        &mut self,
        ledger: &mut AccountLedger,
        escrow: Address,
        beneficiary: Address,
        index: usize,
        now: Timestamp,
    ) -> LedgerResult<TokenAmount> {
        let schedule = self.schedule(&beneficiary, index)?;
        if schedule.revoked {
            return Err(LedgerError::ScheduleRevoked);
        }
        let releasable = schedule.releasable_amount(now)?;
        if releasable == 0 {
            return Ok(0);
        }

        ledger.transfer(&escrow, beneficiary, releasable)?;

        self.schedule_mut(&beneficiary, index)?.released += releasable;
        self.total_vesting_amount -= releasable;
        Ok(releasable)
    }

    /// Revoke a revocable schedule at `now`.
    ///
    /// # Errors
    /// Returns `LedgerError::ScheduleNotFound`, `LedgerError::NotRevocable`,
    /// or `LedgerError::ScheduleRevoked` if it was already revoked.
    pub fn revoke(
        &mut self,
        ledger: &mut AccountLedger,
        escrow: Address,
        treasury: Address,
        beneficiary: Address,
        index: usize,
        now: Timestamp,
    ) -> LedgerResult<Revocation> {
        let schedule = self.schedule(&beneficiary, index)?;
        if !schedule.revocable {
            return Err(LedgerError::NotRevocable);
        }
        if schedule.revoked {
            return Err(LedgerError::ScheduleRevoked);
        }
        let vested = schedule.vested_amount(now)?;
        let revocation = Revocation {
            released_to_beneficiary: vested - schedule.released,
            returned_to_treasury: schedule.total_amount - vested,
        };
        let outstanding = schedule.total_amount - schedule.released;

        ledger.transfer_batch(
            &escrow,
            &[
                (beneficiary, revocation.released_to_beneficiary),
                (treasury, revocation.returned_to_treasury),
            ],
        )?;

        let schedule = self.schedule_mut(&beneficiary, index)?;
        schedule.released = vested;
        schedule.revoked = true;
        self.total_vesting_amount -= outstanding;
        Ok(revocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_core::amount::tokens;
    use fluxion_core::SECONDS_PER_DAY;

    const T0: Timestamp = 1_700_000_000;
    const MONTH: u64 = 30 * SECONDS_PER_DAY;

    fn escrow() -> Address {
        Address::repeat_byte(0xff)
    }

    fn treasury() -> Address {
        Address::from_low_u64(0x7)
    }

    fn beneficiary() -> Address {
        Address::from_low_u64(0x1)
    }

    fn setup() -> (VestingEngine, AccountLedger) {
        (VestingEngine::new(), AccountLedger::new(tokens(1_000_000)))
    }

    fn create(
        engine: &mut VestingEngine,
        ledger: &mut AccountLedger,
        amount: TokenAmount,
        revocable: bool,
    ) -> usize {
        engine
            .create_schedule(
                ledger,
                escrow(),
                beneficiary(),
                amount,
                T0,
                12 * MONTH,
                3 * MONTH,
                revocable,
            )
            .unwrap()
    }

    #[test]
    fn test_create_escrows_amount() {
        let (mut engine, mut ledger) = setup();
        let index = create(&mut engine, &mut ledger, tokens(10_000), false);
        assert_eq!(index, 0);
        assert_eq!(engine.schedule_count(&beneficiary()), 1);
        assert_eq!(engine.total_vesting_amount(), tokens(10_000));
        assert_eq!(ledger.balance_of(&escrow()), tokens(10_000));
    }

    #[test]
    fn test_create_rejects_cliff_past_duration() {
        let (mut engine, mut ledger) = setup();
        let err = engine
            .create_schedule(&mut ledger, escrow(), beneficiary(), 1, T0, 10, 11, false)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidVestingParameters(_)));
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn test_create_rejects_zero_amount_and_duration() {
        let (mut engine, mut ledger) = setup();
        assert_eq!(
            engine.create_schedule(&mut ledger, escrow(), beneficiary(), 0, T0, 10, 0, false),
            Err(LedgerError::ZeroAmount)
        );
        assert!(engine
            .create_schedule(&mut ledger, escrow(), beneficiary(), 1, T0, 0, 0, false)
            .is_err());
    }

    #[test]
    fn test_create_respects_supply_cap() {
        let (mut engine, mut ledger) = setup();
        let err = engine
            .create_schedule(&mut ledger, escrow(), beneficiary(), tokens(2_000_000), T0, 10, 0, false)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SupplyCapExceeded { .. }));
        assert_eq!(engine.schedule_count(&beneficiary()), 0);
        assert_eq!(engine.total_vesting_amount(), 0);
    }

    #[test]
    fn test_nothing_before_cliff() {
        let (mut engine, mut ledger) = setup();
        create(&mut engine, &mut ledger, tokens(12_000), false);
        assert_eq!(engine.releasable_amount(&beneficiary(), 0, T0 + 2 * MONTH).unwrap(), 0);
        assert_eq!(engine.releasable_amount(&beneficiary(), 0, T0 - 1).unwrap(), 0);
    }

    #[test]
    fn test_linear_after_cliff() {
        let (mut engine, mut ledger) = setup();
        create(&mut engine, &mut ledger, tokens(12_000), false);
        assert_eq!(
            engine.releasable_amount(&beneficiary(), 0, T0 + 6 * MONTH).unwrap(),
            tokens(6_000)
        );
        // At the cliff the accrued linear share becomes available at once.
        assert_eq!(
            engine.releasable_amount(&beneficiary(), 0, T0 + 3 * MONTH).unwrap(),
            tokens(3_000)
        );
        assert_eq!(
            engine.releasable_amount(&beneficiary(), 0, T0 + 24 * MONTH).unwrap(),
            tokens(12_000)
        );
    }

    #[test]
    fn test_release_pays_and_is_monotonic() {
        let (mut engine, mut ledger) = setup();
        create(&mut engine, &mut ledger, tokens(12_000), false);

        let first = engine
            .release(&mut ledger, escrow(), beneficiary(), 0, T0 + 6 * MONTH)
            .unwrap();
        assert_eq!(first, tokens(6_000));
        assert_eq!(ledger.balance_of(&beneficiary()), tokens(6_000));
        assert_eq!(engine.total_vesting_amount(), tokens(6_000));

        // Immediately again: nothing new.
        assert_eq!(
            engine
                .release(&mut ledger, escrow(), beneficiary(), 0, T0 + 6 * MONTH)
                .unwrap(),
            0
        );

        let rest = engine
            .release(&mut ledger, escrow(), beneficiary(), 0, T0 + 12 * MONTH)
            .unwrap();
        assert_eq!(rest, tokens(6_000));
        assert!(engine.schedule(&beneficiary(), 0).unwrap().is_terminal());
        assert_eq!(ledger.balance_of(&escrow()), 0);
    }

    #[test]
    fn test_unknown_schedule() {
        let (mut engine, mut ledger) = setup();
        let err = engine
            .release(&mut ledger, escrow(), beneficiary(), 3, T0)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::ScheduleNotFound {
                beneficiary: beneficiary(),
                index: 3
            }
        );
    }

    #[test]
    fn test_revoke_not_revocable() {
        let (mut engine, mut ledger) = setup();
        create(&mut engine, &mut ledger, tokens(12_000), false);
        let err = engine
            .revoke(&mut ledger, escrow(), treasury(), beneficiary(), 0, T0 + 6 * MONTH)
            .unwrap_err();
        assert_eq!(err, LedgerError::NotRevocable);
    }

    #[test]
    fn test_revoke_splits_vested_and_unvested() {
        let (mut engine, mut ledger) = setup();
        create(&mut engine, &mut ledger, tokens(12_000), true);
        engine
            .release(&mut ledger, escrow(), beneficiary(), 0, T0 + 4 * MONTH)
            .unwrap();

        let revocation = engine
            .revoke(&mut ledger, escrow(), treasury(), beneficiary(), 0, T0 + 6 * MONTH)
            .unwrap();
        assert_eq!(revocation.released_to_beneficiary, tokens(2_000));
        assert_eq!(revocation.returned_to_treasury, tokens(6_000));
        assert_eq!(ledger.balance_of(&beneficiary()), tokens(6_000));
        assert_eq!(ledger.balance_of(&treasury()), tokens(6_000));
        assert_eq!(ledger.balance_of(&escrow()), 0);
        assert_eq!(engine.total_vesting_amount(), 0);

        // Terminal afterwards.
        assert_eq!(
            engine.releasable_amount(&beneficiary(), 0, T0 + 12 * MONTH).unwrap(),
            0
        );
        assert_eq!(
            engine.release(&mut ledger, escrow(), beneficiary(), 0, T0 + 12 * MONTH),
            Err(LedgerError::ScheduleRevoked)
        );
        assert_eq!(
            engine.revoke(&mut ledger, escrow(), treasury(), beneficiary(), 0, T0 + 12 * MONTH),
            Err(LedgerError::ScheduleRevoked)
        );
    }

    #[test]
    fn test_multiple_schedules_are_independent() {
        let (mut engine, mut ledger) = setup();
        create(&mut engine, &mut ledger, tokens(12_000), false);
        let second = create(&mut engine, &mut ledger, tokens(1_200), true);
        assert_eq!(second, 1);
        assert_eq!(
            engine.releasable_amount(&beneficiary(), 1, T0 + 6 * MONTH).unwrap(),
            tokens(600)
        );
        assert_eq!(engine.total_vesting_amount(), tokens(13_200));
    }
}

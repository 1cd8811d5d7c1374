// crates/fluxion-token/src/ledger.rs
//
// Account ledger: per-address balances, total supply, and the supply cap.
//
// Every other component moves value only through the primitives here.
// Invariants:
//   - sum(balances) == total_supply
//   - total_supply <= max_supply
// Because every balance is bounded by total_supply, and total_supply by
// max_supply, crediting funds that were just debited can never overflow.
// Each primitive validates first and mutates second, so a failed call leaves
// the ledger untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use fluxion_core::{Address, LedgerError, LedgerResult, TokenAmount};

/// Balances and supply for the single ledger asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedger {
    balances: BTreeMap<Address, TokenAmount>,
    total_supply: TokenAmount,
    max_supply: TokenAmount,
}

impl AccountLedger {
    /// Create an empty ledger with the given supply cap (in base units).
    pub fn new(max_supply: TokenAmount) -> Self {
        Self {
            balances: BTreeMap::new(),
            total_supply: 0,
            max_supply,
        }
    }

    pub fn balance_of(&self, account: &Address) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    pub fn max_supply(&self) -> TokenAmount {
        self.max_supply
    }

    /// Accounts with a non-zero balance, in address order.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &TokenAmount)> {
        self.balances.iter()
    }

    /// Fail with `InsufficientBalance` unless `account` holds at least `amount`.
    pub fn ensure_balance(&self, account: &Address, amount: TokenAmount) -> LedgerResult<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *account,
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Fail with `SupplyCapExceeded` unless `amount` more can be minted.
    pub fn ensure_mintable(&self, amount: TokenAmount) -> LedgerResult<()> {
        let exceeded = LedgerError::SupplyCapExceeded {
            supply: self.total_supply,
            amount,
            cap: self.max_supply,
        };
        match self.total_supply.checked_add(amount) {
            Some(next) if next <= self.max_supply => Ok(()),
            _ => Err(exceeded),
        }
    }

    /// Add to a balance without touching supply.
    ///
    /// Only valid as the second half of a move whose debit already happened;
    /// on its own it would break the supply invariant.
    fn credit(&mut self, account: Address, amount: TokenAmount) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(account).or_insert(0) += amount;
    }

    /// Remove from a balance without touching supply. Caller validated.
    fn debit(&mut self, account: &Address, amount: TokenAmount) {
        if amount == 0 {
            return;
        }
        if let Some(balance) = self.balances.get_mut(account) {
            *balance -= amount;
            if *balance == 0 {
                self.balances.remove(account);
            }
        }
    }

    /// Create `amount` new units in `to`.
    ///
    /// # Errors
    /// Returns `LedgerError::SupplyCapExceeded` if the cap would be breached.
    pub fn mint(&mut self, to: Address, amount: TokenAmount) -> LedgerResult<()> {
        self.ensure_mintable(amount)?;
        self.total_supply += amount;
        self.credit(to, amount);
        Ok(())
    }

    /// Destroy `amount` units held by `from`.
    ///
    /// # Errors
    /// Returns `LedgerError::InsufficientBalance` if `from` holds less.
    pub fn burn(&mut self, from: &Address, amount: TokenAmount) -> LedgerResult<()> {
        self.ensure_balance(from, amount)?;
        self.debit(from, amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` from one account to another.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: Address,
        amount: TokenAmount,
    ) -> LedgerResult<()> {
        self.transfer_batch(from, &[(to, amount)])
    }

    /// Debit `from` once for the sum of `payouts`, then credit each payee.
    ///
    /// The whole batch is validated before any balance changes, so either
    /// every leg applies or none does.
    ///
    /// # Errors
    /// Returns `LedgerError::InsufficientBalance` if `from` cannot cover the
    /// sum, or `LedgerError::Overflow` if the sum itself overflows.
    pub fn transfer_batch(
        &mut self,
        from: &Address,
        payouts: &[(Address, TokenAmount)],
    ) -> LedgerResult<()> {
        let total = payouts
            .iter()
            .try_fold(0u128, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(LedgerError::Overflow)?;
        self.ensure_balance(from, total)?;

        self.debit(from, total);
        for (to, amount) in payouts {
            self.credit(*to, *amount);
        }
        Ok(())
    }

    /// Sum of all balances. Equal to `total_supply()` whenever the ledger is
    /// consistent; exposed for invariant checks.
    pub fn sum_of_balances(&self) -> TokenAmount {
        self.balances.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_core::amount::tokens;

    fn alice() -> Address {
        Address::from_low_u64(0xa1)
    }

    fn bob() -> Address {
        Address::from_low_u64(0xb0)
    }

    #[test]
    fn test_mint_updates_supply_and_balance() {
        let mut ledger = AccountLedger::new(tokens(1_000));
        ledger.mint(alice(), tokens(100)).unwrap();
        assert_eq!(ledger.balance_of(&alice()), tokens(100));
        assert_eq!(ledger.total_supply(), tokens(100));
    }

    #[test]
    fn test_mint_up_to_cap_exactly() {
        let mut ledger = AccountLedger::new(tokens(1_000));
        assert!(ledger.mint(alice(), tokens(1_000)).is_ok());
        let err = ledger.mint(alice(), 1).unwrap_err();
        assert!(matches!(err, LedgerError::SupplyCapExceeded { .. }));
        assert_eq!(ledger.total_supply(), tokens(1_000));
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut ledger = AccountLedger::new(tokens(1_000));
        ledger.mint(alice(), tokens(100)).unwrap();
        ledger.burn(&alice(), tokens(40)).unwrap();
        assert_eq!(ledger.balance_of(&alice()), tokens(60));
        assert_eq!(ledger.total_supply(), tokens(60));
    }

    #[test]
    fn test_burn_insufficient_leaves_state() {
        let mut ledger = AccountLedger::new(tokens(1_000));
        ledger.mint(alice(), tokens(10)).unwrap();
        assert!(ledger.burn(&alice(), tokens(11)).is_err());
        assert_eq!(ledger.balance_of(&alice()), tokens(10));
        assert_eq!(ledger.total_supply(), tokens(10));
    }

    #[test]
    fn test_transfer_moves_value() {
        let mut ledger = AccountLedger::new(tokens(1_000));
        ledger.mint(alice(), tokens(100)).unwrap();
        ledger.transfer(&alice(), bob(), tokens(30)).unwrap();
        assert_eq!(ledger.balance_of(&alice()), tokens(70));
        assert_eq!(ledger.balance_of(&bob()), tokens(30));
        assert_eq!(ledger.sum_of_balances(), ledger.total_supply());
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = AccountLedger::new(tokens(1_000));
        ledger.mint(alice(), tokens(5)).unwrap();
        let err = ledger.transfer(&alice(), bob(), tokens(6)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: alice(),
                available: tokens(5),
                required: tokens(6),
            }
        );
        assert_eq!(ledger.balance_of(&bob()), 0);
    }

    #[test]
    fn test_transfer_batch_is_all_or_nothing() {
        let carol = Address::from_low_u64(0xc0);
        let mut ledger = AccountLedger::new(tokens(1_000));
        ledger.mint(alice(), tokens(100)).unwrap();

        let err = ledger.transfer_batch(&alice(), &[(bob(), tokens(60)), (carol, tokens(50))]);
        assert!(err.is_err());
        assert_eq!(ledger.balance_of(&alice()), tokens(100));
        assert_eq!(ledger.balance_of(&bob()), 0);

        ledger
            .transfer_batch(&alice(), &[(bob(), tokens(60)), (carol, tokens(40))])
            .unwrap();
        assert_eq!(ledger.balance_of(&alice()), 0);
        assert_eq!(ledger.balance_of(&carol), tokens(40));
    }

    #[test]
    fn test_zero_balances_are_pruned() {
        let mut ledger = AccountLedger::new(tokens(1_000));
        ledger.mint(alice(), tokens(1)).unwrap();
        ledger.transfer(&alice(), bob(), tokens(1)).unwrap();
        assert_eq!(ledger.holders().count(), 1);
    }
}

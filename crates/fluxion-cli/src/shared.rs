// crates/fluxion-cli/src/shared.rs
//
// SharedToken: the ledger behind one async reader/writer lock.
//
// Every write closure runs under the exclusive lock, so concurrent callers
// serialize on a single writer and never interleave their read-modify-write
// sequences. Reads share the lock. Closures are synchronous and must not
// await while holding it.

use std::sync::Arc;

use tokio::sync::RwLock;

use fluxion_token::GovernanceToken;

/// Cloneable handle to a ledger shared between tokio tasks.
#[derive(Clone)]
pub struct SharedToken {
    inner: Arc<RwLock<GovernanceToken>>,
}

impl SharedToken {
    pub fn new(token: GovernanceToken) -> Self {
        Self {
            inner: Arc::new(RwLock::new(token)),
        }
    }

    /// Run a read-only closure against the ledger.
    pub async fn read<R>(&self, f: impl FnOnce(&GovernanceToken) -> R) -> R {
        let guard = self.inner.read().await;
        f(&guard)
    }

    /// Run a mutating closure against the ledger with exclusive access.
    pub async fn write<R>(&self, f: impl FnOnce(&mut GovernanceToken) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_core::amount::tokens;
    use fluxion_core::Address;
    use fluxion_token::TokenConfig;

    #[tokio::test]
    async fn test_concurrent_transfers_serialize() {
        let shared = SharedToken::new(GovernanceToken::new(TokenConfig::default()).unwrap());
        let admin = Address::from_low_u64(0x1);

        let mut handles = Vec::new();
        for i in 0..16u64 {
            let handle = shared.clone();
            handles.push(tokio::spawn(async move {
                let to = Address::from_low_u64(0x100 + i);
                handle
                    .write(|token| token.transfer(admin, to, tokens(100), 0))
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let (supply, sum, fees) = shared
            .read(|token| {
                (
                    token.total_supply(),
                    token.sum_of_balances(),
                    token.undistributed_fees(),
                )
            })
            .await;
        assert_eq!(supply, sum);
        assert_eq!(fees, tokens(16 * 5));
        for i in 0..16u64 {
            let account = Address::from_low_u64(0x100 + i);
            let balance = shared.read(|token| token.balance_of(&account)).await;
            assert_eq!(balance, tokens(95));
        }
    }

    #[tokio::test]
    async fn test_concurrent_stake_unstake_keeps_totals() {
        let shared = SharedToken::new(GovernanceToken::new(TokenConfig::default()).unwrap());
        let admin = Address::from_low_u64(0x1);

        let stakers: Vec<_> = (0..8)
            .map(|_| {
                let handle = shared.clone();
                tokio::spawn(async move {
                    handle.write(|token| token.stake(admin, tokens(10), 0, 0)).await?;
                    handle.write(|token| token.unstake(admin, tokens(10), 0)).await
                })
            })
            .collect();
        for h in stakers {
            h.await.unwrap().unwrap();
        }

        let total_staked = shared.read(|token| token.total_staked()).await;
        assert_eq!(total_staked, 0);
        let balance = shared.read(|token| token.balance_of(&admin)).await;
        assert_eq!(balance, tokens(100_000_000));
    }
}

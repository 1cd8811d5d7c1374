// crates/fluxion-token/src/events.rs
//
// Ledger events appended by every successful mutation.
//
// The log is in-process only; callers drain it to forward events to
// whatever transport fronts the ledger. Failed calls append nothing.

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::compliance::ComplianceLimits;
use crate::governance::GovernanceParams;
use fluxion_core::{Address, Timestamp, TokenAmount};

/// A state change on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Value moved between accounts (net of any fee).
    Transfer {
        from: Address,
        to: Address,
        amount: TokenAmount,
    },
    Mint {
        to: Address,
        amount: TokenAmount,
    },
    Burn {
        from: Address,
        amount: TokenAmount,
    },
    /// A treasury fee was taken from a transfer.
    FeesCollected {
        from: Address,
        treasury: Address,
        fee: TokenAmount,
    },
    Staked {
        account: Address,
        amount: TokenAmount,
        lock_period: u64,
        at: Timestamp,
    },
    Unstaked {
        account: Address,
        amount: TokenAmount,
        at: Timestamp,
    },
    RewardsClaimed {
        account: Address,
        amount: TokenAmount,
        at: Timestamp,
    },
    VestingScheduleCreated {
        beneficiary: Address,
        index: usize,
        amount: TokenAmount,
        start: Timestamp,
        duration: u64,
        cliff_duration: u64,
        revocable: bool,
    },
    TokensReleased {
        beneficiary: Address,
        index: usize,
        amount: TokenAmount,
        at: Timestamp,
    },
    VestingRevoked {
        beneficiary: Address,
        index: usize,
        released: TokenAmount,
        returned: TokenAmount,
        at: Timestamp,
    },
    FeesDistributed {
        total: TokenAmount,
        stakers: usize,
        at: Timestamp,
    },
    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
    BlacklistUpdated {
        account: Address,
        blacklisted: bool,
    },
    WhitelistUpdated {
        account: Address,
        whitelisted: bool,
    },
    WhitelistToggled {
        enabled: bool,
    },
    ComplianceLimitsUpdated {
        limits: ComplianceLimits,
    },
    GovernanceParametersUpdated {
        params: GovernanceParams,
    },
    TreasuryUpdated {
        previous: Address,
        current: Address,
    },
    TreasuryFeeRateUpdated {
        fee_rate_bps: u32,
    },
    FeeExemptionUpdated {
        account: Address,
        exempt: bool,
    },
    RewardRateUpdated {
        reward_rate_bps: u32,
    },
}

/// Append-only event buffer.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take every buffered event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_drain() {
        let mut log = EventLog::new();
        log.emit(LedgerEvent::WhitelistToggled { enabled: true });
        log.emit(LedgerEvent::Paused {
            by: Address::from_low_u64(1),
        });
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_serializes_with_tag() {
        let event = LedgerEvent::Mint {
            to: Address::from_low_u64(1),
            amount: 5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "mint");
        assert_eq!(json["amount"], 5);
    }
}

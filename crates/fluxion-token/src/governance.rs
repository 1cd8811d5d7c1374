// crates/fluxion-token/src/governance.rs
//
// Governance parameter store.
//
// The ledger does not run proposals or votes. It only holds the numeric
// knobs an external voting system reads, and guarantees they stay in bounds:
//   - quorum_percentage <= 20
//   - voting_period >= the configured minimum

use serde::{Deserialize, Serialize};

use fluxion_core::amount::tokens;
use fluxion_core::{LedgerError, LedgerResult, TokenAmount, SECONDS_PER_DAY};

/// Highest allowed quorum, in percent.
pub const MAX_QUORUM_PERCENTAGE: u8 = 20;

/// Default floor on the voting period: one day.
pub const DEFAULT_MIN_VOTING_PERIOD: u64 = SECONDS_PER_DAY;

/// The governance knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Tokens needed to open a proposal, in base units.
    pub proposal_threshold: TokenAmount,
    /// Seconds between proposal creation and voting start.
    pub voting_delay: u64,
    /// Seconds a vote stays open.
    pub voting_period: u64,
    /// Share of supply that must vote, in percent.
    pub quorum_percentage: u8,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            proposal_threshold: tokens(1_000_000),
            voting_delay: SECONDS_PER_DAY,
            voting_period: 7 * SECONDS_PER_DAY,
            quorum_percentage: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceParameterStore {
    params: GovernanceParams,
    min_voting_period: u64,
}

impl GovernanceParameterStore {
    /// # Errors
    /// Returns the same errors as `update` if `params` are out of bounds.
    pub fn new(params: GovernanceParams, min_voting_period: u64) -> LedgerResult<Self> {
        validate(&params, min_voting_period)?;
        Ok(Self {
            params,
            min_voting_period,
        })
    }

    pub fn params(&self) -> GovernanceParams {
        self.params
    }

    pub fn min_voting_period(&self) -> u64 {
        self.min_voting_period
    }

    /// Replace all four parameters at once, or none of them.
    ///
    /// # Errors
    /// Returns `LedgerError::QuorumTooHigh` above 20% and
    /// `LedgerError::VotingPeriodTooShort` below the floor.
    pub fn update(&mut self, params: GovernanceParams) -> LedgerResult<()> {
        validate(&params, self.min_voting_period)?;
        self.params = params;
        Ok(())
    }
}

fn validate(params: &GovernanceParams, min_voting_period: u64) -> LedgerResult<()> {
    if params.quorum_percentage > MAX_QUORUM_PERCENTAGE {
        return Err(LedgerError::QuorumTooHigh {
            quorum: params.quorum_percentage,
            max: MAX_QUORUM_PERCENTAGE,
        });
    }
    if params.voting_period < min_voting_period {
        return Err(LedgerError::VotingPeriodTooShort {
            period: params.voting_period,
            minimum: min_voting_period,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> GovernanceParameterStore {
        GovernanceParameterStore::new(GovernanceParams::default(), DEFAULT_MIN_VOTING_PERIOD).unwrap()
    }

    #[test]
    fn test_defaults() {
        let params = store().params();
        assert_eq!(params.proposal_threshold, tokens(1_000_000));
        assert_eq!(params.voting_delay, 86_400);
        assert_eq!(params.voting_period, 604_800);
        assert_eq!(params.quorum_percentage, 4);
    }

    #[test]
    fn test_update_applies_all_fields() {
        let mut store = store();
        let next = GovernanceParams {
            proposal_threshold: tokens(2_000_000),
            voting_delay: 172_800,
            voting_period: 1_209_600,
            quorum_percentage: 5,
        };
        store.update(next).unwrap();
        assert_eq!(store.params(), next);
    }

    #[test]
    fn test_quorum_too_high() {
        let mut store = store();
        let next = GovernanceParams {
            quorum_percentage: 25,
            ..GovernanceParams::default()
        };
        assert_eq!(
            store.update(next),
            Err(LedgerError::QuorumTooHigh { quorum: 25, max: 20 })
        );
        assert_eq!(store.params(), GovernanceParams::default());
    }

    #[test]
    fn test_quorum_at_ceiling_allowed() {
        let mut store = store();
        let next = GovernanceParams {
            quorum_percentage: 20,
            ..GovernanceParams::default()
        };
        assert!(store.update(next).is_ok());
    }

    #[test]
    fn test_voting_period_too_short() {
        let mut store = store();
        let next = GovernanceParams {
            voting_period: 3_600,
            ..GovernanceParams::default()
        };
        assert_eq!(
            store.update(next),
            Err(LedgerError::VotingPeriodTooShort {
                period: 3_600,
                minimum: DEFAULT_MIN_VOTING_PERIOD
            })
        );
    }

    #[test]
    fn test_new_validates() {
        let bad = GovernanceParams {
            voting_period: 10,
            ..GovernanceParams::default()
        };
        assert!(GovernanceParameterStore::new(bad, DEFAULT_MIN_VOTING_PERIOD).is_err());
    }
}

// crates/fluxion-token/src/config.rs
//
// Genesis configuration for a ledger instance.
// Deserialized from TOML by the CLI or populated with defaults.
//
// Supply figures are whole tokens (u64) so they fit TOML integers; the
// ledger scales them to 18-decimal base units.

use serde::{Deserialize, Serialize};

use crate::governance::{GovernanceParams, DEFAULT_MIN_VOTING_PERIOD, MAX_QUORUM_PERCENTAGE};
use crate::staking::{DEFAULT_REWARD_RATE_BPS, MAX_REWARD_RATE_BPS};
use crate::treasury::{DEFAULT_FEE_RATE_BPS, MAX_FEE_RATE_BPS};
use fluxion_core::amount::tokens;
use fluxion_core::{Address, LedgerError, LedgerResult, TokenAmount, SECONDS_PER_DAY, TOKEN_DECIMALS};

/// Genesis parameters for `GovernanceToken::new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Display decimals. Accounting is always 18-decimal.
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Supply minted to the admin at genesis, in whole tokens.
    #[serde(default = "default_initial_supply_tokens")]
    pub initial_supply_tokens: u64,

    /// Hard cap on total supply, in whole tokens.
    #[serde(default = "default_max_supply_tokens")]
    pub max_supply_tokens: u64,

    /// Staking APY in basis points.
    #[serde(default = "default_reward_rate_bps")]
    pub reward_rate_bps: u32,

    /// Transfer fee in basis points.
    #[serde(default = "default_treasury_fee_rate_bps")]
    pub treasury_fee_rate_bps: u32,

    #[serde(default = "default_proposal_threshold_tokens")]
    pub proposal_threshold_tokens: u64,

    /// Seconds.
    #[serde(default = "default_voting_delay")]
    pub voting_delay: u64,

    /// Seconds.
    #[serde(default = "default_voting_period")]
    pub voting_period: u64,

    #[serde(default = "default_quorum_percentage")]
    pub quorum_percentage: u8,

    /// Floor applied to every voting-period update, in seconds.
    #[serde(default = "default_min_voting_period")]
    pub min_voting_period: u64,

    /// Genesis holder of every role and of the initial supply.
    #[serde(default = "default_admin")]
    pub admin: Address,

    /// Fee recipient; granted the Treasury role at genesis.
    #[serde(default = "default_treasury")]
    pub treasury: Address,

    /// The ledger's own account: staking pool and vesting escrow.
    #[serde(default = "default_contract")]
    pub contract: Address,
}

fn default_name() -> String {
    "Fluxion Governance Token".to_string()
}

fn default_symbol() -> String {
    "FGT".to_string()
}

fn default_decimals() -> u8 {
    TOKEN_DECIMALS
}

fn default_initial_supply_tokens() -> u64 {
    100_000_000
}

fn default_max_supply_tokens() -> u64 {
    1_000_000_000
}

fn default_reward_rate_bps() -> u32 {
    DEFAULT_REWARD_RATE_BPS
}

fn default_treasury_fee_rate_bps() -> u32 {
    DEFAULT_FEE_RATE_BPS
}

fn default_proposal_threshold_tokens() -> u64 {
    1_000_000
}

fn default_voting_delay() -> u64 {
    SECONDS_PER_DAY
}

fn default_voting_period() -> u64 {
    7 * SECONDS_PER_DAY
}

fn default_quorum_percentage() -> u8 {
    4
}

fn default_min_voting_period() -> u64 {
    DEFAULT_MIN_VOTING_PERIOD
}

fn default_admin() -> Address {
    Address::from_low_u64(0x1)
}

fn default_treasury() -> Address {
    Address::from_low_u64(0x2)
}

fn default_contract() -> Address {
    Address::repeat_byte(0xff)
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
            initial_supply_tokens: default_initial_supply_tokens(),
            max_supply_tokens: default_max_supply_tokens(),
            reward_rate_bps: default_reward_rate_bps(),
            treasury_fee_rate_bps: default_treasury_fee_rate_bps(),
            proposal_threshold_tokens: default_proposal_threshold_tokens(),
            voting_delay: default_voting_delay(),
            voting_period: default_voting_period(),
            quorum_percentage: default_quorum_percentage(),
            min_voting_period: default_min_voting_period(),
            admin: default_admin(),
            treasury: default_treasury(),
            contract: default_contract(),
        }
    }
}

impl TokenConfig {
    pub fn initial_supply(&self) -> TokenAmount {
        tokens(self.initial_supply_tokens)
    }

    pub fn max_supply(&self) -> TokenAmount {
        tokens(self.max_supply_tokens)
    }

    pub fn governance_params(&self) -> GovernanceParams {
        GovernanceParams {
            proposal_threshold: tokens(self.proposal_threshold_tokens),
            voting_delay: self.voting_delay,
            voting_period: self.voting_period,
            quorum_percentage: self.quorum_percentage,
        }
    }

    /// Check the config is internally consistent.
    ///
    /// # Errors
    /// Returns `LedgerError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.initial_supply_tokens > self.max_supply_tokens {
            return Err(LedgerError::InvalidConfig(format!(
                "initial supply {} exceeds max supply {}",
                self.initial_supply_tokens, self.max_supply_tokens
            )));
        }
        if self.reward_rate_bps > MAX_REWARD_RATE_BPS {
            return Err(LedgerError::InvalidConfig(format!(
                "reward_rate_bps {} exceeds {}",
                self.reward_rate_bps, MAX_REWARD_RATE_BPS
            )));
        }
        if self.treasury_fee_rate_bps > MAX_FEE_RATE_BPS {
            return Err(LedgerError::InvalidConfig(format!(
                "treasury_fee_rate_bps {} exceeds {}",
                self.treasury_fee_rate_bps, MAX_FEE_RATE_BPS
            )));
        }
        if self.quorum_percentage > MAX_QUORUM_PERCENTAGE {
            return Err(LedgerError::InvalidConfig(format!(
                "quorum_percentage {} exceeds {}",
                self.quorum_percentage, MAX_QUORUM_PERCENTAGE
            )));
        }
        if self.voting_period < self.min_voting_period {
            return Err(LedgerError::InvalidConfig(format!(
                "voting_period {}s is below min_voting_period {}s",
                self.voting_period, self.min_voting_period
            )));
        }
        if self.contract == self.admin || self.contract == self.treasury {
            return Err(LedgerError::InvalidConfig(
                "contract address must differ from admin and treasury".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TokenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.symbol, "FGT");
        assert_eq!(config.initial_supply(), tokens(100_000_000));
        assert_eq!(config.governance_params(), GovernanceParams::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TokenConfig = serde_json::from_str(r#"{"symbol": "TST"}"#).unwrap();
        assert_eq!(config.symbol, "TST");
        assert_eq!(config.reward_rate_bps, DEFAULT_REWARD_RATE_BPS);
    }

    #[test]
    fn test_initial_above_max_rejected() {
        let config = TokenConfig {
            initial_supply_tokens: 10,
            max_supply_tokens: 5,
            ..TokenConfig::default()
        };
        assert!(matches!(config.validate(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rates_and_governance_bounds() {
        let high_fee = TokenConfig {
            treasury_fee_rate_bps: 1_001,
            ..TokenConfig::default()
        };
        assert!(high_fee.validate().is_err());

        let short_period = TokenConfig {
            voting_period: 3_600,
            ..TokenConfig::default()
        };
        assert!(short_period.validate().is_err());
    }

    #[test]
    fn test_contract_address_must_be_distinct() {
        let config = TokenConfig {
            contract: default_admin(),
            ..TokenConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

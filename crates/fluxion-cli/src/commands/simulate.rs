// crates/fluxion-cli/src/commands/simulate.rs
//
// `fluxion simulate <scenario.json>` — replay a scenario against a fresh
// in-process ledger.
//
// A scenario is a JSON array of steps:
//
//   [
//     {"at": 0, "call": {"op": "transfer", "from": "0x..01", "to": "0x..0a", "amount": "1000"}},
//     {"at": 86400, "call": {"op": "stake", "account": "0x..0a", "amount": "500", "lock_period": 604800}}
//   ]
//
// Amounts are decimal token strings ("12.5"); `at` is the `now` handed to
// the ledger. A failing step is reported with its error and does not stop
// the run. Every step goes through `SharedToken`.

use serde::{Deserialize, Serialize};
use std::fs;
use tabled::Tabled;
use thiserror::Error;

use fluxion_core::{Address, Fgt, LedgerError, LedgerResult, Timestamp, TokenAmount};
use fluxion_token::{ComplianceLimits, GovernanceParams, GovernanceToken, Role, TokenConfig};

use crate::output::{balance_rows, format_json, format_table, BalanceRow, OutputFormat};
use crate::shared::SharedToken;

/// Errors that stop a scenario before it runs.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Could not read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not build ledger: {0}")]
    Genesis(#[from] LedgerError),
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// The `now` passed to the ledger for this step.
    pub at: Timestamp,
    pub call: Call,
}

/// Ledger calls a scenario can make.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    Transfer {
        from: Address,
        to: Address,
        amount: String,
    },
    Mint {
        caller: Address,
        to: Address,
        amount: String,
    },
    Burn {
        caller: Address,
        from: Address,
        amount: String,
    },
    Stake {
        account: Address,
        amount: String,
        #[serde(default)]
        lock_period: u64,
    },
    Unstake {
        account: Address,
        amount: String,
    },
    ClaimRewards {
        account: Address,
    },
    CreateVestingSchedule {
        caller: Address,
        beneficiary: Address,
        amount: String,
        /// Defaults to the step's `at`.
        #[serde(default)]
        start: Option<Timestamp>,
        duration: u64,
        #[serde(default)]
        cliff_duration: u64,
        #[serde(default)]
        revocable: bool,
    },
    ReleaseVestedTokens {
        beneficiary: Address,
        #[serde(default)]
        index: usize,
    },
    RevokeVesting {
        caller: Address,
        beneficiary: Address,
        #[serde(default)]
        index: usize,
    },
    Pause {
        caller: Address,
    },
    Unpause {
        caller: Address,
    },
    GrantRole {
        caller: Address,
        role: Role,
        account: Address,
    },
    RevokeRole {
        caller: Address,
        role: Role,
        account: Address,
    },
    RenounceRole {
        account: Address,
        role: Role,
    },
    UpdateBlacklist {
        caller: Address,
        account: Address,
        blacklisted: bool,
    },
    UpdateWhitelist {
        caller: Address,
        account: Address,
        whitelisted: bool,
    },
    SetWhitelistEnabled {
        caller: Address,
        enabled: bool,
    },
    UpdateComplianceLimits {
        caller: Address,
        max_transfer_amount: String,
        max_daily_transfer_amount: String,
    },
    UpdateGovernanceParameters {
        caller: Address,
        proposal_threshold: String,
        voting_delay: u64,
        voting_period: u64,
        quorum_percentage: u8,
    },
    UpdateTreasury {
        caller: Address,
        treasury: Address,
    },
    UpdateTreasuryFeeRate {
        caller: Address,
        fee_rate_bps: u32,
    },
    UpdateFeeExemption {
        caller: Address,
        account: Address,
        exempt: bool,
    },
    UpdateRewardRate {
        caller: Address,
        reward_rate_bps: u32,
    },
    DistributeFees {
        caller: Address,
    },
    BalanceOf {
        account: Address,
    },
    StakingInfo {
        account: Address,
    },
    CalculateReleasableAmount {
        beneficiary: Address,
        #[serde(default)]
        index: usize,
    },
    CanTransfer {
        from: Address,
        to: Address,
        amount: String,
    },
}

impl Call {
    /// Short operation name for reports.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Transfer { .. } => "transfer",
            Call::Mint { .. } => "mint",
            Call::Burn { .. } => "burn",
            Call::Stake { .. } => "stake",
            Call::Unstake { .. } => "unstake",
            Call::ClaimRewards { .. } => "claim_rewards",
            Call::CreateVestingSchedule { .. } => "create_vesting_schedule",
            Call::ReleaseVestedTokens { .. } => "release_vested_tokens",
            Call::RevokeVesting { .. } => "revoke_vesting",
            Call::Pause { .. } => "pause",
            Call::Unpause { .. } => "unpause",
            Call::GrantRole { .. } => "grant_role",
            Call::RevokeRole { .. } => "revoke_role",
            Call::RenounceRole { .. } => "renounce_role",
            Call::UpdateBlacklist { .. } => "update_blacklist",
            Call::UpdateWhitelist { .. } => "update_whitelist",
            Call::SetWhitelistEnabled { .. } => "set_whitelist_enabled",
            Call::UpdateComplianceLimits { .. } => "update_compliance_limits",
            Call::UpdateGovernanceParameters { .. } => "update_governance_parameters",
            Call::UpdateTreasury { .. } => "update_treasury",
            Call::UpdateTreasuryFeeRate { .. } => "update_treasury_fee_rate",
            Call::UpdateFeeExemption { .. } => "update_fee_exemption",
            Call::UpdateRewardRate { .. } => "update_reward_rate",
            Call::DistributeFees { .. } => "distribute_fees",
            Call::BalanceOf { .. } => "balance_of",
            Call::StakingInfo { .. } => "staking_info",
            Call::CalculateReleasableAmount { .. } => "calculate_releasable_amount",
            Call::CanTransfer { .. } => "can_transfer",
        }
    }

    /// Whether the call only reads ledger state.
    pub fn is_view(&self) -> bool {
        matches!(
            self,
            Call::BalanceOf { .. }
                | Call::StakingInfo { .. }
                | Call::CalculateReleasableAmount { .. }
                | Call::CanTransfer { .. }
        )
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct StepOutcome {
    #[tabled(rename = "#")]
    pub step: usize,
    #[tabled(rename = "At")]
    pub at: Timestamp,
    #[tabled(rename = "Call")]
    pub call: String,
    #[tabled(rename = "Result")]
    pub result: String,
    #[tabled(rename = "Detail")]
    pub detail: String,
}

/// Full report printed at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepOutcome>,
    pub balances: Vec<BalanceRow>,
    pub total_supply: String,
    pub total_staked: String,
    pub undistributed_fees: String,
    pub events: usize,
}

fn parse_amount(raw: &str) -> LedgerResult<TokenAmount> {
    Ok(raw.parse::<Fgt>()?.units)
}

fn show(amount: TokenAmount) -> String {
    Fgt::from_units(amount).to_string()
}

/// Apply a mutating call. Returns a one-line description of the result.
fn apply(token: &mut GovernanceToken, call: &Call, now: Timestamp) -> LedgerResult<String> {
    match call {
        Call::Transfer { from, to, amount } => {
            let amount = parse_amount(amount)?;
            let fee_before = token.undistributed_fees();
            token.transfer(*from, *to, amount, now)?;
            let fee = token.undistributed_fees() - fee_before;
            Ok(format!("sent {} (fee {})", show(amount - fee), show(fee)))
        }
        Call::Mint { caller, to, amount } => {
            let amount = parse_amount(amount)?;
            token.mint(*caller, *to, amount)?;
            Ok(format!("minted {}", show(amount)))
        }
        Call::Burn { caller, from, amount } => {
            let amount = parse_amount(amount)?;
            token.burn(*caller, *from, amount)?;
            Ok(format!("burned {}", show(amount)))
        }
        Call::Stake {
            account,
            amount,
            lock_period,
        } => {
            let amount = parse_amount(amount)?;
            token.stake(*account, amount, *lock_period, now)?;
            Ok(format!("staked {} (lock {}s)", show(amount), lock_period))
        }
        Call::Unstake { account, amount } => {
            let amount = parse_amount(amount)?;
            token.unstake(*account, amount, now)?;
            Ok(format!("unstaked {}", show(amount)))
        }
        Call::ClaimRewards { account } => {
            let reward = token.claim_rewards(*account, now)?;
            Ok(format!("claimed {}", show(reward)))
        }
        Call::CreateVestingSchedule {
            caller,
            beneficiary,
            amount,
            start,
            duration,
            cliff_duration,
            revocable,
        } => {
            let amount = parse_amount(amount)?;
            let index = token.create_vesting_schedule(
                *caller,
                *beneficiary,
                amount,
                start.unwrap_or(now),
                *duration,
                *cliff_duration,
                *revocable,
                now,
            )?;
            Ok(format!("schedule #{} for {}", index, show(amount)))
        }
        Call::ReleaseVestedTokens { beneficiary, index } => {
            let released = token.release_vested_tokens(*beneficiary, *index, now)?;
            Ok(format!("released {}", show(released)))
        }
        Call::RevokeVesting {
            caller,
            beneficiary,
            index,
        } => {
            let revocation = token.revoke_vesting(*caller, *beneficiary, *index, now)?;
            Ok(format!(
                "released {}, returned {}",
                show(revocation.released_to_beneficiary),
                show(revocation.returned_to_treasury)
            ))
        }
        Call::Pause { caller } => {
            token.pause(*caller)?;
            Ok("paused".to_string())
        }
        Call::Unpause { caller } => {
            token.unpause(*caller)?;
            Ok("unpaused".to_string())
        }
        Call::GrantRole {
            caller,
            role,
            account,
        } => {
            token.grant_role(*caller, *role, *account)?;
            Ok(format!("{} granted to {}", role, account))
        }
        Call::RevokeRole {
            caller,
            role,
            account,
        } => {
            token.revoke_role(*caller, *role, *account)?;
            Ok(format!("{} revoked from {}", role, account))
        }
        Call::RenounceRole { account, role } => {
            token.renounce_role(*account, *role)?;
            Ok(format!("{} renounced by {}", role, account))
        }
        Call::UpdateBlacklist {
            caller,
            account,
            blacklisted,
        } => {
            token.update_blacklist(*caller, *account, *blacklisted)?;
            Ok(format!("blacklisted={}", blacklisted))
        }
        Call::UpdateWhitelist {
            caller,
            account,
            whitelisted,
        } => {
            token.update_whitelist(*caller, *account, *whitelisted)?;
            Ok(format!("whitelisted={}", whitelisted))
        }
        Call::SetWhitelistEnabled { caller, enabled } => {
            token.set_whitelist_enabled(*caller, *enabled)?;
            Ok(format!("whitelist mode={}", enabled))
        }
        Call::UpdateComplianceLimits {
            caller,
            max_transfer_amount,
            max_daily_transfer_amount,
        } => {
            let limits = ComplianceLimits {
                max_transfer_amount: parse_amount(max_transfer_amount)?,
                max_daily_transfer_amount: parse_amount(max_daily_transfer_amount)?,
            };
            token.update_compliance_limits(*caller, limits)?;
            Ok(format!(
                "per-transfer {}, daily {}",
                show(limits.max_transfer_amount),
                show(limits.max_daily_transfer_amount)
            ))
        }
        Call::UpdateGovernanceParameters {
            caller,
            proposal_threshold,
            voting_delay,
            voting_period,
            quorum_percentage,
        } => {
            let params = GovernanceParams {
                proposal_threshold: parse_amount(proposal_threshold)?,
                voting_delay: *voting_delay,
                voting_period: *voting_period,
                quorum_percentage: *quorum_percentage,
            };
            token.update_governance_parameters(*caller, params)?;
            Ok(format!("quorum {}%, period {}s", quorum_percentage, voting_period))
        }
        Call::UpdateTreasury { caller, treasury } => {
            token.update_treasury(*caller, *treasury)?;
            Ok(format!("treasury {}", treasury))
        }
        Call::UpdateTreasuryFeeRate {
            caller,
            fee_rate_bps,
        } => {
            token.update_treasury_fee_rate(*caller, *fee_rate_bps)?;
            Ok(format!("fee {} bps", fee_rate_bps))
        }
        Call::UpdateFeeExemption {
            caller,
            account,
            exempt,
        } => {
            token.update_fee_exemption(*caller, *account, *exempt)?;
            Ok(format!("fee exempt={}", exempt))
        }
        Call::UpdateRewardRate {
            caller,
            reward_rate_bps,
        } => {
            token.update_reward_rate(*caller, *reward_rate_bps)?;
            Ok(format!("reward {} bps", reward_rate_bps))
        }
        Call::DistributeFees { caller } => {
            let distribution = token.distribute_fees(*caller, now)?;
            Ok(format!(
                "distributed {} to {} stakers, {} remaining",
                show(distribution.distributed),
                distribution.payouts.len(),
                show(distribution.remaining)
            ))
        }
        Call::BalanceOf { .. }
        | Call::StakingInfo { .. }
        | Call::CalculateReleasableAmount { .. }
        | Call::CanTransfer { .. } => query(token, call, now),
    }
}

/// Answer a read-only call.
fn query(token: &GovernanceToken, call: &Call, now: Timestamp) -> LedgerResult<String> {
    match call {
        Call::BalanceOf { account } => Ok(show(token.balance_of(account))),
        Call::StakingInfo { account } => {
            let info = token.staking_info(account, now)?;
            Ok(format!(
                "staked {}, unlocks at {}, pending {}",
                show(info.staked_amount),
                info.unlock_time,
                show(info.pending_rewards)
            ))
        }
        Call::CalculateReleasableAmount { beneficiary, index } => {
            Ok(show(token.calculate_releasable_amount(beneficiary, *index, now)?))
        }
        Call::CanTransfer { from, to, amount } => {
            let amount = parse_amount(amount)?;
            match token.check_transfer(from, to, amount, now) {
                Ok(()) => Ok("allowed".to_string()),
                Err(e) => Ok(format!("denied: {}", e)),
            }
        }
        other => Err(LedgerError::InvalidConfig(format!(
            "{} is not a read-only call",
            other.name()
        ))),
    }
}

/// Parse scenario JSON.
pub fn parse_scenario(raw: &str) -> Result<Vec<Step>, ScenarioError> {
    Ok(serde_json::from_str(raw)?)
}

/// Run every step in order against `shared`.
pub async fn run_steps(shared: &SharedToken, steps: &[Step]) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let result = if step.call.is_view() {
            shared.read(|token| query(token, &step.call, step.at)).await
        } else {
            shared.write(|token| apply(token, &step.call, step.at)).await
        };
        let (result, detail) = match result {
            Ok(detail) => ("ok".to_string(), detail),
            Err(e) => {
                tracing::debug!(step = i + 1, call = step.call.name(), error = %e, "Step failed");
                ("error".to_string(), e.to_string())
            }
        };
        outcomes.push(StepOutcome {
            step: i + 1,
            at: step.at,
            call: step.call.name().to_string(),
            result,
            detail,
        });
    }
    outcomes
}

/// Build the closing report from the final ledger state.
pub async fn report(shared: &SharedToken, steps: Vec<StepOutcome>) -> SimulationReport {
    shared
        .read(|token| SimulationReport {
            steps,
            balances: balance_rows(token),
            total_supply: show(token.total_supply()),
            total_staked: show(token.total_staked()),
            undistributed_fees: show(token.undistributed_fees()),
            events: token.events().len(),
        })
        .await
}

/// Run the simulate subcommand.
pub async fn run(
    config: &TokenConfig,
    path: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = GovernanceToken::new(config.clone()).map_err(ScenarioError::Genesis)?;
    let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_string(),
        source,
    })?;
    let steps = parse_scenario(&raw)?;
    tracing::info!(steps = steps.len(), scenario = %path, "Running scenario");

    let shared = SharedToken::new(token);
    let outcomes = run_steps(&shared, &steps).await;
    let report = report(&shared, outcomes).await;

    match format {
        OutputFormat::Table => {
            println!("{}", format_table(&report.steps));
            println!();
            println!("{}", format_table(&report.balances));
            println!();
            println!("Total supply:       {}", report.total_supply);
            println!("Total staked:       {}", report.total_staked);
            println!("Undistributed fees: {}", report.undistributed_fees);
            println!("Events emitted:     {}", report.events);
        }
        OutputFormat::Json => println!("{}", format_json(&report)),
    }
    Ok(())
}

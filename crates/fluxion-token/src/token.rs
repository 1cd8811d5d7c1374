// crates/fluxion-token/src/token.rs
//
// The $FGT ledger state machine.
//
// `GovernanceToken` owns every component (roles, pause switch, balances,
// compliance, treasury fees, staking, vesting, governance parameters, event
// log) and sequences them for each call. Every write follows the same shape:
//   1. check the clock, the caller's role, and the pause switch
//   2. run the component operation, which validates before mutating
//   3. advance the clock and append events
// A call that returns `Err` leaves the ledger exactly as it was.
//
// Time is always supplied by the caller; nothing here reads a clock.

use tracing::{debug, info, warn};

use crate::access::{Role, RoleRegistry};
use crate::compliance::{ComplianceGate, ComplianceLimits};
use crate::config::TokenConfig;
use crate::events::{EventLog, LedgerEvent};
use crate::governance::{GovernanceParameterStore, GovernanceParams};
use crate::ledger::AccountLedger;
use crate::pause::PauseSwitch;
use crate::staking::{StakingEngine, StakingInfo};
use crate::treasury::{FeeDistribution, TreasuryFeeModule};
use crate::vesting::{Revocation, VestingEngine, VestingSchedule};
use fluxion_core::{day_of, Address, Fgt, LedgerError, LedgerResult, Timestamp, TokenAmount};

/// The governance token ledger.
#[derive(Debug, Clone)]
pub struct GovernanceToken {
    name: String,
    symbol: String,
    decimals: u8,
    /// Staking pool and vesting escrow account.
    contract: Address,
    access: RoleRegistry,
    pause: PauseSwitch,
    ledger: AccountLedger,
    compliance: ComplianceGate,
    treasury: TreasuryFeeModule,
    staking: StakingEngine,
    vesting: VestingEngine,
    governance: GovernanceParameterStore,
    events: EventLog,
    /// Highest `now` accepted by a time-dependent write.
    last_now: Timestamp,
}

impl GovernanceToken {
    /// Build a ledger from a genesis config.
    ///
    /// The admin receives every role and the initial supply; the treasury
    /// address receives the Treasury role.
    ///
    /// # Errors
    /// Returns `LedgerError::InvalidConfig` if the config fails validation.
    pub fn new(config: TokenConfig) -> LedgerResult<Self> {
        config.validate()?;

        let mut access = RoleRegistry::new();
        for role in Role::ALL {
            access.grant(role, config.admin);
        }
        access.grant(Role::Treasury, config.treasury);

        let mut ledger = AccountLedger::new(config.max_supply());
        let initial_supply = config.initial_supply();
        if initial_supply > 0 {
            ledger.mint(config.admin, initial_supply)?;
        }

        let mut events = EventLog::new();
        for role in Role::ALL {
            events.emit(LedgerEvent::RoleGranted {
                role,
                account: config.admin,
                sender: config.admin,
            });
        }
        if config.treasury != config.admin {
            events.emit(LedgerEvent::RoleGranted {
                role: Role::Treasury,
                account: config.treasury,
                sender: config.admin,
            });
        }
        if initial_supply > 0 {
            events.emit(LedgerEvent::Mint {
                to: config.admin,
                amount: initial_supply,
            });
        }

        info!(
            symbol = %config.symbol,
            admin = %config.admin,
            treasury = %config.treasury,
            initial_supply = %Fgt::from_units(initial_supply),
            "Ledger initialized"
        );

        Ok(Self {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            decimals: config.decimals,
            contract: config.contract,
            access,
            pause: PauseSwitch::new(),
            ledger,
            compliance: ComplianceGate::new(),
            treasury: TreasuryFeeModule::new(config.treasury, config.treasury_fee_rate_bps)?,
            staking: StakingEngine::new(config.reward_rate_bps)?,
            vesting: VestingEngine::new(),
            governance: GovernanceParameterStore::new(
                config.governance_params(),
                config.min_voting_period,
            )?,
            events,
            last_now: 0,
        })
    }

    // ---------------------------------------------------------------
    // Metadata and supply views
    // ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// The internal pool/escrow account.
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    pub fn balance_of(&self, account: &Address) -> TokenAmount {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.ledger.total_supply()
    }

    pub fn max_supply(&self) -> TokenAmount {
        self.ledger.max_supply()
    }

    /// Every account with a non-zero balance, in address order.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &TokenAmount)> {
        self.ledger.holders()
    }

    /// Sum of all balances; equals `total_supply` on a consistent ledger.
    pub fn sum_of_balances(&self) -> TokenAmount {
        self.ledger.sum_of_balances()
    }

    pub fn paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// The highest `now` accepted so far.
    pub fn last_timestamp(&self) -> Timestamp {
        self.last_now
    }

    // ---------------------------------------------------------------
    // Role views and management
    // ---------------------------------------------------------------

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.access.has_role(role, account)
    }

    pub fn roles_of(&self, account: &Address) -> Vec<Role> {
        self.access.roles_of(account)
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` unless `caller` is an Admin.
    pub fn grant_role(&mut self, caller: Address, role: Role, account: Address) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Admin)?;
        if self.access.grant(role, account) {
            info!(%role, %account, sender = %caller, "Role granted");
            self.events.emit(LedgerEvent::RoleGranted {
                role,
                account,
                sender: caller,
            });
        }
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` unless `caller` is an Admin, and
    /// `LedgerError::LastAdmin` when removing the only Admin.
    pub fn revoke_role(&mut self, caller: Address, role: Role, account: Address) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Admin)?;
        self.remove_role(caller, role, account)
    }

    /// Drop one of the caller's own roles.
    ///
    /// # Errors
    /// Returns `LedgerError::LastAdmin` if the caller is the only Admin.
    pub fn renounce_role(&mut self, account: Address, role: Role) -> LedgerResult<()> {
        self.remove_role(account, role, account)
    }

    fn remove_role(&mut self, sender: Address, role: Role, account: Address) -> LedgerResult<()> {
        if self.access.revoke(role, &account)? {
            info!(%role, %account, %sender, "Role revoked");
            self.events.emit(LedgerEvent::RoleRevoked {
                role,
                account,
                sender,
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Transfers
    // ---------------------------------------------------------------

    /// Move `amount` from `from` to `to`, routing the treasury fee.
    ///
    /// The recipient receives `amount - fee` and the treasury `fee`, where
    /// `fee = floor(amount * fee_rate_bps / 10_000)`.
    ///
    /// # Errors
    /// Returns the compliance rejection verbatim, `LedgerError::InvalidAddress`
    /// for the zero address or the pool account, `LedgerError::InsufficientBalance`,
    /// or `LedgerError::TimeWentBackwards`.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: TokenAmount,
        now: Timestamp,
    ) -> LedgerResult<()> {
        self.check_clock(now)?;
        if let Err(e) = self.compliance.check(&from, &to, amount, now, self.pause.is_paused()) {
            warn!(%from, %to, amount = %Fgt::from_units(amount), error = %e, "Transfer rejected");
            return Err(e);
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidAddress(
                "transfer to the zero address".to_string(),
            ));
        }
        self.ensure_not_pool(&from, "transfer sender")?;
        self.ensure_not_pool(&to, "transfer recipient")?;

        let split = self.treasury.split(&from, &to, amount)?;
        let treasury = self.treasury.treasury();
        self.ledger
            .transfer_batch(&from, &[(to, split.net), (treasury, split.fee)])?;

        self.compliance.record_transfer(from, amount, now);
        self.treasury.record_fee(split.fee);
        self.commit_clock(now);

        debug!(
            %from,
            %to,
            net = %Fgt::from_units(split.net),
            fee = %Fgt::from_units(split.fee),
            "Transfer"
        );
        self.events.emit(LedgerEvent::Transfer {
            from,
            to,
            amount: split.net,
        });
        if split.fee > 0 {
            self.events.emit(LedgerEvent::Transfer {
                from,
                to: treasury,
                amount: split.fee,
            });
            self.events.emit(LedgerEvent::FeesCollected {
                from,
                treasury,
                fee: split.fee,
            });
        }
        Ok(())
    }

    /// The typed outcome `transfer` would produce from the compliance gate.
    ///
    /// # Errors
    /// Returns the first failing compliance check.
    pub fn check_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
        now: Timestamp,
    ) -> LedgerResult<()> {
        self.compliance
            .check(from, to, amount, now, self.pause.is_paused())
    }

    /// Boolean form of `check_transfer`.
    pub fn can_transfer(&self, from: &Address, to: &Address, amount: TokenAmount, now: Timestamp) -> bool {
        self.check_transfer(from, to, amount, now).is_ok()
    }

    pub fn current_day(&self, now: Timestamp) -> u64 {
        day_of(now)
    }

    pub fn daily_transfer_amount(&self, account: &Address, day: u64) -> TokenAmount {
        self.compliance.daily_transfer_amount(account, day)
    }

    // ---------------------------------------------------------------
    // Supply management
    // ---------------------------------------------------------------

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Minter role,
    /// `LedgerError::Paused`, `LedgerError::ZeroAmount`, or
    /// `LedgerError::SupplyCapExceeded`.
    pub fn mint(&mut self, caller: Address, to: Address, amount: TokenAmount) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Minter)?;
        self.pause.ensure_not_paused()?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidAddress("mint to the zero address".to_string()));
        }
        self.ensure_not_pool(&to, "mint recipient")?;
        self.ledger.mint(to, amount)?;

        info!(%to, amount = %Fgt::from_units(amount), minter = %caller, "Minted");
        self.events.emit(LedgerEvent::Mint { to, amount });
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Burner role,
    /// `LedgerError::Paused`, `LedgerError::ZeroAmount`,
    /// `LedgerError::InvalidAddress` for the pool account, or
    /// `LedgerError::InsufficientBalance`.
    pub fn burn(&mut self, caller: Address, from: Address, amount: TokenAmount) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Burner)?;
        self.pause.ensure_not_paused()?;
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.ensure_not_pool(&from, "burn source")?;
        self.ledger.burn(&from, amount)?;

        info!(%from, amount = %Fgt::from_units(amount), burner = %caller, "Burned");
        self.events.emit(LedgerEvent::Burn { from, amount });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Pause
    // ---------------------------------------------------------------

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Pauser role.
    pub fn pause(&mut self, caller: Address) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Pauser)?;
        if self.pause.set(true) {
            info!(by = %caller, "Ledger paused");
            self.events.emit(LedgerEvent::Paused { by: caller });
        }
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Pauser role.
    pub fn unpause(&mut self, caller: Address) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Pauser)?;
        if self.pause.set(false) {
            info!(by = %caller, "Ledger unpaused");
            self.events.emit(LedgerEvent::Unpaused { by: caller });
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Compliance administration
    // ---------------------------------------------------------------

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Compliance role.
    pub fn update_blacklist(&mut self, caller: Address, account: Address, blacklisted: bool) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Compliance)?;
        if self.compliance.set_blacklisted(account, blacklisted) {
            info!(%account, blacklisted, "Blacklist updated");
            self.events.emit(LedgerEvent::BlacklistUpdated {
                account,
                blacklisted,
            });
        }
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Compliance role.
    pub fn update_whitelist(&mut self, caller: Address, account: Address, whitelisted: bool) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Compliance)?;
        if self.compliance.set_whitelisted(account, whitelisted) {
            info!(%account, whitelisted, "Whitelist updated");
            self.events.emit(LedgerEvent::WhitelistUpdated {
                account,
                whitelisted,
            });
        }
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Compliance role.
    pub fn set_whitelist_enabled(&mut self, caller: Address, enabled: bool) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Compliance)?;
        self.compliance.set_whitelist_enabled(enabled);
        info!(enabled, "Whitelist mode toggled");
        self.events.emit(LedgerEvent::WhitelistToggled { enabled });
        Ok(())
    }

    /// Zero disables a limit.
    ///
    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Compliance role.
    pub fn update_compliance_limits(&mut self, caller: Address, limits: ComplianceLimits) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Compliance)?;
        self.compliance.set_limits(limits);
        info!(
            max_transfer = %Fgt::from_units(limits.max_transfer_amount),
            max_daily = %Fgt::from_units(limits.max_daily_transfer_amount),
            "Compliance limits updated"
        );
        self.events.emit(LedgerEvent::ComplianceLimitsUpdated { limits });
        Ok(())
    }

    pub fn is_blacklisted(&self, account: &Address) -> bool {
        self.compliance.is_blacklisted(account)
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.compliance.is_whitelisted(account)
    }

    pub fn whitelist_enabled(&self) -> bool {
        self.compliance.whitelist_enabled()
    }

    pub fn compliance_limits(&self) -> ComplianceLimits {
        self.compliance.limits()
    }

    // ---------------------------------------------------------------
    // Staking
    // ---------------------------------------------------------------

    /// # Errors
    /// Returns `LedgerError::Paused`, `LedgerError::ZeroAmount`,
    /// `LedgerError::InsufficientBalance`, or `LedgerError::TimeWentBackwards`.
    pub fn stake(
        &mut self,
        account: Address,
        amount: TokenAmount,
        lock_period: u64,
        now: Timestamp,
    ) -> LedgerResult<()> {
        self.check_clock(now)?;
        self.pause.ensure_not_paused()?;
        self.ensure_not_pool(&account, "staker")?;
        self.staking
            .stake(&mut self.ledger, self.contract, account, amount, lock_period, now)?;
        self.commit_clock(now);

        debug!(%account, amount = %Fgt::from_units(amount), lock_period, "Staked");
        self.events.emit(LedgerEvent::Staked {
            account,
            amount,
            lock_period,
            at: now,
        });
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Paused`, `LedgerError::ZeroAmount`,
    /// `LedgerError::InsufficientStaked`, `LedgerError::StillLocked`, or
    /// `LedgerError::TimeWentBackwards`.
    pub fn unstake(&mut self, account: Address, amount: TokenAmount, now: Timestamp) -> LedgerResult<()> {
        self.check_clock(now)?;
        self.pause.ensure_not_paused()?;
        self.staking
            .unstake(&mut self.ledger, self.contract, account, amount, now)?;
        self.commit_clock(now);

        debug!(%account, amount = %Fgt::from_units(amount), "Unstaked");
        self.events.emit(LedgerEvent::Unstaked {
            account,
            amount,
            at: now,
        });
        Ok(())
    }

    /// Mint accrued staking rewards to `account`. Allowed while paused.
    ///
    /// Returns the amount paid; zero is a no-op.
    ///
    /// # Errors
    /// Returns `LedgerError::SupplyCapExceeded` or
    /// `LedgerError::TimeWentBackwards`.
    pub fn claim_rewards(&mut self, account: Address, now: Timestamp) -> LedgerResult<TokenAmount> {
        self.check_clock(now)?;
        let reward = self.staking.claim_rewards(&mut self.ledger, account, now)?;
        self.commit_clock(now);

        if reward > 0 {
            debug!(%account, reward = %Fgt::from_units(reward), "Rewards claimed");
            self.events.emit(LedgerEvent::RewardsClaimed {
                account,
                amount: reward,
                at: now,
            });
        }
        Ok(reward)
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` unless `caller` is an Admin, or
    /// `LedgerError::RateTooHigh` above 50%.
    pub fn update_reward_rate(&mut self, caller: Address, reward_rate_bps: u32) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Admin)?;
        self.staking.set_reward_rate(reward_rate_bps)?;
        info!(reward_rate_bps, "Reward rate updated");
        self.events.emit(LedgerEvent::RewardRateUpdated { reward_rate_bps });
        Ok(())
    }

    pub fn reward_rate(&self) -> u32 {
        self.staking.reward_rate_bps()
    }

    pub fn total_staked(&self) -> TokenAmount {
        self.staking.total_staked()
    }

    /// Accounts with an open stake and their staked amounts.
    pub fn stakers(&self) -> impl Iterator<Item = (&Address, TokenAmount)> {
        self.staking.stakers()
    }

    /// # Errors
    /// Returns `LedgerError::Overflow` if the accrual cannot be represented.
    pub fn staking_info(&self, account: &Address, now: Timestamp) -> LedgerResult<StakingInfo> {
        self.staking.staking_info(account, now)
    }

    /// # Errors
    /// Returns `LedgerError::Overflow` if the accrual cannot be represented.
    pub fn pending_rewards(&self, account: &Address, now: Timestamp) -> LedgerResult<TokenAmount> {
        self.staking.pending_rewards(account, now)
    }

    // ---------------------------------------------------------------
    // Vesting
    // ---------------------------------------------------------------

    /// Escrow `amount` newly minted tokens under a vesting schedule.
    ///
    /// Returns the schedule's index within the beneficiary's list.
    ///
    /// # Errors
    /// Returns `LedgerError::Unauthorized` unless `caller` is an Admin,
    /// `LedgerError::ZeroAmount`, `LedgerError::InvalidVestingParameters`,
    /// or `LedgerError::SupplyCapExceeded`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_vesting_schedule(
        &mut self,
        caller: Address,
        beneficiary: Address,
        amount: TokenAmount,
        start: Timestamp,
        duration: u64,
        cliff_duration: u64,
        revocable: bool,
        now: Timestamp,
    ) -> LedgerResult<usize> {
        self.check_clock(now)?;
        self.access.require_role(&caller, Role::Admin)?;
        self.ensure_not_pool(&beneficiary, "vesting beneficiary")?;
        let index = self.vesting.create_schedule(
            &mut self.ledger,
            self.contract,
            beneficiary,
            amount,
            start,
            duration,
            cliff_duration,
            revocable,
        )?;
        self.commit_clock(now);

        info!(
            %beneficiary,
            index,
            amount = %Fgt::from_units(amount),
            start,
            duration,
            cliff_duration,
            revocable,
            "Vesting schedule created"
        );
        self.events.emit(LedgerEvent::Mint {
            to: self.contract,
            amount,
        });
        self.events.emit(LedgerEvent::VestingScheduleCreated {
            beneficiary,
            index,
            amount,
            start,
            duration,
            cliff_duration,
            revocable,
        });
        Ok(index)
    }

    /// Release whatever has vested. Anyone may trigger it; tokens always go
    /// to the beneficiary.
    ///
    /// # Errors
    /// Returns `LedgerError::ScheduleNotFound`, `LedgerError::ScheduleRevoked`,
    /// or `LedgerError::TimeWentBackwards`.
    pub fn release_vested_tokens(
        &mut self,
        beneficiary: Address,
        index: usize,
        now: Timestamp,
    ) -> LedgerResult<TokenAmount> {
        self.check_clock(now)?;
        let released = self
            .vesting
            .release(&mut self.ledger, self.contract, beneficiary, index, now)?;
        self.commit_clock(now);

        if released > 0 {
            debug!(%beneficiary, index, amount = %Fgt::from_units(released), "Vested tokens released");
            self.events.emit(LedgerEvent::TokensReleased {
                beneficiary,
                index,
                amount: released,
                at: now,
            });
        }
        Ok(released)
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` unless `caller` is an Admin,
    /// `LedgerError::ScheduleNotFound`, `LedgerError::NotRevocable`,
    /// `LedgerError::ScheduleRevoked`, or `LedgerError::TimeWentBackwards`.
    pub fn revoke_vesting(
        &mut self,
        caller: Address,
        beneficiary: Address,
        index: usize,
        now: Timestamp,
    ) -> LedgerResult<Revocation> {
        self.check_clock(now)?;
        self.access.require_role(&caller, Role::Admin)?;
        let treasury = self.treasury.treasury();
        let revocation = self.vesting.revoke(
            &mut self.ledger,
            self.contract,
            treasury,
            beneficiary,
            index,
            now,
        )?;
        self.commit_clock(now);

        info!(
            %beneficiary,
            index,
            released = %Fgt::from_units(revocation.released_to_beneficiary),
            returned = %Fgt::from_units(revocation.returned_to_treasury),
            "Vesting revoked"
        );
        self.events.emit(LedgerEvent::VestingRevoked {
            beneficiary,
            index,
            released: revocation.released_to_beneficiary,
            returned: revocation.returned_to_treasury,
            at: now,
        });
        Ok(revocation)
    }

    pub fn vesting_schedule_count(&self, beneficiary: &Address) -> usize {
        self.vesting.schedule_count(beneficiary)
    }

    /// # Errors
    /// Returns `LedgerError::ScheduleNotFound` for an unknown index.
    pub fn vesting_schedule(&self, beneficiary: &Address, index: usize) -> LedgerResult<&VestingSchedule> {
        self.vesting.schedule(beneficiary, index)
    }

    pub fn vesting_schedules(&self, beneficiary: &Address) -> &[VestingSchedule] {
        self.vesting.schedules(beneficiary)
    }

    /// # Errors
    /// Returns `LedgerError::ScheduleNotFound` for an unknown index.
    pub fn calculate_releasable_amount(
        &self,
        beneficiary: &Address,
        index: usize,
        now: Timestamp,
    ) -> LedgerResult<TokenAmount> {
        self.vesting.releasable_amount(beneficiary, index, now)
    }

    pub fn total_vesting_amount(&self) -> TokenAmount {
        self.vesting.total_vesting_amount()
    }

    // ---------------------------------------------------------------
    // Treasury
    // ---------------------------------------------------------------

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Treasury role, or
    /// `LedgerError::InvalidAddress` for the zero address or the pool account.
    pub fn update_treasury(&mut self, caller: Address, treasury: Address) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Treasury)?;
        if treasury.is_zero() {
            return Err(LedgerError::InvalidAddress(
                "treasury cannot be the zero address".to_string(),
            ));
        }
        self.ensure_not_pool(&treasury, "treasury")?;
        let previous = self.treasury.treasury();
        self.treasury.set_treasury(treasury);

        info!(%previous, current = %treasury, "Treasury updated");
        self.events.emit(LedgerEvent::TreasuryUpdated {
            previous,
            current: treasury,
        });
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Treasury role, or
    /// `LedgerError::RateTooHigh` above 10%.
    pub fn update_treasury_fee_rate(&mut self, caller: Address, fee_rate_bps: u32) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Treasury)?;
        self.treasury.set_fee_rate(fee_rate_bps)?;
        info!(fee_rate_bps, "Treasury fee rate updated");
        self.events.emit(LedgerEvent::TreasuryFeeRateUpdated { fee_rate_bps });
        Ok(())
    }

    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Treasury role.
    pub fn update_fee_exemption(&mut self, caller: Address, account: Address, exempt: bool) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Treasury)?;
        if self.treasury.set_fee_exempt(account, exempt) {
            info!(%account, exempt, "Fee exemption updated");
            self.events.emit(LedgerEvent::FeeExemptionUpdated { account, exempt });
        }
        Ok(())
    }

    /// Pay undistributed fees to stakers pro-rata from the treasury balance.
    ///
    /// With no stakers the fees stay undistributed and nothing moves.
    ///
    /// # Errors
    /// Returns `LedgerError::Unauthorized` without the Treasury role,
    /// `LedgerError::NoFeesToDistribute`, `LedgerError::InsufficientBalance`
    /// if the treasury no longer holds the fees, or
    /// `LedgerError::TimeWentBackwards`.
    pub fn distribute_fees(&mut self, caller: Address, now: Timestamp) -> LedgerResult<FeeDistribution> {
        self.check_clock(now)?;
        self.access.require_role(&caller, Role::Treasury)?;
        let distribution = self
            .treasury
            .plan_distribution(self.staking.stakers(), self.staking.total_staked())?;
        let treasury = self.treasury.treasury();
        self.ledger.transfer_batch(&treasury, &distribution.payouts)?;
        self.treasury.commit_distribution(&distribution);
        self.commit_clock(now);

        info!(
            total = %Fgt::from_units(distribution.distributed),
            remaining = %Fgt::from_units(distribution.remaining),
            stakers = distribution.payouts.len(),
            "Fees distributed"
        );
        for (staker, share) in &distribution.payouts {
            self.events.emit(LedgerEvent::Transfer {
                from: treasury,
                to: *staker,
                amount: *share,
            });
        }
        self.events.emit(LedgerEvent::FeesDistributed {
            total: distribution.distributed,
            stakers: distribution.payouts.len(),
            at: now,
        });
        Ok(distribution)
    }

    pub fn treasury(&self) -> Address {
        self.treasury.treasury()
    }

    pub fn treasury_fee_rate(&self) -> u32 {
        self.treasury.fee_rate_bps()
    }

    pub fn undistributed_fees(&self) -> TokenAmount {
        self.treasury.undistributed_fees()
    }

    pub fn is_fee_exempt(&self, account: &Address) -> bool {
        self.treasury.is_fee_exempt(account)
    }

    // ---------------------------------------------------------------
    // Governance parameters
    // ---------------------------------------------------------------

    /// # Errors
    /// Returns `LedgerError::Unauthorized` unless `caller` is an Admin,
    /// `LedgerError::QuorumTooHigh`, or `LedgerError::VotingPeriodTooShort`.
    pub fn update_governance_parameters(&mut self, caller: Address, params: GovernanceParams) -> LedgerResult<()> {
        self.access.require_role(&caller, Role::Admin)?;
        self.governance.update(params)?;
        info!(
            proposal_threshold = %Fgt::from_units(params.proposal_threshold),
            voting_delay = params.voting_delay,
            voting_period = params.voting_period,
            quorum_percentage = params.quorum_percentage,
            "Governance parameters updated"
        );
        self.events.emit(LedgerEvent::GovernanceParametersUpdated { params });
        Ok(())
    }

    pub fn governance_params(&self) -> GovernanceParams {
        self.governance.params()
    }

    /// Floor that `voting_period` updates are checked against.
    pub fn min_voting_period(&self) -> u64 {
        self.governance.min_voting_period()
    }

    // ---------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------

    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    // ---------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------

    fn check_clock(&self, now: Timestamp) -> LedgerResult<()> {
        if now < self.last_now {
            return Err(LedgerError::TimeWentBackwards {
                now,
                last: self.last_now,
            });
        }
        Ok(())
    }

    fn commit_clock(&mut self, now: Timestamp) {
        self.last_now = now;
    }

    /// The pool account only moves through staking and vesting.
    fn ensure_not_pool(&self, account: &Address, what: &str) -> LedgerResult<()> {
        if *account == self.contract {
            return Err(LedgerError::InvalidAddress(format!(
                "{what} cannot be the pool account {account}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxion_core::amount::tokens;

    fn admin() -> Address {
        Address::from_low_u64(0x1)
    }

    fn treasury_addr() -> Address {
        Address::from_low_u64(0x2)
    }

    fn alice() -> Address {
        Address::from_low_u64(0xa)
    }

    fn bob() -> Address {
        Address::from_low_u64(0xb)
    }

    fn token() -> GovernanceToken {
        GovernanceToken::new(TokenConfig::default()).unwrap()
    }

    #[test]
    fn test_genesis_state() {
        let t = token();
        assert_eq!(t.symbol(), "FGT");
        assert_eq!(t.decimals(), 18);
        assert_eq!(t.total_supply(), tokens(100_000_000));
        assert_eq!(t.balance_of(&admin()), tokens(100_000_000));
        for role in Role::ALL {
            assert!(t.has_role(role, &admin()));
        }
        assert!(t.has_role(Role::Treasury, &treasury_addr()));
        assert!(!t.has_role(Role::Minter, &treasury_addr()));
        assert!(!t.paused());
        assert_eq!(t.reward_rate(), 1_000);
        assert_eq!(t.treasury_fee_rate(), 500);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TokenConfig {
            quorum_percentage: 50,
            ..TokenConfig::default()
        };
        assert!(matches!(
            GovernanceToken::new(config),
            Err(LedgerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_transfer_routes_fee() {
        let mut t = token();
        t.transfer(admin(), alice(), tokens(1_000), 10).unwrap();
        assert_eq!(t.balance_of(&alice()), tokens(950));
        assert_eq!(t.balance_of(&treasury_addr()), tokens(50));
        assert_eq!(t.undistributed_fees(), tokens(50));
        assert_eq!(t.daily_transfer_amount(&admin(), t.current_day(10)), tokens(1_000));
        assert_eq!(t.sum_of_balances(), t.total_supply());
    }

    #[test]
    fn test_transfer_from_treasury_is_fee_free() {
        let mut t = token();
        t.transfer(admin(), treasury_addr(), tokens(100), 0).unwrap();
        assert_eq!(t.undistributed_fees(), 0);
        t.transfer(treasury_addr(), alice(), tokens(100), 0).unwrap();
        assert_eq!(t.balance_of(&alice()), tokens(100));
    }

    #[test]
    fn test_failed_transfer_leaves_no_trace() {
        let mut t = token();
        let before = t.events().len();
        let result = t.transfer(alice(), bob(), 1, 0);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(t.events().len(), before);
        assert_eq!(t.daily_transfer_amount(&alice(), 0), 0);
    }

    #[test]
    fn test_transfer_to_zero_address_rejected() {
        let mut t = token();
        assert!(matches!(
            t.transfer(admin(), Address::ZERO, 1, 0),
            Err(LedgerError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_paused_wins_over_zero_recipient() {
        let mut t = token();
        t.pause(admin()).unwrap();
        assert_eq!(t.transfer(admin(), Address::ZERO, 1, 0), Err(LedgerError::Paused));
    }

    #[test]
    fn test_pool_account_rejected_by_user_writes() {
        let mut t = token();
        let pool = t.contract_address();
        t.transfer(admin(), alice(), tokens(1_000), 0).unwrap();
        t.stake(alice(), tokens(950), 0, 0).unwrap();

        let rejected = |r: LedgerResult<()>| matches!(r, Err(LedgerError::InvalidAddress(_)));
        assert!(rejected(t.transfer(pool, bob(), tokens(950), 0)));
        assert!(rejected(t.transfer(admin(), pool, tokens(1), 0)));
        assert!(rejected(t.burn(admin(), pool, tokens(950))));
        assert!(rejected(t.mint(admin(), pool, tokens(1))));
        assert!(rejected(t.stake(pool, tokens(1), 0, 0)));
        assert!(rejected(t.update_treasury(treasury_addr(), pool)));
        assert!(matches!(
            t.create_vesting_schedule(admin(), pool, tokens(1), 0, 100, 0, false, 0),
            Err(LedgerError::InvalidAddress(_))
        ));

        assert_eq!(t.balance_of(&pool), tokens(950));
        t.unstake(alice(), tokens(950), 0).unwrap();
        assert_eq!(t.balance_of(&pool), 0);
    }

    #[test]
    fn test_min_voting_period_view() {
        let mut t = token();
        let mut params = t.governance_params();
        params.voting_period = t.min_voting_period() - 1;
        assert!(matches!(
            t.update_governance_parameters(admin(), params),
            Err(LedgerError::VotingPeriodTooShort { .. })
        ));
        params.voting_period = t.min_voting_period();
        t.update_governance_parameters(admin(), params).unwrap();
    }

    #[test]
    fn test_clock_cannot_go_backwards() {
        let mut t = token();
        t.transfer(admin(), alice(), tokens(10), 100).unwrap();
        assert_eq!(
            t.transfer(admin(), alice(), tokens(10), 99),
            Err(LedgerError::TimeWentBackwards { now: 99, last: 100 })
        );
        assert_eq!(t.last_timestamp(), 100);
    }

    #[test]
    fn test_privileged_calls_require_roles() {
        let mut t = token();
        assert!(matches!(
            t.mint(alice(), alice(), 1),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(t.pause(alice()), Err(LedgerError::Unauthorized { .. })));
        assert!(matches!(
            t.update_blacklist(alice(), bob(), true),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            t.update_treasury_fee_rate(alice(), 100),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_pause_blocks_transfer_and_stake_but_not_claim() {
        let mut t = token();
        t.stake(admin(), tokens(1_000), 0, 0).unwrap();
        t.pause(admin()).unwrap();
        assert_eq!(t.transfer(admin(), alice(), 1, 10), Err(LedgerError::Paused));
        assert_eq!(t.stake(admin(), 1, 0, 10), Err(LedgerError::Paused));
        assert_eq!(t.unstake(admin(), 1, 10), Err(LedgerError::Paused));
        assert!(t.claim_rewards(admin(), 10).is_ok());
        t.unpause(admin()).unwrap();
        assert!(t.transfer(admin(), alice(), 1, 20).is_ok());
    }

    #[test]
    fn test_role_grant_and_last_admin_guard() {
        let mut t = token();
        t.grant_role(admin(), Role::Minter, alice()).unwrap();
        t.mint(alice(), bob(), tokens(5)).unwrap();
        assert_eq!(t.balance_of(&bob()), tokens(5));

        assert_eq!(t.renounce_role(admin(), Role::Admin), Err(LedgerError::LastAdmin));
        t.grant_role(admin(), Role::Admin, bob()).unwrap();
        t.renounce_role(admin(), Role::Admin).unwrap();
        assert!(!t.has_role(Role::Admin, &admin()));
    }

    #[test]
    fn test_distribute_fees_with_no_stakers_keeps_fees() {
        let mut t = token();
        t.transfer(admin(), alice(), tokens(1_000), 0).unwrap();
        let distribution = t.distribute_fees(admin(), 0).unwrap();
        assert_eq!(distribution.distributed, 0);
        assert_eq!(t.undistributed_fees(), tokens(50));
    }

    #[test]
    fn test_distribute_fees_fails_when_treasury_spent_them() {
        let mut t = token();
        t.transfer(admin(), alice(), tokens(1_000), 0).unwrap();
        t.stake(alice(), tokens(100), 0, 0).unwrap();
        t.transfer(treasury_addr(), bob(), tokens(50), 0).unwrap();
        assert!(matches!(
            t.distribute_fees(treasury_addr(), 0),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(t.undistributed_fees(), tokens(50));
    }

    #[test]
    fn test_events_are_drained() {
        let mut t = token();
        let genesis = t.drain_events();
        assert!(genesis.iter().any(|e| matches!(e, LedgerEvent::Mint { .. })));
        t.transfer(admin(), alice(), tokens(100), 0).unwrap();
        let events = t.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], LedgerEvent::FeesCollected { .. }));
        assert!(t.events().is_empty());
    }
}

//! Off-chain host for one router and the campaigns it funds.
//!
//! Each campaign sits behind its own lock so the check-then-act sequence of a
//! distribution cannot interleave with a competing caller: exactly one caller
//! wins an interval and the others see the pacing or exhaustion failure.
//! Every operation is transactional. Campaign, router and ledger are
//! snapshotted before the call and put back if any step fails, so a failed
//! transfer never leaves a consumed epoch behind.
//!
//! Lock order is campaign, then router, then ledger.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use alloy_primitives::{Address, U256};

use crate::{
    clock::Clock,
    errors::{CampaignError, DistributorError},
    ledger::{LedgerError, TokenLedger},
    plan::{CampaignPlan, PlanError, PlanSummary, RolloutTally},
    router::{Funding, Payout, RewardRouter},
    schedule::{EpochDistributor, Execution, Release},
};

#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Campaign(#[from] CampaignError),
    #[error(transparent)]
    Distributor(#[from] DistributorError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("unknown campaign {0}")]
    UnknownCampaign(Address),
    #[error("campaign {0} is already registered")]
    DuplicateCampaign(Address),
    #[error("unknown gauge {0}")]
    UnknownGauge(Address),
    #[error("gauge {0} is already registered")]
    DuplicateGauge(Address),
    #[error("campaign is funded by {0}, which is not this router")]
    ForeignFundingSource(Address),
    #[error("state lock poisoned")]
    Poisoned,
}

/// Result of one campaign visited by a keeper pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperOutcome {
    pub campaign: Address,
    pub result: Result<Execution, ServiceError>,
}

/// What one rollout step did to a campaign. In a dry run the flags report
/// what would have been submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutStep {
    pub campaign: Address,
    pub setup: bool,
    pub reward_epochs: bool,
    pub summary: Option<PlanSummary>,
}

impl RolloutStep {
    pub fn is_noop(&self) -> bool {
        !self.setup && !self.reward_epochs
    }
}

pub struct RewardService<L, C> {
    router_address: Address,
    router: Mutex<RewardRouter>,
    campaigns: BTreeMap<Address, Mutex<EpochDistributor>>,
    gauges: BTreeMap<Address, Address>,
    ledger: Mutex<L>,
    clock: C,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ServiceError> {
    mutex.lock().map_err(|_| ServiceError::Poisoned)
}

impl<L, C> RewardService<L, C>
where
    L: TokenLedger + Clone,
    C: Clock,
{
    pub fn new(router_address: Address, router: RewardRouter, ledger: L, clock: C) -> Self {
        Self {
            router_address,
            router: Mutex::new(router),
            campaigns: BTreeMap::new(),
            gauges: BTreeMap::new(),
            ledger: Mutex::new(ledger),
            clock,
        }
    }

    pub fn register_campaign(
        &mut self,
        address: Address,
        campaign: EpochDistributor,
    ) -> Result<(), ServiceError> {
        if self.campaigns.contains_key(&address) {
            return Err(ServiceError::DuplicateCampaign(address));
        }

        self.campaigns.insert(address, Mutex::new(campaign));
        log::info!("registered campaign {address}");

        Ok(())
    }

    /// Binds an allow-listed gauge to the address its balance is swept to.
    pub fn register_gauge(
        &mut self,
        gauge: Address,
        recovery_address: Address,
    ) -> Result<(), ServiceError> {
        if !lock(&self.router)?.is_receiving_gauge(gauge) {
            return Err(DistributorError::ReceiverNotAllowed.into());
        }
        if self.gauges.contains_key(&gauge) {
            return Err(ServiceError::DuplicateGauge(gauge));
        }

        self.gauges.insert(gauge, recovery_address);
        log::info!("registered gauge {gauge} recovering to {recovery_address}");

        Ok(())
    }

    pub fn gauge_recovery_address(&self, gauge: Address) -> Option<Address> {
        self.gauges.get(&gauge).copied()
    }

    pub fn router_address(&self) -> Address {
        self.router_address
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &Address> {
        self.campaigns.keys()
    }

    /// Copy of a campaign's current state.
    pub fn campaign_snapshot(&self, campaign: Address) -> Result<EpochDistributor, ServiceError> {
        Ok(self.campaign(campaign)?.clone())
    }

    pub fn with_ledger<T>(&self, f: impl FnOnce(&mut L) -> T) -> Result<T, ServiceError> {
        let mut ledger = lock(&self.ledger)?;
        Ok(f(&mut *ledger))
    }

    pub fn setup(
        &self,
        campaign: Address,
        caller: Address,
        funding_source: Address,
        receiving_gauge: Address,
        min_epoch_duration: U256,
    ) -> Result<(), ServiceError> {
        let mut distributor = self.campaign(campaign)?;
        distributor.setup(caller, funding_source, receiving_gauge, min_epoch_duration)?;

        log::info!("campaign {campaign} bound to gauge {receiving_gauge}");

        Ok(())
    }

    pub fn set_reward_epochs(
        &self,
        campaign: Address,
        caller: Address,
        amounts: Vec<U256>,
    ) -> Result<(), ServiceError> {
        let mut distributor = self.campaign(campaign)?;
        distributor.set_reward_epochs(caller, amounts)?;

        log::info!(
            "campaign {campaign} scheduled {} epochs",
            distributor.remaining_epochs()
        );

        Ok(())
    }

    /// Brings one campaign of a batch rollout to its planned configuration.
    ///
    /// Setup and the epoch schedule are each submitted only if the campaign
    /// does not report them done already, so rerunning a rollout is a no-op.
    /// The plan is recorded in `tally` whenever its schedule is (or, with
    /// `dry_run`, would be) submitted. A dry run never touches the campaign.
    pub fn roll_out(
        &self,
        tally: &mut RolloutTally,
        caller: Address,
        campaign: Address,
        gauge: Address,
        plan: &CampaignPlan,
        dry_run: bool,
    ) -> Result<RolloutStep, ServiceError> {
        plan.validate()?;

        let mut distributor = self.campaign(campaign)?;
        let mut step = RolloutStep {
            campaign,
            setup: !distributor.is_setup_complete(),
            reward_epochs: !distributor.is_reward_epochs_set(),
            summary: None,
        };

        if step.is_noop() {
            log::info!("campaign {campaign} already rolled out, skipping");
            return Ok(step);
        }

        let mut next_tally = tally.clone();
        if step.reward_epochs {
            step.summary = Some(next_tally.record(plan)?);
        }

        if dry_run {
            log::info!(
                "dry run: campaign {campaign} would submit setup={} epochs={}",
                step.setup,
                step.reward_epochs
            );
            *tally = next_tally;
            return Ok(step);
        }

        let before = distributor.clone();
        let applied = apply_plan(&mut *distributor, &step, caller, self.router_address, gauge, plan);
        if let Err(err) = applied {
            *distributor = before;
            return Err(err.into());
        }

        *tally = next_tally;
        Ok(step)
    }

    pub fn distribute(&self, campaign: Address) -> Result<Release, ServiceError> {
        let now = self.clock.now();
        let router_address = self.router_address;

        self.transact(campaign, |distributor, router, ledger| {
            let release = distributor.distribute_reward(now)?;
            fund_release(router_address, router, ledger, campaign, &release)?;

            Ok(release)
        })
    }

    /// Distributes and pays the execution bounty to `caller` out of the
    /// campaign's own bounty-token balance when it can cover it.
    pub fn execute(&self, campaign: Address, caller: Address) -> Result<Execution, ServiceError> {
        let now = self.clock.now();
        let router_address = self.router_address;

        self.transact(campaign, |distributor, router, ledger| {
            let bounty_balance = distributor
                .bounty()
                .map_or(U256::ZERO, |bounty| ledger.balance_of(bounty.token, campaign));

            let execution = distributor.execute(caller, now, bounty_balance)?;
            fund_release(router_address, router, ledger, campaign, &execution.release)?;

            if let Some(bounty) = execution.bounty {
                ledger.transfer(bounty.token, campaign, bounty.to, bounty.amount)?;
                log::info!("paid {} execute reward to {}", bounty.amount, bounty.to);
            }

            Ok(execution)
        })
    }

    pub fn next_epoch_info(&self, campaign: Address) -> Result<(U256, U256), ServiceError> {
        Ok(self.campaign(campaign)?.next_epoch_info(self.clock.now())?)
    }

    pub fn execution_allowed(&self, campaign: Address) -> Result<bool, ServiceError> {
        Ok(self.campaign(campaign)?.execution_allowed(self.clock.now())?)
    }

    /// One keeper pass: executes every campaign whose next epoch may be
    /// released now. Campaigns that are not configured yet are skipped.
    pub fn run_due(&self, caller: Address) -> Vec<KeeperOutcome> {
        let mut outcomes = vec![];

        for &campaign in self.campaigns.keys() {
            match self.execution_allowed(campaign) {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!("campaign {campaign}: nothing due");
                    continue;
                }
                Err(err) => {
                    log::debug!("campaign {campaign} skipped: {err}");
                    continue;
                }
            }

            let result = self.execute(campaign, caller);
            match &result {
                Ok(execution) => log::info!(
                    "campaign {campaign}: distributed {}, {} epochs left",
                    execution.release.amount,
                    execution.release.remaining_epochs
                ),
                Err(err) => log::warn!("campaign {campaign}: distribution failed: {err}"),
            }

            outcomes.push(KeeperOutcome { campaign, result });
        }

        outcomes
    }

    pub fn send_reward_token(
        &self,
        caller: Address,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
    ) -> Result<Payout, ServiceError> {
        let router_address = self.router_address;

        self.with_router(|router, ledger| {
            let payout = router.send_reward_token(caller, receiver, amount, epoch)?;
            settle(router_address, ledger, &payout)?;

            Ok(payout)
        })
    }

    pub fn deposit_send_reward_token(
        &self,
        caller: Address,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
    ) -> Result<Payout, ServiceError> {
        let router_address = self.router_address;

        self.with_router(|router, ledger| {
            let payout = router.deposit_send_reward_token(caller, receiver, amount, epoch)?;
            settle(router_address, ledger, &payout)?;

            Ok(payout)
        })
    }

    pub fn deposit_reward_token_from_contract(
        &self,
        caller: Address,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
    ) -> Result<Payout, ServiceError> {
        let router_address = self.router_address;

        self.with_router(|router, ledger| {
            let balance = ledger.balance_of(router.reward_token(), router_address);
            let payout = router
                .deposit_reward_token_from_contract(caller, receiver, amount, epoch, balance)?;
            settle(router_address, ledger, &payout)?;

            Ok(payout)
        })
    }

    pub fn recover_token(
        &self,
        caller: Address,
        token: Address,
        amount: U256,
    ) -> Result<(), ServiceError> {
        let router_address = self.router_address;

        self.with_router(|router, ledger| {
            let recovery = router.recover_token(caller, token, amount)?;
            ledger.transfer(recovery.token, router_address, recovery.to, recovery.amount)?;

            log::info!("recovered {} of {} to {}", recovery.amount, recovery.token, recovery.to);

            Ok(())
        })
    }

    pub fn remove_campaign_address(
        &self,
        caller: Address,
        address: Address,
    ) -> Result<bool, ServiceError> {
        self.with_router(|router, _| Ok(router.remove_campaign_address(caller, address)?))
    }

    pub fn campaign_addresses(&self) -> Result<Vec<Address>, ServiceError> {
        Ok(lock(&self.router)?.campaign_addresses().as_slice().to_vec())
    }

    /// Receiver-side forwarding step: moves the gauge's entire reward-token
    /// balance to the recovery address it was registered with and returns the
    /// amount moved.
    pub fn forward_from_gauge(&self, gauge: Address) -> Result<U256, ServiceError> {
        let recovery_address = self
            .gauge_recovery_address(gauge)
            .ok_or(ServiceError::UnknownGauge(gauge))?;

        self.with_router(|router, ledger| {
            let token = router.reward_token();
            let balance = ledger.balance_of(token, gauge);
            if balance > U256::ZERO {
                ledger.transfer(token, gauge, recovery_address, balance)?;
                log::info!("forwarded {balance} from gauge {gauge} to {recovery_address}");
            }

            Ok(balance)
        })
    }

    fn campaign(&self, campaign: Address) -> Result<MutexGuard<'_, EpochDistributor>, ServiceError> {
        let distributor = self
            .campaigns
            .get(&campaign)
            .ok_or(ServiceError::UnknownCampaign(campaign))?;

        lock(distributor)
    }

    fn with_router<T>(
        &self,
        f: impl FnOnce(&mut RewardRouter, &mut L) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut router = lock(&self.router)?;
        let mut ledger = lock(&self.ledger)?;
        let router_before = router.clone();
        let ledger_before = ledger.clone();

        let result = f(&mut *router, &mut *ledger);
        if result.is_err() {
            *router = router_before;
            *ledger = ledger_before;
        }

        result
    }

    fn transact<T>(
        &self,
        campaign: Address,
        f: impl FnOnce(&mut EpochDistributor, &mut RewardRouter, &mut L) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut distributor = self.campaign(campaign)?;
        let before = distributor.clone();

        let result = self.with_router(|router, ledger| f(&mut *distributor, router, ledger));
        if result.is_err() {
            *distributor = before;
        }

        result
    }
}

fn apply_plan(
    distributor: &mut EpochDistributor,
    step: &RolloutStep,
    caller: Address,
    router_address: Address,
    gauge: Address,
    plan: &CampaignPlan,
) -> Result<(), CampaignError> {
    if step.setup {
        distributor.setup(caller, router_address, gauge, plan.min_epoch_duration)?;
        log::info!("campaign {} bound to gauge {gauge}", step.campaign);
    }
    if step.reward_epochs {
        distributor.set_reward_epochs(caller, plan.epochs.clone())?;
        log::info!("campaign {} scheduled {} epochs", step.campaign, plan.epochs.len());
    }

    Ok(())
}

/// Routes a campaign release through the router: the campaign acts as a
/// guard asking the router to fund its gauge for one epoch.
fn fund_release<L: TokenLedger>(
    router_address: Address,
    router: &mut RewardRouter,
    ledger: &mut L,
    campaign: Address,
    release: &Release,
) -> Result<(), ServiceError> {
    if release.funding_source != router_address {
        return Err(ServiceError::ForeignFundingSource(release.funding_source));
    }

    let payout = router.send_reward_token(
        campaign,
        release.receiving_gauge,
        release.amount,
        Some(release.epoch_duration),
    )?;

    settle(router_address, ledger, &payout)
}

/// Moves a payout into the gauge the way an on-chain gauge deposit does:
/// the router approves the gauge, which then pulls the tokens.
fn settle<L: TokenLedger>(
    router_address: Address,
    ledger: &mut L,
    payout: &Payout,
) -> Result<(), ServiceError> {
    if let Funding::PullFrom(source) = payout.funding {
        ledger.transfer_from(payout.token, router_address, source, router_address, payout.amount)?;
    }

    ledger.approve(payout.token, router_address, payout.receiver, payout.amount)?;
    ledger.transfer_from(
        payout.token,
        payout.receiver,
        router_address,
        payout.receiver,
        payout.amount,
    )?;

    log::debug!(
        "deposited {} into gauge {} for a {}s epoch",
        payout.amount,
        payout.receiver,
        payout.epoch
    );

    Ok(())
}

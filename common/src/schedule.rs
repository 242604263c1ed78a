//! Epoch distributor state machine.
//!
//! A campaign is bound once to a funding source (the router holding the
//! reward tokens) and a receiving gauge, is handed a bounded list of reward
//! amounts, and then releases one amount per call no faster than its minimum
//! epoch duration. The machine is pure: it decides what should be paid and
//! records that it was paid, while the host performs the token movement and
//! discards the new state if that movement fails.

use alloy_primitives::{Address, U256};

use crate::{
    errors::CampaignError,
    guards::Guards,
    is_valid_epoch_duration, safe_add, safe_sub, DEFAULT_EPOCH_DURATION, DISTRIBUTION_BUFFER,
    MAX_REWARD_EPOCHS, MIN_REWARD_EPOCHS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignConfig {
    pub funding_source: Address,
    pub receiving_gauge: Address,
    pub min_epoch_duration: U256,
}

/// Fixed incentive paid in a secondary token to whoever triggers `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounty {
    pub token: Address,
    pub amount: U256,
}

impl Bounty {
    /// Returns `None` when either the token or the amount is unset, which is
    /// how a bounty-less campaign is configured on-chain.
    pub fn new(token: Address, amount: U256) -> Option<Self> {
        if token.is_zero() || amount == U256::ZERO {
            None
        } else {
            Some(Self { token, amount })
        }
    }
}

/// Persistable part of a campaign. Guards and bounty are fixed at creation
/// and live beside it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignState {
    pub config: Option<CampaignConfig>,
    pub reward_epochs: Option<Vec<U256>>,
    pub distributed_epochs: usize,
    pub last_distribution_time: U256,
    pub have_rewards_started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    ConfiguredNoEpochs,
    EpochsSetNoConfig,
    Ready,
    Active,
    Exhausted,
}

/// Transfer the host must carry out after a successful distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    pub funding_source: Address,
    pub receiving_gauge: Address,
    pub amount: U256,
    pub epoch_duration: U256,
    pub remaining_epochs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BountyPayment {
    pub token: Address,
    pub to: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub release: Release,
    pub bounty: Option<BountyPayment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochDistributor {
    guards: Guards,
    bounty: Option<Bounty>,
    state: CampaignState,
}

impl EpochDistributor {
    pub fn new(guards: Guards, bounty: Option<Bounty>) -> Self {
        Self::restore(guards, bounty, CampaignState::default())
    }

    pub fn restore(guards: Guards, bounty: Option<Bounty>, state: CampaignState) -> Self {
        Self {
            guards,
            bounty,
            state,
        }
    }

    pub fn setup(
        &mut self,
        caller: Address,
        funding_source: Address,
        receiving_gauge: Address,
        min_epoch_duration: U256,
    ) -> Result<(), CampaignError> {
        self.guards.ensure(caller)?;

        if self.state.config.is_some() {
            return Err(CampaignError::AlreadyConfigured);
        }

        if !is_valid_epoch_duration(min_epoch_duration) {
            return Err(CampaignError::InvalidDuration);
        }

        self.state.config = Some(CampaignConfig {
            funding_source,
            receiving_gauge,
            min_epoch_duration,
        });

        log::debug!(
            "campaign setup: funding source {funding_source}, gauge {receiving_gauge}, min epoch {min_epoch_duration}s"
        );

        Ok(())
    }

    pub fn set_reward_epochs(
        &mut self,
        caller: Address,
        amounts: Vec<U256>,
    ) -> Result<(), CampaignError> {
        self.guards.ensure(caller)?;

        if self.state.reward_epochs.is_some() {
            return Err(CampaignError::AlreadyConfigured);
        }

        if !(MIN_REWARD_EPOCHS..=MAX_REWARD_EPOCHS).contains(&amounts.len()) {
            return Err(CampaignError::InvalidScheduleLength);
        }

        log::debug!("reward epochs set: {} entries", amounts.len());

        self.state.reward_epochs = Some(amounts);
        self.state.distributed_epochs = 0;

        Ok(())
    }

    /// Releases the next scheduled amount. Anyone may call this; pacing is the
    /// only gate.
    pub fn distribute_reward(&mut self, now: U256) -> Result<Release, CampaignError> {
        let config = self.state.config.ok_or(CampaignError::SetupNotCompleted)?;
        let amount = self.next_amount()?;

        if !self.pacing_allows(now)? {
            return Err(CampaignError::MinimumIntervalNotMet);
        }

        self.state.distributed_epochs += 1;
        self.state.last_distribution_time = now;
        self.state.have_rewards_started = true;

        let release = Release {
            funding_source: config.funding_source,
            receiving_gauge: config.receiving_gauge,
            amount,
            epoch_duration: config.min_epoch_duration,
            remaining_epochs: self.remaining_epochs(),
        };

        log::debug!(
            "released {} to {}, {} epochs left",
            release.amount,
            release.receiving_gauge,
            release.remaining_epochs
        );

        Ok(release)
    }

    /// Distributes and, when the campaign carries a bounty and holds enough of
    /// the bounty token, pays it to `caller`. An underfunded bounty is skipped.
    pub fn execute(
        &mut self,
        caller: Address,
        now: U256,
        bounty_balance: U256,
    ) -> Result<Execution, CampaignError> {
        let release = self.distribute_reward(now)?;

        let bounty = match self.bounty {
            Some(bounty) if bounty_balance >= bounty.amount => Some(BountyPayment {
                token: bounty.token,
                to: caller,
                amount: bounty.amount,
            }),
            Some(bounty) => {
                log::warn!(
                    "bounty skipped: balance {bounty_balance} below execute reward {}",
                    bounty.amount
                );
                None
            }
            None => None,
        };

        Ok(Execution { release, bounty })
    }

    /// Next amount to be released and the seconds until that release is
    /// accepted.
    pub fn next_epoch_info(&self, now: U256) -> Result<(U256, U256), CampaignError> {
        let amount = self.next_amount().map_err(|_| CampaignError::NoRemainingEpochs)?;

        if !self.state.have_rewards_started {
            return Ok((amount, U256::ZERO));
        }

        let allowed_at = self.next_allowed_time()?;

        Ok((amount, allowed_at.saturating_sub(now)))
    }

    pub fn execution_allowed(&self, now: U256) -> Result<bool, CampaignError> {
        if self.state.config.is_none() {
            return Err(CampaignError::SetupNotCompleted);
        }

        if self.state.reward_epochs.is_none() {
            return Err(CampaignError::RewardEpochsNotSet);
        }

        if self.remaining_epochs() == 0 {
            return Ok(false);
        }

        self.pacing_allows(now)
    }

    pub fn phase(&self) -> Phase {
        match (&self.state.config, &self.state.reward_epochs) {
            (None, None) => Phase::Uninitialized,
            (Some(_), None) => Phase::ConfiguredNoEpochs,
            (None, Some(_)) => Phase::EpochsSetNoConfig,
            (Some(_), Some(_)) if self.remaining_epochs() == 0 => Phase::Exhausted,
            (Some(_), Some(_)) if self.state.have_rewards_started => Phase::Active,
            (Some(_), Some(_)) => Phase::Ready,
        }
    }

    pub fn remaining_epochs(&self) -> usize {
        self.state
            .reward_epochs
            .as_ref()
            .map_or(0, |epochs| epochs.len().saturating_sub(self.state.distributed_epochs))
    }

    pub fn all_epochs(&self) -> &[U256] {
        self.state.reward_epochs.as_deref().unwrap_or_default()
    }

    pub fn is_setup_complete(&self) -> bool {
        self.state.config.is_some()
    }

    pub fn is_reward_epochs_set(&self) -> bool {
        self.state.reward_epochs.is_some()
    }

    pub fn min_epoch_duration(&self) -> U256 {
        self.state
            .config
            .map_or(DEFAULT_EPOCH_DURATION, |config| config.min_epoch_duration)
    }

    pub fn funding_source(&self) -> Option<Address> {
        self.state.config.map(|config| config.funding_source)
    }

    pub fn receiving_gauge(&self) -> Option<Address> {
        self.state.config.map(|config| config.receiving_gauge)
    }

    pub fn last_distribution_time(&self) -> U256 {
        self.state.last_distribution_time
    }

    pub fn have_rewards_started(&self) -> bool {
        self.state.have_rewards_started
    }

    pub fn guards(&self) -> &Guards {
        &self.guards
    }

    pub fn bounty(&self) -> Option<Bounty> {
        self.bounty
    }

    pub fn state(&self) -> &CampaignState {
        &self.state
    }

    // Amounts are consumed from the tail of the list as it was handed in.
    fn next_amount(&self) -> Result<U256, CampaignError> {
        let epochs = self
            .state
            .reward_epochs
            .as_ref()
            .ok_or(CampaignError::RewardEpochsNotSet)?;

        let remaining = epochs.len().saturating_sub(self.state.distributed_epochs);
        if remaining == 0 {
            return Err(CampaignError::NoRemainingEpochs);
        }

        Ok(epochs[remaining - 1])
    }

    fn next_allowed_time(&self) -> Result<U256, CampaignError> {
        let earliest = safe_add(
            self.state.last_distribution_time,
            self.min_epoch_duration(),
        )?;

        Ok(safe_sub(earliest, DISTRIBUTION_BUFFER)?)
    }

    fn pacing_allows(&self, now: U256) -> Result<bool, CampaignError> {
        if !self.state.have_rewards_started {
            return Ok(true);
        }

        Ok(now >= self.next_allowed_time()?)
    }
}

//! Flat mirrors of the contracts' storage layouts.
//!
//! Contracts read their slots into a record, turn it into the core type, and
//! write back only what the core changed.

use alloy_primitives::{Address, U256};

use crate::{
    campaigns::CampaignAddresses,
    guards::Guards,
    router::RewardRouter,
    schedule::{Bounty, CampaignConfig, CampaignState, EpochDistributor},
};

/// Campaign contract slots. Config fields are only meaningful once
/// `is_setup_complete` is set and the epoch list once
/// `is_reward_epochs_set` is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignRecord {
    pub guards: Vec<Address>,
    pub execute_reward_token: Address,
    pub execute_reward_amount: U256,
    pub reward_manager: Address,
    pub receiving_reward_manager: Address,
    pub min_epoch_duration: U256,
    pub is_setup_complete: bool,
    pub reward_epochs: Vec<U256>,
    pub is_reward_epochs_set: bool,
    pub distributed_epochs: U256,
    pub last_reward_distribution_time: U256,
    pub have_rewards_started: bool,
}

impl CampaignRecord {
    pub fn from_distributor(campaign: &EpochDistributor) -> Self {
        let state = campaign.state();
        let config = state.config;
        let bounty = campaign.bounty();

        Self {
            guards: campaign.guards().as_slice().to_vec(),
            execute_reward_token: bounty.map_or(Address::ZERO, |bounty| bounty.token),
            execute_reward_amount: bounty.map_or(U256::ZERO, |bounty| bounty.amount),
            reward_manager: config.map_or(Address::ZERO, |config| config.funding_source),
            receiving_reward_manager: config.map_or(Address::ZERO, |config| config.receiving_gauge),
            min_epoch_duration: config.map_or(U256::ZERO, |config| config.min_epoch_duration),
            is_setup_complete: config.is_some(),
            reward_epochs: state.reward_epochs.clone().unwrap_or_default(),
            is_reward_epochs_set: state.reward_epochs.is_some(),
            distributed_epochs: U256::from(state.distributed_epochs),
            last_reward_distribution_time: state.last_distribution_time,
            have_rewards_started: state.have_rewards_started,
        }
    }

    pub fn into_distributor(self) -> EpochDistributor {
        let config = self.is_setup_complete.then_some(CampaignConfig {
            funding_source: self.reward_manager,
            receiving_gauge: self.receiving_reward_manager,
            min_epoch_duration: self.min_epoch_duration,
        });

        let state = CampaignState {
            config,
            reward_epochs: self.is_reward_epochs_set.then_some(self.reward_epochs),
            distributed_epochs: usize::try_from(self.distributed_epochs).unwrap_or(usize::MAX),
            last_distribution_time: self.last_reward_distribution_time,
            have_rewards_started: self.have_rewards_started,
        };

        EpochDistributor::restore(
            Guards::new(self.guards),
            Bounty::new(self.execute_reward_token, self.execute_reward_amount),
            state,
        )
    }
}

/// Router contract slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouterRecord {
    pub guards: Vec<Address>,
    pub reward_token: Address,
    pub receiving_gauges: Vec<Address>,
    pub recovery_address: Address,
    pub campaign_addresses: Vec<Address>,
}

impl RouterRecord {
    pub fn from_router(router: &RewardRouter) -> Self {
        Self {
            guards: router.guards().as_slice().to_vec(),
            reward_token: router.reward_token(),
            receiving_gauges: router.receiving_gauges().to_vec(),
            recovery_address: router.recovery_address(),
            campaign_addresses: router.campaign_addresses().as_slice().to_vec(),
        }
    }

    pub fn into_router(self) -> RewardRouter {
        RewardRouter::restore(
            Guards::new(self.guards),
            self.reward_token,
            self.receiving_gauges,
            self.recovery_address,
            CampaignAddresses::from_list(self.campaign_addresses),
        )
    }
}

/// Storage writes that bring a persisted `address[]` in line with the
/// router's campaign set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListWrite {
    Unchanged,
    Push(Address),
    Rewrite(Vec<Address>),
}

impl ListWrite {
    pub fn diff(stored: &[Address], current: &CampaignAddresses) -> Self {
        let current = current.as_slice();

        if stored == current {
            return Self::Unchanged;
        }

        match current.split_last() {
            Some((&last, head)) if head == stored => Self::Push(last),
            _ => Self::Rewrite(current.to_vec()),
        }
    }
}

#![cfg_attr(not(feature = "export-abi"), no_main)]
extern crate alloc;

#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

use alloy_primitives::{Address, U256};
use gauge_common::{
    errors::CampaignError,
    host::{no_reentrant, CallContextExt},
    schedule::{EpochDistributor, Release},
    storage::CampaignRecord,
    DISTRIBUTION_BUFFER,
};
use gauge_interfaces::{
    campaign::{ExecuteRewardPaid, RewardDistributed, RewardEpochsSet, SetupCompleted},
    distributor::IDistributor,
    erc20::{safe_transfer, IErc20},
};
use stylus_sdk::{block, contract, evm, msg, prelude::*};

sol_storage! {
    #[entrypoint]
    pub struct Campaign {
        bool initialized;

        address[] guards;

        address execute_reward_token;
        uint256 execute_reward_amount;

        address reward_manager;
        address receiving_reward_manager;
        uint256 min_epoch_duration;
        bool is_setup_complete;

        uint256[] reward_epochs;
        bool is_reward_epochs_set;
        uint256 distributed_epochs;

        uint256 last_reward_distribution_time;
        bool have_rewards_started;
    }
}

impl Campaign {
    fn record(&self) -> CampaignRecord {
        let reward_epochs = if self.is_reward_epochs_set.get() {
            (0..self.reward_epochs.len())
                .filter_map(|i| self.reward_epochs.get(i))
                .collect()
        } else {
            vec![]
        };

        CampaignRecord {
            guards: (0..self.guards.len()).filter_map(|i| self.guards.get(i)).collect(),
            execute_reward_token: self.execute_reward_token.get(),
            execute_reward_amount: self.execute_reward_amount.get(),
            reward_manager: self.reward_manager.get(),
            receiving_reward_manager: self.receiving_reward_manager.get(),
            min_epoch_duration: self.min_epoch_duration.get(),
            is_setup_complete: self.is_setup_complete.get(),
            reward_epochs,
            is_reward_epochs_set: self.is_reward_epochs_set.get(),
            distributed_epochs: self.distributed_epochs.get(),
            last_reward_distribution_time: self.last_reward_distribution_time.get(),
            have_rewards_started: self.have_rewards_started.get(),
        }
    }

    fn load(&self) -> EpochDistributor {
        self.record().into_distributor()
    }

    fn store_progress(&mut self, campaign: &EpochDistributor) {
        let record = CampaignRecord::from_distributor(campaign);

        self.distributed_epochs.set(record.distributed_epochs);
        self.last_reward_distribution_time
            .set(record.last_reward_distribution_time);
        self.have_rewards_started.set(record.have_rewards_started);
    }

    fn now() -> U256 {
        U256::from(block::timestamp())
    }

    fn fund(&mut self, release: &Release) -> Result<(), Vec<u8>> {
        let distributor = IDistributor::new(release.funding_source);
        distributor.send_reward_token_with_epoch(
            self.ctx(),
            release.receiving_gauge,
            release.amount,
            release.epoch_duration,
        )?;

        evm::log(RewardDistributed {
            receiving_reward_manager: release.receiving_gauge,
            amount: release.amount,
            remaining_epochs: U256::from(release.remaining_epochs),
        });

        Ok(())
    }
}

#[external]
impl Campaign {
    pub fn init(
        &mut self,
        guards: Vec<Address>,
        execute_reward_token: Address,
        execute_reward_amount: U256,
    ) -> Result<(), Vec<u8>> {
        if self.initialized.get() {
            return Err(CampaignError::AlreadyInitialized.into());
        }

        for guard in guards {
            self.guards.push(guard);
        }

        self.execute_reward_token.set(execute_reward_token);
        self.execute_reward_amount.set(execute_reward_amount);

        self.initialized.set(true);

        Ok(())
    }

    pub fn setup(
        &mut self,
        reward_manager: Address,
        receiving_reward_manager: Address,
        min_epoch_duration: U256,
    ) -> Result<(), Vec<u8>> {
        let mut campaign = Campaign::load(self);
        campaign.setup(
            msg::sender(),
            reward_manager,
            receiving_reward_manager,
            min_epoch_duration,
        )?;

        let record = CampaignRecord::from_distributor(&campaign);
        self.reward_manager.set(record.reward_manager);
        self.receiving_reward_manager
            .set(record.receiving_reward_manager);
        self.min_epoch_duration.set(record.min_epoch_duration);
        self.is_setup_complete.set(record.is_setup_complete);

        evm::log(SetupCompleted {
            reward_manager: record.reward_manager,
            receiving_reward_manager: record.receiving_reward_manager,
            min_epoch_duration: record.min_epoch_duration,
        });

        Ok(())
    }

    pub fn set_reward_epochs(&mut self, epochs: Vec<U256>) -> Result<(), Vec<u8>> {
        let mut campaign = Campaign::load(self);
        campaign.set_reward_epochs(msg::sender(), epochs)?;

        let record = CampaignRecord::from_distributor(&campaign);
        let count = U256::from(record.reward_epochs.len());
        for amount in record.reward_epochs {
            self.reward_epochs.push(amount);
        }
        self.distributed_epochs.set(record.distributed_epochs);
        self.is_reward_epochs_set.set(record.is_reward_epochs_set);

        evm::log(RewardEpochsSet { epochs: count });

        Ok(())
    }

    pub fn distribute_reward(&mut self) -> Result<(), Vec<u8>> {
        no_reentrant()?;

        let mut campaign = Campaign::load(self);
        let release = campaign.distribute_reward(Self::now())?;

        self.store_progress(&campaign);
        self.fund(&release)
    }

    pub fn execute(&mut self) -> Result<(), Vec<u8>> {
        no_reentrant()?;

        let mut campaign = Campaign::load(self);
        let bounty_balance = match campaign.bounty() {
            Some(bounty) => IErc20::new(bounty.token).balance_of(self.ctx(), contract::address())?,
            None => U256::ZERO,
        };

        let execution = campaign.execute(msg::sender(), Self::now(), bounty_balance)?;

        self.store_progress(&campaign);
        self.fund(&execution.release)?;

        if let Some(bounty) = execution.bounty {
            safe_transfer(self.ctx(), bounty.token, bounty.to, bounty.amount)?;

            evm::log(ExecuteRewardPaid {
                executor: bounty.to,
                token: bounty.token,
                amount: bounty.amount,
            });
        }

        Ok(())
    }

    pub fn get_next_epoch_info(&self) -> Result<(U256, U256), Vec<u8>> {
        Ok(Campaign::load(self).next_epoch_info(Self::now())?)
    }

    pub fn execution_allowed(&self) -> Result<bool, Vec<u8>> {
        Ok(Campaign::load(self).execution_allowed(Self::now())?)
    }

    pub fn get_number_of_remaining_epochs(&self) -> Result<U256, Vec<u8>> {
        Ok(U256::from(Campaign::load(self).remaining_epochs()))
    }

    pub fn get_all_epochs(&self) -> Result<Vec<U256>, Vec<u8>> {
        Ok(Campaign::load(self).all_epochs().to_vec())
    }

    pub fn is_setup_complete(&self) -> Result<bool, Vec<u8>> {
        Ok(self.is_setup_complete.get())
    }

    pub fn is_reward_epochs_set(&self) -> Result<bool, Vec<u8>> {
        Ok(self.is_reward_epochs_set.get())
    }

    pub fn guards(&self, index: U256) -> Result<Address, Vec<u8>> {
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        Ok(self.guards.get(index).unwrap_or_default())
    }

    pub fn reward_manager(&self) -> Result<Address, Vec<u8>> {
        Ok(self.reward_manager.get())
    }

    pub fn receiving_reward_manager(&self) -> Result<Address, Vec<u8>> {
        Ok(self.receiving_reward_manager.get())
    }

    pub fn min_epoch_duration(&self) -> Result<U256, Vec<u8>> {
        Ok(Campaign::load(self).min_epoch_duration())
    }

    pub fn last_reward_distribution_time(&self) -> Result<U256, Vec<u8>> {
        Ok(self.last_reward_distribution_time.get())
    }

    pub fn have_rewards_started(&self) -> Result<bool, Vec<u8>> {
        Ok(self.have_rewards_started.get())
    }

    pub fn execute_reward_token(&self) -> Result<Address, Vec<u8>> {
        Ok(self.execute_reward_token.get())
    }

    pub fn execute_reward_amount(&self) -> Result<U256, Vec<u8>> {
        Ok(self.execute_reward_amount.get())
    }

    #[selector(name = "DISTRIBUTION_BUFFER")]
    pub fn distribution_buffer(&self) -> Result<U256, Vec<u8>> {
        Ok(DISTRIBUTION_BUFFER)
    }
}

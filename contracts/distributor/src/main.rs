#![cfg_attr(not(feature = "export-abi"), no_main)]
extern crate alloc;

#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

use alloy_primitives::{Address, U256};
use gauge_common::{
    errors::DistributorError,
    host::{no_reentrant, CallContextExt},
    router::{Funding, Payout, RewardRouter},
    storage::{ListWrite, RouterRecord},
};
use gauge_interfaces::{
    distributor::{CampaignAddressAdded, CampaignAddressRemoved, RewardSent, TokenRecovered},
    erc20::{safe_approve, safe_transfer, safe_transfer_from, IErc20},
    gauge::IRewardGauge,
};
use stylus_sdk::{contract, evm, msg, prelude::*};

sol_storage! {
    #[entrypoint]
    pub struct Distributor {
        bool initialized;

        address[] guards;

        address reward_token;
        address[] receiving_gauges;
        address recovery_address;

        address[] campaign_addresses;
    }
}

impl Distributor {
    fn record(&self) -> RouterRecord {
        RouterRecord {
            guards: (0..self.guards.len()).filter_map(|i| self.guards.get(i)).collect(),
            reward_token: self.reward_token.get(),
            receiving_gauges: (0..self.receiving_gauges.len())
                .filter_map(|i| self.receiving_gauges.get(i))
                .collect(),
            recovery_address: self.recovery_address.get(),
            campaign_addresses: (0..self.campaign_addresses.len())
                .filter_map(|i| self.campaign_addresses.get(i))
                .collect(),
        }
    }

    fn load(&self) -> RewardRouter {
        self.record().into_router()
    }

    fn store_campaigns(&mut self, write: ListWrite) {
        match write {
            ListWrite::Unchanged => {}
            ListWrite::Push(campaign) => self.campaign_addresses.push(campaign),
            ListWrite::Rewrite(campaigns) => {
                self.campaign_addresses.erase();
                for campaign in campaigns {
                    self.campaign_addresses.push(campaign);
                }
            }
        }
    }

    fn send(
        &mut self,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
        pull: bool,
    ) -> Result<(), Vec<u8>> {
        no_reentrant()?;

        let caller = msg::sender();
        let record = self.record();
        let stored = record.campaign_addresses.clone();
        let mut router = record.into_router();

        let payout = if pull {
            router.deposit_send_reward_token(caller, receiver, amount, epoch)?
        } else {
            router.send_reward_token(caller, receiver, amount, epoch)?
        };

        let write = ListWrite::diff(&stored, router.campaign_addresses());
        if let ListWrite::Push(campaign) = write {
            evm::log(CampaignAddressAdded { campaign });
        }
        self.store_campaigns(write);

        self.forward(caller, payout)
    }

    /// Moves a payout into the receiving gauge: pulls the funds in first when
    /// required, approves the gauge and lets it collect.
    fn forward(&mut self, caller: Address, payout: Payout) -> Result<(), Vec<u8>> {
        if let Funding::PullFrom(source) = payout.funding {
            safe_transfer_from(
                self.ctx(),
                payout.token,
                source,
                contract::address(),
                payout.amount,
            )?;
        }

        safe_approve(self.ctx(), payout.token, payout.receiver, payout.amount)?;

        let gauge = IRewardGauge::new(payout.receiver);
        gauge.deposit_reward_token(self.ctx(), payout.token, payout.amount, payout.epoch)?;

        evm::log(RewardSent {
            caller,
            receiver: payout.receiver,
            amount: payout.amount,
            epoch: payout.epoch,
        });

        Ok(())
    }
}

#[external]
impl Distributor {
    pub fn init(
        &mut self,
        guards: Vec<Address>,
        reward_token: Address,
        receiving_gauges: Vec<Address>,
        recovery_address: Address,
    ) -> Result<(), Vec<u8>> {
        if self.initialized.get() {
            return Err(DistributorError::AlreadyInitialized.into());
        }

        for guard in guards {
            self.guards.push(guard);
        }
        for gauge in receiving_gauges {
            self.receiving_gauges.push(gauge);
        }

        self.reward_token.set(reward_token);
        self.recovery_address.set(recovery_address);

        self.initialized.set(true);

        Ok(())
    }

    pub fn send_reward_token(&mut self, receiver: Address, amount: U256) -> Result<(), Vec<u8>> {
        self.send(receiver, amount, None, false)
    }

    pub fn send_reward_token_with_epoch(
        &mut self,
        receiver: Address,
        amount: U256,
        epoch: U256,
    ) -> Result<(), Vec<u8>> {
        self.send(receiver, amount, Some(epoch), false)
    }

    pub fn deposit_send_reward_token(
        &mut self,
        receiver: Address,
        amount: U256,
    ) -> Result<(), Vec<u8>> {
        self.send(receiver, amount, None, true)
    }

    pub fn deposit_send_reward_token_with_epoch(
        &mut self,
        receiver: Address,
        amount: U256,
        epoch: U256,
    ) -> Result<(), Vec<u8>> {
        self.send(receiver, amount, Some(epoch), true)
    }

    pub fn deposit_reward_token_from_contract(
        &mut self,
        receiver: Address,
        amount: U256,
    ) -> Result<(), Vec<u8>> {
        no_reentrant()?;

        let router = Distributor::load(self);
        let token = IErc20::new(router.reward_token());
        let balance = token.balance_of(self.ctx(), contract::address())?;

        let payout =
            router.deposit_reward_token_from_contract(msg::sender(), receiver, amount, None, balance)?;

        self.forward(msg::sender(), payout)
    }

    pub fn recover_token(&mut self, token: Address, amount: U256) -> Result<(), Vec<u8>> {
        no_reentrant()?;

        let recovery = Distributor::load(self).recover_token(msg::sender(), token, amount)?;
        safe_transfer(self.ctx(), recovery.token, recovery.to, recovery.amount)?;

        evm::log(TokenRecovered {
            token: recovery.token,
            to: recovery.to,
            amount: recovery.amount,
        });

        Ok(())
    }

    pub fn remove_campaign_address(&mut self, campaign: Address) -> Result<(), Vec<u8>> {
        let record = self.record();
        let stored = record.campaign_addresses.clone();
        let mut router = record.into_router();

        if router.remove_campaign_address(msg::sender(), campaign)? {
            self.store_campaigns(ListWrite::diff(&stored, router.campaign_addresses()));
            evm::log(CampaignAddressRemoved { campaign });
        }

        Ok(())
    }

    pub fn get_all_campaign_addresses(&self) -> Result<Vec<Address>, Vec<u8>> {
        Ok(Distributor::load(self).campaign_addresses().as_slice().to_vec())
    }

    pub fn campaign_addresses(&self, index: U256) -> Result<Address, Vec<u8>> {
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        Ok(self.campaign_addresses.get(index).unwrap_or_default())
    }

    pub fn guards(&self, index: U256) -> Result<Address, Vec<u8>> {
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        Ok(self.guards.get(index).unwrap_or_default())
    }

    pub fn receiving_gauges(&self, index: U256) -> Result<Address, Vec<u8>> {
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        Ok(self.receiving_gauges.get(index).unwrap_or_default())
    }

    pub fn reward_token(&self) -> Result<Address, Vec<u8>> {
        Ok(self.reward_token.get())
    }

    pub fn recovery_address(&self) -> Result<Address, Vec<u8>> {
        Ok(self.recovery_address.get())
    }
}

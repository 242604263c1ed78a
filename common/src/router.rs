//! Multi-receiver router: holds a pool of one reward token and forwards it to
//! allow-listed gauges on behalf of guards (operators and campaign
//! contracts), remembering which callers have been funded.

use alloy_primitives::{Address, U256};

use crate::{
    campaigns::CampaignAddresses, errors::DistributorError, guards::Guards,
    is_valid_epoch_duration, DEFAULT_EPOCH_DURATION,
};

/// Where the forwarded tokens come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Funding {
    /// Router's own balance.
    FromBalance,
    /// Pulled from an approved account first.
    PullFrom(Address),
}

/// Approve-and-deposit the host performs against the receiving gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub token: Address,
    pub receiver: Address,
    pub amount: U256,
    pub epoch: U256,
    pub funding: Funding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pub token: Address,
    pub to: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRouter {
    guards: Guards,
    reward_token: Address,
    receiving_gauges: Vec<Address>,
    recovery_address: Address,
    campaigns: CampaignAddresses,
}

impl RewardRouter {
    pub fn new(
        guards: Guards,
        reward_token: Address,
        receiving_gauges: Vec<Address>,
        recovery_address: Address,
    ) -> Self {
        Self::restore(
            guards,
            reward_token,
            receiving_gauges,
            recovery_address,
            CampaignAddresses::new(),
        )
    }

    pub fn restore(
        guards: Guards,
        reward_token: Address,
        receiving_gauges: Vec<Address>,
        recovery_address: Address,
        campaigns: CampaignAddresses,
    ) -> Self {
        Self {
            guards,
            reward_token,
            receiving_gauges,
            recovery_address,
            campaigns,
        }
    }

    pub fn send_reward_token(
        &mut self,
        caller: Address,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
    ) -> Result<Payout, DistributorError> {
        let payout = self.payout(caller, receiver, amount, epoch, Funding::FromBalance)?;
        self.track(caller);

        Ok(payout)
    }

    pub fn deposit_send_reward_token(
        &mut self,
        caller: Address,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
    ) -> Result<Payout, DistributorError> {
        let payout = self.payout(caller, receiver, amount, epoch, Funding::PullFrom(caller))?;
        self.track(caller);

        Ok(payout)
    }

    /// Forwards from the router's balance without campaign bookkeeping.
    pub fn deposit_reward_token_from_contract(
        &self,
        caller: Address,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
        router_balance: U256,
    ) -> Result<Payout, DistributorError> {
        let payout = self.payout(caller, receiver, amount, epoch, Funding::FromBalance)?;

        if router_balance < amount {
            return Err(DistributorError::InsufficientBalance);
        }

        Ok(payout)
    }

    /// Sweeps any token, the reward token included, to the recovery address.
    pub fn recover_token(
        &self,
        caller: Address,
        token: Address,
        amount: U256,
    ) -> Result<Recovery, DistributorError> {
        self.guards.ensure(caller)?;

        if amount == U256::ZERO {
            return Err(DistributorError::InvalidAmount);
        }

        Ok(Recovery {
            token,
            to: self.recovery_address,
            amount,
        })
    }

    pub fn remove_campaign_address(
        &mut self,
        caller: Address,
        address: Address,
    ) -> Result<bool, DistributorError> {
        self.guards.ensure(caller)?;

        let removed = self.campaigns.remove(address);
        if removed {
            log::info!("campaign address {address} removed");
        }

        Ok(removed)
    }

    pub fn guards(&self) -> &Guards {
        &self.guards
    }

    pub fn reward_token(&self) -> Address {
        self.reward_token
    }

    pub fn receiving_gauges(&self) -> &[Address] {
        &self.receiving_gauges
    }

    pub fn is_receiving_gauge(&self, receiver: Address) -> bool {
        self.receiving_gauges.contains(&receiver)
    }

    pub fn recovery_address(&self) -> Address {
        self.recovery_address
    }

    pub fn campaign_addresses(&self) -> &CampaignAddresses {
        &self.campaigns
    }

    fn payout(
        &self,
        caller: Address,
        receiver: Address,
        amount: U256,
        epoch: Option<U256>,
        funding: Funding,
    ) -> Result<Payout, DistributorError> {
        self.guards.ensure(caller)?;

        if let Some(epoch) = epoch {
            if !is_valid_epoch_duration(epoch) {
                return Err(DistributorError::InvalidDuration);
            }
        }

        if amount == U256::ZERO {
            return Err(DistributorError::InvalidAmount);
        }

        if !self.is_receiving_gauge(receiver) {
            return Err(DistributorError::ReceiverNotAllowed);
        }

        Ok(Payout {
            token: self.reward_token,
            receiver,
            amount,
            epoch: epoch.unwrap_or(DEFAULT_EPOCH_DURATION),
            funding,
        })
    }

    fn track(&mut self, caller: Address) {
        if self.campaigns.insert(caller) {
            log::info!("tracking new campaign address {caller}");
        }
    }
}

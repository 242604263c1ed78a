#![cfg_attr(not(feature = "export-abi"), no_main)]
extern crate alloc;

#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

use alloy_primitives::{Address, U256};
use gauge_common::{
    errors::DistributorError,
    host::{no_reentrant, CallContextExt},
};
use gauge_interfaces::{
    erc20::{safe_transfer, safe_transfer_from, IErc20},
    gauge::{RewardDeposited, RewardForwarded},
};
use stylus_sdk::{contract, evm, msg, prelude::*};

// Stand-in receiver for gauges that cannot take rewards: whatever it is sent
// can be swept to the recovery address by anyone.
sol_storage! {
    #[entrypoint]
    pub struct RecoveryGauge {
        bool initialized;

        address reward_token;
        address recovery_address;
    }
}

#[external]
impl RecoveryGauge {
    pub fn init(&mut self, reward_token: Address, recovery_address: Address) -> Result<(), Vec<u8>> {
        if self.initialized.get() {
            return Err(DistributorError::AlreadyInitialized.into());
        }

        self.reward_token.set(reward_token);
        self.recovery_address.set(recovery_address);

        self.initialized.set(true);

        Ok(())
    }

    pub fn deposit_reward_token(
        &mut self,
        token: Address,
        amount: U256,
        epoch: U256,
    ) -> Result<(), Vec<u8>> {
        no_reentrant()?;

        if amount == U256::ZERO {
            return Err(DistributorError::InvalidAmount.into());
        }

        safe_transfer_from(self.ctx(), token, msg::sender(), contract::address(), amount)?;

        evm::log(RewardDeposited {
            from: msg::sender(),
            token,
            amount,
            epoch,
        });

        Ok(())
    }

    pub fn recover_token(&mut self) -> Result<bool, Vec<u8>> {
        no_reentrant()?;

        let token = self.reward_token.get();
        let to = self.recovery_address.get();
        let balance = IErc20::new(token).balance_of(self.ctx(), contract::address())?;

        if balance > U256::ZERO {
            safe_transfer(self.ctx(), token, to, balance)?;
        }

        evm::log(RewardForwarded {
            token,
            to,
            amount: balance,
        });

        Ok(true)
    }

    pub fn reward_token(&self) -> Result<Address, Vec<u8>> {
        Ok(self.reward_token.get())
    }

    pub fn recovery_address(&self) -> Result<Address, Vec<u8>> {
        Ok(self.recovery_address.get())
    }
}

//! Off-chain view of fungible token balances.
//!
//! `TokenLedger` mirrors the ERC20 calls the contracts make; `MemoryLedger`
//! keeps everything in memory for dry runs and tests.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient balance of {token} for {account}")]
    InsufficientBalance { token: Address, account: Address },
    #[error("insufficient allowance of {token} from {owner} to {spender}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
    #[error("transfer involving the zero address")]
    ZeroAddress,
    #[error("balance overflow")]
    Overflow,
}

pub trait TokenLedger {
    fn balance_of(&self, token: Address, account: Address) -> U256;

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256;

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(token, from, spender);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                token,
                owner: from,
                spender,
            })?;

        self.transfer(token, from, to, amount)?;
        self.approve(token, from, spender, remaining)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    balances: BTreeMap<(Address, Address), U256>,
    allowances: BTreeMap<(Address, Address, Address), U256>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(
        &mut self,
        token: Address,
        account: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        let balance = self.balance_of(token, account);
        let balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.balances.insert((token, account), balance);

        Ok(())
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        let from_balance = self
            .balance_of(token, from)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                token,
                account: from,
            })?;
        self.balances.insert((token, from), from_balance);

        let to_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert((token, to), to_balance);

        Ok(())
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        self.allowances.insert((token, owner, spender), amount);

        Ok(())
    }
}

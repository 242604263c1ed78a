extern crate alloc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolError};
use stylus_sdk::{
    call::{Error as CallError, NonPayableCallContext},
    stylus_proc::sol_interface,
};

sol! {
    error SafeTransferFailed();
    error SafeTransferFromFailed();
    error SafeApproveFailed();
}

sol_interface! {
    interface IErc20 {
        function balanceOf(address account) external view returns (uint256);

        function transfer(address recipient, uint256 amount) external returns (bool);

        function approve(address spender, uint256 amount) external returns (bool);

        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);
    }
}

impl From<Address> for IErc20 {
    fn from(addr: Address) -> Self {
        Self::new(addr)
    }
}

/// Token call that either reverted or returned `false`.
#[derive(Debug)]
pub enum SafeTransferError {
    TransferFailed,
    TransferFromFailed,
    ApproveFailed,
    CallError(CallError),
}

impl From<CallError> for SafeTransferError {
    fn from(err: CallError) -> Self {
        Self::CallError(err)
    }
}

impl From<SafeTransferError> for Vec<u8> {
    fn from(err: SafeTransferError) -> Vec<u8> {
        use SafeTransferError as E;
        match err {
            E::TransferFailed => SafeTransferFailed {}.encode(),
            E::TransferFromFailed => SafeTransferFromFailed {}.encode(),
            E::ApproveFailed => SafeApproveFailed {}.encode(),
            E::CallError(err) => err.into(),
        }
    }
}

pub fn safe_transfer(
    ctx: impl NonPayableCallContext,
    token: impl Into<IErc20>,
    recipient: Address,
    amount: U256,
) -> Result<(), SafeTransferError> {
    let token: IErc20 = token.into();

    if token.transfer(ctx, recipient, amount)? {
        Ok(())
    } else {
        Err(SafeTransferError::TransferFailed)
    }
}

pub fn safe_transfer_from(
    ctx: impl NonPayableCallContext,
    token: impl Into<IErc20>,
    sender: Address,
    recipient: Address,
    amount: U256,
) -> Result<(), SafeTransferError> {
    let token: IErc20 = token.into();

    if token.transfer_from(ctx, sender, recipient, amount)? {
        Ok(())
    } else {
        Err(SafeTransferError::TransferFromFailed)
    }
}

pub fn safe_approve(
    ctx: impl NonPayableCallContext,
    token: impl Into<IErc20>,
    spender: Address,
    amount: U256,
) -> Result<(), SafeTransferError> {
    let token: IErc20 = token.into();

    if token.approve(ctx, spender, amount)? {
        Ok(())
    } else {
        Err(SafeTransferError::ApproveFailed)
    }
}

//! Helpers for contract entrypoints running on Stylus.

use alloy_sol_types::SolError;
use stylus_sdk::{call::Call, console, msg, storage::TopLevelStorage};

use crate::errors::ReentrantCall;

/// Call context for reaching other contracts from a `&mut self` entrypoint.
pub trait CallContextExt {
    fn ctx(&mut self) -> Call<&mut Self>;
}

impl<T> CallContextExt for T
where
    T: TopLevelStorage,
{
    fn ctx(&mut self) -> Call<&mut Self> {
        Call::new_in(self)
    }
}

/// Rejects the call when the contract is already further up the call stack.
/// Entrypoints that move tokens check this before touching storage.
pub fn no_reentrant() -> Result<(), Vec<u8>> {
    if msg::reentrant() {
        console!("reentrant call rejected from {}", msg::sender());
        return Err(ReentrantCall {}.encode());
    }

    Ok(())
}

use alloy_primitives::Address;

use crate::errors::{CampaignError, DistributorError};

/// Raised when a privileged operation is attempted by an address outside the
/// guard set.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct NotGuard(pub Address);

impl From<NotGuard> for CampaignError {
    fn from(_: NotGuard) -> Self {
        CampaignError::OnlyGuards
    }
}

impl From<NotGuard> for DistributorError {
    fn from(_: NotGuard) -> Self {
        DistributorError::OnlyGuards
    }
}

/// Fixed, ordered set of addresses allowed to administer an instance.
///
/// The set is bound once when the instance is created and has no mutation
/// API afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Guards(Vec<Address>);

impl Guards {
    pub fn new(guards: impl IntoIterator<Item = Address>) -> Self {
        Self(guards.into_iter().collect())
    }

    pub fn contains(&self, account: Address) -> bool {
        self.0.contains(&account)
    }

    pub fn ensure(&self, caller: Address) -> Result<(), NotGuard> {
        if !self.contains(caller) {
            log::debug!("rejected privileged call from {caller}");
            return Err(NotGuard(caller));
        }

        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<Address> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.0
    }
}

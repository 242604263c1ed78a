use std::collections::HashSet;

use alloy_primitives::Address;

/// Addresses that have pulled rewards through the router, in first-seen order.
///
/// Removal shifts later entries down so the remaining order is preserved and
/// no holes are left behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignAddresses {
    ordered: Vec<Address>,
    members: HashSet<Address>,
}

impl CampaignAddresses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the set from a persisted list, dropping duplicates.
    pub fn from_list(addresses: impl IntoIterator<Item = Address>) -> Self {
        let mut set = Self::new();
        for address in addresses {
            set.insert(address);
        }
        set
    }

    /// Returns true if the address was not tracked before.
    pub fn insert(&mut self, address: Address) -> bool {
        if !self.members.insert(address) {
            return false;
        }

        self.ordered.push(address);
        true
    }

    /// Returns true if the address was tracked. Removing an unknown address is
    /// a no-op.
    pub fn remove(&mut self, address: Address) -> bool {
        if !self.members.remove(&address) {
            return false;
        }

        self.ordered.retain(|tracked| *tracked != address);
        true
    }

    pub fn contains(&self, address: Address) -> bool {
        self.members.contains(&address)
    }

    pub fn get(&self, index: usize) -> Option<Address> {
        self.ordered.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.ordered
    }
}

//! Admin capability injected into contracts at construction.

use poi_types::Address;

/// Decides which accounts may perform admin-only operations.
pub trait AccessControl: Send + Sync {
    fn is_admin(&self, account: &Address) -> bool;
}

/// A single owner account, fixed at deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnerAccess {
    owner: Address,
}

impl OwnerAccess {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }
}

impl AccessControl for OwnerAccess {
    fn is_admin(&self, account: &Address) -> bool {
        *account == self.owner
    }
}

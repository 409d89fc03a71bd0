//! Nullable access capability.

use poi_ledger::AccessControl;
use poi_types::Address;
use std::collections::HashSet;

/// A fake admin capability with a fixed answer.
pub enum NullAccess {
    /// Every account is admin.
    AllowAll,
    /// No account is admin.
    DenyAll,
    /// Exactly the listed accounts are admin.
    Only(HashSet<Address>),
}

impl NullAccess {
    pub fn only(admins: impl IntoIterator<Item = Address>) -> Self {
        Self::Only(admins.into_iter().collect())
    }
}

impl AccessControl for NullAccess {
    fn is_admin(&self, account: &Address) -> bool {
        match self {
            Self::AllowAll => true,
            Self::DenyAll => false,
            Self::Only(admins) => admins.contains(account),
        }
    }
}

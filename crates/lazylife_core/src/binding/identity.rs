//! Owner identity resolution.
//!
//! Bindings never look identity up themselves; callers resolve it once
//! through an `IdentityProvider` and pass it to every call.

use crate::model::record::OwnerId;

pub trait IdentityProvider {
    /// Currently signed-in owner, or `None` while identity is unresolved.
    fn current_owner(&self) -> Option<OwnerId>;
}

/// Fixed identity, e.g. from config or a CLI flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    owner: Option<OwnerId>,
}

impl StaticIdentity {
    pub fn new(owner: OwnerId) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, owner: OwnerId) {
        self.owner = Some(owner);
    }

    pub fn sign_out(&mut self) {
        self.owner = None;
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_owner(&self) -> Option<OwnerId> {
        self.owner.clone()
    }
}

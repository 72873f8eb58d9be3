//! # Identity Capability
//!
//! Authentication is an external concern. The store layer only needs
//! one thing from it: "who owns the documents being read and written
//! right now?". This module is that capability, nothing more - no
//! passwords, no sessions, no sign-up flow.

/// Supplies the currently signed-in identity, if any.
///
/// A session cannot open without one: every query and every write is
/// scoped to the owner this trait reports.
pub trait IdentityProvider: Send + Sync {
    /// Returns the current owner id, or `None` when signed out.
    fn current_identity(&self) -> Option<String>;
}

/// A fixed identity for single-operator deployments and tests.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl StaticIdentity {
    /// Creates a provider that always reports `owner_id`.
    pub fn new(owner_id: impl Into<String>) -> Self {
        StaticIdentity(owner_id.into())
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// The signed-out state, for tests exercising the no-identity path.
#[derive(Debug, Clone, Default)]
pub struct SignedOut;

impl IdentityProvider for SignedOut {
    fn current_identity(&self) -> Option<String> {
        None
    }
}

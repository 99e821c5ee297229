//! Port through which the wizard engine reads the current identity.

use super::SessionIdentity;

/// Supplies the identity of the signed-in user, if any.
///
/// Reads are synchronous: the engine never fetches or refreshes identities.
pub trait SessionSource: Send + Sync {
    /// Returns the current identity, or `None` when signed out.
    fn current(&self) -> Option<SessionIdentity>;
}

/// A fixed identity, for hosts that resolve the session before mounting a
/// wizard.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(Option<SessionIdentity>);

impl StaticSession {
    /// Creates a source that always returns `identity`.
    #[must_use]
    pub const fn signed_in(identity: SessionIdentity) -> Self {
        Self(Some(identity))
    }

    /// Creates a source with no identity.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self(None)
    }
}

impl SessionSource for StaticSession {
    fn current(&self) -> Option<SessionIdentity> {
        self.0.clone()
    }
}

//! Session identity consumed by the wizard engine.
//!
//! Identities (phone + bearer token) are minted by an external
//! authentication collaborator. This module only models them and keeps them
//! in an explicit, expiring store owned by the host application.

mod identity;
mod source;
mod store;

pub use identity::{SessionError, SessionIdentity};
pub use source::{SessionSource, StaticSession};
pub use store::SessionStore;

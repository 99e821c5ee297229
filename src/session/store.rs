//! Explicit in-memory session store with timestamp expiry.

use super::{SessionError, SessionIdentity, SessionSource};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct SessionEntry {
    identity: SessionIdentity,
    expires_at: DateTime<Utc>,
    sequence: u64,
}

#[derive(Debug, Default)]
struct SessionState {
    entries: HashMap<String, SessionEntry>,
    next_sequence: u64,
}

/// Session identities keyed by phone, each expiring at a fixed instant.
///
/// The host creates one store at startup and hands it to wizards as their
/// [`SessionSource`]; nothing about it is process-global.
#[derive(Debug, Clone)]
pub struct SessionStore<C>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<SessionState>>,
    clock: Arc<C>,
}

impl<C> SessionStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            clock,
        }
    }

    /// Stores `identity` for `ttl`, replacing any entry for the same phone.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TtlOutOfRange`] when the expiry instant
    /// overflows, and [`SessionError::Unavailable`] when the lock is
    /// poisoned.
    pub fn insert(&self, identity: SessionIdentity, ttl: TimeDelta) -> Result<(), SessionError> {
        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(ttl)
            .ok_or(SessionError::TtlOutOfRange(ttl))?;
        let mut state = self
            .state
            .write()
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.entries.insert(
            identity.phone().to_owned(),
            SessionEntry {
                identity,
                expires_at,
                sequence,
            },
        );
        Ok(())
    }

    /// Removes the entry for `phone`. Returns `true` when one existed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unavailable`] when the lock is poisoned.
    pub fn revoke(&self, phone: &str) -> Result<bool, SessionError> {
        let mut state = self
            .state
            .write()
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;
        Ok(state.entries.remove(phone).is_some())
    }

    /// Drops every expired entry and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unavailable`] when the lock is poisoned.
    pub fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = self.clock.utc();
        let mut state = self
            .state
            .write()
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - state.entries.len())
    }

    /// Returns the most recently inserted identity that has not expired.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unavailable`] when the lock is poisoned.
    pub fn active(&self) -> Result<Option<SessionIdentity>, SessionError> {
        let now = self.clock.utc();
        let state = self
            .state
            .read()
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;
        Ok(state
            .entries
            .values()
            .filter(|entry| entry.expires_at > now)
            .max_by_key(|entry| entry.sequence)
            .map(|entry| entry.identity.clone()))
    }
}

impl<C> SessionSource for SessionStore<C>
where
    C: Clock + Send + Sync,
{
    fn current(&self) -> Option<SessionIdentity> {
        match self.active() {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(error = %err, "session store unavailable, treating as signed out");
                None
            }
        }
    }
}

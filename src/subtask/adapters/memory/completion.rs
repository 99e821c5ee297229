//! Scripted completion client for exercising finalize flows.

use crate::session::SessionIdentity;
use crate::subtask::{
    domain::{CompletionOutcome, CompletionPayload, FailureReason, TaskKey},
    ports::CompletionClient,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// A claim that reached the (simulated) network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCall {
    /// Claimed task.
    pub task: TaskKey,
    /// Phone of the claiming identity.
    pub phone: String,
    /// Payload sent with the claim.
    pub payload: CompletionPayload,
}

#[derive(Debug)]
struct ScriptState {
    queued: VecDeque<CompletionOutcome>,
    fallback: CompletionOutcome,
    calls: Vec<CompletionCall>,
}

/// Completion client answering from a queue of scripted outcomes.
///
/// Once the queue is empty every claim receives the fallback outcome
/// (`Ok` unless overridden). Claims without an identity fail with
/// `AUTH_REQUIRED` and are not recorded as calls. An optional release
/// signal holds every claim in flight until notified.
#[derive(Debug, Clone)]
pub struct ScriptedCompletionClient {
    state: Arc<Mutex<ScriptState>>,
    release: Option<Arc<Notify>>,
}

impl Default for ScriptedCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCompletionClient {
    /// Creates a client that acknowledges every claim with `Ok`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                queued: VecDeque::new(),
                fallback: CompletionOutcome::Ok,
                calls: Vec::new(),
            })),
            release: None,
        }
    }

    /// Queues outcomes returned before the fallback.
    #[must_use]
    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = CompletionOutcome>) -> Self {
        self.lock().queued.extend(outcomes);
        self
    }

    /// Replaces the fallback outcome.
    #[must_use]
    pub fn with_fallback(self, outcome: CompletionOutcome) -> Self {
        self.lock().fallback = outcome;
        self
    }

    /// Holds each claim until `release` is notified.
    #[must_use]
    pub fn held_until(mut self, release: Arc<Notify>) -> Self {
        self.release = Some(release);
        self
    }

    /// Queues one more outcome.
    pub fn push_outcome(&self, outcome: CompletionOutcome) {
        self.lock().queued.push_back(outcome);
    }

    /// Returns the claims that reached the simulated network.
    #[must_use]
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.lock().calls.clone()
    }

    /// Returns how many claims reached the simulated network.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(
        &self,
        task: &TaskKey,
        identity: Option<&SessionIdentity>,
        payload: &CompletionPayload,
    ) -> CompletionOutcome {
        let Some(identity) = identity else {
            return CompletionOutcome::Fail(FailureReason::auth_required());
        };
        self.lock().calls.push(CompletionCall {
            task: task.clone(),
            phone: identity.phone().to_owned(),
            payload: payload.clone(),
        });
        if let Some(release) = &self.release {
            release.notified().await;
        }
        let mut state = self.lock();
        let fallback = state.fallback.clone();
        state.queued.pop_front().unwrap_or(fallback)
    }
}

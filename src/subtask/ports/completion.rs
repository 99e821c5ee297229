//! Completion service port.

use crate::session::SessionIdentity;
use crate::subtask::domain::{CompletionOutcome, CompletionPayload, TaskKey};
use async_trait::async_trait;

/// Claims completion of a task with the remote service.
///
/// Implementations never return transport errors: every failure is folded
/// into [`CompletionOutcome::Fail`] with a short reason code. Claims are
/// idempotent on the server, which answers a repeated claim with
/// [`CompletionOutcome::AlreadyDone`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends a completion claim for `task`.
    ///
    /// Without an identity the claim fails with `AUTH_REQUIRED` and no
    /// request is made.
    async fn complete(
        &self,
        task: &TaskKey,
        identity: Option<&SessionIdentity>,
        payload: &CompletionPayload,
    ) -> CompletionOutcome;
}

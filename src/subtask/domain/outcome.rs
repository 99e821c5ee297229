//! Completion outcomes and failure reasons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a normalized failure code.
const MAX_REASON_LEN: usize = 64;

/// Short machine-readable reason attached to a failed completion.
///
/// Codes are normalized to upper snake case (`[A-Z0-9_]`), so anything
/// received from the server can be logged and matched safely. Server copy
/// written for people travels separately as an optional, sanitized display
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailureReason {
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl FailureReason {
    /// No session identity was available.
    pub const AUTH_REQUIRED: &'static str = "AUTH_REQUIRED";
    /// The request could not be delivered.
    pub const NETWORK_ERROR: &'static str = "NETWORK_ERROR";
    /// The request timed out.
    pub const TIMEOUT: &'static str = "TIMEOUT";
    /// The response body could not be understood.
    pub const BAD_RESPONSE: &'static str = "BAD_RESPONSE";
    /// The server reported a failure without a code.
    pub const SERVER_ERROR: &'static str = "SERVER_ERROR";

    /// Creates a reason from an arbitrary code, normalizing it.
    ///
    /// Letters are upper-cased, other characters outside `[A-Za-z0-9_]`
    /// become `_`, and the result is truncated. An empty result becomes
    /// [`Self::SERVER_ERROR`].
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        let normalized: String = code
            .as_ref()
            .trim()
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .take(MAX_REASON_LEN)
            .collect();
        let trimmed = normalized.trim_matches('_');
        if trimmed.is_empty() {
            return Self::from_code(Self::SERVER_ERROR.to_owned());
        }
        Self::from_code(trimmed.to_owned())
    }

    const fn from_code(code: String) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// Attaches a display message, already sanitized for the local script.
    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    /// Reason used when no identity is available.
    #[must_use]
    pub fn auth_required() -> Self {
        Self::from_code(Self::AUTH_REQUIRED.to_owned())
    }

    /// Reason for a non-success HTTP status without a usable body.
    #[must_use]
    pub fn http_status(status: u16) -> Self {
        Self::from_code(format!("HTTP_{status}"))
    }

    /// Returns the code as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Returns the display message, if the server sent one in the local
    /// script.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Result of a completion claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The server recorded the completion.
    Ok,
    /// The server had already recorded this completion.
    AlreadyDone,
    /// The claim failed and nothing was recorded locally.
    Fail(FailureReason),
}

impl CompletionOutcome {
    /// Returns `true` for `Ok` and `AlreadyDone`, which lock the task in.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::AlreadyDone)
    }
}


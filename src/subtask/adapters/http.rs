//! HTTP completion client.
//!
//! Claims are sent as `POST {base}/subtask/complete` with a JSON body
//! `{ phone, subtaskKey, payload }` and a bearer token. Every failure is
//! folded into [`CompletionOutcome::Fail`]; the caller never sees a
//! transport error. Server failure text written in the configured
//! [`LocalScript`] is kept, sanitized, as the reason's display message.

use crate::session::SessionIdentity;
use crate::subtask::{
    domain::{
        CompletionOutcome, CompletionPayload, FailureReason, LocalScript, TaskKey,
        sanitize_display_text,
    },
    ports::CompletionClient,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default path of the completion endpoint.
pub const DEFAULT_COMPLETION_PATH: &str = "/subtask/complete";

/// Reason codes that mark a successful response as a replay.
pub const DEFAULT_ALREADY_DONE_CODES: [&str; 3] =
    ["ALREADY_DONE", "ALREADY_COMPLETED", "ALREADY_RECORDED"];

/// Location and behaviour of the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEndpointConfig {
    base_url: Url,
    path: String,
    timeout: Option<Duration>,
    already_done_codes: Vec<String>,
    script: LocalScript,
}

impl CompletionEndpointConfig {
    /// Targets the default path under `base_url`, with no timeout.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            path: DEFAULT_COMPLETION_PATH.to_owned(),
            timeout: None,
            already_done_codes: DEFAULT_ALREADY_DONE_CODES
                .iter()
                .map(|code| (*code).to_owned())
                .collect(),
            script: LocalScript::default(),
        }
    }

    /// Overrides the endpoint path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Bounds every request by `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a reason code that marks a successful response as a replay.
    #[must_use]
    pub fn with_already_done_code(mut self, code: impl AsRef<str>) -> Self {
        self.already_done_codes
            .push(FailureReason::new(code).as_str().to_owned());
        self
    }

    /// Selects the script kept in server failure messages.
    #[must_use]
    pub const fn with_script(mut self, script: LocalScript) -> Self {
        self.script = script;
        self
    }

    /// Returns the script kept in server failure messages.
    #[must_use]
    pub const fn script(&self) -> LocalScript {
        self.script
    }

    /// Returns the configured request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolves the full endpoint URL.
    ///
    /// The path is always relative to the base, so a base of
    /// `https://host/api` yields `https://host/api/subtask/complete`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::InvalidEndpoint`] when the path does not
    /// form a valid URL with the base.
    pub fn endpoint(&self) -> Result<Url, HttpClientError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let directory = format!("{}/", base.path());
            base.set_path(&directory);
        }
        base.join(self.path.trim_start_matches('/'))
            .map_err(|err| HttpClientError::InvalidEndpoint(err.to_string()))
    }

    fn is_already_done(&self, code: &str) -> bool {
        let normalized = FailureReason::new(code);
        self.already_done_codes
            .iter()
            .any(|known| known == normalized.as_str())
    }
}

/// Errors raised while constructing an [`HttpCompletionClient`].
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The configured base URL and path do not form a valid URL.
    #[error("invalid completion endpoint: {0}")]
    InvalidEndpoint(String),

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    phone: &'a str,
    subtask_key: &'a str,
    payload: &'a CompletionPayload,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// [`CompletionClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: Client,
    endpoint: Url,
    config: CompletionEndpointConfig,
}

impl HttpCompletionClient {
    /// Builds a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] when the endpoint is invalid or the
    /// client cannot be built.
    pub fn new(config: CompletionEndpointConfig) -> Result<Self, HttpClientError> {
        let endpoint = config.endpoint()?;
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
            config,
        })
    }

    /// Returns the resolved endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn server_failure(&self, response: &CompletionResponse) -> FailureReason {
        let texts = [response.error.as_deref(), response.reason.as_deref()];
        let code = texts.into_iter().flatten().next().unwrap_or_default();
        let message = texts
            .into_iter()
            .flatten()
            .find_map(|text| sanitize_display_text(text, self.config.script));
        FailureReason::new(code).with_message(message)
    }

    fn classify(&self, success: bool, status: u16, body: &[u8]) -> CompletionOutcome {
        let parsed = serde_json::from_slice::<CompletionResponse>(body);
        if !success {
            let reason = match parsed {
                Ok(response) if response.error.is_some() => self.server_failure(&response),
                _ => FailureReason::http_status(status),
            };
            return CompletionOutcome::Fail(reason);
        }
        let Ok(response) = parsed else {
            return CompletionOutcome::Fail(FailureReason::new(FailureReason::BAD_RESPONSE));
        };
        if !response.ok {
            return CompletionOutcome::Fail(self.server_failure(&response));
        }
        let replayed = [response.reason.as_deref(), response.error.as_deref()]
            .into_iter()
            .flatten()
            .any(|code| self.config.is_already_done(code));
        if replayed {
            CompletionOutcome::AlreadyDone
        } else {
            CompletionOutcome::Ok
        }
    }
}

fn transport_failure(err: &reqwest::Error) -> CompletionOutcome {
    let code = if err.is_timeout() {
        FailureReason::TIMEOUT
    } else {
        FailureReason::NETWORK_ERROR
    };
    CompletionOutcome::Fail(FailureReason::new(code))
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        task: &TaskKey,
        identity: Option<&SessionIdentity>,
        payload: &CompletionPayload,
    ) -> CompletionOutcome {
        let Some(identity) = identity else {
            return CompletionOutcome::Fail(FailureReason::auth_required());
        };
        let body = CompletionRequest {
            phone: identity.phone(),
            subtask_key: task.as_str(),
            payload,
        };
        tracing::debug!(
            task = %task,
            phone = %identity.masked_phone(),
            endpoint = %self.endpoint,
            "sending completion claim"
        );
        let response = match self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(identity.token())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(task = %task, error = %err, "completion request failed");
                return transport_failure(&err);
            }
        };
        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(task = %task, error = %err, "completion body unreadable");
                return transport_failure(&err);
            }
        };
        let outcome = self.classify(status.is_success(), status.as_u16(), &bytes);
        tracing::debug!(
            task = %task,
            status = status.as_u16(),
            outcome = ?outcome,
            "completion claim answered"
        );
        outcome
    }
}

//! Backend configuration with sensible defaults.
//!
//! [`BackendConfig`] controls where the inference backend lives, how the
//! outbound body is shaped, and the timeout/retry budget. The defaults
//! match the hosted workflow the proxy was built against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::BackendError;

/// Configuration for calls to the inference backend.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Absolute URL of the backend run endpoint.
    pub url: String,
    /// Bearer token sent in the `Authorization` header. Empty means no header.
    pub api_token: String,
    /// User identifier sent alongside every query.
    pub user_id: String,
    /// Name of the body field that carries the query text.
    pub query_field: String,
    /// Envelope field holding the map of outputs.
    pub outputs_field: String,
    /// Key of the designated output slot inside `outputs_field`.
    pub output_slot: String,
    /// Budget in milliseconds for the whole attempt sequence.
    pub timeout_ms: u64,
    /// Retries after the first attempt on transport or status failures.
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds.
    pub retry_backoff_ms: u64,
    /// Custom User-Agent string. If `None`, a crate-versioned default is used.
    pub user_agent: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "https://api.stack-ai.com/inference/v0/run".into(),
            api_token: String::new(),
            user_id: "anonymous-user".into(),
            query_field: "in-0".into(),
            outputs_field: "outputs".into(),
            output_slot: "out-0".into(),
            timeout_ms: 25_000,
            max_retries: 2,
            retry_backoff_ms: 1_000,
            user_agent: None,
        }
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field(
                "api_token",
                &if self.api_token.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("user_id", &self.user_id)
            .field("query_field", &self.query_field)
            .field("outputs_field", &self.outputs_field)
            .field("output_slot", &self.output_slot)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Upper bound on configured retries.
pub const MAX_RETRIES_LIMIT: u32 = 5;

impl BackendConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `url` parses and uses `http` or `https`
    /// - `timeout_ms` must be greater than 0
    /// - `max_retries` must be at most [`MAX_RETRIES_LIMIT`]
    /// - `retry_backoff_ms` must be less than `timeout_ms`
    /// - `query_field` and `output_slot` must not be empty
    pub fn validate(&self) -> Result<(), BackendError> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| BackendError::Config(format!("backend url is invalid: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::Config(format!(
                "backend url scheme must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.timeout_ms == 0 {
            return Err(BackendError::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(BackendError::Config(format!(
                "max_retries must be <= {MAX_RETRIES_LIMIT}"
            )));
        }
        if self.retry_backoff_ms >= self.timeout_ms {
            return Err(BackendError::Config(
                "retry_backoff_ms must be less than timeout_ms".into(),
            ));
        }
        if self.query_field.trim().is_empty() {
            return Err(BackendError::Config("query_field must not be empty".into()));
        }
        if self.output_slot.trim().is_empty() {
            return Err(BackendError::Config("output_slot must not be empty".into()));
        }
        Ok(())
    }

    /// The overall budget as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The delay between attempts as a [`Duration`].
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

//! Transport client for the inference backend.
//!
//! One POST per attempt. The timeout budget wraps the whole attempt
//! sequence (including back-off sleeps), so the worst case is bounded by
//! `timeout_ms` no matter how many retries are configured. Hitting the
//! budget drops the in-flight request and is never retried.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::http;
use crate::types::Query;

/// A backend that turns a query into a decoded response envelope.
///
/// Implementations must be `Send + Sync`: one instance serves all
/// concurrent requests.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Send `query` to the backend and return the decoded envelope.
    ///
    /// `user_id` overrides the configured user identifier for this call.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Timeout`] when the budget is exhausted,
    /// [`BackendError::Transport`] / [`BackendError::HttpStatus`] after the
    /// last retry, or [`BackendError::MalformedEnvelope`] when the body is
    /// not a JSON object.
    async fn fetch(&self, query: &Query, user_id: Option<&str>) -> Result<Value, BackendError>;

    /// Short name used in log fields.
    fn name(&self) -> &str;
}

/// [`InferenceBackend`] over HTTP with bounded retries.
pub struct HttpBackend {
    config: BackendConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("config", &self.config)
            .finish()
    }
}

impl HttpBackend {
    /// Create a backend client after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] if the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;
        let client = http::build_client(&config)?;
        Ok(Self { config, client })
    }

    /// The configuration this backend was built with.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Build the outbound JSON body.
    fn request_body(&self, query: &Query, user_id: Option<&str>) -> Value {
        let mut body = Map::new();
        body.insert(
            "user_id".to_owned(),
            Value::String(user_id.unwrap_or(&self.config.user_id).to_owned()),
        );
        body.insert(
            self.config.query_field.clone(),
            Value::String(query.as_str().to_owned()),
        );
        Value::Object(body)
    }

    async fn fetch_with_retry(&self, body: &Value) -> Result<Value, BackendError> {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(body).await {
                Ok(envelope) => return Ok(envelope),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "backend attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff()).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// A single POST to the backend.
    async fn attempt(&self, body: &Value) -> Result<Value, BackendError> {
        let mut request = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json");
        if !self.config.api_token.is_empty() {
            request = request.header(
                "Authorization",
                format!("Bearer {}", self.config.api_token),
            );
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("backend request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("backend response read failed: {e}")))?;

        tracing::trace!(bytes = text.len(), "backend response received");
        decode_envelope(&text)
    }
}

/// Decode a response body into an envelope object.
///
/// # Errors
///
/// Returns [`BackendError::MalformedEnvelope`] if the body is not JSON or
/// is JSON but not an object.
pub fn decode_envelope(text: &str) -> Result<Value, BackendError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| BackendError::MalformedEnvelope(format!("body is not valid JSON: {e}")))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(BackendError::MalformedEnvelope(
            "envelope is not a JSON object".into(),
        ))
    }
}

#[async_trait]
impl InferenceBackend for HttpBackend {
    async fn fetch(&self, query: &Query, user_id: Option<&str>) -> Result<Value, BackendError> {
        tracing::trace!(query = query.as_str(), "backend fetch");
        let body = self.request_body(query, user_id);
        match tokio::time::timeout(self.config.timeout(), self.fetch_with_retry(&body)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = self.config.timeout_ms, "backend timed out");
                Err(BackendError::Timeout(self.config.timeout_ms))
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

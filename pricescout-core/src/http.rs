//! Shared HTTP client for backend requests.

use crate::config::BackendConfig;
use crate::error::BackendError;

/// Default User-Agent sent to the backend.
pub const DEFAULT_USER_AGENT: &str = concat!("pricescout/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for backend calls.
///
/// The client has:
/// - Connect timeout equal to the overall budget (the budget itself is
///   enforced around the whole attempt sequence, not per request)
/// - The configured User-Agent, or [`DEFAULT_USER_AGENT`]
/// - gzip decompression
///
/// # Errors
///
/// Returns [`BackendError::Config`] if the client cannot be constructed.
pub fn build_client(config: &BackendConfig) -> Result<reqwest::Client, BackendError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .connect_timeout(config.timeout())
        .user_agent(ua)
        .gzip(true)
        .build()
        .map_err(|e| BackendError::Config(format!("failed to build HTTP client: {e}")))
}

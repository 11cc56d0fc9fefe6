//! # pricescout
//!
//! Product search proxy. Accepts a free-text query over HTTP, forwards it
//! to a natural-language inference backend through
//! [`pricescout_core::SearchPipeline`], and always answers with a
//! non-empty JSON array of `{Product, Price, Store, URL}` records.
//!
//! - [`config`]: TOML configuration with environment overrides
//! - [`server`]: axum router, background server handle, graceful serving
//! - [`error`]: process-level error type

pub mod config;
pub mod error;
pub mod server;

pub use config::{LoggingConfig, ProxyConfig, ServerConfig};
pub use error::{ProxyError, Result};
pub use server::{ProxyServer, router, serve_until};

/// Build the search pipeline described by `config`.
///
/// # Errors
///
/// Returns [`ProxyError::Core`] if the backend configuration is invalid.
pub fn build_pipeline(config: &ProxyConfig) -> Result<pricescout_core::SearchPipeline> {
    Ok(pricescout_core::http_pipeline(config.backend.clone())?)
}

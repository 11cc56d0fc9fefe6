//! # pricescout-core
//!
//! Search-result normalisation for PriceScout.
//!
//! A free-text product query is forwarded to a natural-language inference
//! backend, and whatever comes back (a structured array, a string with
//! JSON embedded in it, or nothing useful at all) is turned into a strict,
//! non-empty list of [`ProductRecord`]s.
//!
//! ## Design
//!
//! - [`transport`]: one POST per attempt, bounded retries, one timeout
//!   budget for the whole attempt sequence
//! - [`normalize`]: locate the output slot and classify it as a
//!   [`ContentPayload`]
//! - [`extract`]: ordered strategy chain, first match wins
//! - [`sanitize`]: loose-JSON clean-up before the last-resort parse
//! - [`pipeline`]: per-request driver; every failure becomes a
//!   placeholder record, never an error
//!
//! No state is kept across requests.

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod placeholder;
pub mod sanitize;
pub mod transport;
pub mod types;

pub use config::BackendConfig;
pub use error::{BackendError, Result};
pub use pipeline::SearchPipeline;
pub use transport::{HttpBackend, InferenceBackend};
pub use types::{ContentPayload, ProductRecord, Query, ResultSet};

/// Build an HTTP-backed pipeline from `config`.
///
/// # Errors
///
/// Returns [`BackendError::Config`] if the configuration is invalid.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> pricescout_core::Result<()> {
/// let config = pricescout_core::BackendConfig {
///     url: "https://backend.example.com/run".into(),
///     api_token: "token".into(),
///     ..Default::default()
/// };
/// let pipeline = pricescout_core::http_pipeline(config)?;
/// let results = pipeline.run("iphone 14", None).await;
/// for record in results.records() {
///     println!("{} at {}: {}", record.product, record.store, record.price);
/// }
/// # Ok(())
/// # }
/// ```
pub fn http_pipeline(config: BackendConfig) -> Result<SearchPipeline> {
    let backend = HttpBackend::new(config.clone())?;
    Ok(SearchPipeline::new(std::sync::Arc::new(backend), config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_pipeline_validates_config() {
        let config = BackendConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let err = http_pipeline(config).unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn http_pipeline_with_default_config() {
        assert!(http_pipeline(BackendConfig::default()).is_ok());
    }
}

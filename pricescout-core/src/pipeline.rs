//! Per-request pipeline driver.
//!
//! ```text
//! Received → Validated → BackendCalled → Normalized → Extracted → Responded
//!     │           │             │              │
//!     └───────────┴─────────────┴──────────────┴──► Responded (placeholder)
//! ```
//!
//! Any stage failure jumps straight to `Responded` with a placeholder
//! result set. There is no pipeline-level retry; only the transport
//! retries internally.

use std::fmt;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::extract;
use crate::normalize;
use crate::placeholder;
use crate::transport::InferenceBackend;
use crate::types::{Query, ResultSet};

/// Pipeline stages, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Request accepted.
    Received,
    /// Query trimmed and found non-empty.
    Validated,
    /// Backend returned an envelope.
    BackendCalled,
    /// Content payload located.
    Normalized,
    /// Records produced.
    Extracted,
    /// Result set handed back.
    Responded,
}

impl Stage {
    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::BackendCalled => "backend_called",
            Self::Normalized => "normalized",
            Self::Extracted => "extracted",
            Self::Responded => "responded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stateless search pipeline shared by every request.
#[derive(Clone)]
pub struct SearchPipeline {
    backend: Arc<dyn InferenceBackend>,
    config: BackendConfig,
}

impl fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

impl SearchPipeline {
    /// Create a pipeline over `backend`. `config` supplies the output slot
    /// names used by the normaliser.
    pub fn new(backend: Arc<dyn InferenceBackend>, config: BackendConfig) -> Self {
        Self { backend, config }
    }

    /// Run one query through the pipeline.
    ///
    /// Never fails: blank queries get the guidance record without touching
    /// the backend, and every downstream failure becomes a placeholder.
    pub async fn run(&self, raw_query: &str, user_id: Option<&str>) -> ResultSet {
        tracing::debug!(stage = %Stage::Received, "search pipeline");

        let Some(query) = Query::parse(raw_query) else {
            tracing::debug!(stage = %Stage::Responded, "blank query, returning guidance");
            return placeholder::empty_query();
        };
        tracing::debug!(stage = %Stage::Validated, chars = query.as_str().chars().count());

        let envelope = match self.backend.fetch(&query, user_id).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    code = e.code(),
                    error = %e,
                    "backend call failed"
                );
                return placeholder::for_backend_error(&query, &e);
            }
        };
        tracing::debug!(stage = %Stage::BackendCalled);

        let payload = match normalize::extract_content(&envelope, &self.config) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "backend reported an application error");
                return placeholder::for_backend_error(&query, &e);
            }
        };
        tracing::debug!(stage = %Stage::Normalized, kind = payload.kind());

        let results = extract::extract(&payload, &query);
        tracing::debug!(stage = %Stage::Extracted, count = results.len());
        tracing::debug!(stage = %Stage::Responded);
        results
    }
}

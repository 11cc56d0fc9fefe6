//! Error types for the pricescout proxy.

use pricescout_core::BackendError;

/// Top-level error type for the proxy process.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server error (bind, serve).
    #[error("server error: {0}")]
    Server(String),

    /// Search pipeline construction error.
    #[error("pipeline error: {0}")]
    Core(#[from] BackendError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ProxyError>;

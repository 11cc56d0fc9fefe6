//! Error types for the pricescout-core crate.
//!
//! Each variant carries a stable error code (SCREAMING_SNAKE_CASE) that is
//! accessible via [`BackendError::code()`]. No bearer tokens or query text
//! appear in error messages.

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// The backend did not answer within the configured budget.
    pub const BACKEND_TIMEOUT: &str = "BACKEND_TIMEOUT";

    /// Network-level failure talking to the backend.
    pub const TRANSPORT_FAILED: &str = "TRANSPORT_FAILED";

    /// The backend answered with a non-success HTTP status.
    pub const HTTP_STATUS: &str = "HTTP_STATUS";

    /// The backend body could not be decoded as an envelope.
    pub const MALFORMED_ENVELOPE: &str = "MALFORMED_ENVELOPE";

    /// The backend signalled its own error inside a success response.
    pub const BACKEND_APPLICATION_ERROR: &str = "BACKEND_APPLICATION_ERROR";

    /// Invalid backend configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
}

/// Errors that can occur while talking to the inference backend.
///
/// None of these reach the HTTP caller directly: the pipeline turns each
/// one into a placeholder result set.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The whole attempt sequence exceeded the timeout budget.
    #[error("[{code}] backend timed out after {0} ms", code = error_codes::BACKEND_TIMEOUT)]
    Timeout(u64),

    /// The request could not be sent or the body could not be read.
    #[error("[{}] {}", error_codes::TRANSPORT_FAILED, .0)]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("[{}] backend returned HTTP {status}", error_codes::HTTP_STATUS)]
    HttpStatus {
        /// Status code returned by the backend.
        status: u16,
    },

    /// The body was not a JSON object.
    #[error("[{}] {}", error_codes::MALFORMED_ENVELOPE, .0)]
    MalformedEnvelope(String),

    /// The backend reported an error inside a 2xx response.
    #[error("[{}] {}", error_codes::BACKEND_APPLICATION_ERROR, .0)]
    Application(String),

    /// Invalid backend configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),
}

impl BackendError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => error_codes::BACKEND_TIMEOUT,
            Self::Transport(_) => error_codes::TRANSPORT_FAILED,
            Self::HttpStatus { .. } => error_codes::HTTP_STATUS,
            Self::MalformedEnvelope(_) => error_codes::MALFORMED_ENVELOPE,
            Self::Application(_) => error_codes::BACKEND_APPLICATION_ERROR,
            Self::Config(_) => error_codes::CONFIG_INVALID,
        }
    }

    /// Returns true if another attempt may succeed.
    ///
    /// Only transport failures and non-success statuses are retried. A
    /// timeout is terminal because the budget covers the whole attempt
    /// sequence.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::HttpStatus { .. } => true,
            Self::Timeout(_)
            | Self::MalformedEnvelope(_)
            | Self::Application(_)
            | Self::Config(_) => false,
        }
    }
}

/// Convenience type alias for pricescout-core results.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        let err = BackendError::Timeout(25_000);
        assert_eq!(
            err.to_string(),
            "[BACKEND_TIMEOUT] backend timed out after 25000 ms"
        );
    }

    #[test]
    fn display_http_status() {
        let err = BackendError::HttpStatus { status: 502 };
        assert_eq!(err.to_string(), "[HTTP_STATUS] backend returned HTTP 502");
    }

    #[test]
    fn display_malformed() {
        let err = BackendError::MalformedEnvelope("body is not JSON".into());
        assert_eq!(err.to_string(), "[MALFORMED_ENVELOPE] body is not JSON");
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(BackendError::Timeout(1).code(), "BACKEND_TIMEOUT");
        assert_eq!(
            BackendError::Transport("x".into()).code(),
            "TRANSPORT_FAILED"
        );
        assert_eq!(BackendError::HttpStatus { status: 500 }.code(), "HTTP_STATUS");
        assert_eq!(
            BackendError::Application("x".into()).code(),
            "BACKEND_APPLICATION_ERROR"
        );
        assert_eq!(BackendError::Config("x".into()).code(), "CONFIG_INVALID");
    }

    #[test]
    fn only_transport_level_failures_are_retryable() {
        assert!(BackendError::Transport("refused".into()).is_retryable());
        assert!(BackendError::HttpStatus { status: 503 }.is_retryable());
        assert!(!BackendError::Timeout(10).is_retryable());
        assert!(!BackendError::MalformedEnvelope("x".into()).is_retryable());
        assert!(!BackendError::Application("x".into()).is_retryable());
        assert!(!BackendError::Config("x".into()).is_retryable());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackendError>();
    }
}

//! Error types for onestroke.
//!
//! Epistemic taxonomy:
//! - B_i falsified: Expected failures (malformed graph, bad config)
//! - I^B materialized: Infrastructure failures (network, timeout, backend status)

use thiserror::Error;

/// Top-level error type for onestroke.
#[derive(Debug, Error)]
pub enum OnestrokeError {
    // ═══════════════════════════════════════════════════════════════════
    // B_i FALSIFIED — Belief proven wrong (expected failures)
    // ═══════════════════════════════════════════════════════════════════
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed edge: expected 2 endpoints, got {arity}")]
    MalformedEdge { arity: usize },

    #[error("Parse error: {0}")]
    ParseError(String),

    // ═══════════════════════════════════════════════════════════════════
    // I^B MATERIALIZED — Bounded ignorance became known-bad
    // ═══════════════════════════════════════════════════════════════════
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Puzzle backend specific errors.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl OnestrokeError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if this error is retryable.
    ///
    /// Client errors (4xx) are final; server errors and transport failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Backend(BackendError::Status { status, .. }) => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for onestroke.
pub type Result<T> = std::result::Result<T, OnestrokeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_retryable_classification() {
        assert!(OnestrokeError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(
            OnestrokeError::Backend(BackendError::Status {
                status: 503,
                message: "unavailable".to_string(),
            })
            .is_retryable()
        );
        assert!(
            !OnestrokeError::Backend(BackendError::Status {
                status: 422,
                message: "unprocessable".to_string(),
            })
            .is_retryable()
        );
        assert!(!OnestrokeError::MalformedEdge { arity: 1 }.is_retryable());
    }

    #[test]
    fn test_malformed_edge_message() {
        let err = OnestrokeError::MalformedEdge { arity: 3 };
        assert_eq!(
            err.to_string(),
            "Malformed edge: expected 2 endpoints, got 3"
        );
    }
}

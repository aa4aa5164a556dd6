//! Error taxonomy for document-store operations
//!
//! Every failure the facade can surface is classified here. Transport
//! adapters map service status codes into these variants; the facade never
//! exposes vendor SDK error types to callers.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the document-store facade
///
/// Variants are split between fatal conditions (`Configuration`,
/// `SchemaConflict`) and recoverable ones the caller is expected to handle
/// (`NotFound`, `AlreadyExists`, `Throttled`, ...). See
/// [`StoreError::is_recoverable`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or invalid connection settings, detected before any network call
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A document value that does not satisfy the container contract
    /// (not an object, missing `id`, missing partition-key field)
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Create with an id already present in the same partition scope
    #[error("Document '{id}' already exists in partition scope")]
    AlreadyExists { id: String },

    /// Point read/replace/delete target absent under the given partition key
    #[error("Document '{id}' not found")]
    NotFound { id: String },

    /// Container exists with a different partition-key path than requested
    #[error(
        "Container '{container}' has partition-key path '{existing}', requested '{requested}'"
    )]
    SchemaConflict {
        container: String,
        existing: String,
        requested: String,
    },

    /// Optimistic-concurrency mismatch on replace
    #[error("Version conflict on document '{id}': stored version changed since read")]
    VersionConflict { id: String },

    /// Rate-limit signal from the service (429), with the retry-after hint
    /// when the service supplied one. Never retried internally.
    #[error("Request rate too large, retry after {retry_after:?}")]
    Throttled { retry_after: Option<Duration> },

    /// Requested RU/s rejected by the service as out of the legal range
    #[error("Invalid throughput request: {0}")]
    InvalidThroughput(String),

    /// Container has no explicit provisioned throughput (shared or autoscale)
    #[error("Container '{container}' has no provisioned throughput configured")]
    ThroughputNotConfigured { container: String },

    /// Operation aborted by a caller-supplied signal
    ///
    /// Nothing in this crate constructs this variant itself: in-flight work
    /// is cancelled by dropping its future (every operation is drop-safe),
    /// and the CLI exits on Ctrl+C the same way. It exists for callers
    /// wrapping operations in their own shutdown signal, so an abort can be
    /// reported distinctly from [`StoreError::Timeout`].
    #[error("Operation cancelled by caller")]
    Cancelled,

    /// Operation exceeded its deadline
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Failed to serialize or deserialize a document payload
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other transport or protocol failure, with the underlying status
    /// code when one was available
    #[error("Transport error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },
}

impl StoreError {
    /// Whether the caller can reasonably recover from this error
    ///
    /// Recoverable errors are part of normal operation (a missing document,
    /// a throttle signal). Fatal ones indicate a broken setup.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            StoreError::Configuration(_) | StoreError::SchemaConflict { .. }
        )
    }

    /// Shorthand for a transport error without a status code
    pub fn transport(message: impl Into<String>) -> Self {
        StoreError::Transport {
            status: None,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Transport {
            status: None,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            id: "SalesOrder1".to_string(),
        };
        assert_eq!(err.to_string(), "Document 'SalesOrder1' not found");
    }

    #[test]
    fn test_transport_display_with_status() {
        let err = StoreError::Transport {
            status: Some(503),
            message: "service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Transport error (503): service unavailable");
    }

    #[test]
    fn test_transport_display_without_status() {
        let err = StoreError::transport("connection reset");
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(StoreError::NotFound {
            id: "x".to_string()
        }
        .is_recoverable());
        assert!(StoreError::Throttled { retry_after: None }.is_recoverable());
        assert!(StoreError::ThroughputNotConfigured {
            container: "orders".to_string()
        }
        .is_recoverable());
        assert!(!StoreError::Configuration("missing key".to_string()).is_recoverable());
        assert!(!StoreError::SchemaConflict {
            container: "orders".to_string(),
            existing: "/id".to_string(),
            requested: "/partitionKey".to_string(),
        }
        .is_recoverable());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_implements_std_error() {
        let err = StoreError::Cancelled;
        let _: &dyn std::error::Error = &err;
    }
}

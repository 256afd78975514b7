//! Error types for session and hashing operations
//!
//! Configuration problems fail fast at construction or `set_options` time.
//! Storage backend failures are reported to the caller so session operations
//! fail closed instead of silently proceeding with lost data. A missing or
//! malformed client identifier is deliberately *not* an error anywhere in
//! this crate; it is treated as "no session" and routed through the fresh
//! start path.

use thiserror::Error;

/// Convenience alias used throughout the session modules
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session manager and storage handlers
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid options, or a lifecycle misuse caught at configuration time
    /// (e.g. rebinding the storage handler after `start`)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The storage backend failed during the named operation; the session
    /// operation that depended on it has not taken effect
    #[error("storage backend unavailable during {op}: {source}")]
    BackendUnavailable {
        /// Handler operation that failed (`open`, `read`, `write`, ...)
        op: &'static str,
        /// Underlying backend error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The in-memory data mapping could not be serialized for storage
    #[error("session data serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SessionError {
    /// Wrap a backend error, tagging it with the handler operation that
    /// produced it
    pub fn backend(
        op: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::BackendUnavailable {
            op,
            source: Box::new(source),
        }
    }
}

/// Errors surfaced by the hashing module
///
/// `verify`, `needs_rehash` and `get_info` report `Format` for hash strings
/// they cannot decode; they never panic on malformed input.
#[derive(Debug, Error)]
pub enum HashError {
    /// Cost parameters the algorithm cannot execute
    #[error("invalid hasher options: {0}")]
    Configuration(String),

    /// A hash string that does not decode as a PHC-formatted hash
    #[error("malformed hash string: {0}")]
    Format(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn backend_error_names_the_failing_operation() {
        let err = SessionError::backend("open", io::Error::new(io::ErrorKind::Other, "disk gone"));
        let message = err.to_string();
        assert!(message.contains("open"));
        assert!(message.contains("unavailable"));
    }

    #[test]
    fn serialization_errors_convert() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = SessionError::from(json_err);
        assert!(matches!(err, SessionError::Serialization(_)));
    }
}

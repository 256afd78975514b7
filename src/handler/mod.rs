//! Storage handler contract and reference implementations
//!
//! A handler persists opaque session records keyed by identifier. The
//! manager treats blobs as opaque and the handler never inspects them.
//! Handlers are shared across execution contexts through an `Arc`, so every
//! operation takes `&self` and implementations must tolerate concurrent
//! calls for *different* identifiers; a single session's records are only
//! ever driven by its owning manager. No operation may stall without bound:
//! a handler over a remote backend applies its own timeouts and surfaces
//! them as `BackendUnavailable` rather than blocking the caller.
//!
//! - [`FileSessionHandler`] - default persistent variant, one file per record
//! - [`NullSessionHandler`] - blackhole variant for stateless contexts

use std::time::Duration;

use crate::error::Result;

/// Capability contract for session record storage
///
/// Every operation is idempotent on repeated identical calls: re-opening an
/// open backend, destroying an absent record or re-writing the same blob all
/// succeed.
pub trait SessionHandler: Send + Sync {
    /// Prepare the backend; a failure here must prevent `start` from
    /// succeeding
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the backend cannot be
    /// prepared, `SessionError::Configuration` for unusable arguments.
    fn open(&self, save_path: &str, namespace: &str) -> Result<()>;

    /// Release backend resources
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when release fails.
    fn close(&self) -> Result<()>;

    /// Read the blob stored under `id`; absence yields an empty blob, never
    /// an error
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the backend fails.
    fn read(&self, id: &str) -> Result<Vec<u8>>;

    /// Insert or replace the record under `id`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the backend fails.
    fn write(&self, id: &str, blob: &[u8]) -> Result<()>;

    /// Remove the record under `id`; removing an absent record succeeds
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the backend fails.
    fn destroy(&self, id: &str) -> Result<()>;

    /// Remove every record whose last-write age reaches `max_lifetime`,
    /// returning how many were removed
    ///
    /// Invoked out-of-band (cron-like), not per request; must be safe to run
    /// concurrently with reads and writes of other identifiers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the backend fails.
    fn gc(&self, max_lifetime: Duration) -> Result<usize>;
}

pub mod file;
pub mod null;

pub use file::FileSessionHandler;
pub use null::NullSessionHandler;

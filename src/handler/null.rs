//! The blackhole session handler

use std::time::Duration;

use crate::error::Result;
use crate::handler::SessionHandler;

/// Handler that reports success for every operation and persists nothing
///
/// Intended for stateless execution contexts (background jobs, tests of
/// session-free code paths) that must not touch session storage. `read`
/// always yields an empty blob regardless of prior `write` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSessionHandler;

impl NullSessionHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SessionHandler for NullSessionHandler {
    fn open(&self, _save_path: &str, _namespace: &str) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn read(&self, _id: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn write(&self, _id: &str, _blob: &[u8]) -> Result<()> {
        Ok(())
    }

    fn destroy(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    fn gc(&self, _max_lifetime: Duration) -> Result<usize> {
        Ok(0)
    }
}

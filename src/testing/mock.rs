//! Mock storage handlers for tests
//!
//! [`MemoryHandler`] keeps records in a map with an explicit last-write
//! timestamp per record, so garbage-collection age logic is testable
//! without sleeping. [`FailingHandler`] reports `BackendUnavailable` for
//! every operation, for exercising fail-closed paths.

use std::collections::HashMap;
use std::io;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Result, SessionError};
use crate::handler::SessionHandler;

#[derive(Debug, Clone)]
struct MemoryRecord {
    blob: Vec<u8>,
    written_at: DateTime<Utc>,
}

/// In-memory session handler with controllable record ages
#[derive(Debug, Default)]
pub struct MemoryHandler {
    records: RwLock<HashMap<String, MemoryRecord>>,
}

impl MemoryHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record exists under `id`
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of stored records
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// Age the record under `id` as if it had been written `age` ago
    pub fn backdate(&self, id: &str, age: Duration) {
        let delta = TimeDelta::from_std(age).unwrap_or_else(|_| TimeDelta::zero());
        if let Ok(mut records) = self.records.write() {
            if let Some(record) = records.get_mut(id) {
                record.written_at = Utc::now() - delta;
            }
        }
    }
}

impl SessionHandler for MemoryHandler {
    fn open(&self, _save_path: &str, _namespace: &str) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        Ok(self
            .records
            .read()
            .map_err(|_| SessionError::Configuration("mock lock poisoned".to_string()))?
            .get(id)
            .map(|record| record.blob.clone())
            .unwrap_or_default())
    }

    fn write(&self, id: &str, blob: &[u8]) -> Result<()> {
        self.records
            .write()
            .map_err(|_| SessionError::Configuration("mock lock poisoned".to_string()))?
            .insert(
                id.to_string(),
                MemoryRecord {
                    blob: blob.to_vec(),
                    written_at: Utc::now(),
                },
            );
        Ok(())
    }

    fn destroy(&self, id: &str) -> Result<()> {
        self.records
            .write()
            .map_err(|_| SessionError::Configuration("mock lock poisoned".to_string()))?
            .remove(id);
        Ok(())
    }

    fn gc(&self, max_lifetime: Duration) -> Result<usize> {
        // A lifetime too large to represent removes nothing, matching the
        // "huge lifetime keeps everything" contract.
        let Ok(threshold) = TimeDelta::from_std(max_lifetime) else {
            return Ok(0);
        };
        let now = Utc::now();
        let mut records = self
            .records
            .write()
            .map_err(|_| SessionError::Configuration("mock lock poisoned".to_string()))?;
        let before = records.len();
        records.retain(|_, record| now.signed_duration_since(record.written_at) < threshold);
        Ok(before - records.len())
    }
}

/// Handler whose every operation reports an unavailable backend
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingHandler;

impl FailingHandler {
    fn unavailable(op: &'static str) -> SessionError {
        SessionError::backend(op, io::Error::new(io::ErrorKind::Other, "backend down"))
    }
}

impl SessionHandler for FailingHandler {
    fn open(&self, _save_path: &str, _namespace: &str) -> Result<()> {
        Err(Self::unavailable("open"))
    }

    fn close(&self) -> Result<()> {
        Err(Self::unavailable("close"))
    }

    fn read(&self, _id: &str) -> Result<Vec<u8>> {
        Err(Self::unavailable("read"))
    }

    fn write(&self, _id: &str, _blob: &[u8]) -> Result<()> {
        Err(Self::unavailable("write"))
    }

    fn destroy(&self, _id: &str) -> Result<()> {
        Err(Self::unavailable("destroy"))
    }

    fn gc(&self, _max_lifetime: Duration) -> Result<usize> {
        Err(Self::unavailable("gc"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gc_honors_record_ages() {
        let handler = MemoryHandler::new();
        handler.write("fresh", b"a").unwrap();
        handler.write("stale", b"b").unwrap();
        handler.backdate("stale", Duration::from_secs(7200));

        // huge lifetime removes nothing
        assert_eq!(handler.gc(Duration::from_secs(1_000_000_000)).unwrap(), 0);
        assert_eq!(handler.record_count(), 2);

        // one hour removes only the backdated record
        assert_eq!(handler.gc(Duration::from_secs(3600)).unwrap(), 1);
        assert!(handler.contains("fresh"));
        assert!(!handler.contains("stale"));

        // zero lifetime removes everything
        assert_eq!(handler.gc(Duration::ZERO).unwrap(), 1);
        assert_eq!(handler.record_count(), 0);
    }

    #[test]
    fn absent_records_read_empty() {
        let handler = MemoryHandler::new();
        assert_eq!(handler.read("never-written").unwrap(), Vec::<u8>::new());
    }
}

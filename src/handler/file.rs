//! File-backed session handler
//!
//! The default persistent variant: one file per record under
//! `save_path/namespace`, named by the session identifier. Writes land in a
//! uniquely named temporary file first and are renamed into place, so
//! concurrent writers of the same identifier resolve to last-writer-wins
//! without a global lock, and readers never observe a half-written record.
//! Garbage collection works off file modification times and may run from a
//! separate process against the same directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use rand::RngCore;

use crate::error::{Result, SessionError};
use crate::handler::SessionHandler;
use crate::session::id::is_valid_session_id;

/// Session handler persisting records as individual files
#[derive(Debug, Default)]
pub struct FileSessionHandler {
    dir: RwLock<Option<PathBuf>>,
}

impl FileSessionHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.dir
            .read()
            .map_err(|_| SessionError::Configuration("handler lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| {
                SessionError::Configuration("file handler used before open".to_string())
            })
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        Ok(self.current_dir()?.join(id))
    }

    fn temp_path(dir: &Path, id: &str) -> PathBuf {
        dir.join(format!("{id}.tmp-{:016x}", rand::rng().next_u64()))
    }
}

impl SessionHandler for FileSessionHandler {
    fn open(&self, save_path: &str, namespace: &str) -> Result<()> {
        if save_path.is_empty() {
            return Err(SessionError::Configuration(
                "save_path must not be empty".to_string(),
            ));
        }
        if namespace.is_empty()
            || !namespace
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(SessionError::Configuration(format!(
                "namespace '{namespace}' contains characters outside [A-Za-z0-9_-]"
            )));
        }

        let dir = Path::new(save_path).join(namespace);
        fs::create_dir_all(&dir).map_err(|err| SessionError::backend("open", err))?;

        let mut guard = self
            .dir
            .write()
            .map_err(|_| SessionError::Configuration("handler lock poisoned".to_string()))?;
        *guard = Some(dir);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut guard = self
            .dir
            .write()
            .map_err(|_| SessionError::Configuration("handler lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        // A foreign identifier cannot have been written by us; report it as
        // absent rather than touching the filesystem with hostile input.
        if !is_valid_session_id(id) {
            return Ok(Vec::new());
        }
        match fs::read(self.record_path(id)?) {
            Ok(blob) => Ok(blob),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(SessionError::backend("read", err)),
        }
    }

    fn write(&self, id: &str, blob: &[u8]) -> Result<()> {
        if !is_valid_session_id(id) {
            return Err(SessionError::Configuration(format!(
                "refusing to write record under invalid identifier '{id}'"
            )));
        }
        let dir = self.current_dir()?;
        let target = dir.join(id);
        let tmp = Self::temp_path(&dir, id);

        fs::write(&tmp, blob).map_err(|err| SessionError::backend("write", err))?;
        if let Err(err) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(SessionError::backend("write", err));
        }
        Ok(())
    }

    fn destroy(&self, id: &str) -> Result<()> {
        // Destroying a record that could never exist is a success, same as
        // destroying an absent one.
        if !is_valid_session_id(id) {
            return Ok(());
        }
        match fs::remove_file(self.record_path(id)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionError::backend("destroy", err)),
        }
    }

    fn gc(&self, max_lifetime: Duration) -> Result<usize> {
        let dir = self.current_dir()?;
        let entries = fs::read_dir(&dir).map_err(|err| SessionError::backend("gc", err))?;

        let mut removed = 0;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!("skipping unreadable directory entry during gc: {err}");
                    continue;
                }
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            // Records and stranded temp files are candidates; foreign files
            // in a shared save_path are left alone.
            if !is_valid_session_id(name) && !name.contains(".tmp-") {
                continue;
            }

            let expired = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .map(|mtime| mtime.elapsed().map_or(false, |age| age >= max_lifetime));
            match expired {
                Ok(true) => match fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(err) => log::warn!("failed to remove expired session record: {err}"),
                },
                Ok(false) => {}
                Err(err) => log::debug!("skipping record without readable mtime: {err}"),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::id::generate_session_id;
    use tempfile::TempDir;

    fn open_handler(root: &TempDir) -> FileSessionHandler {
        let handler = FileSessionHandler::new();
        handler
            .open(root.path().to_str().unwrap(), "keeprs")
            .unwrap();
        handler
    }

    #[test]
    fn read_of_absent_record_is_empty_not_error() {
        let root = TempDir::new().unwrap();
        let handler = open_handler(&root);
        assert_eq!(handler.read(&generate_session_id()).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn write_then_read_round_trips() {
        let root = TempDir::new().unwrap();
        let handler = open_handler(&root);
        let id = generate_session_id();

        handler.write(&id, b"{\"user\":\"alice\"}").unwrap();
        assert_eq!(handler.read(&id).unwrap(), b"{\"user\":\"alice\"}".to_vec());

        // upsert replaces
        handler.write(&id, b"{}").unwrap();
        assert_eq!(handler.read(&id).unwrap(), b"{}".to_vec());
    }

    #[test]
    fn destroy_is_idempotent() {
        let root = TempDir::new().unwrap();
        let handler = open_handler(&root);
        let id = generate_session_id();

        handler.write(&id, b"data").unwrap();
        handler.destroy(&id).unwrap();
        assert_eq!(handler.read(&id).unwrap(), Vec::<u8>::new());
        // second destroy of the now-absent record still succeeds
        handler.destroy(&id).unwrap();
    }

    #[test]
    fn hostile_identifiers_never_reach_the_filesystem() {
        let root = TempDir::new().unwrap();
        let handler = open_handler(&root);

        assert_eq!(handler.read("../../etc/passwd").unwrap(), Vec::<u8>::new());
        assert!(handler.write("../escape", b"x").is_err());
        assert!(handler.destroy("../escape").is_ok());
    }

    #[test]
    fn operations_before_open_fail_fast() {
        let handler = FileSessionHandler::new();
        assert!(handler.read(&generate_session_id()).is_err());
        assert!(handler.write(&generate_session_id(), b"x").is_err());
        assert!(handler.gc(Duration::ZERO).is_err());
    }

    #[test]
    fn gc_removes_only_expired_records() {
        let root = TempDir::new().unwrap();
        let handler = open_handler(&root);
        let first = generate_session_id();
        let second = generate_session_id();

        handler.write(&first, b"one").unwrap();
        handler.write(&second, b"two").unwrap();
        // foreign files in the directory are not gc candidates
        fs::write(root.path().join("keeprs").join("README"), b"keep me").unwrap();

        // a huge lifetime removes nothing
        assert_eq!(handler.gc(Duration::from_secs(1_000_000)).unwrap(), 0);
        assert_eq!(handler.read(&first).unwrap(), b"one".to_vec());

        // give the records a measurable age, then expire everything
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(handler.gc(Duration::ZERO).unwrap(), 2);
        assert_eq!(handler.read(&first).unwrap(), Vec::<u8>::new());
        assert_eq!(handler.read(&second).unwrap(), Vec::<u8>::new());
        assert!(root.path().join("keeprs").join("README").exists());
    }

    #[test]
    fn reopen_is_idempotent() {
        let root = TempDir::new().unwrap();
        let handler = open_handler(&root);
        let id = generate_session_id();
        handler.write(&id, b"kept").unwrap();

        handler
            .open(root.path().to_str().unwrap(), "keeprs")
            .unwrap();
        assert_eq!(handler.read(&id).unwrap(), b"kept".to_vec());
    }

    #[test]
    fn open_rejects_bad_namespace() {
        let root = TempDir::new().unwrap();
        let handler = FileSessionHandler::new();
        assert!(handler
            .open(root.path().to_str().unwrap(), "../escape")
            .is_err());
        assert!(handler.open(root.path().to_str().unwrap(), "").is_err());
        assert!(handler.open("", "keeprs").is_err());
    }
}

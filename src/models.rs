//! Core session data structures

use std::collections::HashMap;

/// Lifecycle state of the session owned by a manager
///
/// `Destroyed` is terminal for that identifier; a subsequent `start` mints a
/// fresh identifier and returns to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started in this lifecycle
    Absent,
    /// A session is live and its data mapping is usable
    Active,
    /// The session and its identifier have been invalidated
    Destroyed,
}

/// A live session: an opaque identifier plus its string key/value mapping
///
/// The mapping is the session's sole state; it is owned exclusively by the
/// manager for the duration of one logical request and persisted between
/// requests only through a storage handler.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    data: HashMap<String, String>,
}

impl Session {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            data: HashMap::new(),
        }
    }

    /// The opaque identifier this session is stored under
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Look up a value; `None` when the key was never set
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Whether a value is present for `key`
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Insert or replace a value
    pub fn put(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
    }

    /// Remove a value; removing an absent key is a no-op
    pub fn delete(&mut self, key: &str) {
        self.data.remove(key);
    }

    /// Read-once retrieval: returns the value and removes it in the same
    /// call, so an immediate second `flash` of the same key yields `None`
    pub fn flash(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the mapping holds no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    /// Serialize the mapping into the opaque blob handed to storage handlers
    pub(crate) fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.data)
    }

    /// Decode a stored blob back into a mapping
    pub(crate) fn decode(blob: &[u8]) -> Result<HashMap<String, String>, serde_json::Error> {
        serde_json::from_slice(blob)
    }

    pub(crate) fn restore(&mut self, data: HashMap<String, String>) {
        self.data = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new("test-session-id".to_string())
    }

    #[test]
    fn put_then_get_round_trips() {
        let mut session = session();
        session.put("user", "alice");
        assert_eq!(session.get("user"), Some("alice"));
        assert!(session.has("user"));

        session.put("user", "bob");
        assert_eq!(session.get("user"), Some("bob"));
    }

    #[test]
    fn delete_returns_to_default() {
        let mut session = session();
        session.put("token", "abc");
        session.delete("token");
        assert_eq!(session.get("token"), None);

        // deleting an absent key is a no-op, not an error
        session.delete("never-set");
    }

    #[test]
    fn flash_reads_exactly_once() {
        let mut session = session();
        session.put("notice", "saved");
        assert_eq!(session.flash("notice"), Some("saved".to_string()));
        assert_eq!(session.flash("notice"), None);
        assert_eq!(session.get("notice"), None);
    }

    #[test]
    fn encode_decode_round_trips() {
        let mut session = session();
        session.put("a", "1");
        session.put("b", "2");

        let blob = session.encode().unwrap();
        let data = Session::decode(&blob).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Session::decode(b"not a mapping").is_err());
    }

    #[test]
    fn clear_empties_the_mapping() {
        let mut session = session();
        session.put("k", "v");
        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.len(), 0);
    }
}

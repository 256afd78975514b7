//! Configuration surface for the session layer
//!
//! Settings are plain serde structs so hosts can embed them in their own
//! configuration files. Unrecognized keys fail deserialization; omitted keys
//! take the documented defaults. `validate` is invoked by the session
//! manager at construction and at every `set_options` call, so invalid
//! values fail fast instead of being silently clamped.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::session::cookie::parse_same_site;

/// Top-level settings for a [`crate::SessionManager`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SessionSettings {
    pub cookie: CookieSettings,
    pub storage: StorageSettings,
    /// Maximum record age in seconds before garbage collection removes it
    pub gc_max_lifetime_secs: u64,
    /// Persist the data mapping when the manager goes out of scope, so
    /// mutations survive even if the caller never calls `flush`
    pub auto_flush: bool,
}

/// Attributes of the client-side identifier cookie
///
/// These are snapshotted by the manager when a session starts; the clearing
/// cookie sent by `destroy` reuses the snapshot so a mid-session
/// configuration change cannot leave a stale token on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CookieSettings {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    /// One of `strict`, `lax` or `none` (case-insensitive)
    pub same_site: String,
    /// Cookie lifetime in seconds; `None` yields a session cookie that the
    /// browser drops on exit
    pub max_age_secs: Option<u64>,
}

/// Location handed to the storage handler's `open`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StorageSettings {
    /// Base location for the backend (a directory for the file handler)
    pub save_path: String,
    /// Namespace separating this application's records from others sharing
    /// the same backend
    pub namespace: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie: CookieSettings::default(),
            storage: StorageSettings::default(),
            gc_max_lifetime_secs: 1440,
            auto_flush: true,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "keeprs_session".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: "lax".to_string(),
            max_age_secs: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            save_path: std::env::temp_dir().display().to_string(),
            namespace: "keeprs".to_string(),
        }
    }
}

impl SessionSettings {
    /// Parse settings from a TOML document
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when the document does not
    /// parse, contains unrecognized keys, or fails validation.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let settings: Self = basic_toml::from_str(raw)
            .map_err(|err| SessionError::Configuration(format!("invalid settings: {err}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate every field, reporting the first problem found
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` describing the offending field.
    pub fn validate(&self) -> Result<()> {
        self.cookie.validate()?;
        self.storage.validate()?;
        if self.gc_max_lifetime_secs == 0 {
            return Err(SessionError::Configuration(
                "gc_max_lifetime_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl CookieSettings {
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SessionError::Configuration(
                "cookie name must not be empty".to_string(),
            ));
        }
        if !self
            .name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(SessionError::Configuration(format!(
                "cookie name '{}' contains characters outside [A-Za-z0-9_-]",
                self.name
            )));
        }
        if !self.path.starts_with('/') {
            return Err(SessionError::Configuration(format!(
                "cookie path '{}' must start with '/'",
                self.path
            )));
        }
        if parse_same_site(&self.same_site).is_none() {
            return Err(SessionError::Configuration(format!(
                "same_site '{}' is not one of strict, lax, none",
                self.same_site
            )));
        }
        Ok(())
    }
}

impl StorageSettings {
    fn validate(&self) -> Result<()> {
        if self.save_path.is_empty() {
            return Err(SessionError::Configuration(
                "storage save_path must not be empty".to_string(),
            ));
        }
        if self.namespace.is_empty() {
            return Err(SessionError::Configuration(
                "storage namespace must not be empty".to_string(),
            ));
        }
        if !self
            .namespace
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(SessionError::Configuration(format!(
                "storage namespace '{}' contains characters outside [A-Za-z0-9_-]",
                self.namespace
            )));
        }
        Ok(())
    }
}

//! Session Manager - lifecycle state machine over pluggable storage
//!
//! The `SessionManager` owns the active session for one logical request:
//! it starts, regenerates and destroys sessions, exposes the key/value view
//! over the session's data, and enforces fixation-resistant identifier
//! handling. Durability is delegated to a [`SessionHandler`]; token delivery
//! is delegated to a [`TokenTransport`].
//!
//! ## Lifecycle
//!
//! ```text
//! Absent --start()--> Active --destroy()--> Destroyed --start()--> Active
//!                        |                                         (new id)
//!                   regenerate()
//!                     (new id, same data)
//! ```
//!
//! Cookie attributes are snapshotted when the session starts; the clearing
//! cookie sent by `destroy` reuses that snapshot even if options changed
//! mid-session, so the client-side token is always cleared with the scope it
//! was set with.

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpRequest;

use crate::error::{Result, SessionError};
use crate::handler::{FileSessionHandler, SessionHandler};
use crate::models::{Session, SessionState};
use crate::session::cookie::{CookieFactory, CookieOptions};
use crate::session::id::{generate_session_id, is_valid_session_id};
use crate::session::transport::{CookieTransport, HeadlessTransport, TokenTransport};
use crate::settings::SessionSettings;

/// Securely manage and preserve per-client session data
///
/// One manager per logical unit of work; the in-memory mapping requires
/// exclusive access by its owning execution context, which `&mut self`
/// enforces. The storage handler behind it may be shared freely.
pub struct SessionManager<T: TokenTransport> {
    settings: SessionSettings,
    transport: T,
    handler: Arc<dyn SessionHandler>,
    auto_flush: bool,
    state: SessionState,
    session: Option<Session>,
    cookie_snapshot: Option<CookieFactory>,
}

impl SessionManager<CookieTransport> {
    /// Construct a manager reading the client token from a request's cookies
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when the settings fail
    /// validation.
    pub fn from_request(settings: SessionSettings, req: &HttpRequest) -> Result<Self> {
        let transport = CookieTransport::from_request(req, &settings.cookie.name);
        Self::new(settings, transport)
    }
}

impl SessionManager<HeadlessTransport> {
    /// Construct a manager for a non-interactive context; sessions never
    /// exist here and `start` is a no-op
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when the settings fail
    /// validation.
    pub fn headless(settings: SessionSettings) -> Result<Self> {
        Self::new(settings, HeadlessTransport)
    }
}

impl<T: TokenTransport> SessionManager<T> {
    /// Construct a manager over an explicit transport
    ///
    /// The default storage handler is the persistent file handler; replace
    /// it with [`SessionManager::set_save_handler`] before `start`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when the settings fail
    /// validation.
    pub fn new(settings: SessionSettings, transport: T) -> Result<Self> {
        settings.validate()?;
        let auto_flush = settings.auto_flush;
        Ok(Self {
            settings,
            transport,
            handler: Arc::new(FileSessionHandler::new()),
            auto_flush,
            state: SessionState::Absent,
            session: None,
            cookie_snapshot: None,
        })
    }

    /// Replace the manager options
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when validation fails or a
    /// session is already active; options are fixed for the lifetime of an
    /// active session.
    pub fn set_options(&mut self, settings: SessionSettings) -> Result<&mut Self> {
        if self.state == SessionState::Active {
            return Err(SessionError::Configuration(
                "options cannot be replaced while a session is active".to_string(),
            ));
        }
        settings.validate()?;
        self.auto_flush = settings.auto_flush;
        self.settings = settings;
        Ok(self)
    }

    /// Install the storage handler, optionally arming flush-on-drop so
    /// mutations persist even when the caller never calls `flush`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when a session is already
    /// active; rebinding storage underneath live data would lose it.
    pub fn set_save_handler(
        &mut self,
        handler: Arc<dyn SessionHandler>,
        auto_flush: bool,
    ) -> Result<&mut Self> {
        if self.state == SessionState::Active {
            return Err(SessionError::Configuration(
                "storage handler cannot be rebound while a session is active".to_string(),
            ));
        }
        self.handler = handler;
        self.auto_flush = auto_flush;
        Ok(self)
    }

    /// Whether a session currently exists for this context
    ///
    /// Always false on a non-interactive transport, regardless of state.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.transport.interactive() && self.state == SessionState::Active
    }

    /// Start a session: idempotent when one is already active
    ///
    /// Takes the client-supplied identifier when it is format-valid,
    /// otherwise mints a fresh one; loads the stored record into the
    /// in-memory mapping; issues the token and snapshots the cookie
    /// attributes for the eventual `destroy`. Returns `Ok(false)` on a
    /// non-interactive transport, where sessions never exist.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the storage handler
    /// cannot be opened or read; the manager stays out of the `Active`
    /// state rather than proceeding with lost data.
    pub fn start(&mut self) -> Result<bool> {
        if !self.transport.interactive() {
            log::debug!("session start skipped: transport is not interactive");
            return Ok(false);
        }
        if self.state == SessionState::Active {
            return Ok(true);
        }

        let storage = &self.settings.storage;
        self.handler.open(&storage.save_path, &storage.namespace)?;

        let id = match self.transport.incoming_id() {
            Some(raw) if is_valid_session_id(&raw) => raw,
            Some(_) => {
                log::debug!("ignoring malformed client identifier, minting a fresh one");
                generate_session_id()
            }
            None => generate_session_id(),
        };

        let blob = self.handler.read(&id)?;
        let mut session = Session::new(id);
        if !blob.is_empty() {
            match Session::decode(&blob) {
                Ok(data) => session.restore(data),
                Err(err) => log::warn!("discarding undecodable session record: {err}"),
            }
        }

        let factory = CookieFactory::new(CookieOptions::from_settings(&self.settings.cookie)?);
        self.transport.issue(factory.create_session_cookie(session.id()));
        self.cookie_snapshot = Some(factory);
        self.session = Some(session);
        self.state = SessionState::Active;
        Ok(true)
    }

    /// Issue a new identifier for the same data
    ///
    /// Critical for defeating session fixation after a privilege change
    /// (e.g. login). The data mapping is unaffected and the session stays
    /// active. When `delete_old` is true the old record is removed from
    /// storage after migration; otherwise it is left to expire via gc.
    /// Returns `Ok(false)` when no session is active.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when migrating the record
    /// fails; the session keeps its current identifier in that case.
    pub fn regenerate(&mut self, delete_old: bool) -> Result<bool> {
        if self.state != SessionState::Active {
            return Ok(false);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };

        let old_id = session.id().to_owned();
        let new_id = generate_session_id();
        let blob = session.encode()?;
        self.handler.write(&new_id, &blob)?;
        if delete_old {
            self.handler.destroy(&old_id)?;
        }
        session.set_id(new_id);
        if let Some(factory) = &self.cookie_snapshot {
            self.transport.issue(factory.create_session_cookie(session.id()));
        }
        log::debug!(
            "session identifier regenerated, old record {}",
            if delete_old { "deleted" } else { "left to expire" }
        );
        Ok(true)
    }

    /// Destroy the active session
    ///
    /// Clears the in-memory mapping, clears the client token using the
    /// attributes snapshotted at `start`, removes the stored record and
    /// transitions to `Destroyed`. Succeeds even when the client never held
    /// a token. Returns `Ok(false)` when no session is active.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the stored record
    /// cannot be removed; the in-memory session is gone regardless, so the
    /// failure cannot resurrect its data.
    pub fn destroy(&mut self) -> Result<bool> {
        if self.state != SessionState::Active {
            return Ok(false);
        }
        let Some(mut session) = self.session.take() else {
            return Ok(false);
        };

        session.clear();
        let id = session.id().to_owned();
        if let Some(factory) = self.cookie_snapshot.take() {
            self.transport.revoke(factory.create_expired_cookie());
        }
        self.state = SessionState::Destroyed;

        self.handler.destroy(&id)?;
        self.handler.close()?;
        Ok(true)
    }

    /// Look up a session value; `None` when unset or no session is active
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.session.as_ref().and_then(|session| session.get(key))
    }

    /// Whether a session value exists for `key`
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.has(key))
    }

    /// Insert or replace a session value; dropped when no session is active
    pub fn put(&mut self, key: &str, value: &str) {
        if let Some(session) = self.session.as_mut() {
            session.put(key, value);
        } else {
            log::debug!("session put dropped: no active session");
        }
    }

    /// Remove a session value; removing an absent key is a no-op
    pub fn delete(&mut self, key: &str) {
        if let Some(session) = self.session.as_mut() {
            session.delete(key);
        }
    }

    /// Read-once retrieval: returns the value and removes it in the same
    /// call, so a second `flash` of the same key yields `None`
    pub fn flash(&mut self, key: &str) -> Option<String> {
        self.session.as_mut()?.flash(key)
    }

    /// Persist the in-memory mapping through the storage handler
    ///
    /// A no-op when no session is active.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the write fails, or
    /// `SessionError::Serialization` when the mapping cannot be encoded.
    pub fn flush(&mut self) -> Result<()> {
        if self.state != SessionState::Active {
            return Ok(());
        }
        let Some(session) = &self.session else {
            return Ok(());
        };
        let blob = session.encode()?;
        self.handler.write(session.id(), &blob)
    }

    /// Remove expired records using the configured maximum lifetime,
    /// returning how many were removed
    ///
    /// Externally triggered (cron-like); this crate never schedules it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BackendUnavailable` when the backend fails.
    pub fn gc(&self) -> Result<usize> {
        self.handler
            .gc(Duration::from_secs(self.settings.gc_max_lifetime_secs))
    }

    /// The active session's identifier
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.session.as_ref().map(Session::id)
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The settings this manager was configured with
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Borrow the transport, e.g. to inspect pending cookies
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport, e.g. to drain cookies into a response
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// Flush-on-drop: with auto-flush armed, an active session's mutations are
/// persisted on every exit path, including early returns and errors. Drop
/// cannot report failures, so they are logged instead.
impl<T: TokenTransport> Drop for SessionManager<T> {
    fn drop(&mut self) {
        if self.auto_flush && self.state == SessionState::Active {
            if let Err(err) = self.flush() {
                log::warn!("session auto-flush on scope exit failed: {err}");
            }
        }
    }
}

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Session management and credential hashing for server applications
//!
//! `keeprs` tracks per-client server-side state keyed by an opaque session
//! identifier, protects that identifier against fixation and leakage, and
//! provides an algorithm-agnostic password-hashing abstraction with
//! rehash-on-policy-change detection.
//!
//! # Architecture
//!
//! - [`session::SessionManager`] owns the lifecycle of one session per
//!   logical request: start, regenerate, destroy, plus the key/value view
//!   over its data.
//! - [`handler::SessionHandler`] is the pluggable durability contract; the
//!   file handler persists records, the null handler is for stateless
//!   contexts, and handlers may be shared across requests via `Arc`.
//! - [`session::TokenTransport`] carries the single identifier token; the
//!   cookie-backed transport buffers finished cookies for the host to apply
//!   to its response.
//! - [`hashing::Hasher`] computes, verifies and inspects self-describing
//!   password hashes, independent of any session state.

/// Version of the keeprs library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod handler;
pub mod hashing;
pub mod models;
pub mod session;
pub mod settings;
pub mod testing;

/// Re-export commonly used items
pub use error::{HashError, Result, SessionError};
pub use handler::{FileSessionHandler, NullSessionHandler, SessionHandler};
pub use hashing::{Argon2Hasher, HashInfo, Hasher, HasherOptions};
pub use models::{Session, SessionState};
pub use session::{
    CookieFactory, CookieOptions, CookieTransport, HeadlessTransport, SessionManager,
    TokenTransport,
};
pub use settings::{CookieSettings, SessionSettings, StorageSettings};

//! Session identifier minting and validation
//!
//! Identifiers are opaque lookup keys with no meaning to the client. Minting
//! draws 32 bytes (256 bits) from the thread-local CSPRNG and encodes them
//! as base64url without padding, giving a fixed 43-character token.
//! Externally supplied identifiers are accepted only when they match that
//! exact shape; anything else is treated as "no session" and replaced with a
//! freshly minted identifier.

use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;

/// Raw entropy drawn per identifier
pub const ID_ENTROPY_BYTES: usize = 32;

/// Length of an encoded identifier
pub const ID_LENGTH: usize = 43;

/// Mint a new opaque session identifier
#[must_use]
pub fn generate_session_id() -> String {
    let mut raw = [0u8; ID_ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut raw);
    general_purpose::URL_SAFE_NO_PAD.encode(raw)
}

/// Whether `id` has the exact shape of a minted identifier
///
/// Also guards storage handlers against hostile identifiers reaching the
/// filesystem (path separators, `..`, NUL bytes all fail the charset check).
#[must_use]
pub fn is_valid_session_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

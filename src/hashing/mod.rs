//! Password hashing contract with rehash-on-policy-change detection
//!
//! The [`Hasher`] trait is what credential stores program against: compute a
//! hash, verify a password, and decide lazily whether a stored hash should
//! be upgraded. Hash strings are self-describing (PHC format), so
//! verification always uses the parameters embedded in the hash while
//! `needs_rehash` compares them against the hasher's *current*
//! configuration. Hashing is independent of sessions; nothing here touches
//! session state.

use crate::error::HashError;

pub mod argon2;

pub use self::argon2::{Argon2Hasher, HasherOptions};

/// Decoded metadata of a self-describing hash string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashInfo {
    /// Algorithm identifier embedded in the hash (e.g. `argon2id`)
    pub algorithm: String,
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

/// Capability for computing, verifying and inspecting password hashes
pub trait Hasher {
    /// Compute a new hash with a fresh random salt
    ///
    /// Two calls with the same password never produce the same hash.
    /// Deterministic failures (input the algorithm cannot process) return
    /// `None`; they never panic.
    fn compute(&self, password: &str) -> Option<String>;

    /// Verify `password` against `hash` using the parameters embedded in
    /// the hash, not the hasher's current configuration
    ///
    /// # Errors
    ///
    /// Returns `HashError::Format` when `hash` does not decode.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError>;

    /// Whether `hash` was produced under a different algorithm or cost
    /// configuration than the hasher's current one
    ///
    /// Used to upgrade stored hashes lazily after a successful verify,
    /// avoiding a mass migration when the policy changes.
    ///
    /// # Errors
    ///
    /// Returns `HashError::Format` when `hash` does not decode.
    fn needs_rehash(&self, hash: &str) -> Result<bool, HashError>;

    /// Decode the algorithm identifier and cost parameters embedded in
    /// `hash` without verifying a password
    ///
    /// # Errors
    ///
    /// Returns `HashError::Format` when `hash` does not decode.
    fn get_info(&self, hash: &str) -> Result<HashInfo, HashError>;
}

//! Argon2id implementation of the hasher contract

use argon2::password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::error::HashError;
use crate::hashing::{HashInfo, Hasher};

/// Cost parameters for the Argon2id hasher
///
/// Omitted keys take the algorithm's recommended defaults; unrecognized keys
/// fail deserialization. Values are validated at construction and at every
/// `set_options` call, never silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HasherOptions {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HasherOptions {
    fn default() -> Self {
        Self {
            memory_cost: Params::DEFAULT_M_COST,
            time_cost: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HasherOptions {
    fn params(self) -> Result<Params, HashError> {
        Params::new(self.memory_cost, self.time_cost, self.parallelism, None).map_err(|err| {
            HashError::Configuration(format!(
                "argon2 rejects m={}, t={}, p={}: {err}",
                self.memory_cost, self.time_cost, self.parallelism
            ))
        })
    }
}

/// Argon2id password hasher
///
/// Hashes are PHC strings carrying algorithm, version, cost parameters and
/// salt, so a hasher can verify hashes computed under any earlier
/// configuration.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    options: HasherOptions,
    params: Params,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            options: HasherOptions::default(),
            params: Params::default(),
        }
    }
}

impl Argon2Hasher {
    /// Construct a hasher with the given cost parameters
    ///
    /// # Errors
    ///
    /// Returns `HashError::Configuration` when the parameters are outside
    /// what the algorithm can execute; there is no silent fallback to
    /// defaults.
    pub fn new(options: HasherOptions) -> Result<Self, HashError> {
        let params = options.params()?;
        Ok(Self { options, params })
    }

    /// Replace the active cost parameters
    ///
    /// Existing hashes are unaffected; they self-describe their own
    /// parameters. `needs_rehash` starts reporting `true` for them.
    ///
    /// # Errors
    ///
    /// Returns `HashError::Configuration` when validation fails; the
    /// previous parameters stay active in that case.
    pub fn set_options(&mut self, options: HasherOptions) -> Result<&mut Self, HashError> {
        self.params = options.params()?;
        self.options = options;
        Ok(self)
    }

    /// The currently configured cost parameters
    #[must_use]
    pub fn options(&self) -> &HasherOptions {
        &self.options
    }

    fn context(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

/// Parse a PHC hash string, insisting on an actual digest
///
/// `PasswordHash` accepts salt-only strings; for this contract a hash
/// without a digest is malformed, not merely unusual.
fn parse_hash(hash: &str) -> Result<PasswordHash<'_>, HashError> {
    let parsed = PasswordHash::new(hash).map_err(|err| HashError::Format(err.to_string()))?;
    if parsed.hash.is_none() {
        return Err(HashError::Format(
            "hash string carries no digest".to_string(),
        ));
    }
    Ok(parsed)
}

impl Hasher for Argon2Hasher {
    fn compute(&self, password: &str) -> Option<String> {
        let salt = SaltString::generate(&mut OsRng);
        match self.context().hash_password(password.as_bytes(), &salt) {
            Ok(hash) => Some(hash.to_string()),
            Err(err) => {
                log::warn!("password hash computation failed: {err}");
                None
            }
        }
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        let parsed = parse_hash(hash)?;
        // Parameters come from the hash itself; the comparison inside is
        // constant-time.
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(HashError::Format(err.to_string())),
        }
    }

    fn needs_rehash(&self, hash: &str) -> Result<bool, HashError> {
        let parsed = parse_hash(hash)?;
        if parsed.algorithm.as_str() != "argon2id" {
            return Ok(true);
        }
        if parsed.version != Some(Version::V0x13 as u32) {
            return Ok(true);
        }
        let embedded =
            Params::try_from(&parsed).map_err(|err| HashError::Format(err.to_string()))?;
        Ok(embedded.m_cost() != self.params.m_cost()
            || embedded.t_cost() != self.params.t_cost()
            || embedded.p_cost() != self.params.p_cost())
    }

    fn get_info(&self, hash: &str) -> Result<HashInfo, HashError> {
        let parsed = parse_hash(hash)?;
        let params = Params::try_from(&parsed).map_err(|err| HashError::Format(err.to_string()))?;
        Ok(HashInfo {
            algorithm: parsed.algorithm.as_str().to_string(),
            memory_cost: params.m_cost(),
            time_cost: params.t_cost(),
            parallelism: params.p_cost(),
        })
    }
}

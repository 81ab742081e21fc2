//! Master-password key derivation.
//!
//! Argon2id is the target scheme; PBKDF2-HMAC-SHA256 is kept as a fallback
//! for vaults created in environments without Argon2. The algorithm in use
//! is recorded in the vault file so a vault always reopens with the scheme
//! it was created under.

use argon2::{Algorithm, Argon2, Params, Version};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::keys::{Salt, VaultKey, KEY_LENGTH};
use vaultkeep_common::{Error, Result};

/// Length of the stored authentication hash in bytes.
pub const AUTH_HASH_LENGTH: usize = 32;

/// Safety floor for PBKDF2 iteration counts (OWASP recommendation for
/// HMAC-SHA256). Derivation below the floor is permitted; blocking it is
/// a policy decision that belongs to the caller.
pub const MIN_PBKDF2_ITERATIONS: u32 = 600_000;

/// Safety floor for Argon2id memory cost in KiB.
pub const MIN_ARGON2_MEMORY_KIB: u32 = 19_456;

/// Safety floor for Argon2id iterations.
pub const MIN_ARGON2_TIME_COST: u32 = 2;

/// Key derivation scheme identifier, persisted in the vault file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfAlgorithm {
    /// Argon2id, the target scheme.
    Argon2id,
    /// PBKDF2-HMAC-SHA256 fallback.
    Pbkdf2HmacSha256,
}

impl KdfAlgorithm {
    /// Identifier string stored in the vault file.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Argon2id => "argon2id",
            Self::Pbkdf2HmacSha256 => "pbkdf2-hmac-sha256",
        }
    }

    /// Parse a stored identifier.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedAlgorithm`] for identifiers this build
    /// does not know, so a vault created by a newer version fails loudly
    /// instead of deriving a wrong key.
    pub fn from_identifier(id: &str) -> Result<Self> {
        match id {
            "argon2id" => Ok(Self::Argon2id),
            "pbkdf2-hmac-sha256" => Ok(Self::Pbkdf2HmacSha256),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Parameters for key derivation.
///
/// The Argon2 fields are ignored under PBKDF2 and vice versa; keeping them
/// in one struct lets the file header carry a single `params` object
/// regardless of scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// Argon2 memory cost in KiB (e.g., 65536 = 64 MiB).
    pub memory_cost: u32,
    /// Argon2 number of iterations.
    pub time_cost: u32,
    /// Argon2 degree of parallelism.
    pub parallelism: u32,
    /// PBKDF2 iteration count.
    pub iterations: u32,
}

impl KdfParams {
    /// Parameters suitable for interactive use, targeting a few hundred
    /// milliseconds of derivation time on commodity hardware.
    pub fn interactive() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
            iterations: MIN_PBKDF2_ITERATIONS,
        }
    }

    /// Higher-security parameters that may take several seconds.
    pub fn sensitive() -> Self {
        Self {
            memory_cost: 262144, // 256 MiB
            time_cost: 4,
            parallelism: 4,
            iterations: 1_000_000,
        }
    }

    /// Moderate parameters for constrained devices.
    pub fn moderate() -> Self {
        Self {
            memory_cost: 32768, // 32 MiB
            time_cost: 3,
            parallelism: 2,
            iterations: MIN_PBKDF2_ITERATIONS,
        }
    }

    /// Check whether these parameters fall below the recommended safety
    /// floor for the given scheme.
    ///
    /// Sub-floor parameters still derive; the caller decides whether to
    /// warn the user.
    pub fn below_floor(&self, algorithm: KdfAlgorithm) -> bool {
        match algorithm {
            KdfAlgorithm::Argon2id => {
                self.memory_cost < MIN_ARGON2_MEMORY_KIB || self.time_cost < MIN_ARGON2_TIME_COST
            }
            KdfAlgorithm::Pbkdf2HmacSha256 => self.iterations < MIN_PBKDF2_ITERATIONS,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Derive a vault key from a password and salt.
///
/// # Preconditions
/// - `password` must not be empty
///
/// # Postconditions
/// - The derived key is deterministic given the same inputs
///
/// # Errors
/// - Returns error if password is empty
/// - Returns error if the Argon2id parameters are structurally invalid
///
/// # Security
/// - The password is not stored or logged
/// - Intermediate buffers are zeroized
pub fn derive_key(
    password: &[u8],
    salt: &Salt,
    algorithm: KdfAlgorithm,
    params: &KdfParams,
) -> Result<VaultKey> {
    if password.is_empty() {
        return Err(Error::InvalidInput("password cannot be empty".to_string()));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];

    match algorithm {
        KdfAlgorithm::Argon2id => {
            let argon2_params = Params::new(
                params.memory_cost,
                params.time_cost,
                params.parallelism,
                Some(KEY_LENGTH),
            )
            .map_err(|e| Error::InvalidInput(format!("invalid KDF parameters: {}", e)))?;

            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);
            argon2
                .hash_password_into(password, salt.as_bytes(), &mut key_bytes)
                .map_err(|e| Error::InvalidInput(format!("key derivation failed: {}", e)))?;
        }
        KdfAlgorithm::Pbkdf2HmacSha256 => {
            if params.iterations == 0 {
                return Err(Error::InvalidInput(
                    "PBKDF2 iteration count cannot be zero".to_string(),
                ));
            }
            pbkdf2::pbkdf2_hmac::<sha2::Sha256>(
                password,
                salt.as_bytes(),
                params.iterations,
                &mut key_bytes,
            );
        }
    }

    let key = VaultKey::from_bytes(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}

/// One-way digest of a derived key, stored in the vault file to verify a
/// password attempt without ever persisting the key itself.
pub fn auth_value(key: &VaultKey) -> [u8; AUTH_HASH_LENGTH] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}

/// Compare a candidate key's auth value against the stored hash.
///
/// # Security
/// Constant-time comparison; the result does not leak how many leading
/// bytes matched.
pub fn verify_auth(candidate: &VaultKey, stored_hash: &[u8]) -> bool {
    let computed = auth_value(candidate);
    computed.as_slice().ct_eq(stored_hash).into()
}

//! Common error types for VaultKeep.

use thiserror::Error;

/// Top-level error type for vault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The master password could not be verified against the stored
    /// authentication hash. Deliberately carries no detail about whether
    /// the password or the stored salts were at fault.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The vault file is structurally invalid: malformed JSON, an unknown
    /// entry discriminator, or an incompatible format version.
    #[error("corrupt vault file: {0}")]
    CorruptFile(String),

    /// AEAD authentication failed for a single field (tag mismatch or
    /// wrong key). Distinct from [`Error::InvalidEncoding`].
    #[error("field decryption failed")]
    DecryptionFailed,

    /// A ciphertext record could not be decoded (malformed base64 or a
    /// record shorter than nonce + tag).
    #[error("invalid ciphertext encoding: {0}")]
    InvalidEncoding(String),

    /// A folder or entry index outside the valid range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Attempted removal of the non-deletable default folder.
    #[error("the default folder cannot be removed")]
    ProtectedFolder,

    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A loaded vault file names a KDF identifier this build does not know.
    #[error("unsupported key derivation algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

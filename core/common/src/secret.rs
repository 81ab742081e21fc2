//! Secret string wrapper with secure memory handling.
//!
//! Decrypted field values pass through this type so that plaintext is
//! zeroized when the caller is done with it, rather than lingering on
//! the heap until the allocator reuses the memory.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A UTF-8 string that zeroizes its buffer on drop.
///
/// The value is never printed by `Debug` and has no `Display`
/// implementation; callers must go through [`SecretString::expose`]
/// to read it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap an already-owned string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Borrow the secret value.
    ///
    /// The returned slice should be used immediately and not stored.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED; {} bytes])", self.0.len())
    }
}

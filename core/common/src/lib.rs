//! Common types shared across VaultKeep crates.
//!
//! This crate provides the error taxonomy every vault operation reports
//! through, and the zeroizing secret wrapper decrypted values travel in.

pub mod error;
pub mod secret;

pub use error::{Error, Result};
pub use secret::SecretString;

//! Cryptographic primitives for VaultKeep.
//!
//! This crate provides:
//! - Master-password key derivation (Argon2id, PBKDF2-HMAC-SHA256 fallback)
//! - Password authentication without persisting the key
//! - Field-level authenticated encryption using ChaCha20-Poly1305
//! - Key types with automatic zeroization
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Constant-time operations for sensitive comparisons
//! - Every encrypted field carries its own fresh random nonce

pub mod cipher;
pub mod kdf;
pub mod keys;

pub use cipher::{decrypt_field, encrypt_field, CipherText};
pub use kdf::{auth_value, derive_key, verify_auth, KdfAlgorithm, KdfParams};
pub use keys::{Salt, VaultKey, KEY_LENGTH, SALT_LENGTH};

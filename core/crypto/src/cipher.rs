//! Field-level authenticated encryption using ChaCha20-Poly1305.
//!
//! Every encrypted value carries its own freshly generated 96-bit nonce.
//! A vault encrypts many independent short fields under one key; sharing a
//! nonce across fields would reuse the key stream the moment two fields
//! held identical plaintext, so the nonce is generated per call and stored
//! inside the record.
//!
//! Record layout: `base64(nonce || ciphertext || tag)`, one opaque string
//! safe for embedding in the JSON vault file.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng},
    ChaCha20Poly1305,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::keys::VaultKey;
use vaultkeep_common::{Error, Result, SecretString};

/// Nonce size for ChaCha20-Poly1305 (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// A self-describing encrypted field as stored in the vault file.
///
/// Opaque to everything except [`decrypt_field`]; the ciphertext itself is
/// not secret and may appear in logs or diffs of the vault file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CipherText(String);

impl CipherText {
    /// The stored base64 form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Encrypt a single field value.
///
/// # Postconditions
/// - The record embeds a nonce generated fresh for this call; encrypting
///   the same plaintext twice never yields the same record
///
/// # Errors
/// - Returns error if the AEAD backend rejects the input
pub fn encrypt_field(plaintext: &str, key: &VaultKey) -> Result<CipherText> {
    let cipher = ChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| Error::InvalidInput("encryption failed".to_string()))?;

    let mut record = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    record.extend_from_slice(&nonce);
    record.extend_from_slice(&ciphertext);

    Ok(CipherText(BASE64.encode(record)))
}

/// Decrypt a single field value.
///
/// # Errors
/// - [`Error::InvalidEncoding`] for malformed base64 or a record shorter
///   than nonce + tag
/// - [`Error::DecryptionFailed`] for a tag mismatch or wrong key
///
/// The two are never collapsed: a caller that sees `InvalidEncoding` is
/// looking at container-level corruption, while `DecryptionFailed` means
/// the bytes decoded fine but fail authentication.
pub fn decrypt_field(record: &CipherText, key: &VaultKey) -> Result<SecretString> {
    let raw = BASE64
        .decode(&record.0)
        .map_err(|e| Error::InvalidEncoding(e.to_string()))?;

    if raw.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::InvalidEncoding(format!(
            "ciphertext record too short: {} bytes",
            raw.len()
        )));
    }

    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_SIZE);
    let nonce = GenericArray::from_slice(nonce_bytes);
    let cipher = ChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| Error::DecryptionFailed)?;

    match String::from_utf8(plaintext) {
        Ok(value) => Ok(SecretString::new(value)),
        Err(e) => {
            // Authenticated but not UTF-8; wipe before reporting.
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            Err(Error::InvalidEncoding(
                "decrypted field is not valid UTF-8".to_string(),
            ))
        }
    }
}

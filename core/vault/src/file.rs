//! Durable vault file format.
//!
//! One JSON document per vault: a header carrying the KDF identifier and
//! parameters, the two salts, and the authentication hash, followed by the
//! ordered folder list. Writes go to a temporary file in the same
//! directory and are renamed over the previous file, so a failed save
//! never damages the last valid vault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::folder::{Folder, FolderId};
use vaultkeep_common::{Error, Result};
use vaultkeep_crypto::kdf::AUTH_HASH_LENGTH;
use vaultkeep_crypto::{KdfAlgorithm, KdfParams, Salt};

/// Vault format version for migration support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultVersion {
    pub major: u32,
    pub minor: u32,
}

impl VaultVersion {
    /// Current vault format version.
    pub const CURRENT: Self = Self { major: 1, minor: 0 };

    /// Check if this version can be read by the current build.
    pub fn is_compatible(&self) -> bool {
        self.major == Self::CURRENT.major
    }
}

impl Default for VaultVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// The KDF section of the file header: identifier string plus parameters.
///
/// The identifier is kept as a plain string through deserialization so an
/// unknown scheme surfaces as [`Error::UnsupportedAlgorithm`] rather than
/// being rejected as malformed JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmHeader {
    pub id: String,
    pub params: KdfParams,
}

impl AlgorithmHeader {
    /// Resolve the stored identifier to a known scheme.
    pub fn algorithm(&self) -> Result<KdfAlgorithm> {
        KdfAlgorithm::from_identifier(&self.id)
    }
}

/// Cryptographic header of a vault file.
///
/// Everything needed to re-derive the vault key and verify a password
/// attempt; the key itself is never part of this structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultHeader {
    pub version: VaultVersion,
    pub algorithm: AlgorithmHeader,
    pub encryption_salt: Salt,
    pub auth_salt: Salt,
    #[serde(with = "b64")]
    pub auth_hash: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl VaultHeader {
    /// Build a header for a freshly created vault.
    pub fn new(
        algorithm: KdfAlgorithm,
        params: KdfParams,
        encryption_salt: Salt,
        auth_salt: Salt,
        auth_hash: [u8; AUTH_HASH_LENGTH],
    ) -> Self {
        let now = Utc::now();
        Self {
            version: VaultVersion::CURRENT,
            algorithm: AlgorithmHeader {
                id: algorithm.identifier().to_string(),
                params,
            },
            encryption_salt,
            auth_salt,
            auth_hash: auth_hash.to_vec(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// The complete persisted vault document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDocument {
    #[serde(flatten)]
    pub header: VaultHeader,
    pub default_folder: FolderId,
    pub folders: Vec<Folder>,
}

impl VaultDocument {
    /// Structural validation beyond what serde enforces.
    ///
    /// # Errors
    /// - [`Error::CorruptFile`] for an incompatible format version, an
    ///   empty folder list, or a default-folder id that matches no folder
    pub fn validate(&self) -> Result<()> {
        if !self.header.version.is_compatible() {
            return Err(Error::CorruptFile(format!(
                "unsupported vault format version {}.{}",
                self.header.version.major, self.header.version.minor
            )));
        }
        if self.header.auth_hash.len() != AUTH_HASH_LENGTH {
            return Err(Error::CorruptFile(format!(
                "authentication hash has wrong length: {} bytes",
                self.header.auth_hash.len()
            )));
        }
        if self.folders.is_empty() {
            return Err(Error::CorruptFile("vault has no folders".to_string()));
        }
        if !self.folders.iter().any(|f| f.id() == self.default_folder) {
            return Err(Error::CorruptFile(
                "default folder id matches no folder".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read and validate a vault document.
///
/// # Errors
/// - [`Error::Io`] if the file cannot be read
/// - [`Error::CorruptFile`] for malformed JSON, unknown entry
///   discriminators, or failed structural validation
pub fn read_document(path: &Path) -> Result<VaultDocument> {
    let data = fs::read_to_string(path)?;
    let document: VaultDocument =
        serde_json::from_str(&data).map_err(|e| Error::CorruptFile(e.to_string()))?;
    document.validate()?;
    Ok(document)
}

/// Write a vault document, replacing the previous file atomically.
///
/// The document is serialized to `<path>.tmp` first and renamed into
/// place; if anything fails before the rename, the previous file is left
/// untouched and the temporary file is removed.
pub fn write_document(path: &Path, document: &VaultDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)
        .map_err(|e| Error::Io(std::io::Error::other(e)))?;

    let tmp = path.with_extension("tmp");
    if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(&encoded)
            .map_err(|e| D::Error::custom(format!("invalid base64: {}", e)))
    }
}

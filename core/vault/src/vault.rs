//! The vault aggregate root.
//!
//! A vault owns the KDF salts, the authentication hash, and the ordered
//! folder list, and is the only component that touches the file on disk.
//! The session model is deliberately thin: `create` and `open` hand the
//! derived key back to the caller, and every accessor and mutator takes
//! it explicitly. The core holds no global session; when the caller drops
//! the key, it is zeroized and the vault is effectively closed.

use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::file::{self, VaultDocument, VaultHeader};
use crate::folder::{check_index, check_insertion_index, Folder};
use vaultkeep_common::{Error, Result};
use vaultkeep_crypto::{auth_value, derive_key, verify_auth, KdfAlgorithm, KdfParams, Salt, VaultKey};

/// Name given to the default folder at vault creation.
pub const DEFAULT_FOLDER_NAME: &str = "General";

/// A single user's encrypted credential store, backed by one file.
pub struct Vault {
    path: PathBuf,
    document: VaultDocument,
}

impl Vault {
    /// Create a new vault and persist it immediately.
    ///
    /// Generates two independent salts, derives the vault key and the
    /// authentication hash, and seeds the folder list with the default
    /// folder. A vault that exists only in memory is not considered
    /// created, so the file is written before this returns.
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] for an empty password or invalid KDF
    ///   parameters
    /// - [`Error::Io`] if the file cannot be written
    pub fn create(
        path: impl AsRef<Path>,
        password: &str,
        algorithm: KdfAlgorithm,
        params: KdfParams,
    ) -> Result<(Self, VaultKey)> {
        let path = path.as_ref().to_path_buf();

        let encryption_salt = Salt::generate();
        let auth_salt = Salt::generate();

        let key = derive_key(password.as_bytes(), &encryption_salt, algorithm, &params)?;
        let auth_key = derive_key(password.as_bytes(), &auth_salt, algorithm, &params)?;
        let auth_hash = auth_value(&auth_key);

        let general = Folder::new(DEFAULT_FOLDER_NAME, &key)?;
        let document = VaultDocument {
            header: VaultHeader::new(algorithm, params, encryption_salt, auth_salt, auth_hash),
            default_folder: general.id(),
            folders: vec![general],
        };

        let mut vault = Self { path, document };
        vault.save()?;
        tracing::info!(path = %vault.path.display(), "created vault");

        Ok((vault, key))
    }

    /// Open an existing vault, verifying the password before returning.
    ///
    /// Derives a candidate key from the stored salts and compares its
    /// authentication value against the stored hash in constant time.
    /// Failure is side-effect-free, so the caller may retry freely.
    ///
    /// # Errors
    /// - [`Error::AuthenticationFailed`] on a mismatch, without revealing
    ///   whether the password or the stored salts were at fault
    /// - [`Error::CorruptFile`] / [`Error::UnsupportedAlgorithm`] from
    ///   loading
    pub fn open(path: impl AsRef<Path>, password: &str) -> Result<(Self, VaultKey)> {
        let vault = Self::load(path)?;
        // An empty candidate is just a wrong password here; only `create`
        // treats it as invalid input.
        if password.is_empty() {
            return Err(Error::AuthenticationFailed);
        }
        let header = &vault.document.header;
        let algorithm = header.algorithm.algorithm()?;
        let params = &header.algorithm.params;

        let key = derive_key(
            password.as_bytes(),
            &header.encryption_salt,
            algorithm,
            params,
        )?;
        let auth_key = derive_key(password.as_bytes(), &header.auth_salt, algorithm, params)?;

        if !verify_auth(&auth_key, &header.auth_hash) {
            return Err(Error::AuthenticationFailed);
        }

        tracing::info!(path = %vault.path.display(), "opened vault");
        Ok((vault, key))
    }

    /// Load a vault file without verifying any password.
    ///
    /// Structural validation happens here; the KDF identifier is also
    /// resolved so an unsupported scheme fails at load time rather than on
    /// the first derivation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = file::read_document(&path)?;
        document.header.algorithm.algorithm()?;
        Ok(Self { path, document })
    }

    /// Serialize the full aggregate to the vault's path.
    ///
    /// Uses a temp-file-then-rename replacement; a failed write leaves the
    /// previous valid file intact.
    pub fn save(&mut self) -> Result<()> {
        self.document.header.modified_at = Utc::now();
        file::write_document(&self.path, &self.document)?;
        tracing::debug!(path = %self.path.display(), folders = self.document.folders.len(), "saved vault");
        Ok(())
    }

    /// The file path backing this vault.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The vault's file header (salts, KDF identifier, timestamps).
    pub fn header(&self) -> &VaultHeader {
        &self.document.header
    }

    /// Number of folders.
    pub fn folder_count(&self) -> usize {
        self.document.folders.len()
    }

    /// Current position of the default folder.
    ///
    /// The default folder is tracked by id, not position; reordering may
    /// move it away from index 0.
    pub fn default_folder_index(&self) -> usize {
        // Invariant validated at load and maintained by every mutation.
        self.document
            .folders
            .iter()
            .position(|f| f.id() == self.document.default_folder)
            .unwrap_or(0)
    }

    /// Get the folder at `index`.
    pub fn folder(&self, index: usize) -> Result<&Folder> {
        check_index(index, self.document.folders.len())?;
        Ok(&self.document.folders[index])
    }

    /// Get the folder at `index` mutably.
    pub fn folder_mut(&mut self, index: usize) -> Result<&mut Folder> {
        check_index(index, self.document.folders.len())?;
        Ok(&mut self.document.folders[index])
    }

    /// Append a new folder.
    pub fn add_folder(&mut self, name: &str, key: &VaultKey) -> Result<()> {
        let folder = Folder::new(name, key)?;
        self.document.folders.push(folder);
        Ok(())
    }

    /// Insert a new folder at `index`; insertion at the folder count is an
    /// append.
    pub fn insert_folder(&mut self, name: &str, index: usize, key: &VaultKey) -> Result<()> {
        check_insertion_index(index, self.document.folders.len())?;
        let folder = Folder::new(name, key)?;
        self.document.folders.insert(index, folder);
        Ok(())
    }

    /// Remove the folder at `index`, migrating its entries into the
    /// default folder first.
    ///
    /// Migration is all-or-nothing: the folder is only removed once every
    /// entry has been appended to the default folder.
    ///
    /// # Errors
    /// - [`Error::ProtectedFolder`] if `index` is the default folder,
    ///   wherever it currently sits; no mutation is performed
    pub fn remove_folder(&mut self, index: usize) -> Result<()> {
        check_index(index, self.document.folders.len())?;

        if self.document.folders[index].id() == self.document.default_folder {
            return Err(Error::ProtectedFolder);
        }

        let default_index = self
            .document
            .folders
            .iter()
            .position(|f| f.id() == self.document.default_folder)
            .ok_or_else(|| {
                Error::CorruptFile("default folder id matches no folder".to_string())
            })?;

        let entries = self.document.folders[index].drain_entries();
        let migrated = entries.len();
        for entry in entries {
            self.document.folders[default_index].add_entry(entry);
        }
        self.document.folders.remove(index);

        tracing::debug!(migrated, "removed folder, entries moved to default");
        Ok(())
    }

    /// Relocate a folder within the vault.
    ///
    /// Both indices are checked against the pre-move size. Moving the
    /// default folder is allowed; its protection follows its id.
    pub fn move_folder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.document.folders.len();
        check_index(from, len)?;
        check_index(to, len)?;

        let folder = self.document.folders.remove(from);
        self.document.folders.insert(to, folder);
        Ok(())
    }

    /// Find the first folder whose decrypted name matches `name`
    /// case-insensitively.
    pub fn find_folder(&self, name: &str, key: &VaultKey) -> Result<Option<usize>> {
        let wanted = name.to_lowercase();
        for (index, folder) in self.document.folders.iter().enumerate() {
            if folder.name(key)?.expose().to_lowercase() == wanted {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Iterate over folders in display order.
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.document.folders.iter()
    }

    /// Move an entry from one folder to another, appending at the
    /// destination.
    ///
    /// All three indices are validated against current sizes before any
    /// mutation.
    pub fn move_entry(
        &mut self,
        from_folder: usize,
        to_folder: usize,
        entry_index: usize,
    ) -> Result<()> {
        let len = self.document.folders.len();
        check_index(from_folder, len)?;
        check_index(to_folder, len)?;
        check_index(entry_index, self.document.folders[from_folder].len())?;

        let entry: Entry = self.document.folders[from_folder].remove_entry(entry_index)?;
        self.document.folders[to_folder].add_entry(entry);
        Ok(())
    }

    /// Change the master password, re-encrypting the entire vault.
    ///
    /// Verifies the old password, derives fresh salts and keys for the new
    /// one, re-encrypts every folder name and entry field, and persists.
    /// The switch is all-or-nothing: re-encryption happens on a working
    /// copy which is written to disk first, and only a successful save
    /// commits it in memory. Any field or I/O failure leaves both the file
    /// and the in-memory vault on the old password.
    ///
    /// Returns the new session key; the old one is stale after this call.
    pub fn change_password(&mut self, old_password: &str, new_password: &str) -> Result<VaultKey> {
        if old_password.is_empty() {
            return Err(Error::AuthenticationFailed);
        }
        let algorithm = self.document.header.algorithm.algorithm()?;
        let params = self.document.header.algorithm.params.clone();

        let old_auth_key = derive_key(
            old_password.as_bytes(),
            &self.document.header.auth_salt,
            algorithm,
            &params,
        )?;
        if !verify_auth(&old_auth_key, &self.document.header.auth_hash) {
            return Err(Error::AuthenticationFailed);
        }

        let old_key = derive_key(
            old_password.as_bytes(),
            &self.document.header.encryption_salt,
            algorithm,
            &params,
        )?;

        let encryption_salt = Salt::generate();
        let auth_salt = Salt::generate();
        let new_key = derive_key(new_password.as_bytes(), &encryption_salt, algorithm, &params)?;
        let new_auth_key = derive_key(new_password.as_bytes(), &auth_salt, algorithm, &params)?;

        let mut document = self.document.clone();
        for folder in &mut document.folders {
            folder.reencrypt(&old_key, &new_key)?;
        }
        document.header.encryption_salt = encryption_salt;
        document.header.auth_salt = auth_salt;
        document.header.auth_hash = auth_value(&new_auth_key).to_vec();
        document.header.modified_at = Utc::now();

        file::write_document(&self.path, &document)?;
        self.document = document;

        tracing::info!(path = %self.path.display(), "changed master password");
        Ok(new_key)
    }

    #[cfg(test)]
    pub(crate) fn default_folder_id(&self) -> crate::folder::FolderId {
        self.document.default_folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, Login};
    use tempfile::TempDir;

    fn fast_params() -> KdfParams {
        KdfParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            iterations: 1_000,
        }
    }

    fn create_test_vault(dir: &TempDir) -> (Vault, VaultKey) {
        Vault::create(
            dir.path().join("test.vault"),
            "test-password",
            KdfAlgorithm::Argon2id,
            fast_params(),
        )
        .unwrap()
    }

    fn login(name: &str, key: &VaultKey) -> Entry {
        Login::new(name, "user", "pass", "example.com", "", key)
            .unwrap()
            .into()
    }

    #[test]
    fn test_create_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let (vault, key) = create_test_vault(&dir);

        assert!(vault.path().exists());
        assert_eq!(vault.folder_count(), 1);
        assert_eq!(
            vault.folder(0).unwrap().name(&key).unwrap().expose(),
            DEFAULT_FOLDER_NAME
        );
    }

    #[test]
    fn test_open_with_correct_password() {
        let dir = TempDir::new().unwrap();
        let (vault, _key) = create_test_vault(&dir);
        let path = vault.path().to_path_buf();
        drop(vault);

        let (reopened, key) = Vault::open(&path, "test-password").unwrap();
        assert_eq!(
            reopened.folder(0).unwrap().name(&key).unwrap().expose(),
            DEFAULT_FOLDER_NAME
        );
    }

    #[test]
    fn test_open_with_wrong_password() {
        let dir = TempDir::new().unwrap();
        let (vault, _key) = create_test_vault(&dir);
        let path = vault.path().to_path_buf();
        drop(vault);

        assert!(matches!(
            Vault::open(&path, "test-passworD"),
            Err(Error::AuthenticationFailed)
        ));
        // Failure is side-effect-free; the correct password still works.
        assert!(Vault::open(&path, "test-password").is_ok());
    }

    #[test]
    fn test_open_with_empty_password() {
        let dir = TempDir::new().unwrap();
        let (vault, _key) = create_test_vault(&dir);
        let path = vault.path().to_path_buf();
        drop(vault);

        // An empty candidate is indistinguishable from any other wrong
        // password.
        assert!(matches!(
            Vault::open(&path, ""),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_remove_default_folder_protected() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = create_test_vault(&dir);
        vault.add_folder("Work", &key).unwrap();

        assert!(matches!(
            vault.remove_folder(0),
            Err(Error::ProtectedFolder)
        ));
        assert_eq!(vault.folder_count(), 2);
    }

    #[test]
    fn test_default_folder_protection_follows_reorder() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = create_test_vault(&dir);
        vault.add_folder("Work", &key).unwrap();

        let default_id = vault.default_folder_id();

        // Default folder moves from index 0 to index 1.
        vault.move_folder(0, 1).unwrap();
        assert_eq!(vault.default_folder_index(), 1);
        assert_eq!(vault.folder(1).unwrap().id(), default_id);

        assert!(matches!(
            vault.remove_folder(1),
            Err(Error::ProtectedFolder)
        ));
        // The folder now at index 0 is removable.
        vault.remove_folder(0).unwrap();
        assert_eq!(vault.folder_count(), 1);
    }

    #[test]
    fn test_remove_folder_migrates_entries() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = create_test_vault(&dir);
        vault.add_folder("Work", &key).unwrap();
        for name in ["a", "b", "c"] {
            vault.folder_mut(1).unwrap().add_entry(login(name, &key));
        }
        let before = vault.folder(0).unwrap().len();

        vault.remove_folder(1).unwrap();

        assert_eq!(vault.folder_count(), 1);
        assert_eq!(vault.folder(0).unwrap().len(), before + 3);
    }

    #[test]
    fn test_move_entry_between_folders() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = create_test_vault(&dir);
        vault.add_folder("Work", &key).unwrap();
        vault.folder_mut(0).unwrap().add_entry(login("a", &key));

        vault.move_entry(0, 1, 0).unwrap();

        assert_eq!(vault.folder(0).unwrap().len(), 0);
        assert_eq!(vault.folder(1).unwrap().len(), 1);
        assert_eq!(
            vault
                .folder(1)
                .unwrap()
                .entry(0)
                .unwrap()
                .name(&key)
                .unwrap()
                .expose(),
            "a"
        );

        assert!(vault.move_entry(0, 2, 0).is_err());
        assert!(vault.move_entry(1, 0, 1).is_err());
    }

    #[test]
    fn test_insert_and_find_folder() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = create_test_vault(&dir);
        vault.add_folder("Work", &key).unwrap();
        vault.insert_folder("Banking", 1, &key).unwrap();

        assert_eq!(vault.folder_count(), 3);
        assert_eq!(vault.find_folder("banking", &key).unwrap(), Some(1));
        assert_eq!(vault.find_folder("work", &key).unwrap(), Some(2));
        assert_eq!(vault.find_folder("missing", &key).unwrap(), None);

        assert!(vault.insert_folder("X", 4, &key).is_err());
    }

    #[test]
    fn test_change_password() {
        let dir = TempDir::new().unwrap();
        let (mut vault, key) = create_test_vault(&dir);
        vault.folder_mut(0).unwrap().add_entry(login("github", &key));
        vault.save().unwrap();
        let path = vault.path().to_path_buf();

        let new_key = vault.change_password("test-password", "new-password").unwrap();
        assert_eq!(
            vault
                .folder(0)
                .unwrap()
                .entry(0)
                .unwrap()
                .name(&new_key)
                .unwrap()
                .expose(),
            "github"
        );
        drop(vault);

        assert!(matches!(
            Vault::open(&path, "test-password"),
            Err(Error::AuthenticationFailed)
        ));
        let (reopened, key) = Vault::open(&path, "new-password").unwrap();
        assert_eq!(
            reopened
                .folder(0)
                .unwrap()
                .entry(0)
                .unwrap()
                .name(&key)
                .unwrap()
                .expose(),
            "github"
        );
    }

    #[test]
    fn test_change_password_wrong_old_password() {
        let dir = TempDir::new().unwrap();
        let (mut vault, _key) = create_test_vault(&dir);

        assert!(matches!(
            vault.change_password("wrong", "new-password"),
            Err(Error::AuthenticationFailed)
        ));
        assert!(matches!(
            vault.change_password("", "new-password"),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_change_password_failed_save_keeps_old_state() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let (mut vault, key) = Vault::create(
            sub.join("test.vault"),
            "test-password",
            KdfAlgorithm::Argon2id,
            fast_params(),
        )
        .unwrap();
        vault.folder_mut(0).unwrap().add_entry(login("github", &key));
        vault.save().unwrap();

        // Make the save fail after re-encryption succeeds.
        std::fs::remove_dir_all(&sub).unwrap();
        assert!(matches!(
            vault.change_password("test-password", "new-password"),
            Err(Error::Io(_))
        ));

        // The in-memory vault still reads under the old key.
        assert_eq!(
            vault
                .folder(0)
                .unwrap()
                .entry(0)
                .unwrap()
                .name(&key)
                .unwrap()
                .expose(),
            "github"
        );
    }

    #[test]
    fn test_pbkdf2_vault_roundtrip() {
        let dir = TempDir::new().unwrap();
        let (vault, _key) = Vault::create(
            dir.path().join("pbkdf2.vault"),
            "test-password",
            KdfAlgorithm::Pbkdf2HmacSha256,
            fast_params(),
        )
        .unwrap();
        let path = vault.path().to_path_buf();
        drop(vault);

        assert!(Vault::open(&path, "test-password").is_ok());
        assert!(matches!(
            Vault::open(&path, "wrong"),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_load_unsupported_algorithm() {
        let dir = TempDir::new().unwrap();
        let (vault, _key) = create_test_vault(&dir);
        let path = vault.path().to_path_buf();
        drop(vault);

        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        json["algorithm"]["id"] = "scrypt".into();
        std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

        assert!(matches!(
            Vault::load(&path),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}

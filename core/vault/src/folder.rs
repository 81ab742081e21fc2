//! Ordered, encrypted-name containers of entries.
//!
//! Entry order is display order. Index contracts are half-open `[0, len)`
//! for access and removal, and `[0, len]` for insertion points; removal
//! compacts, never leaving gaps or tombstones.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::Entry;
use vaultkeep_common::{Error, Result, SecretString};
use vaultkeep_crypto::{decrypt_field, encrypt_field, CipherText, VaultKey};

/// Stable folder identity.
///
/// The default folder is tracked by this id rather than by position, so
/// reordering folders never changes which one is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(Uuid);

impl FolderId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds check for access and removal: valid indices are `[0, len)`.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// Bounds check for insertion points: valid indices are `[0, len]`.
pub(crate) fn check_insertion_index(index: usize, len: usize) -> Result<()> {
    if index > len {
        return Err(Error::IndexOutOfRange { index, len });
    }
    Ok(())
}

/// An ordered, named container of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    id: FolderId,
    name: CipherText,
    entries: Vec<Entry>,
}

impl Folder {
    /// Create an empty folder with an encrypted name and a fresh id.
    pub fn new(name: &str, key: &VaultKey) -> Result<Self> {
        Ok(Self {
            id: FolderId::new(),
            name: encrypt_field(name, key)?,
            entries: Vec::new(),
        })
    }

    /// The folder's stable identity.
    pub fn id(&self) -> FolderId {
        self.id
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the folder holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decrypt the folder name.
    pub fn name(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.name, key)
    }

    /// Replace the folder name.
    pub fn rename(&mut self, name: &str, key: &VaultKey) -> Result<()> {
        self.name = encrypt_field(name, key)?;
        Ok(())
    }

    /// Get the entry at `index`.
    pub fn entry(&self, index: usize) -> Result<&Entry> {
        check_index(index, self.entries.len())?;
        Ok(&self.entries[index])
    }

    /// Get the entry at `index` mutably.
    pub fn entry_mut(&mut self, index: usize) -> Result<&mut Entry> {
        check_index(index, self.entries.len())?;
        Ok(&mut self.entries[index])
    }

    /// Append an entry.
    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Insert an entry at `index`; insertion at `len` is an append.
    pub fn insert_entry(&mut self, entry: Entry, index: usize) -> Result<()> {
        check_insertion_index(index, self.entries.len())?;
        self.entries.insert(index, entry);
        Ok(())
    }

    /// Remove and return the entry at `index`, compacting the sequence.
    pub fn remove_entry(&mut self, index: usize) -> Result<Entry> {
        check_index(index, self.entries.len())?;
        Ok(self.entries.remove(index))
    }

    /// Relocate an entry within this folder.
    ///
    /// Both indices are checked against the pre-move size. Implemented as
    /// remove-then-insert; the entry's identity and ciphertext are
    /// unchanged.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        check_index(from, len)?;
        check_index(to, len)?;

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Find the first entry whose decrypted name matches `name`
    /// case-insensitively.
    ///
    /// # Errors
    /// Decryption failures propagate; a corrupted entry name must not be
    /// silently skipped over.
    pub fn find_entry(&self, name: &str, key: &VaultKey) -> Result<Option<usize>> {
        let wanted = name.to_lowercase();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.name(key)?.expose().to_lowercase() == wanted {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Iterate over entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Take every entry out of this folder, used when entries migrate to
    /// the default folder before removal.
    pub(crate) fn drain_entries(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.entries)
    }

    /// Re-encrypt the folder name and every entry under a new key.
    pub(crate) fn reencrypt(&mut self, old_key: &VaultKey, new_key: &VaultKey) -> Result<()> {
        let name = decrypt_field(&self.name, old_key)?;
        self.name = encrypt_field(name.expose(), new_key)?;
        for entry in &mut self.entries {
            entry.reencrypt(old_key, new_key)?;
        }
        Ok(())
    }
}

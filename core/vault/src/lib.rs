//! Vault data model and durable storage for VaultKeep.
//!
//! This crate provides:
//! - The polymorphic entry hierarchy (logins, payment cards, SSH keys,
//!   secure notes) with per-field encryption
//! - Ordered folders with indexed CRUD and reordering
//! - The vault aggregate root: creation, password-verified opening,
//!   cross-folder operations, and atomic persistence to a single file
//!
//! # Architecture
//! The vault crate sits between the caller (an interactive shell or GUI,
//! out of scope here) and `vaultkeep-crypto`. Callers supply the master
//! password once to `Vault::create`/`Vault::open` and thread the returned
//! key through every subsequent call; the crate keeps no session state of
//! its own.

pub mod entry;
pub mod file;
pub mod folder;
pub mod vault;

pub use entry::{Entry, EntryKind, EntryView, FieldView, Login, PaymentCard, SecureNote, SshKey};
pub use file::{VaultHeader, VaultVersion};
pub use folder::{Folder, FolderId};
pub use vault::{Vault, DEFAULT_FOLDER_NAME};

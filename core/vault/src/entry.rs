//! Polymorphic secret records.
//!
//! An entry is a tagged union of the four record shapes a vault stores:
//! logins, payment cards, SSH keys, and secure notes. The discriminator is
//! carried through serialization as a `type` field, and every variant
//! shares an encrypted name and notes. Each field is encrypted on its own,
//! so corruption of one field never blocks decrypting the others.

use serde::{Deserialize, Serialize};

use vaultkeep_common::{Result, SecretString};
use vaultkeep_crypto::{decrypt_field, encrypt_field, CipherText, VaultKey};

/// Discriminator for the concrete entry shape, used for persistence and
/// for the caller's dispatch (e.g., which edit menu to show).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Login,
    PaymentCard,
    SshKey,
    SecureNote,
}

impl EntryKind {
    /// The discriminator string as stored in the vault file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::PaymentCard => "paymentCard",
            Self::SshKey => "sshKey",
            Self::SecureNote => "secureNote",
        }
    }
}

/// A website or application login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    name: CipherText,
    notes: CipherText,
    username: CipherText,
    password: CipherText,
    url: CipherText,
}

impl Login {
    /// Create a login entry, encrypting every field under `key`.
    pub fn new(
        name: &str,
        username: &str,
        password: &str,
        url: &str,
        notes: &str,
        key: &VaultKey,
    ) -> Result<Self> {
        Ok(Self {
            name: encrypt_field(name, key)?,
            notes: encrypt_field(notes, key)?,
            username: encrypt_field(username, key)?,
            password: encrypt_field(password, key)?,
            url: encrypt_field(url, key)?,
        })
    }

    pub fn username(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.username, key)
    }

    pub fn set_username(&mut self, username: &str, key: &VaultKey) -> Result<()> {
        self.username = encrypt_field(username, key)?;
        Ok(())
    }

    pub fn password(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.password, key)
    }

    pub fn set_password(&mut self, password: &str, key: &VaultKey) -> Result<()> {
        self.password = encrypt_field(password, key)?;
        Ok(())
    }

    pub fn url(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.url, key)
    }

    pub fn set_url(&mut self, url: &str, key: &VaultKey) -> Result<()> {
        self.url = encrypt_field(url, key)?;
        Ok(())
    }
}

/// A payment card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCard {
    name: CipherText,
    notes: CipherText,
    cardholder_name: CipherText,
    card_number: CipherText,
    brand: CipherText,
    expire_date: CipherText,
    security_code: CipherText,
}

impl PaymentCard {
    /// Create a payment-card entry, encrypting every field under `key`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        cardholder_name: &str,
        card_number: &str,
        brand: &str,
        expire_date: &str,
        security_code: &str,
        notes: &str,
        key: &VaultKey,
    ) -> Result<Self> {
        Ok(Self {
            name: encrypt_field(name, key)?,
            notes: encrypt_field(notes, key)?,
            cardholder_name: encrypt_field(cardholder_name, key)?,
            card_number: encrypt_field(card_number, key)?,
            brand: encrypt_field(brand, key)?,
            expire_date: encrypt_field(expire_date, key)?,
            security_code: encrypt_field(security_code, key)?,
        })
    }

    pub fn cardholder_name(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.cardholder_name, key)
    }

    pub fn set_cardholder_name(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.cardholder_name = encrypt_field(value, key)?;
        Ok(())
    }

    pub fn card_number(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.card_number, key)
    }

    pub fn set_card_number(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.card_number = encrypt_field(value, key)?;
        Ok(())
    }

    pub fn brand(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.brand, key)
    }

    pub fn set_brand(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.brand = encrypt_field(value, key)?;
        Ok(())
    }

    pub fn expire_date(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.expire_date, key)
    }

    pub fn set_expire_date(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.expire_date = encrypt_field(value, key)?;
        Ok(())
    }

    pub fn security_code(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.security_code, key)
    }

    pub fn set_security_code(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.security_code = encrypt_field(value, key)?;
        Ok(())
    }
}

/// An SSH key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    name: CipherText,
    notes: CipherText,
    private_key: CipherText,
    public_key: CipherText,
    fingerprint: CipherText,
}

impl SshKey {
    /// Create an SSH-key entry, encrypting every field under `key`.
    pub fn new(
        name: &str,
        private_key: &str,
        public_key: &str,
        fingerprint: &str,
        notes: &str,
        key: &VaultKey,
    ) -> Result<Self> {
        Ok(Self {
            name: encrypt_field(name, key)?,
            notes: encrypt_field(notes, key)?,
            private_key: encrypt_field(private_key, key)?,
            public_key: encrypt_field(public_key, key)?,
            fingerprint: encrypt_field(fingerprint, key)?,
        })
    }

    pub fn private_key(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.private_key, key)
    }

    pub fn set_private_key(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.private_key = encrypt_field(value, key)?;
        Ok(())
    }

    pub fn public_key(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.public_key, key)
    }

    pub fn set_public_key(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.public_key = encrypt_field(value, key)?;
        Ok(())
    }

    pub fn fingerprint(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(&self.fingerprint, key)
    }

    pub fn set_fingerprint(&mut self, value: &str, key: &VaultKey) -> Result<()> {
        self.fingerprint = encrypt_field(value, key)?;
        Ok(())
    }
}

/// A free-form secure note; holds nothing beyond the common fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureNote {
    name: CipherText,
    notes: CipherText,
}

impl SecureNote {
    /// Create a secure note, encrypting both fields under `key`.
    pub fn new(name: &str, notes: &str, key: &VaultKey) -> Result<Self> {
        Ok(Self {
            name: encrypt_field(name, key)?,
            notes: encrypt_field(notes, key)?,
        })
    }
}

/// A secret record in a folder.
///
/// The variant is fixed at creation; fields can be replaced but never
/// added or removed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Entry {
    Login(Login),
    PaymentCard(PaymentCard),
    SshKey(SshKey),
    SecureNote(SecureNote),
}

impl Entry {
    /// The concrete shape of this entry.
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Login(_) => EntryKind::Login,
            Self::PaymentCard(_) => EntryKind::PaymentCard,
            Self::SshKey(_) => EntryKind::SshKey,
            Self::SecureNote(_) => EntryKind::SecureNote,
        }
    }

    fn name_field(&self) -> &CipherText {
        match self {
            Self::Login(e) => &e.name,
            Self::PaymentCard(e) => &e.name,
            Self::SshKey(e) => &e.name,
            Self::SecureNote(e) => &e.name,
        }
    }

    fn name_field_mut(&mut self) -> &mut CipherText {
        match self {
            Self::Login(e) => &mut e.name,
            Self::PaymentCard(e) => &mut e.name,
            Self::SshKey(e) => &mut e.name,
            Self::SecureNote(e) => &mut e.name,
        }
    }

    fn notes_field(&self) -> &CipherText {
        match self {
            Self::Login(e) => &e.notes,
            Self::PaymentCard(e) => &e.notes,
            Self::SshKey(e) => &e.notes,
            Self::SecureNote(e) => &e.notes,
        }
    }

    fn notes_field_mut(&mut self) -> &mut CipherText {
        match self {
            Self::Login(e) => &mut e.notes,
            Self::PaymentCard(e) => &mut e.notes,
            Self::SshKey(e) => &mut e.notes,
            Self::SecureNote(e) => &mut e.notes,
        }
    }

    /// Decrypt this entry's name.
    pub fn name(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(self.name_field(), key)
    }

    /// Replace this entry's name.
    pub fn set_name(&mut self, name: &str, key: &VaultKey) -> Result<()> {
        *self.name_field_mut() = encrypt_field(name, key)?;
        Ok(())
    }

    /// Decrypt this entry's notes.
    pub fn notes(&self, key: &VaultKey) -> Result<SecretString> {
        decrypt_field(self.notes_field(), key)
    }

    /// Replace this entry's notes.
    pub fn set_notes(&mut self, notes: &str, key: &VaultKey) -> Result<()> {
        *self.notes_field_mut() = encrypt_field(notes, key)?;
        Ok(())
    }

    /// Borrow the login variant, if this is one.
    pub fn as_login(&self) -> Option<&Login> {
        match self {
            Self::Login(e) => Some(e),
            _ => None,
        }
    }

    /// Mutably borrow the login variant, if this is one.
    pub fn as_login_mut(&mut self) -> Option<&mut Login> {
        match self {
            Self::Login(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the payment-card variant, if this is one.
    pub fn as_payment_card(&self) -> Option<&PaymentCard> {
        match self {
            Self::PaymentCard(e) => Some(e),
            _ => None,
        }
    }

    /// Mutably borrow the payment-card variant, if this is one.
    pub fn as_payment_card_mut(&mut self) -> Option<&mut PaymentCard> {
        match self {
            Self::PaymentCard(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the SSH-key variant, if this is one.
    pub fn as_ssh_key(&self) -> Option<&SshKey> {
        match self {
            Self::SshKey(e) => Some(e),
            _ => None,
        }
    }

    /// Mutably borrow the SSH-key variant, if this is one.
    pub fn as_ssh_key_mut(&mut self) -> Option<&mut SshKey> {
        match self {
            Self::SshKey(e) => Some(e),
            _ => None,
        }
    }

    /// Decrypt every field into a structured record for read-only
    /// presentation. The core never prints; rendering belongs to the
    /// caller.
    pub fn display(&self, key: &VaultKey) -> Result<EntryView> {
        let mut fields = Vec::new();

        match self {
            Self::Login(e) => {
                fields.push(FieldView::new("username", decrypt_field(&e.username, key)?));
                fields.push(FieldView::new("password", decrypt_field(&e.password, key)?));
                fields.push(FieldView::new("url", decrypt_field(&e.url, key)?));
            }
            Self::PaymentCard(e) => {
                fields.push(FieldView::new(
                    "cardholderName",
                    decrypt_field(&e.cardholder_name, key)?,
                ));
                fields.push(FieldView::new(
                    "cardNumber",
                    decrypt_field(&e.card_number, key)?,
                ));
                fields.push(FieldView::new("brand", decrypt_field(&e.brand, key)?));
                fields.push(FieldView::new(
                    "expireDate",
                    decrypt_field(&e.expire_date, key)?,
                ));
                fields.push(FieldView::new(
                    "securityCode",
                    decrypt_field(&e.security_code, key)?,
                ));
            }
            Self::SshKey(e) => {
                fields.push(FieldView::new(
                    "privateKey",
                    decrypt_field(&e.private_key, key)?,
                ));
                fields.push(FieldView::new(
                    "publicKey",
                    decrypt_field(&e.public_key, key)?,
                ));
                fields.push(FieldView::new(
                    "fingerprint",
                    decrypt_field(&e.fingerprint, key)?,
                ));
            }
            Self::SecureNote(_) => {}
        }

        Ok(EntryView {
            kind: self.kind(),
            name: self.name(key)?,
            notes: self.notes(key)?,
            fields,
        })
    }

    /// Re-encrypt every field under a new key, used when the master
    /// password changes. Ciphertext is replaced in place; a failure on any
    /// field surfaces before the vault header is switched over.
    pub(crate) fn reencrypt(&mut self, old_key: &VaultKey, new_key: &VaultKey) -> Result<()> {
        match self {
            Self::Login(e) => {
                recrypt(&mut e.name, old_key, new_key)?;
                recrypt(&mut e.notes, old_key, new_key)?;
                recrypt(&mut e.username, old_key, new_key)?;
                recrypt(&mut e.password, old_key, new_key)?;
                recrypt(&mut e.url, old_key, new_key)?;
            }
            Self::PaymentCard(e) => {
                recrypt(&mut e.name, old_key, new_key)?;
                recrypt(&mut e.notes, old_key, new_key)?;
                recrypt(&mut e.cardholder_name, old_key, new_key)?;
                recrypt(&mut e.card_number, old_key, new_key)?;
                recrypt(&mut e.brand, old_key, new_key)?;
                recrypt(&mut e.expire_date, old_key, new_key)?;
                recrypt(&mut e.security_code, old_key, new_key)?;
            }
            Self::SshKey(e) => {
                recrypt(&mut e.name, old_key, new_key)?;
                recrypt(&mut e.notes, old_key, new_key)?;
                recrypt(&mut e.private_key, old_key, new_key)?;
                recrypt(&mut e.public_key, old_key, new_key)?;
                recrypt(&mut e.fingerprint, old_key, new_key)?;
            }
            Self::SecureNote(e) => {
                recrypt(&mut e.name, old_key, new_key)?;
                recrypt(&mut e.notes, old_key, new_key)?;
            }
        }
        Ok(())
    }
}

fn recrypt(field: &mut CipherText, old_key: &VaultKey, new_key: &VaultKey) -> Result<()> {
    let plaintext = decrypt_field(field, old_key)?;
    *field = encrypt_field(plaintext.expose(), new_key)?;
    Ok(())
}

impl From<Login> for Entry {
    fn from(e: Login) -> Self {
        Self::Login(e)
    }
}

impl From<PaymentCard> for Entry {
    fn from(e: PaymentCard) -> Self {
        Self::PaymentCard(e)
    }
}

impl From<SshKey> for Entry {
    fn from(e: SshKey) -> Self {
        Self::SshKey(e)
    }
}

impl From<SecureNote> for Entry {
    fn from(e: SecureNote) -> Self {
        Self::SecureNote(e)
    }
}

/// One decrypted variant-specific field for presentation.
#[derive(Debug)]
pub struct FieldView {
    pub label: &'static str,
    pub value: SecretString,
}

impl FieldView {
    fn new(label: &'static str, value: SecretString) -> Self {
        Self { label, value }
    }
}

/// A fully decrypted entry for read-only presentation.
#[derive(Debug)]
pub struct EntryView {
    pub kind: EntryKind,
    pub name: SecretString,
    pub notes: SecretString,
    pub fields: Vec<FieldView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultkeep_crypto::KEY_LENGTH;

    fn test_key() -> VaultKey {
        VaultKey::from_bytes([7u8; KEY_LENGTH])
    }

    #[test]
    fn test_login_fields_roundtrip() {
        let key = test_key();
        let login = Login::new("github", "alice", "p@ss", "github.com", "work acct", &key).unwrap();

        assert_eq!(login.username(&key).unwrap().expose(), "alice");
        assert_eq!(login.password(&key).unwrap().expose(), "p@ss");
        assert_eq!(login.url(&key).unwrap().expose(), "github.com");

        let entry = Entry::from(login);
        assert_eq!(entry.kind(), EntryKind::Login);
        assert_eq!(entry.name(&key).unwrap().expose(), "github");
        assert_eq!(entry.notes(&key).unwrap().expose(), "work acct");
    }

    #[test]
    fn test_set_field_replaces_ciphertext() {
        let key = test_key();
        let mut login = Login::new("github", "alice", "old", "github.com", "", &key).unwrap();

        login.set_password("new", &key).unwrap();
        assert_eq!(login.password(&key).unwrap().expose(), "new");
    }

    #[test]
    fn test_payment_card_roundtrip() {
        let key = test_key();
        let card = PaymentCard::new(
            "visa", "Alice B", "4111111111111111", "Visa", "12/27", "123", "", &key,
        )
        .unwrap();

        assert_eq!(card.cardholder_name(&key).unwrap().expose(), "Alice B");
        assert_eq!(card.card_number(&key).unwrap().expose(), "4111111111111111");
        assert_eq!(card.brand(&key).unwrap().expose(), "Visa");
        assert_eq!(card.expire_date(&key).unwrap().expose(), "12/27");
        assert_eq!(card.security_code(&key).unwrap().expose(), "123");
    }

    #[test]
    fn test_ssh_key_roundtrip() {
        let key = test_key();
        let ssh = SshKey::new("server", "PRIVATE", "ssh-ed25519 AAAA", "SHA256:abcd", "", &key)
            .unwrap();

        assert_eq!(ssh.private_key(&key).unwrap().expose(), "PRIVATE");
        assert_eq!(ssh.public_key(&key).unwrap().expose(), "ssh-ed25519 AAAA");
        assert_eq!(ssh.fingerprint(&key).unwrap().expose(), "SHA256:abcd");
    }

    #[test]
    fn test_discriminators_in_serialized_form() {
        let key = test_key();
        let cases: Vec<(Entry, &str)> = vec![
            (
                Login::new("a", "b", "c", "d", "e", &key).unwrap().into(),
                "login",
            ),
            (
                PaymentCard::new("a", "b", "c", "d", "e", "f", "g", &key)
                    .unwrap()
                    .into(),
                "paymentCard",
            ),
            (
                SshKey::new("a", "b", "c", "d", "e", &key).unwrap().into(),
                "sshKey",
            ),
            (SecureNote::new("a", "b", &key).unwrap().into(), "secureNote"),
        ];

        for (entry, expected) in cases {
            assert_eq!(entry.kind().as_str(), expected);
            let json = serde_json::to_value(&entry).unwrap();
            assert_eq!(json["type"], expected);
        }
    }

    #[test]
    fn test_unknown_discriminator_rejected() {
        let json = r#"{"type":"totpSeed","name":"x","notes":"y"}"#;
        assert!(serde_json::from_str::<Entry>(json).is_err());
    }

    #[test]
    fn test_display_collects_variant_fields() {
        let key = test_key();
        let entry: Entry = Login::new("github", "alice", "p@ss", "github.com", "", &key)
            .unwrap()
            .into();

        let view = entry.display(&key).unwrap();
        assert_eq!(view.kind, EntryKind::Login);
        assert_eq!(view.name.expose(), "github");
        assert_eq!(view.fields.len(), 3);
        assert_eq!(view.fields[0].label, "username");
        assert_eq!(view.fields[0].value.expose(), "alice");
    }

    #[test]
    fn test_reencrypt_moves_entry_to_new_key() {
        let old_key = test_key();
        let new_key = VaultKey::from_bytes([9u8; KEY_LENGTH]);
        let mut entry: Entry = Login::new("github", "alice", "p@ss", "github.com", "n", &old_key)
            .unwrap()
            .into();

        entry.reencrypt(&old_key, &new_key).unwrap();

        assert!(entry.name(&old_key).is_err());
        assert_eq!(entry.name(&new_key).unwrap().expose(), "github");
        assert_eq!(
            entry.as_login().unwrap().password(&new_key).unwrap().expose(),
            "p@ss"
        );
    }

    #[test]
    fn test_corrupt_field_does_not_block_others() {
        let key = test_key();
        let mut entry: Entry = Login::new("github", "alice", "p@ss", "github.com", "", &key)
            .unwrap()
            .into();

        // Corrupt only the password ciphertext.
        if let Entry::Login(login) = &mut entry {
            login.password = vaultkeep_crypto::encrypt_field("x", &VaultKey::from_bytes([1u8; KEY_LENGTH])).unwrap();
        }

        assert!(entry.as_login().unwrap().password(&key).is_err());
        assert_eq!(entry.name(&key).unwrap().expose(), "github");
        assert_eq!(
            entry.as_login().unwrap().username(&key).unwrap().expose(),
            "alice"
        );
    }
}

//! Domain records persisted by the vault.
//!
//! Metadata and payload travel as separate records so listings never touch
//! payload ciphertext. All records serialize to CBOR before encryption; see
//! the field docs for which values the engine fills in on write.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

/// Unique identifier of a vault record.
///
/// Generated as a hyphenated UUID v4 string; the UTF-8 bytes of that string
/// are the record's bucket key. Ids imported from elsewhere (for example a
/// sync peer) are kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the bucket key bytes of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl AsRef<[u8]> for RecordId {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Classification of an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Login credentials.
    #[default]
    Login,
    /// Free-form secure note.
    SecureNote,
}

/// Classification of a single field within an item payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Plain text, such as a username.
    #[default]
    Text,
    /// Sensitive value, such as a password.
    Secret,
    /// Web address.
    Url,
    /// Long-form note body.
    Note,
}

/// One field of an item payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Position of the field within the item.
    pub order: i32,
    /// Label shown next to the value.
    pub title: String,
    /// Field classification.
    pub kind: FieldKind,
    /// Field content. Call [`ItemData::wipe`] once the value is no longer
    /// needed in memory.
    pub value: Vec<u8>,
}

/// Decrypted payload of an item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Ordered fields of the item.
    pub fields: Vec<Field>,
}

impl ItemData {
    /// Overwrites every field value with zeros and empties it.
    pub fn wipe(&mut self) {
        for field in &mut self.fields {
            field.value.zeroize();
        }
    }
}

/// Metadata of a stored item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMeta {
    /// Record id. Leave `None` on first put; the vault assigns one.
    pub id: Option<RecordId>,
    /// Creation time in Unix seconds. Leave `0` on first put; the vault
    /// stamps it and keeps it immutable afterwards.
    pub created_at: i64,
    /// Last mutation time in Unix seconds. The vault refreshes this on
    /// every put.
    pub updated_at: i64,
    /// Title shown in listings.
    pub title: String,
    /// Item classification.
    pub kind: ItemKind,
    /// Soft-delete marker. Set by delete, reclaimed by vacuum.
    pub deleted: bool,
    /// Ids of attachments that belong to this item.
    pub attachment_ids: Vec<RecordId>,
}

/// Metadata of a stored attachment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    /// Record id. Leave `None` on first put; the vault assigns one.
    pub id: Option<RecordId>,
    /// Creation time in Unix seconds. Leave `0` on first put.
    pub created_at: i64,
    /// Last mutation time in Unix seconds, refreshed on every put.
    pub updated_at: i64,
    /// Original file name. Must not be blank.
    pub file_name: String,
    /// Plaintext size in bytes. The vault derives this from the payload.
    pub file_size: u64,
    /// Soft-delete marker. Set by delete, reclaimed by vacuum.
    pub deleted: bool,
}

/// Wrapped master key and the salt bound to its wrapping.
///
/// Stored as plain CBOR in the settings bucket: `master_key_encrypted` is
/// already AEAD ciphertext, so the record needs no second layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Master key wrapped under the password-derived key.
    pub master_key_encrypted: Vec<u8>,
    /// Salt consumed by the wrapping derivation.
    pub salt: Vec<u8>,
    /// Time the record was last written, in Unix seconds.
    pub updated_at: i64,
}

/// Remote sync endpoint configuration.
///
/// A single optional record, stored encrypted in the settings bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncServerConfig {
    /// Server base URL.
    pub url: String,
    /// Account name on the server.
    pub username: String,
    /// Opaque refresh token issued by the server.
    pub refresh_token: Vec<u8>,
    /// Time of the last completed synchronization in Unix seconds, `0` if
    /// never synced.
    pub last_synced_at: i64,
}

/// Sort order for item listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

/// Stable-sorts item metadata by creation time.
pub fn sort_by_created_at(items: &mut [ItemMeta], direction: SortDirection) {
    match direction {
        SortDirection::Asc => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortDirection::Desc => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

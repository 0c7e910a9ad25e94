#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! Encrypted local vault engine for secrets-manager clients.
//!
//! The vault keeps items, file attachments and settings in a single local
//! database file. Every payload is sealed under a 32-byte master key; the
//! master key is wrapped under a key derived from the master password and a
//! salt, and only the wrapped form ever touches the disk. Unlocking unwraps
//! the master key into guarded memory, locking zeroizes it.
//!
//! Deletion is a two-step affair: [`Vault::item_delete`] and
//! [`Vault::attachment_delete`] replace a record with a tombstone and
//! overwrite its payload ciphertext, and [`Vault::vacuum`] later reclaims
//! the tombstones. Tombstones survive until then so a sync layer can
//! propagate deletions.
//!
//! ```no_run
//! use vaultkit_core::{AesGcmCrypto, ItemData, ItemMeta, Vault};
//!
//! # fn main() -> Result<(), vaultkit_core::VaultError> {
//! let mut vault = Vault::open("secrets.vault", Box::new(AesGcmCrypto::new()))?;
//! vault.keys_generate_new(b"master password")?;
//! vault.unlock(b"master password")?;
//!
//! let meta = vault.item_put(
//!     ItemMeta {
//!         title: "Mail account".to_owned(),
//!         ..ItemMeta::default()
//!     },
//!     &ItemData::default(),
//! )?;
//! println!("stored item {}", meta.id.as_ref().map_or("?", |id| id.as_str()));
//!
//! vault.close()?;
//! # Ok(())
//! # }
//! ```

mod clock;
mod codec;
pub mod crypto;
mod error;
mod records;
mod secret;
mod vault;

pub use clock::{Clock, SystemClock};
pub use crypto::{AesGcmCrypto, CryptoError, CryptoProvider, KEY_LEN, SALT_LEN};
pub use error::{VaultError, VaultResult};
pub use records::{
    sort_by_created_at, AttachmentMeta, Field, FieldKind, ItemData, ItemKind, ItemMeta, KeyRecord,
    RecordId, SortDirection, SyncServerConfig,
};
pub use vault::Vault;

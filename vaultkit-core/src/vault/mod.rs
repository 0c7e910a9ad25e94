//! The vault engine: lifecycle, transactions, and record encryption.

mod attachments;
mod items;
mod keys;
mod migration;
mod sync_server;

use std::fmt;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use vaultkit_store::{Bucket, BucketRead, Store, WriteTxn};

use crate::clock::{Clock, SystemClock};
use crate::codec;
use crate::crypto::CryptoProvider;
use crate::error::{VaultError, VaultResult};
use crate::secret::KeyHolder;

/// Encrypted vault over a single local database file.
///
/// All payloads are sealed under a master key that never touches the disk
/// unwrapped; the key itself is wrapped under the master password and stored
/// alongside the data. A vault opens locked. Reads take `&self`, mutations
/// take `&mut self`, and [`Vault::close`] consumes the vault, so a closed
/// handle cannot be used by construction.
pub struct Vault {
    store: Store,
    keys: KeyHolder,
    clock: Box<dyn Clock>,
}

impl Vault {
    /// Opens (or creates) the vault at `path` using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Open`] when the database cannot be opened and
    /// [`VaultError::Migrate`] / [`VaultError::UnsupportedVersion`] when the
    /// schema cannot be brought up.
    pub fn open(path: impl AsRef<Path>, provider: Box<dyn CryptoProvider>) -> VaultResult<Self> {
        Self::open_with_clock(path, provider, Box::new(SystemClock))
    }

    /// Opens (or creates) the vault at `path` with an injected clock.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Vault::open`].
    pub fn open_with_clock(
        path: impl AsRef<Path>,
        provider: Box<dyn CryptoProvider>,
        clock: Box<dyn Clock>,
    ) -> VaultResult<Self> {
        let store = Store::open(path.as_ref()).map_err(VaultError::Open)?;
        Self::from_store(store, provider, clock)
    }

    /// Opens an ephemeral in-memory vault. Contents vanish on close.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Vault::open`].
    pub fn open_in_memory(
        provider: Box<dyn CryptoProvider>,
        clock: Box<dyn Clock>,
    ) -> VaultResult<Self> {
        let store = Store::open_in_memory().map_err(VaultError::Open)?;
        Self::from_store(store, provider, clock)
    }

    fn from_store(
        store: Store,
        provider: Box<dyn CryptoProvider>,
        clock: Box<dyn Clock>,
    ) -> VaultResult<Self> {
        let mut vault = Self {
            store,
            keys: KeyHolder::new(provider),
            clock,
        };
        vault.migrate()?;
        Ok(vault)
    }

    /// Returns `true` while no master key is held in memory.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.keys.is_locked()
    }

    /// Locks the vault, zeroizing the held master key. Idempotent.
    pub fn lock(&mut self) {
        self.keys.lock();
        tracing::debug!("vault locked");
    }

    /// Unlocks the vault by unwrapping the stored master key with
    /// `password`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when no keys were generated yet and
    /// [`VaultError::DecryptFailed`] for a wrong password or a tampered key
    /// record. The lock state is untouched on failure.
    pub fn unlock(&mut self, password: &[u8]) -> VaultResult<()> {
        let record = self.keys_get()?;
        let master_key = match self.keys.provider().decrypt_master_key(
            &record.master_key_encrypted,
            password,
            &record.salt,
        ) {
            Ok(master_key) => master_key,
            Err(_) => {
                tracing::warn!("vault unlock failed");
                return Err(VaultError::DecryptFailed);
            }
        };
        self.keys.install(&master_key)?;
        tracing::debug!("vault unlocked");
        Ok(())
    }

    /// Permanently removes every soft-deleted item and attachment.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] when the vault is locked, since
    /// deletion markers live inside encrypted metadata.
    pub fn vacuum(&mut self) -> VaultResult<()> {
        self.item_vacuum()?;
        self.attachment_vacuum()
    }

    /// Destroys every record, reinitializes the schema and locks the vault.
    ///
    /// After a purge the vault behaves like a freshly created one: no keys,
    /// no items, same file.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Write`] or [`VaultError::Migrate`] when the
    /// rebuild fails.
    pub fn purge(&mut self) -> VaultResult<()> {
        self.keys.lock();
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        for bucket in Bucket::ALL {
            txn.drop_bucket(bucket).map_err(VaultError::Write)?;
        }
        txn.commit().map_err(VaultError::Write)?;
        tracing::warn!("vault purged");
        self.migrate()
    }

    /// Locks the vault and closes the underlying store.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Close`] when the store does not shut down
    /// cleanly. The vault is consumed either way.
    pub fn close(mut self) -> VaultResult<()> {
        self.keys.lock();
        self.store.close().map_err(VaultError::Close)
    }
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Serializes, encrypts and stores one record.
fn put_record<T: Serialize>(
    keys: &KeyHolder,
    txn: &WriteTxn<'_>,
    bucket: Bucket,
    key: &[u8],
    record: &T,
) -> VaultResult<()> {
    let plaintext = codec::encode(record)?;
    let ciphertext = keys.encrypt(&plaintext)?;
    txn.put(bucket, key, &ciphertext).map_err(VaultError::Write)
}

/// Fetches, decrypts and deserializes one record.
fn get_record<T, R>(keys: &KeyHolder, txn: &R, bucket: Bucket, key: &[u8]) -> VaultResult<T>
where
    T: DeserializeOwned,
    R: BucketRead,
{
    let ciphertext = get_value(txn, bucket, key)?;
    let plaintext = Zeroizing::new(keys.decrypt(&ciphertext)?);
    codec::decode(&plaintext)
}

/// Raw bucket read mapped into the vault taxonomy.
fn get_value<R: BucketRead>(txn: &R, bucket: Bucket, key: &[u8]) -> VaultResult<Vec<u8>> {
    txn.get(bucket, key)
        .map_err(VaultError::Read)?
        .ok_or(VaultError::NotFound)
}

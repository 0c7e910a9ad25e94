//! Master-key lifecycle: generate, import, rotate, export.

use vaultkit_store::{Bucket, BucketRead};

use crate::codec;
use crate::error::{VaultError, VaultResult};
use crate::records::KeyRecord;

use super::{get_value, Vault};

/// Settings key carrying the key record, stored as plain CBOR. The wrapped
/// master key inside it is already ciphertext.
pub(crate) const KEY_VAULT_KEYS: &[u8] = b"vault_keys";

impl Vault {
    /// Generates a fresh master key and salt, wraps the key under
    /// `password` and persists the resulting key record. Leaves the vault
    /// locked; call [`Vault::unlock`] to start using the new key.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::AlreadyExists`] when keys are present. Use
    /// [`Vault::rotate_password`] to change the password or [`Vault::purge`]
    /// to start over. Also fails with [`VaultError::KeygenFailed`],
    /// [`VaultError::EncryptFailed`] or [`VaultError::Write`].
    pub fn keys_generate_new(&mut self, password: &[u8]) -> VaultResult<()> {
        if self.keys_exist() {
            return Err(VaultError::AlreadyExists);
        }
        let salt = self
            .keys
            .provider()
            .new_salt()
            .map_err(|_| VaultError::KeygenFailed)?;
        let master_key = self
            .keys
            .provider()
            .new_key()
            .map_err(|_| VaultError::KeygenFailed)?;
        let wrapped = self
            .keys
            .provider()
            .encrypt_master_key(&master_key, password, &salt)
            .map_err(|_| VaultError::EncryptFailed)?;
        let record = KeyRecord {
            master_key_encrypted: wrapped,
            salt,
            updated_at: self.clock.now_unix(),
        };
        self.persist_keys(&record)?;
        self.keys.lock();
        tracing::debug!("vault keys generated");
        Ok(())
    }

    /// Imports a key record produced elsewhere, for example by a sync peer.
    ///
    /// `password` must unwrap the incoming record. When the vault already
    /// has keys, it must be unlocked and the incoming master key must equal
    /// the held one; a vault without keys accepts any record that unwraps.
    /// The record is persisted verbatim, keeping the remote timestamp.
    /// Leaves the vault locked.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::DecryptFailed`] when `password` does not
    /// unwrap the record, [`VaultError::Locked`] when existing keys cannot
    /// be compared, and [`VaultError::MasterKeyMismatch`] when the incoming
    /// key differs from the held one.
    pub fn keys_replace(&mut self, password: &[u8], record: &KeyRecord) -> VaultResult<()> {
        let incoming = self
            .keys
            .provider()
            .decrypt_master_key(&record.master_key_encrypted, password, &record.salt)
            .map_err(|_| VaultError::DecryptFailed)?;
        if self.keys_exist() {
            if self.keys.is_locked() {
                return Err(VaultError::Locked);
            }
            if !self.keys.key_matches(&incoming)? {
                return Err(VaultError::MasterKeyMismatch);
            }
        }
        self.persist_keys(record)?;
        self.keys.lock();
        tracing::debug!("vault keys replaced");
        Ok(())
    }

    /// Returns the persisted key record, for example to hand to a sync
    /// peer. The master key inside stays wrapped.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when no keys were generated yet.
    pub fn keys_get(&self) -> VaultResult<KeyRecord> {
        let txn = self.store.read_txn().map_err(VaultError::Read)?;
        let raw = get_value(&txn, Bucket::Settings, KEY_VAULT_KEYS)?;
        codec::decode(&raw)
    }

    /// Returns `true` when a key record is persisted.
    #[must_use]
    pub fn keys_exist(&self) -> bool {
        self.store
            .read_txn()
            .and_then(|txn| txn.contains(Bucket::Settings, KEY_VAULT_KEYS))
            .unwrap_or(false)
    }

    /// Re-wraps the master key under `new_password` with a fresh salt. The
    /// master key itself does not change, so stored records stay readable.
    /// Runs in one transaction and locks the vault on success; a failed
    /// rotation changes neither the record nor the lock state.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when no keys exist and
    /// [`VaultError::DecryptFailed`] when `old_password` is wrong.
    pub fn rotate_password(&mut self, old_password: &[u8], new_password: &[u8]) -> VaultResult<()> {
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        let raw = get_value(&txn, Bucket::Settings, KEY_VAULT_KEYS)?;
        let record: KeyRecord = codec::decode(&raw)?;
        let master_key = self
            .keys
            .provider()
            .decrypt_master_key(&record.master_key_encrypted, old_password, &record.salt)
            .map_err(|_| VaultError::DecryptFailed)?;
        let salt = self
            .keys
            .provider()
            .new_salt()
            .map_err(|_| VaultError::KeygenFailed)?;
        let wrapped = self
            .keys
            .provider()
            .encrypt_master_key(&master_key, new_password, &salt)
            .map_err(|_| VaultError::EncryptFailed)?;
        let rotated = KeyRecord {
            master_key_encrypted: wrapped,
            salt,
            updated_at: self.clock.now_unix(),
        };
        let bytes = codec::encode(&rotated)?;
        txn.put(Bucket::Settings, KEY_VAULT_KEYS, &bytes)
            .map_err(VaultError::Write)?;
        txn.commit().map_err(VaultError::Write)?;
        self.keys.lock();
        tracing::debug!("vault password rotated");
        Ok(())
    }

    fn persist_keys(&mut self, record: &KeyRecord) -> VaultResult<()> {
        let bytes = codec::encode(record)?;
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        txn.put(Bucket::Settings, KEY_VAULT_KEYS, &bytes)
            .map_err(VaultError::Write)?;
        txn.commit().map_err(VaultError::Write)
    }
}

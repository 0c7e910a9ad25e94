//! Sync endpoint configuration, stored encrypted in the settings bucket.

use vaultkit_store::Bucket;

use crate::error::{VaultError, VaultResult};
use crate::records::SyncServerConfig;

use super::{get_record, put_record, Vault};

/// Settings key carrying the sync-server record.
pub(crate) const KEY_SYNC_SERVER: &[u8] = b"sync_server";

impl Vault {
    /// Returns the sync-server configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when no configuration was stored
    /// and [`VaultError::Locked`] when the vault is locked.
    pub fn sync_server_get(&self) -> VaultResult<SyncServerConfig> {
        let txn = self.store.read_txn().map_err(VaultError::Read)?;
        get_record(&self.keys, &txn, Bucket::Settings, KEY_SYNC_SERVER)
    }

    /// Stores the sync-server configuration, replacing any previous one.
    /// The record is encrypted like any other payload since it carries a
    /// token and an account name.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] when the vault is locked.
    pub fn sync_server_set(&mut self, config: &SyncServerConfig) -> VaultResult<()> {
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        put_record(&self.keys, &txn, Bucket::Settings, KEY_SYNC_SERVER, config)?;
        txn.commit().map_err(VaultError::Write)?;
        tracing::debug!("sync server configured");
        Ok(())
    }

    /// Removes the sync-server configuration. Succeeds when none is stored,
    /// and works on a locked vault since nothing is decrypted.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Write`] when the store rejects the delete.
    pub fn sync_server_purge(&mut self) -> VaultResult<()> {
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        txn.delete(Bucket::Settings, KEY_SYNC_SERVER)
            .map_err(VaultError::Write)?;
        txn.commit().map_err(VaultError::Write)?;
        tracing::debug!("sync server configuration removed");
        Ok(())
    }
}

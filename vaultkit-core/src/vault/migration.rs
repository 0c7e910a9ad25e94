//! Schema creation and version gating.

use vaultkit_store::{Bucket, BucketRead};

use crate::error::{VaultError, VaultResult};

use super::Vault;

/// The only schema version this build reads and writes.
pub(crate) const SCHEMA_VERSION: &str = "1.0.0";

/// Settings key carrying the schema version, stored as raw UTF-8.
pub(crate) const KEY_SCHEMA_VERSION: &[u8] = b"db_version";

impl Vault {
    /// Creates missing buckets and validates the stored schema version,
    /// stamping it on first open. Runs in one transaction, so a version
    /// mismatch leaves the file untouched.
    pub(crate) fn migrate(&mut self) -> VaultResult<()> {
        let txn = self.store.write_txn().map_err(VaultError::Migrate)?;
        for bucket in Bucket::ALL {
            txn.create_bucket(bucket).map_err(VaultError::Migrate)?;
        }
        let version = match txn
            .get(Bucket::Settings, KEY_SCHEMA_VERSION)
            .map_err(VaultError::Migrate)?
        {
            Some(raw) => String::from_utf8_lossy(&raw).into_owned(),
            None => {
                txn.put(Bucket::Settings, KEY_SCHEMA_VERSION, SCHEMA_VERSION.as_bytes())
                    .map_err(VaultError::Migrate)?;
                SCHEMA_VERSION.to_owned()
            }
        };
        if version != SCHEMA_VERSION {
            return Err(VaultError::UnsupportedVersion {
                found: version,
                expected: SCHEMA_VERSION,
            });
        }
        txn.commit().map_err(VaultError::Migrate)?;
        tracing::debug!(version = SCHEMA_VERSION, "vault schema ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vaultkit_store::Store;

    use super::super::test_support::open_vault;
    use super::*;
    use crate::clock::test_support::FixedClock;
    use crate::crypto::AesGcmCrypto;

    #[test]
    fn test_open_stamps_schema_version() {
        let clock = FixedClock::at(12_345);
        let vault = open_vault(&clock);
        let txn = vault.store.read_txn().expect("read txn");
        let raw = txn
            .get(Bucket::Settings, KEY_SCHEMA_VERSION)
            .expect("read version")
            .expect("version present");
        assert_eq!(raw, SCHEMA_VERSION.as_bytes());
    }

    #[test]
    fn test_open_rejects_unsupported_version() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("vault.sqlite");

        {
            let mut store = Store::open(&path).expect("open store");
            let txn = store.write_txn().expect("write txn");
            txn.create_bucket(Bucket::Settings).expect("create bucket");
            txn.put(Bucket::Settings, KEY_SCHEMA_VERSION, b"9.9.9")
                .expect("stamp future version");
            txn.commit().expect("commit");
            store.close().expect("close store");
        }

        let err = Vault::open(&path, Box::new(AesGcmCrypto::new()))
            .expect_err("future version must be rejected");
        match err {
            VaultError::UnsupportedVersion { found, expected } => {
                assert_eq!(found, "9.9.9");
                assert_eq!(expected, SCHEMA_VERSION);
            }
            _ => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn test_reopen_keeps_version() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("vault.sqlite");

        let vault = Vault::open(&path, Box::new(AesGcmCrypto::new())).expect("create");
        vault.close().expect("close");
        let vault = Vault::open(&path, Box::new(AesGcmCrypto::new())).expect("reopen");
        vault.close().expect("close again");
    }
}

//! Database handle and bucket naming.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use crate::error::{StoreError, StoreResult};
use crate::transaction::{ReadTxn, WriteTxn};

/// Named key/value buckets of the store.
///
/// Every bucket maps to one SQLite table with a `BLOB` primary key and a
/// `BLOB` value. Buckets are created by [`WriteTxn::create_bucket`] and the
/// set is fixed at compile time, so table names never come from user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Item metadata records.
    ItemsMeta,
    /// Item payload records.
    ItemsData,
    /// Attachment metadata records.
    AttachmentsMeta,
    /// Attachment payload blobs.
    AttachmentsData,
    /// Engine settings and key material.
    Settings,
}

impl Bucket {
    /// Every bucket, in schema order.
    pub const ALL: [Self; 5] = [
        Self::ItemsMeta,
        Self::ItemsData,
        Self::AttachmentsMeta,
        Self::AttachmentsData,
        Self::Settings,
    ];

    pub(crate) const fn table(self) -> &'static str {
        match self {
            Self::ItemsMeta => "items_meta",
            Self::ItemsData => "items_data",
            Self::AttachmentsMeta => "attachments_meta",
            Self::AttachmentsData => "attachments_data",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Handle to a single store database.
///
/// Reads run through [`Store::read_txn`] and share the handle; writes run
/// through [`Store::write_txn`] and take exclusive access, so a writer can
/// never race another transaction on the same handle.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] when the file cannot be opened or the
    /// connection cannot be configured.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|err| StoreError::Open(err.to_string()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an ephemeral in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] when the connection cannot be created.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|err| StoreError::Open(err.to_string()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    /// Begins a read-only transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transaction`] when the transaction cannot start.
    pub fn read_txn(&self) -> StoreResult<ReadTxn<'_>> {
        ReadTxn::begin(&self.conn)
    }

    /// Begins a write transaction with an immediate lock.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transaction`] when the lock cannot be acquired.
    pub fn write_txn(&mut self) -> StoreResult<WriteTxn<'_>> {
        WriteTxn::begin(&mut self.conn)
    }

    /// Closes the database handle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Close`] when SQLite reports a failure while
    /// shutting the connection down.
    pub fn close(self) -> StoreResult<()> {
        self.conn
            .close()
            .map_err(|(_, err)| StoreError::Close(err.to_string()))
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

/// Durability and contention settings applied to every connection.
fn configure_connection(conn: &Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))
        .map_err(|err| StoreError::Open(err.to_string()))?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = FULL;",
    )
    .map_err(|err| StoreError::Open(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_create_and_reopen() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("store.sqlite");
        let store = Store::open(&path).expect("create store");
        store.close().expect("close store");
        let store = Store::open(&path).expect("reopen store");
        store.close().expect("close store again");
    }

    #[test]
    fn test_store_open_in_memory() {
        let store = Store::open_in_memory().expect("open in-memory store");
        store.close().expect("close in-memory store");
    }

    #[test]
    fn test_store_open_bad_path_fails() {
        let err = Store::open(Path::new("/nonexistent-dir/no/such/store.sqlite"))
            .expect_err("open must fail");
        match err {
            StoreError::Open(_) => {}
            _ => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn test_bucket_table_names() {
        assert_eq!(Bucket::ItemsMeta.table(), "items_meta");
        assert_eq!(Bucket::Settings.to_string(), "settings");
        assert_eq!(Bucket::ALL.len(), 5);
    }
}

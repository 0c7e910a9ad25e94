//! Scoped read and write transactions over the bucket tables.

use std::fmt;

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{StoreError, StoreResult};
use crate::store::Bucket;

/// Read operations shared by both transaction kinds.
pub trait BucketRead {
    /// Returns the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] when the query fails.
    fn get(&self, bucket: Bucket, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Returns `true` when `key` exists in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] when the query fails.
    fn contains(&self, bucket: Bucket, key: &[u8]) -> StoreResult<bool>;

    /// Invokes `f` for every key/value pair in `bucket`, in ascending key
    /// order. Iteration stops at the first error from `f`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] when the scan fails, or the error
    /// produced by `f`.
    fn for_each<F>(&self, bucket: Bucket, f: F) -> StoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> StoreResult<()>,
        Self: Sized;
}

/// Read-only transaction. Rolls back when dropped.
pub struct ReadTxn<'conn> {
    tx: Transaction<'conn>,
}

impl fmt::Debug for ReadTxn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadTxn").finish_non_exhaustive()
    }
}

impl<'conn> ReadTxn<'conn> {
    pub(crate) fn begin(conn: &'conn Connection) -> StoreResult<Self> {
        conn.unchecked_transaction()
            .map(|tx| Self { tx })
            .map_err(|err| StoreError::Transaction(err.to_string()))
    }
}

impl BucketRead for ReadTxn<'_> {
    fn get(&self, bucket: Bucket, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        get_value(&self.tx, bucket, key)
    }

    fn contains(&self, bucket: Bucket, key: &[u8]) -> StoreResult<bool> {
        contains_key(&self.tx, bucket, key)
    }

    fn for_each<F>(&self, bucket: Bucket, f: F) -> StoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> StoreResult<()>,
    {
        for_each_pair(&self.tx, bucket, f)
    }
}

/// Write transaction holding the database lock. Rolls back when dropped
/// without [`WriteTxn::commit`].
pub struct WriteTxn<'conn> {
    tx: Transaction<'conn>,
}

impl fmt::Debug for WriteTxn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteTxn").finish_non_exhaustive()
    }
}

impl<'conn> WriteTxn<'conn> {
    pub(crate) fn begin(conn: &'conn mut Connection) -> StoreResult<Self> {
        conn.transaction_with_behavior(TransactionBehavior::Immediate)
            .map(|tx| Self { tx })
            .map_err(|err| StoreError::Transaction(err.to_string()))
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the statement fails.
    pub fn put(&self, bucket: Bucket, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} (key, value) VALUES (?1, ?2)",
            bucket.table()
        );
        self.tx
            .execute(&sql, params![key, value])
            .map(|_| ())
            .map_err(|err| StoreError::Write(err.to_string()))
    }

    /// Removes `key` from `bucket`. Succeeds when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the statement fails.
    pub fn delete(&self, bucket: Bucket, key: &[u8]) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE key = ?1", bucket.table());
        self.tx
            .execute(&sql, params![key])
            .map(|_| ())
            .map_err(|err| StoreError::Write(err.to_string()))
    }

    /// Creates the table behind `bucket` when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the DDL fails.
    pub fn create_bucket(&self, bucket: Bucket) -> StoreResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                key   BLOB PRIMARY KEY,
                value BLOB NOT NULL
            ) WITHOUT ROWID",
            bucket.table()
        );
        self.tx
            .execute_batch(&sql)
            .map_err(|err| StoreError::Write(err.to_string()))
    }

    /// Drops the table behind `bucket` together with all of its content.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the DDL fails.
    pub fn drop_bucket(&self, bucket: Bucket) -> StoreResult<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", bucket.table());
        self.tx
            .execute_batch(&sql)
            .map_err(|err| StoreError::Write(err.to_string()))
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transaction`] when the commit fails.
    pub fn commit(self) -> StoreResult<()> {
        self.tx
            .commit()
            .map_err(|err| StoreError::Transaction(err.to_string()))
    }
}

impl BucketRead for WriteTxn<'_> {
    fn get(&self, bucket: Bucket, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        get_value(&self.tx, bucket, key)
    }

    fn contains(&self, bucket: Bucket, key: &[u8]) -> StoreResult<bool> {
        contains_key(&self.tx, bucket, key)
    }

    fn for_each<F>(&self, bucket: Bucket, f: F) -> StoreResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> StoreResult<()>,
    {
        for_each_pair(&self.tx, bucket, f)
    }
}

fn get_value(tx: &Transaction<'_>, bucket: Bucket, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
    let sql = format!("SELECT value FROM {} WHERE key = ?1", bucket.table());
    tx.query_row(&sql, params![key], |row| row.get(0))
        .optional()
        .map_err(|err| StoreError::Read(err.to_string()))
}

fn contains_key(tx: &Transaction<'_>, bucket: Bucket, key: &[u8]) -> StoreResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE key = ?1", bucket.table());
    tx.query_row(&sql, params![key], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
        .map_err(|err| StoreError::Read(err.to_string()))
}

fn for_each_pair<F>(tx: &Transaction<'_>, bucket: Bucket, mut f: F) -> StoreResult<()>
where
    F: FnMut(&[u8], &[u8]) -> StoreResult<()>,
{
    let sql = format!("SELECT key, value FROM {} ORDER BY key", bucket.table());
    let mut stmt = tx
        .prepare(&sql)
        .map_err(|err| StoreError::Read(err.to_string()))?;
    let mut rows = stmt
        .query([])
        .map_err(|err| StoreError::Read(err.to_string()))?;
    while let Some(row) = rows
        .next()
        .map_err(|err| StoreError::Read(err.to_string()))?
    {
        let key: Vec<u8> = row
            .get(0)
            .map_err(|err| StoreError::Read(err.to_string()))?;
        let value: Vec<u8> = row
            .get(1)
            .map_err(|err| StoreError::Read(err.to_string()))?;
        f(&key, &value)?;
    }
    Ok(())
}

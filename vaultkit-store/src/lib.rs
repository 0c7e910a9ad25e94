//! Transactional bucket store backing the VaultKit engine.
//!
//! The store presents a small ordered key/value surface on top of SQLite:
//! fixed, compile-time named [`Bucket`]s, scoped [`ReadTxn`] / [`WriteTxn`]
//! transactions, and byte keys iterated in ascending order. Values are opaque
//! blobs; encryption and serialization happen above this crate.
//!
//! A [`WriteTxn`] borrows the [`Store`] mutably, so the type system enforces
//! a single writer per handle while readers share the handle freely.

mod error;
mod store;
mod transaction;

pub use error::{StoreError, StoreResult};
pub use store::{Bucket, Store};
pub use transaction::{BucketRead, ReadTxn, WriteTxn};

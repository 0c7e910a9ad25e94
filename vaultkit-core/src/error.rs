//! Error taxonomy of the vault engine.

use thiserror::Error;
use vaultkit_store::StoreError;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors surfaced by the vault engine.
///
/// Store and crypto failures are translated into this closed set at the
/// engine boundary, so callers match on vault semantics rather than on
/// driver or cipher internals. Decryption failures deliberately carry no
/// detail: a wrong password is indistinguishable from tampered ciphertext.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The vault database could not be opened.
    #[error("failed to open vault store")]
    Open(#[source] StoreError),

    /// The vault database could not be closed cleanly.
    #[error("failed to close vault store")]
    Close(#[source] StoreError),

    /// Schema creation or version stamping failed.
    #[error("failed to migrate vault store")]
    Migrate(#[source] StoreError),

    /// The persisted schema version is not supported by this build.
    #[error("vault schema version {found} is not supported (expected {expected})")]
    UnsupportedVersion {
        /// Version string found in the settings bucket.
        found: String,
        /// The schema version this build supports.
        expected: &'static str,
    },

    /// The operation requires an unlocked vault.
    #[error("vault is locked")]
    Locked,

    /// Key or salt generation failed.
    #[error("failed to generate key material")]
    KeygenFailed,

    /// Payload or master-key encryption failed.
    #[error("failed to encrypt record")]
    EncryptFailed,

    /// Authentication failed on decrypt: wrong password, wrong key, or
    /// tampered ciphertext.
    #[error("failed to decrypt record")]
    DecryptFailed,

    /// An imported key record unwraps to a master key different from the
    /// one currently held.
    #[error("master key mismatch")]
    MasterKeyMismatch,

    /// No record exists under the requested key.
    #[error("not found")]
    NotFound,

    /// Vault keys are already present.
    #[error("already exists")]
    AlreadyExists,

    /// Malformed caller input.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Record serialization failed.
    #[error("failed to encode record: {0}")]
    Encode(String),

    /// Record deserialization failed.
    #[error("failed to decode record: {0}")]
    Decode(String),

    /// A read from the underlying store failed.
    #[error("failed to read from vault store")]
    Read(#[source] StoreError),

    /// A write to the underlying store failed.
    #[error("failed to write to vault store")]
    Write(#[source] StoreError),
}

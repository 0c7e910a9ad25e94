//! Provider error set.

use thiserror::Error;

/// Errors reported by a [`CryptoProvider`](super::CryptoProvider).
///
/// Decryption failures are a single variant on purpose; distinguishing a
/// wrong password from corrupted ciphertext would hand an oracle to anyone
/// probing the vault file.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key length does not match [`KEY_LEN`](super::KEY_LEN).
    #[error("invalid key length")]
    InvalidKeyLength,

    /// Salt length does not match [`SALT_LEN`](super::SALT_LEN).
    #[error("invalid salt length")]
    InvalidSaltLength,

    /// The master password is empty.
    #[error("master password must not be empty")]
    EmptyPassword,

    /// Random key or salt generation failed.
    #[error("failed to generate key material")]
    KeygenFailed,

    /// Encryption failed.
    #[error("encryption failed")]
    EncryptFailed,

    /// Decryption or authentication failed.
    #[error("decryption failed")]
    DecryptFailed,
}

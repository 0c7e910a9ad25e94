//! Pluggable encryption behind the vault.
//!
//! The engine never touches cipher primitives directly; everything flows
//! through a [`CryptoProvider`]. Two contracts matter to the rest of the
//! crate: ciphertext is self-contained (any nonce or header travels inside
//! the returned bytes), and the master-key wrapping binds a password and a
//! salt without persisting either.

mod aes_gcm;
mod error;
#[cfg(test)]
mod nop;

use zeroize::Zeroizing;

// `self::` disambiguates the module from the `aes-gcm` crate.
pub use self::aes_gcm::AesGcmCrypto;
pub use error::CryptoError;
#[cfg(test)]
pub(crate) use nop::NopCrypto;

/// Length in bytes of a master key.
pub const KEY_LEN: usize = 32;

/// Length in bytes of a wrapping salt.
pub const SALT_LEN: usize = 32;

/// Encryption strategy consumed by the vault.
///
/// `encrypt_data` / `decrypt_data` protect record payloads under the master
/// key. `encrypt_master_key` / `decrypt_master_key` wrap the master key
/// itself under a password-derived key, producing the envelope persisted in
/// the settings bucket.
pub trait CryptoProvider: Send + Sync {
    /// Generates a fresh random key of [`KEY_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeygenFailed`] when entropy is unavailable.
    fn new_key(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Generates a fresh random salt of [`SALT_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeygenFailed`] when entropy is unavailable.
    fn new_salt(&self) -> Result<Vec<u8>, CryptoError>;

    /// Encrypts `plaintext` under `key`. The result carries everything
    /// needed to decrypt it apart from the key. Empty plaintext is valid.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] or
    /// [`CryptoError::EncryptFailed`].
    fn encrypt_data(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts a buffer produced by [`CryptoProvider::encrypt_data`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] or, for any authentication
    /// failure, [`CryptoError::DecryptFailed`] with no further detail.
    fn decrypt_data(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Wraps `master_key` under a key derived from `password` and `salt`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`],
    /// [`CryptoError::InvalidSaltLength`], [`CryptoError::EmptyPassword`] or
    /// [`CryptoError::EncryptFailed`].
    fn encrypt_master_key(
        &self,
        master_key: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Unwraps a master key wrapped by [`CryptoProvider::encrypt_master_key`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSaltLength`],
    /// [`CryptoError::EmptyPassword`] or, for a wrong password as much as a
    /// tampered envelope, [`CryptoError::DecryptFailed`].
    fn decrypt_master_key(
        &self,
        wrapped: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
}

//! Guarded holding of the unlocked master key.

use secrecy::{ExposeSecret, SecretBox};
use subtle::ConstantTimeEq;

use crate::crypto::{CryptoProvider, KEY_LEN};
use crate::error::{VaultError, VaultResult};

/// Owns the crypto provider and, while unlocked, the plaintext master key.
///
/// The key lives in a [`SecretBox`] and is exposed only for the duration of
/// a single provider call. Locking drops the box, which zeroizes the key;
/// dropping the holder does the same.
pub(crate) struct KeyHolder {
    provider: Box<dyn CryptoProvider>,
    held: Option<SecretBox<[u8; KEY_LEN]>>,
}

impl KeyHolder {
    pub(crate) fn new(provider: Box<dyn CryptoProvider>) -> Self {
        Self {
            provider,
            held: None,
        }
    }

    pub(crate) fn provider(&self) -> &dyn CryptoProvider {
        self.provider.as_ref()
    }

    pub(crate) const fn is_locked(&self) -> bool {
        self.held.is_none()
    }

    /// Discards the held key. Idempotent.
    pub(crate) fn lock(&mut self) {
        self.held = None;
    }

    /// Installs an unwrapped master key, entering the unlocked state.
    ///
    /// A wrong length means the key record was corrupted, which reads as a
    /// decryption failure to the caller.
    pub(crate) fn install(&mut self, master_key: &[u8]) -> VaultResult<()> {
        if master_key.len() != KEY_LEN {
            return Err(VaultError::DecryptFailed);
        }
        let key: SecretBox<[u8; KEY_LEN]> = SecretBox::init_with(|| {
            let mut bytes = [0u8; KEY_LEN];
            bytes.copy_from_slice(master_key);
            bytes
        });
        self.held = Some(key);
        Ok(())
    }

    /// Encrypts `plaintext` under the held master key.
    pub(crate) fn encrypt(&self, plaintext: &[u8]) -> VaultResult<Vec<u8>> {
        let key = self.held.as_ref().ok_or(VaultError::Locked)?;
        self.provider
            .encrypt_data(plaintext, key.expose_secret())
            .map_err(|_| VaultError::EncryptFailed)
    }

    /// Decrypts `ciphertext` under the held master key.
    pub(crate) fn decrypt(&self, ciphertext: &[u8]) -> VaultResult<Vec<u8>> {
        let key = self.held.as_ref().ok_or(VaultError::Locked)?;
        self.provider
            .decrypt_data(ciphertext, key.expose_secret())
            .map_err(|_| VaultError::DecryptFailed)
    }

    /// Compares `candidate` against the held master key in constant time.
    pub(crate) fn key_matches(&self, candidate: &[u8]) -> VaultResult<bool> {
        let key = self.held.as_ref().ok_or(VaultError::Locked)?;
        Ok(key.expose_secret().ct_eq(candidate).into())
    }
}

impl std::fmt::Debug for KeyHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHolder")
            .field("held", &self.held.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AesGcmCrypto;

    fn unlocked_holder() -> KeyHolder {
        let mut holder = KeyHolder::new(Box::new(AesGcmCrypto::new()));
        let key = holder.provider().new_key().expect("generate key");
        holder.install(&key).expect("install key");
        holder
    }

    #[test]
    fn test_holder_starts_locked() {
        let holder = KeyHolder::new(Box::new(AesGcmCrypto::new()));
        assert!(holder.is_locked());
        let err = holder.encrypt(b"data").expect_err("locked");
        assert!(matches!(err, VaultError::Locked));
    }

    #[test]
    fn test_install_and_lock() {
        let mut holder = unlocked_holder();
        assert!(!holder.is_locked());
        holder.lock();
        assert!(holder.is_locked());
        holder.lock();
        assert!(holder.is_locked());
    }

    #[test]
    fn test_install_rejects_short_key() {
        let mut holder = KeyHolder::new(Box::new(AesGcmCrypto::new()));
        let err = holder.install(&[0u8; 16]).expect_err("short key");
        assert!(matches!(err, VaultError::DecryptFailed));
        assert!(holder.is_locked());
    }

    #[test]
    fn test_encrypt_decrypt_through_holder() {
        let holder = unlocked_holder();
        let sealed = holder.encrypt(b"payload").expect("encrypt");
        let opened = holder.decrypt(&sealed).expect("decrypt");
        assert_eq!(opened, b"payload");
    }

    #[test]
    fn test_key_matches() {
        let mut holder = KeyHolder::new(Box::new(AesGcmCrypto::new()));
        let key = holder.provider().new_key().expect("generate key");
        holder.install(&key).expect("install key");
        assert!(holder.key_matches(&key).expect("compare"));
        assert!(!holder.key_matches(&[0u8; KEY_LEN]).expect("compare other"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let holder = unlocked_holder();
        let rendered = format!("{holder:?}");
        assert!(rendered.contains("REDACTED"));
    }
}

//! AES-256-GCM provider with HMAC-SHA256 key wrapping.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::error::CryptoError;
use super::{CryptoProvider, KEY_LEN, SALT_LEN};

/// 12-byte nonce, the GCM standard size.
const NONCE_LEN: usize = 12;

type HmacSha256 = Hmac<Sha256>;

/// Reference [`CryptoProvider`].
///
/// Payloads are sealed with AES-256-GCM under a fresh random nonce; the
/// nonce is prepended to the ciphertext, so a sealed buffer is
/// `nonce || ciphertext || tag`. The master-key wrapping key is
/// `HMAC-SHA256(key = salt, message = password)`, which makes the wrapping
/// as strong as the password. Deployments that need a slow KDF can supply
/// their own provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct AesGcmCrypto;

impl AesGcmCrypto {
    /// Creates the provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn derive_wrap_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if password.is_empty() {
            return Err(CryptoError::EmptyPassword);
        }
        if salt.len() != SALT_LEN {
            return Err(CryptoError::InvalidSaltLength);
        }
        let mut mac = <HmacSha256 as Mac>::new_from_slice(salt)
            .map_err(|_| CryptoError::InvalidSaltLength)?;
        mac.update(password);
        Ok(Zeroizing::new(mac.finalize().into_bytes().to_vec()))
    }

    fn cipher(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength);
        }
        Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength)
    }

    fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| CryptoError::KeygenFailed)?;
        Ok(bytes)
    }
}

impl CryptoProvider for AesGcmCrypto {
    fn new_key(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        Self::random_bytes(KEY_LEN).map(Zeroizing::new)
    }

    fn new_salt(&self) -> Result<Vec<u8>, CryptoError> {
        Self::random_bytes(SALT_LEN)
    }

    fn encrypt_data(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = Self::cipher(key)?;
        let nonce_bytes = Self::random_bytes(NONCE_LEN).map_err(|_| CryptoError::EncryptFailed)?;
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::EncryptFailed)?;
        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn decrypt_data(&self, ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = Self::cipher(key)?;
        if ciphertext.len() < NONCE_LEN {
            return Err(CryptoError::DecryptFailed);
        }
        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| CryptoError::DecryptFailed)
    }

    fn encrypt_master_key(
        &self,
        master_key: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if master_key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKeyLength);
        }
        let wrap_key = Self::derive_wrap_key(password, salt)?;
        self.encrypt_data(master_key, &wrap_key)
    }

    fn decrypt_master_key(
        &self,
        wrapped: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let wrap_key = Self::derive_wrap_key(password, salt)?;
        self.decrypt_data(wrapped, &wrap_key).map(Zeroizing::new)
    }
}

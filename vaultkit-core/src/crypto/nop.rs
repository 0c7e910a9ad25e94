//! Passthrough provider for tests.
//!
//! Keys are fixed zeros and payloads pass through unchanged, which lets
//! tests assert on stored bytes directly. Never ship this.

use zeroize::Zeroizing;

use super::error::CryptoError;
use super::{CryptoProvider, KEY_LEN, SALT_LEN};

pub(crate) struct NopCrypto;

impl CryptoProvider for NopCrypto {
    fn new_key(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        Ok(Zeroizing::new(vec![0u8; KEY_LEN]))
    }

    fn new_salt(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(vec![0u8; SALT_LEN])
    }

    fn encrypt_data(&self, plaintext: &[u8], _key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(plaintext.to_vec())
    }

    fn decrypt_data(&self, ciphertext: &[u8], _key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(ciphertext.to_vec())
    }

    fn encrypt_master_key(
        &self,
        master_key: &[u8],
        _password: &[u8],
        _salt: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        Ok(master_key.to_vec())
    }

    fn decrypt_master_key(
        &self,
        wrapped: &[u8],
        _password: &[u8],
        _salt: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        Ok(Zeroizing::new(wrapped.to_vec()))
    }
}

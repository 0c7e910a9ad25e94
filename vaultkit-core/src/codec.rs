//! CBOR serialization of vault records.

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

/// Serializes `value` to CBOR.
///
/// The returned buffer zeroizes on drop because it may hold decrypted field
/// values on their way to the cipher.
pub(crate) fn encode<T: Serialize>(value: &T) -> VaultResult<Zeroizing<Vec<u8>>> {
    let mut bytes = Zeroizing::new(Vec::new());
    ciborium::ser::into_writer(value, &mut *bytes)
        .map_err(|err| VaultError::Encode(err.to_string()))?;
    Ok(bytes)
}

/// Deserializes a record from CBOR.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> VaultResult<T> {
    ciborium::de::from_reader(bytes).map_err(|err| VaultError::Decode(err.to_string()))
}

//! Printable text encoding of canonically serialized objects. Export formats are base64 (standard
//! alphabet, padded) of the compressed canonical bytes.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use ark_std::{string::String, vec::Vec};
use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("text is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("bytes do not decode to the expected object: {0}")]
    Serialization(#[from] SerializationError),
    #[error("{0} unexpected bytes after the encoded object")]
    TrailingBytes(usize),
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Surrounding whitespace, as left by line oriented storage, is ignored.
pub fn from_base64(text: &str) -> Result<Vec<u8>, TextError> {
    Ok(STANDARD.decode(text.trim())?)
}

pub fn canonical_bytes<T: CanonicalSerialize>(obj: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::with_capacity(obj.compressed_size());
    obj.serialize_compressed(&mut bytes)?;
    Ok(bytes)
}

/// Decode an object from its compressed canonical bytes, rejecting any bytes left over.
pub fn from_canonical_bytes<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T, TextError> {
    let mut reader = bytes;
    let obj = T::deserialize_compressed(&mut reader)?;
    if !reader.is_empty() {
        return Err(TextError::TrailingBytes(reader.len()));
    }
    Ok(obj)
}

pub fn to_text<T: CanonicalSerialize>(obj: &T) -> Result<String, SerializationError> {
    Ok(to_base64(&canonical_bytes(obj)?))
}

pub fn from_text<T: CanonicalDeserialize>(text: &str) -> Result<T, TextError> {
    from_canonical_bytes(&from_base64(text)?)
}

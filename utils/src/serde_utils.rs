//! Serde serialization for `arkworks-rs` objects they themselves don't implement serde.
//!
//! Objects are written in their compressed canonical encoding, as a base64 string for human
//! readable formats like JSON and as raw bytes otherwise.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

use crate::text;

pub type ArkObjectBytes = AsCanonical;

pub struct AsCanonical;

impl AsCanonical {
    pub fn serialize<S, T>(x: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: CanonicalSerialize,
        S: Serializer,
    {
        let mut bytes = Vec::with_capacity(x.compressed_size());
        x.serialize_compressed(&mut bytes)
            .map_err(serde::ser::Error::custom)?;
        if serializer.is_human_readable() {
            serializer.serialize_str(&text::to_base64(&bytes))
        } else {
            Serialize::serialize(&bytes, serializer)
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        T: CanonicalDeserialize,
        D: Deserializer<'de>,
    {
        let bytes = if deserializer.is_human_readable() {
            let encoded = <ark_std::string::String as Deserialize>::deserialize(deserializer)?;
            text::from_base64(&encoded).map_err(serde::de::Error::custom)?
        } else {
            <Vec<u8> as Deserialize>::deserialize(deserializer)?
        };
        text::from_canonical_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

impl<T> SerializeAs<T> for AsCanonical
where
    T: CanonicalSerialize,
{
    fn serialize_as<S>(x: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Self::serialize(x, serializer)
    }
}

impl<'de, T> DeserializeAs<'de, T> for AsCanonical
where
    T: CanonicalDeserialize,
{
    fn deserialize_as<D>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        Self::deserialize(deserializer)
    }
}

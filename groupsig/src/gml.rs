//! Group membership list: the manager's record of every member that completed the join protocol,
//! indexed in order of issuance. Entries are never removed.

use crate::{error::GroupSigError, registry, scheme::SchemeCode};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{string::String, vec::Vec};
use groupsig_utils::text;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct GmlEntry {
    pub index: u64,
    /// Scheme specific member record
    pub(crate) material: Vec<u8>,
}

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Gml {
    code: SchemeCode,
    entries: Vec<GmlEntry>,
}

impl Gml {
    pub fn new(code: SchemeCode) -> Self {
        Self {
            code,
            entries: Vec::new(),
        }
    }

    pub fn code(&self) -> SchemeCode {
        self.code
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<&GmlEntry> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GmlEntry> {
        self.entries.iter()
    }

    pub fn export(&self) -> Result<String, GroupSigError> {
        Ok(text::to_text(self)?)
    }

    pub fn import(code: SchemeCode, encoded: &str) -> Result<Self, GroupSigError> {
        let gml: Self = text::from_text(encoded)?;
        if gml.code != code {
            return Err(GroupSigError::ImportSchemeMismatch {
                expected: code,
                found: gml.code,
            });
        }
        registry::resolve(code)?;
        // Indices are positions so lookups by index stay valid after a round trip
        if gml
            .entries
            .iter()
            .enumerate()
            .any(|(i, e)| e.index != i as u64)
        {
            return Err(GroupSigError::Serialization(
                ark_serialize::SerializationError::InvalidData,
            ));
        }
        Ok(gml)
    }

    pub(crate) fn ensure_scheme(&self, expected: SchemeCode) -> Result<(), GroupSigError> {
        if self.code != expected {
            return Err(GroupSigError::SchemeMismatch {
                expected,
                found: self.code,
            });
        }
        Ok(())
    }

    pub(crate) fn contains(&self, material: &[u8]) -> bool {
        self.entries.iter().any(|e| e.material == material)
    }

    /// Append a member record, returning its index
    pub(crate) fn append(&mut self, material: Vec<u8>) -> u64 {
        let index = self.entries.len() as u64;
        self.entries.push(GmlEntry { index, material });
        index
    }
}

impl GmlEntry {
    pub(crate) fn to_typed<T: CanonicalDeserialize>(&self) -> Result<T, GroupSigError> {
        Ok(text::from_canonical_bytes(&self.material)?)
    }
}

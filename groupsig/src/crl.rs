//! Revocation list of members whose tracing trapdoor was revealed.

use crate::{error::GroupSigError, objects::Trapdoor, registry, scheme::SchemeCode};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{string::String, vec::Vec};
use groupsig_utils::text;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct CrlEntry {
    /// Index of the member in the group membership list
    pub index: u64,
    pub trapdoor: Trapdoor,
}

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Crl {
    code: SchemeCode,
    entries: Vec<CrlEntry>,
}

impl Crl {
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

    pub fn contains_index(&self, index: u64) -> bool {
        self.get(index).is_some()
    }

    pub fn get(&self, index: u64) -> Option<&Trapdoor> {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .map(|e| &e.trapdoor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrlEntry> {
        self.entries.iter()
    }

    pub fn export(&self) -> Result<String, GroupSigError> {
        Ok(text::to_text(self)?)
    }

    pub fn import(code: SchemeCode, encoded: &str) -> Result<Self, GroupSigError> {
        let crl: Self = text::from_text(encoded)?;
        if crl.code != code {
            return Err(GroupSigError::ImportSchemeMismatch {
                expected: code,
                found: crl.code,
            });
        }
        registry::resolve(code)?;
        for entry in &crl.entries {
            entry.trapdoor.ensure_scheme(code)?;
        }
        Ok(crl)
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

    /// Returns false and leaves the list unchanged when `index` was already revealed
    pub(crate) fn insert(&mut self, index: u64, trapdoor: Trapdoor) -> bool {
        if self.contains_index(index) {
            return false;
        }
        self.entries.push(CrlEntry { index, trapdoor });
        true
    }
}

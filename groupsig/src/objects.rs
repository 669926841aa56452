//! Scheme-tagged containers for keys, signatures and proofs.
//!
//! Every container carries the code of the scheme that produced it and the canonical encoding of
//! the scheme's own object. Containers export to printable text (base64 of the canonical encoding,
//! scheme code first) and import back only under the same scheme code.

use crate::{
    error::GroupSigError,
    registry,
    scheme::{ManagerRole, SchemeCode},
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{fmt, string::String, vec::Vec};
use groupsig_utils::text;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

macro_rules! impl_scheme_object {
    ($name: ident, $label: expr) => {
        impl_scheme_object!(@common $name, $label);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "{} {}: {}",
                    self.code,
                    $label,
                    text::to_base64(&self.material)
                )
            }
        }
    };
    ($name: ident, $label: expr, secret) => {
        impl_scheme_object!(@common $name, $label);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "{} {}: <{} secret bytes>",
                    self.code,
                    $label,
                    self.material.len()
                )
            }
        }
    };
    (@common $name: ident, $label: expr) => {
        impl $name {
            pub fn code(&self) -> SchemeCode {
                self.code
            }

            /// Printable text of this object for storage or transport
            pub fn export(&self) -> Result<String, GroupSigError> {
                Ok(text::to_text(self)?)
            }

            /// Parse text produced by [`Self::export`], requiring the object to belong to `code`
            pub fn import(code: SchemeCode, encoded: &str) -> Result<Self, GroupSigError> {
                let obj: Self = text::from_text(encoded)?;
                if obj.code != code {
                    return Err(GroupSigError::ImportSchemeMismatch {
                        expected: code,
                        found: obj.code,
                    });
                }
                registry::resolve(code)?;
                Ok(obj)
            }

            #[allow(dead_code)]
            pub(crate) fn ensure_scheme(&self, expected: SchemeCode) -> Result<(), GroupSigError> {
                if self.code != expected {
                    return Err(GroupSigError::SchemeMismatch {
                        expected,
                        found: self.code,
                    });
                }
                Ok(())
            }

            #[allow(dead_code)]
            pub(crate) fn to_typed<T: CanonicalDeserialize>(&self) -> Result<T, GroupSigError> {
                Ok(text::from_canonical_bytes(&self.material)?)
            }
        }
    };
}

macro_rules! impl_from_typed {
    ($($name: ident),+) => {
        $(
            impl $name {
                pub(crate) fn from_typed<T: CanonicalSerialize>(
                    code: SchemeCode,
                    obj: &T,
                ) -> Result<Self, GroupSigError> {
                    Ok(Self {
                        code,
                        material: text::canonical_bytes(obj)?,
                    })
                }
            }
        )+
    };
}

/// Public key of a group. Signatures verify against it alone.
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct GroupKey {
    code: SchemeCode,
    material: Vec<u8>,
}

/// Secret key of a group authority, tagged with what it is allowed to do.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
pub struct ManagerKey {
    #[zeroize(skip)]
    code: SchemeCode,
    #[zeroize(skip)]
    role: ManagerRole,
    material: Vec<u8>,
}

/// Key of a group member. Produced by the first member step of the join protocol and only usable
/// for signing after the member's final step.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
pub struct MemberKey {
    #[zeroize(skip)]
    code: SchemeCode,
    /// Last join step the member ran
    #[zeroize(skip)]
    pub(crate) step: u8,
    #[zeroize(skip)]
    pub(crate) usable: bool,
    material: Vec<u8>,
}

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Signature {
    code: SchemeCode,
    material: Vec<u8>,
}

/// Signature with the signer's identity encrypted for conversion. `converted` is set once a
/// converter has processed it.
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct BlindSignature {
    code: SchemeCode,
    converted: bool,
    material: Vec<u8>,
}

#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Proof {
    code: SchemeCode,
    material: Vec<u8>,
}

/// Pseudonym recovered by unblinding a converted signature. Equal identities mean the same signer
/// within one conversion.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Identity {
    code: SchemeCode,
    material: Vec<u8>,
}

/// Tracing information of a revealed member
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Trapdoor {
    code: SchemeCode,
    material: Vec<u8>,
}

/// A message of the join protocol. `seq` is the index of the step that produced it.
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct JoinMessage {
    code: SchemeCode,
    seq: u8,
    material: Vec<u8>,
}

/// Scheme-wide parameters, the same for every group of a scheme
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SchemeParams {
    code: SchemeCode,
    material: Vec<u8>,
}

impl_scheme_object!(GroupKey, "group key");
impl_scheme_object!(ManagerKey, "manager key", secret);
impl_scheme_object!(MemberKey, "member key", secret);
impl_scheme_object!(Signature, "signature");
impl_scheme_object!(BlindSignature, "blind signature");
impl_scheme_object!(Proof, "proof");
impl_scheme_object!(Identity, "identity");
impl_scheme_object!(Trapdoor, "trapdoor");
impl_scheme_object!(JoinMessage, "join message");
impl_scheme_object!(SchemeParams, "parameters");

impl_from_typed!(GroupKey, Signature, Proof, Identity, Trapdoor, SchemeParams);

impl ManagerKey {
    pub(crate) fn from_typed<T: CanonicalSerialize>(
        code: SchemeCode,
        role: ManagerRole,
        obj: &T,
    ) -> Result<Self, GroupSigError> {
        Ok(Self {
            code,
            role,
            material: text::canonical_bytes(obj)?,
        })
    }

    pub fn role(&self) -> ManagerRole {
        self.role
    }
}

impl MemberKey {
    /// A key fresh from a join step. The join driver sets the step and whether the key is usable.
    pub(crate) fn from_typed<T: CanonicalSerialize>(
        code: SchemeCode,
        obj: &T,
    ) -> Result<Self, GroupSigError> {
        Ok(Self {
            code,
            step: 0,
            usable: false,
            material: text::canonical_bytes(obj)?,
        })
    }

    /// Last join step this key went through
    pub fn join_step(&self) -> u8 {
        self.step
    }

    /// Whether the join protocol completed and the key can sign
    pub fn is_usable(&self) -> bool {
        self.usable
    }
}

impl BlindSignature {
    pub(crate) fn from_typed<T: CanonicalSerialize>(
        code: SchemeCode,
        converted: bool,
        obj: &T,
    ) -> Result<Self, GroupSigError> {
        Ok(Self {
            code,
            converted,
            material: text::canonical_bytes(obj)?,
        })
    }

    pub fn is_converted(&self) -> bool {
        self.converted
    }

    pub(crate) fn stage(&self) -> &'static str {
        if self.converted {
            "converted"
        } else {
            "blinded"
        }
    }
}

impl JoinMessage {
    pub(crate) fn from_typed<T: CanonicalSerialize>(
        code: SchemeCode,
        seq: u8,
        obj: &T,
    ) -> Result<Self, GroupSigError> {
        Ok(Self {
            code,
            seq,
            material: text::canonical_bytes(obj)?,
        })
    }

    pub fn seq(&self) -> u8 {
        self.seq
    }
}

/// Keypair a requester uses to have signatures converted for them. Only the public half is needed
/// to blind and convert, the secret half unblinds.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
pub struct BlindingKey {
    #[zeroize(skip)]
    code: SchemeCode,
    #[zeroize(skip)]
    public: Vec<u8>,
    secret: Option<Vec<u8>>,
}

impl BlindingKey {
    pub(crate) fn from_typed<P: CanonicalSerialize, S: CanonicalSerialize>(
        code: SchemeCode,
        public: &P,
        secret: Option<&S>,
    ) -> Result<Self, GroupSigError> {
        Ok(Self {
            code,
            public: text::canonical_bytes(public)?,
            secret: secret.map(text::canonical_bytes).transpose()?,
        })
    }

    pub fn code(&self) -> SchemeCode {
        self.code
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// The same key without its secret half
    pub fn public_key(&self) -> Self {
        Self {
            code: self.code,
            public: self.public.clone(),
            secret: None,
        }
    }

    /// Full export including the secret half when present
    pub fn export(&self) -> Result<String, GroupSigError> {
        Ok(text::to_text(self)?)
    }

    /// Export of the public half only
    pub fn export_public(&self) -> Result<String, GroupSigError> {
        self.public_key().export()
    }

    pub fn import(code: SchemeCode, encoded: &str) -> Result<Self, GroupSigError> {
        let obj: Self = text::from_text(encoded)?;
        if obj.code != code {
            return Err(GroupSigError::ImportSchemeMismatch {
                expected: code,
                found: obj.code,
            });
        }
        registry::resolve(code)?;
        Ok(obj)
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

    pub(crate) fn public_to_typed<T: CanonicalDeserialize>(&self) -> Result<T, GroupSigError> {
        Ok(text::from_canonical_bytes(&self.public)?)
    }

    pub(crate) fn secret_to_typed<T: CanonicalDeserialize>(&self) -> Result<T, GroupSigError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or(GroupSigError::MissingBlindingSecret)?;
        Ok(text::from_canonical_bytes(secret)?)
    }
}

impl fmt::Display for BlindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blinding key: {}{}",
            self.code,
            text::to_base64(&self.public),
            if self.has_secret() {
                " (with secret)"
            } else {
                ""
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::Fr;

    #[test]
    fn export_import() {
        let proof = Proof::from_typed(SchemeCode::PS16, &Fr::from(7u64)).unwrap();
        let encoded = proof.export().unwrap();
        assert!(encoded.chars().all(|c| c.is_ascii_graphic()));
        assert_eq!(Proof::import(SchemeCode::PS16, &encoded).unwrap(), proof);
        assert!(matches!(
            Proof::import(SchemeCode::DL21, &encoded),
            Err(GroupSigError::ImportSchemeMismatch { .. })
        ));
        assert!(matches!(
            Proof::import(SchemeCode::PS16, "%%%"),
            Err(GroupSigError::Text(_))
        ));
        assert!(matches!(
            Proof::import(SchemeCode::PS16, &encoded[..encoded.len() / 2]),
            Err(GroupSigError::Text(_))
        ));
        assert_eq!(proof.to_typed::<Fr>().unwrap(), Fr::from(7u64));

        // Objects of unsupported schemes never import
        let foreign = Proof::from_typed(SchemeCode(9), &Fr::from(7u64)).unwrap();
        assert!(matches!(
            Proof::import(SchemeCode(9), &foreign.export().unwrap()),
            Err(GroupSigError::UnknownScheme(9))
        ));
    }

    #[test]
    fn printable_and_redacted() {
        let sig = Signature::from_typed(SchemeCode::DL21SEQ, &Fr::from(1u64)).unwrap();
        let shown = sig.to_string();
        assert!(shown.starts_with("DL21SEQ signature: "));
        assert!(shown.chars().all(|c| c.is_ascii() && !c.is_ascii_control()));

        let key =
            ManagerKey::from_typed(SchemeCode::PS16, ManagerRole::Manager, &Fr::from(3u64))
                .unwrap();
        assert_eq!(key.to_string(), "PS16 manager key: <32 secret bytes>");
        assert_eq!(
            ManagerKey::import(SchemeCode::PS16, &key.export().unwrap())
                .unwrap()
                .role(),
            ManagerRole::Manager
        );
    }

    #[test]
    fn blinding_key_halves() {
        let key = BlindingKey::from_typed(
            SchemeCode::GL19,
            &Fr::from(2u64),
            Some(&Fr::from(5u64)),
        )
        .unwrap();
        assert!(key.has_secret());
        let public = BlindingKey::import(SchemeCode::GL19, &key.export_public().unwrap()).unwrap();
        assert!(!public.has_secret());
        assert_eq!(public, key.public_key());
        assert_eq!(public.public_to_typed::<Fr>().unwrap(), Fr::from(2u64));
        assert!(matches!(
            public.secret_to_typed::<Fr>(),
            Err(GroupSigError::MissingBlindingSecret)
        ));
        let full = BlindingKey::import(SchemeCode::GL19, &key.export().unwrap()).unwrap();
        assert_eq!(full, key);
        assert_eq!(full.secret_to_typed::<Fr>().unwrap(), Fr::from(5u64));
    }
}

//! Scheme codes, scheme descriptions and the operation table every scheme implements.

use crate::{
    crl::Crl,
    error::GroupSigError,
    gml::Gml,
    join::JoinStep,
    message::Message,
    objects::{
        BlindSignature, BlindingKey, GroupKey, Identity, JoinMessage, ManagerKey, MemberKey,
        Proof, SchemeParams, Signature, Trapdoor,
    },
    registry,
};
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, SerializationError, Valid, Validate,
};
use ark_std::{
    cfg_iter,
    fmt,
    io::{Read, Write},
    rand::RngCore,
    vec::Vec,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Identifies a scheme. Codes are stable across versions since they prefix every exported object.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct SchemeCode(pub u8);

impl SchemeCode {
    pub const GL19: Self = Self(3);
    pub const PS16: Self = Self(4);
    pub const DL21: Self = Self(6);
    pub const DL21SEQ: Self = Self(7);
}

impl fmt::Display for SchemeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match registry::resolve(*self) {
            Ok(scheme) => f.write_str(scheme.description().name),
            Err(_) => write!(f, "scheme #{}", self.0),
        }
    }
}

/// Static facts about a scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemeDescription {
    pub code: SchemeCode,
    pub name: &'static str,
    /// Issuance is recorded in a group membership list
    pub has_gml: bool,
    /// Revealed members are recorded in a revocation list that `trace` checks
    pub has_crl: bool,
    /// `open` returns a proof that `open_verify` checks
    pub has_open_proof: bool,
    /// Which party sends the first join message: 0 for the manager, 1 for the member
    pub join_start: u8,
    /// Number of messages exchanged in the join protocol. Steps `0..join_seq` each send one
    /// message and the step at index `join_seq` consumes the last one.
    pub join_seq: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinParty {
    Manager,
    Member,
}

impl SchemeDescription {
    /// Party running the join step at `seq`, `None` past the end of the protocol
    pub fn party_at(&self, seq: u8) -> Option<JoinParty> {
        if seq > self.join_seq {
            None
        } else if seq % 2 == self.join_start % 2 {
            Some(JoinParty::Manager)
        } else {
            Some(JoinParty::Member)
        }
    }

    pub fn first_step_of(&self, party: JoinParty) -> u8 {
        match (party, self.join_start % 2) {
            (JoinParty::Manager, 0) | (JoinParty::Member, 1) => 0,
            _ => 1,
        }
    }

    /// Index of the member step after which the member key is usable
    pub fn final_member_step(&self) -> u8 {
        match self.party_at(self.join_seq) {
            Some(JoinParty::Member) => self.join_seq,
            _ => self.join_seq.saturating_sub(1),
        }
    }
}

/// What a manager key allows its holder to do. Single-authority schemes use `Manager` for the
/// combined issuer and opener. Multi-authority schemes split issuance and conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagerRole {
    Manager,
    Issuer,
    Converter,
}

impl ManagerRole {
    pub fn can_issue(&self) -> bool {
        matches!(self, Self::Manager | Self::Issuer)
    }

    pub fn can_open(&self) -> bool {
        matches!(self, Self::Manager)
    }

    pub fn can_convert(&self) -> bool {
        matches!(self, Self::Converter)
    }

    fn as_byte(&self) -> u8 {
        match self {
            Self::Manager => 0,
            Self::Issuer => 1,
            Self::Converter => 2,
        }
    }
}

impl TryFrom<u8> for ManagerRole {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::Manager),
            1 => Ok(Self::Issuer),
            2 => Ok(Self::Converter),
            b => Err(b),
        }
    }
}

impl CanonicalSerialize for ManagerRole {
    fn serialize_with_mode<W: Write>(
        &self,
        writer: W,
        compress: Compress,
    ) -> Result<(), SerializationError> {
        self.as_byte().serialize_with_mode(writer, compress)
    }

    fn serialized_size(&self, compress: Compress) -> usize {
        self.as_byte().serialized_size(compress)
    }
}

impl Valid for ManagerRole {
    fn check(&self) -> Result<(), SerializationError> {
        Ok(())
    }
}

impl CanonicalDeserialize for ManagerRole {
    fn deserialize_with_mode<R: Read>(
        reader: R,
        compress: Compress,
        validate: Validate,
    ) -> Result<Self, SerializationError> {
        let byte = u8::deserialize_with_mode(reader, compress, validate)?;
        Self::try_from(byte).map_err(|_| SerializationError::InvalidData)
    }
}

/// Result of opening a signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opening {
    /// Index of the signer in the group membership list
    pub index: u64,
    pub proof: Option<Proof>,
}

/// The operation table of a scheme. All objects passed in are already checked to belong to the
/// scheme and join steps are checked against the scheme description before dispatch.
///
/// Operations a scheme does not offer keep the provided implementation, which fails with
/// [`GroupSigError::UnsupportedOperation`].
#[allow(unused_variables)]
pub trait GroupSignatureScheme: Send + Sync {
    fn description(&self) -> &'static SchemeDescription;

    /// Scheme-wide parameters every group of this scheme is set up with
    fn init(&self) -> Result<SchemeParams, GroupSigError>;

    /// Create the group key and a manager key. Multi-authority schemes are set up by calling this
    /// again with the group key returned by the previous call.
    fn setup(
        &self,
        rng: &mut dyn RngCore,
        params: &SchemeParams,
        grpkey: Option<&GroupKey>,
    ) -> Result<(GroupKey, ManagerKey), GroupSigError>;

    fn join_mgr(
        &self,
        rng: &mut dyn RngCore,
        seq: u8,
        msg_in: Option<&JoinMessage>,
        mgrkey: &ManagerKey,
        grpkey: &GroupKey,
        gml: &mut Gml,
    ) -> Result<JoinMessage, GroupSigError>;

    fn join_mem(
        &self,
        rng: &mut dyn RngCore,
        seq: u8,
        msg_in: Option<&JoinMessage>,
        memkey: Option<&MemberKey>,
        grpkey: &GroupKey,
    ) -> Result<JoinStep, GroupSigError>;

    fn sign(
        &self,
        rng: &mut dyn RngCore,
        msg: &Message,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        seed: u32,
    ) -> Result<Signature, GroupSigError>;

    fn verify(
        &self,
        sig: &Signature,
        msg: &Message,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError>;

    fn verify_batch(
        &self,
        sigs: &[Signature],
        msgs: &[Message],
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        if sigs.len() != msgs.len() {
            return Err(GroupSigError::ExpectedSameSizeSequences(
                sigs.len(),
                msgs.len(),
            ));
        }
        let results = cfg_iter!(sigs)
            .zip(cfg_iter!(msgs))
            .map(|(sig, msg)| self.verify(sig, msg, grpkey))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results.into_iter().all(|valid| valid))
    }

    fn open(
        &self,
        rng: &mut dyn RngCore,
        sig: &Signature,
        grpkey: &GroupKey,
        mgrkey: &ManagerKey,
        gml: &Gml,
    ) -> Result<Opening, GroupSigError> {
        Err(self.unsupported("open"))
    }

    fn open_verify(
        &self,
        proof: &Proof,
        sig: &Signature,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        Err(self.unsupported("open_verify"))
    }

    fn reveal(&self, crl: &mut Crl, gml: &Gml, index: u64) -> Result<Trapdoor, GroupSigError> {
        Err(self.unsupported("reveal"))
    }

    fn trace(
        &self,
        sig: &Signature,
        grpkey: &GroupKey,
        crl: &Crl,
        mgrkey: &ManagerKey,
        gml: &Gml,
    ) -> Result<bool, GroupSigError> {
        Err(self.unsupported("trace"))
    }

    fn claim(
        &self,
        rng: &mut dyn RngCore,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        sig: &Signature,
    ) -> Result<Option<Proof>, GroupSigError> {
        Err(self.unsupported("claim"))
    }

    fn claim_verify(
        &self,
        proof: &Proof,
        sig: &Signature,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        Err(self.unsupported("claim_verify"))
    }

    fn prove_equality(
        &self,
        rng: &mut dyn RngCore,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        sigs: &[Signature],
    ) -> Result<Option<Proof>, GroupSigError> {
        Err(self.unsupported("prove_equality"))
    }

    fn prove_equality_verify(
        &self,
        proof: &Proof,
        grpkey: &GroupKey,
        sigs: &[Signature],
    ) -> Result<bool, GroupSigError> {
        Err(self.unsupported("prove_equality_verify"))
    }

    fn blinding_keygen(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
    ) -> Result<BlindingKey, GroupSigError> {
        Err(self.unsupported("blinding_keygen"))
    }

    fn blind(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
        sig: &Signature,
        msg: &Message,
        bldkey: &BlindingKey,
    ) -> Result<BlindSignature, GroupSigError> {
        Err(self.unsupported("blind"))
    }

    fn convert(
        &self,
        rng: &mut dyn RngCore,
        bsigs: &[BlindSignature],
        grpkey: &GroupKey,
        mgrkey: &ManagerKey,
        bldkey: &BlindingKey,
        msg: Option<&Message>,
    ) -> Result<Vec<BlindSignature>, GroupSigError> {
        Err(self.unsupported("convert"))
    }

    fn unblind(
        &self,
        csig: &BlindSignature,
        bldkey: &BlindingKey,
    ) -> Result<Identity, GroupSigError> {
        Err(self.unsupported("unblind"))
    }

    fn identify(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
        memkey: &MemberKey,
        sig: &Signature,
        msg: &Message,
    ) -> Result<Option<Proof>, GroupSigError> {
        Err(self.unsupported("identify"))
    }

    fn link(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
        memkey: &MemberKey,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<Option<Proof>, GroupSigError> {
        Err(self.unsupported("link"))
    }

    fn verify_link(
        &self,
        grpkey: &GroupKey,
        proof: &Proof,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<bool, GroupSigError> {
        Err(self.unsupported("verify_link"))
    }

    fn seqlink(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
        memkey: &MemberKey,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<Option<Proof>, GroupSigError> {
        Err(self.unsupported("seqlink"))
    }

    fn verify_seqlink(
        &self,
        grpkey: &GroupKey,
        proof: &Proof,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<bool, GroupSigError> {
        Err(self.unsupported("verify_seqlink"))
    }

    fn unsupported(&self, operation: &'static str) -> GroupSigError {
        GroupSigError::UnsupportedOperation {
            scheme: self.description().name,
            operation,
        }
    }
}

//! DL21 and DL21SEQ group signatures.
//!
//! The member holds the same Pointcheval-Sanders credential as in PS16 and every signature
//! additionally carries a pseudonym `nym = nym_base * sk` for a fresh random `nym_base`. Pseudonyms
//! of different signatures are unlinkable, but the member can prove that a set of signatures share
//! the secret behind their pseudonyms (`link`) or that one signature is theirs (`identify`).
//!
//! DL21SEQ signatures also carry sequence tags derived from a PRF on the member's secret and the
//! signature's position `i` passed as the signing seed: `current = H(x_i)` and
//! `chain = H(x_{i-1}, x_i)` where `x_i = PRF(sk, i)`. `seqlink` reveals the `x_i` so a verifier can
//! check that the linked signatures were produced at consecutive positions in the given order.
//! The position itself is stored masked with a value only the member can compute.

use crate::{
    common::{self, Curve, Fr, G1Affine, SetupParams},
    credential::{self, Credential, CredentialKey, IssuerPublicKey, IssuerSecretKey},
    error::GroupSigError,
    gml::Gml,
    join::JoinStep,
    message::Message,
    objects::{GroupKey, JoinMessage, ManagerKey, MemberKey, Proof, SchemeParams, Signature},
    scheme::{GroupSignatureScheme, ManagerRole, SchemeCode, SchemeDescription},
};
use ark_ec::{AffineRepr, CurveGroup};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, vec::Vec, UniformRand};
use blake2::Blake2b512;
use digest::Digest;
use groupsig_spk::{
    discrete_log::{EqualDiscreteLogs, EqualDiscreteLogsProtocol, PokDiscreteLog, PokDiscreteLogProtocol},
    target_group::{PokTargetGroupDiscreteLog, PokTargetGroupDiscreteLogProtocol},
};
use groupsig_utils::{serde_utils::ArkObjectBytes, text};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::Zeroize;

const SIGN_DOMAIN: &[u8] = b"DL21-SIGN";
const IDENTIFY_DOMAIN: &[u8] = b"DL21-IDENTIFY";
const LINK_DOMAIN: &[u8] = b"DL21-LINK";
const SEQLINK_DOMAIN: &[u8] = b"DL21-SEQLINK";

const PRF_KEY_LABEL: &[u8] = b"DL21SEQ-prf-key";
const PRF_LABEL: &[u8] = b"DL21SEQ-prf";
const TAG_LABEL: &[u8] = b"DL21SEQ-tag";
const CHAIN_LABEL: &[u8] = b"DL21SEQ-chain";
const SEAL_LABEL: &[u8] = b"DL21SEQ-seal";

static DL21_DESCRIPTION: SchemeDescription = SchemeDescription {
    code: SchemeCode::DL21,
    name: "DL21",
    has_gml: true,
    has_crl: false,
    has_open_proof: false,
    join_start: 0,
    join_seq: 3,
};

static DL21SEQ_DESCRIPTION: SchemeDescription = SchemeDescription {
    code: SchemeCode::DL21SEQ,
    name: "DL21SEQ",
    has_gml: true,
    has_crl: false,
    has_open_proof: false,
    join_start: 0,
    join_seq: 3,
};

pub struct Dl21 {
    sequential: bool,
}

pub static DL21: Dl21 = Dl21 { sequential: false };
pub static DL21_SEQ: Dl21 = Dl21 { sequential: true };

#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SequenceTags {
    /// Position of the signature xored with a mask derived from the member secret and pseudonym
    pub sealed_position: u32,
    pub current: Vec<u8>,
    pub chain: Vec<u8>,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Dl21Signature {
    pub credential: Credential<Curve>,
    #[serde_as(as = "ArkObjectBytes")]
    pub nym_base: G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub nym: G1Affine,
    pub sequence: Option<SequenceTags>,
    /// Knowledge of the secret certified by the credential
    pub spk_credential: PokTargetGroupDiscreteLog<Curve>,
    /// Knowledge of the secret behind the pseudonym, with the same response as `spk_credential`
    pub spk_nym: PokDiscreteLog<G1Affine>,
}

#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SeqLinkProof {
    pub link: EqualDiscreteLogs<G1Affine>,
    /// PRF output of every linked signature, in the order of the signatures
    pub revealed: Vec<Vec<u8>>,
}

fn hash(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Blake2b512::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// PRF key of a member secret
fn prf_key(sk: &Fr) -> Result<Vec<u8>, GroupSigError> {
    let mut sk_bytes = text::canonical_bytes(sk)?;
    let key = hash(&[PRF_KEY_LABEL, &sk_bytes[..]]);
    sk_bytes.zeroize();
    Ok(key)
}

fn prf(key: &[u8], position: u32) -> Vec<u8> {
    hash(&[PRF_LABEL, key, &position.to_le_bytes()[..]])
}

fn current_tag(x: &[u8]) -> Vec<u8> {
    hash(&[TAG_LABEL, x])
}

fn chain_tag(previous: &[u8], x: &[u8]) -> Vec<u8> {
    hash(&[CHAIN_LABEL, previous, x])
}

fn seal_mask(key: &[u8], nym: &G1Affine) -> Result<u32, GroupSigError> {
    let digest = hash(&[SEAL_LABEL, key, &text::canonical_bytes(nym)?[..]]);
    let mut mask = [0u8; 4];
    mask.copy_from_slice(&digest[..4]);
    Ok(u32::from_le_bytes(mask))
}

impl SequenceTags {
    fn new(key: &[u8], position: u32, nym: &G1Affine) -> Result<Self, GroupSigError> {
        let x = prf(key, position);
        let previous = prf(key, position.wrapping_sub(1));
        Ok(Self {
            sealed_position: position ^ seal_mask(key, nym)?,
            current: current_tag(&x),
            chain: chain_tag(&previous, &x),
        })
    }
}

impl Dl21Signature {
    fn transcript(&self) -> Result<Vec<u8>, GroupSigError> {
        let mut transcript = common::transcript(SIGN_DOMAIN, self.code());
        self.credential.serialize_compressed(&mut transcript)?;
        self.sequence.serialize_compressed(&mut transcript)?;
        Ok(transcript)
    }

    fn code(&self) -> SchemeCode {
        if self.sequence.is_some() {
            SchemeCode::DL21SEQ
        } else {
            SchemeCode::DL21
        }
    }

    fn is_valid(&self, msg: &Message, ipk: &IssuerPublicKey<Curve>) -> Result<bool, GroupSigError> {
        if !self.credential.is_well_formed()
            || self.nym_base.is_zero()
            || self.spk_credential.t.len() != 1
            || self.spk_credential.response != self.spk_nym.response
        {
            return Ok(false);
        }
        let (base, target) = self.credential.statement(ipk);
        let mut transcript = self.transcript()?;
        self.spk_credential
            .challenge_contribution(&[base], &[target], &mut transcript)?;
        self.spk_nym
            .challenge_contribution(&self.nym_base, &self.nym, &mut transcript)?;
        common::append_message(&mut transcript, msg);
        let challenge = common::challenge::<Fr>(&transcript);
        Ok(self.spk_nym.verify(&self.nym, &self.nym_base, &challenge)
            && self
                .spk_credential
                .verify(&[target], &[base], &challenge)?)
    }
}

/// Proof that all pseudonyms have the same secret, bound to `msg`
fn link_proof(
    rng: &mut dyn RngCore,
    domain: &[u8],
    code: SchemeCode,
    sk: &Fr,
    sigs: &[Dl21Signature],
    msg: &Message,
) -> Result<EqualDiscreteLogs<G1Affine>, GroupSigError> {
    let (bases, nyms): (Vec<_>, Vec<_>) = sigs.iter().map(|s| (s.nym_base, s.nym)).unzip();
    let protocol = EqualDiscreteLogsProtocol::init(*sk, Fr::rand(rng), &bases)?;
    let mut transcript = common::transcript(domain, code);
    protocol.challenge_contribution(&bases, &nyms, &mut transcript)?;
    common::append_message(&mut transcript, msg);
    Ok(protocol.gen_proof(&common::challenge(&transcript)))
}

fn verify_link_proof(
    domain: &[u8],
    code: SchemeCode,
    proof: &EqualDiscreteLogs<G1Affine>,
    sigs: &[Dl21Signature],
    msg: &Message,
) -> Result<bool, GroupSigError> {
    let (bases, nyms): (Vec<_>, Vec<_>) = sigs.iter().map(|s| (s.nym_base, s.nym)).unzip();
    if bases.is_empty() || proof.t.len() != bases.len() {
        return Ok(false);
    }
    let mut transcript = common::transcript(domain, code);
    proof.challenge_contribution(&bases, &nyms, &mut transcript)?;
    common::append_message(&mut transcript, msg);
    Ok(proof.verify(&nyms, &bases, &common::challenge(&transcript))?)
}

impl Dl21 {
    fn code(&self) -> SchemeCode {
        self.description().code
    }

    fn decode_valid(
        &self,
        sigs: &[Signature],
        msgs: &[Message],
        ipk: &IssuerPublicKey<Curve>,
    ) -> Result<Option<Vec<Dl21Signature>>, GroupSigError> {
        if sigs.len() != msgs.len() {
            return Err(GroupSigError::ExpectedSameSizeSequences(
                sigs.len(),
                msgs.len(),
            ));
        }
        let mut decoded = Vec::with_capacity(sigs.len());
        for (sig, msg) in sigs.iter().zip(msgs) {
            let sig = match sig.to_typed::<Dl21Signature>() {
                Ok(sig) => sig,
                Err(_) => return Ok(None),
            };
            if sig.sequence.is_some() != self.sequential || !sig.is_valid(msg, ipk)? {
                return Ok(None);
            }
            decoded.push(sig);
        }
        Ok(Some(decoded))
    }

    /// Valid signatures whose pseudonyms are all of the member, `None` otherwise
    fn member_signatures(
        &self,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<Option<(CredentialKey<Curve>, Vec<Dl21Signature>)>, GroupSigError> {
        let key = memkey.to_typed::<CredentialKey<Curve>>()?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        let sigs = match self.decode_valid(sigs, msgs, &ipk)? {
            Some(sigs) => sigs,
            None => return Ok(None),
        };
        if sigs
            .iter()
            .any(|s| (s.nym_base * key.sk).into_affine() != s.nym)
        {
            return Ok(None);
        }
        Ok(Some((key, sigs)))
    }
}

impl GroupSignatureScheme for Dl21 {
    fn description(&self) -> &'static SchemeDescription {
        if self.sequential {
            &DL21SEQ_DESCRIPTION
        } else {
            &DL21_DESCRIPTION
        }
    }

    fn init(&self) -> Result<SchemeParams, GroupSigError> {
        SchemeParams::from_typed(
            self.code(),
            &SetupParams::<Curve>::new::<Blake2b512>(b"DL21 : setup params"),
        )
    }

    fn setup(
        &self,
        rng: &mut dyn RngCore,
        params: &SchemeParams,
        grpkey: Option<&GroupKey>,
    ) -> Result<(GroupKey, ManagerKey), GroupSigError> {
        if grpkey.is_some() {
            return Err(GroupSigError::SetupAlreadyComplete);
        }
        let params = params.to_typed::<SetupParams<Curve>>()?;
        let (isk, ipk) = credential::issuer_setup(rng, &params);
        Ok((
            GroupKey::from_typed(self.code(), &ipk)?,
            ManagerKey::from_typed(self.code(), ManagerRole::Issuer, &isk)?,
        ))
    }

    fn join_mgr(
        &self,
        rng: &mut dyn RngCore,
        seq: u8,
        msg_in: Option<&JoinMessage>,
        mgrkey: &ManagerKey,
        grpkey: &GroupKey,
        gml: &mut Gml,
    ) -> Result<JoinMessage, GroupSigError> {
        let isk = mgrkey.to_typed::<IssuerSecretKey<Fr>>()?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        credential::manager_join_step(rng, self.code(), seq, msg_in, &isk, &ipk, gml)
    }

    fn join_mem(
        &self,
        rng: &mut dyn RngCore,
        seq: u8,
        msg_in: Option<&JoinMessage>,
        memkey: Option<&MemberKey>,
        grpkey: &GroupKey,
    ) -> Result<JoinStep, GroupSigError> {
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        credential::member_join_step(rng, self.code(), seq, msg_in, memkey, &ipk)
    }

    fn sign(
        &self,
        rng: &mut dyn RngCore,
        msg: &Message,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        seed: u32,
    ) -> Result<Signature, GroupSigError> {
        let key = memkey.to_typed::<CredentialKey<Curve>>()?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        let credential = key.credential()?.randomize(rng);
        let (base, target) = credential.statement(&ipk);
        let nym_base = <G1Affine as AffineRepr>::Group::rand(rng).into_affine();
        let nym = (nym_base * key.sk).into_affine();
        let sequence = if self.sequential {
            Some(SequenceTags::new(&prf_key(&key.sk)?, seed, &nym)?)
        } else {
            None
        };

        // Same blinding for both so the responses are equal
        let blinding = Fr::rand(rng);
        let protocol_credential =
            PokTargetGroupDiscreteLogProtocol::init(key.sk, blinding, &[base])?;
        let protocol_nym = PokDiscreteLogProtocol::init(key.sk, blinding, &nym_base);

        let mut transcript = common::transcript(SIGN_DOMAIN, self.code());
        credential.serialize_compressed(&mut transcript)?;
        sequence.serialize_compressed(&mut transcript)?;
        protocol_credential.challenge_contribution(&[base], &[target], &mut transcript)?;
        protocol_nym.challenge_contribution(&nym_base, &nym, &mut transcript)?;
        common::append_message(&mut transcript, msg);
        let challenge = common::challenge::<Fr>(&transcript);

        let sig = Dl21Signature {
            credential,
            nym_base,
            nym,
            sequence,
            spk_credential: protocol_credential.gen_proof(&challenge),
            spk_nym: protocol_nym.gen_proof(&challenge),
        };
        Signature::from_typed(self.code(), &sig)
    }

    fn verify(
        &self,
        sig: &Signature,
        msg: &Message,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        let sig = match sig.to_typed::<Dl21Signature>() {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        if sig.sequence.is_some() != self.sequential {
            return Ok(false);
        }
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        sig.is_valid(msg, &ipk)
    }

    fn identify(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
        memkey: &MemberKey,
        sig: &Signature,
        msg: &Message,
    ) -> Result<Option<Proof>, GroupSigError> {
        let (key, sigs) = match self.member_signatures(
            memkey,
            grpkey,
            ark_std::slice::from_ref(sig),
            ark_std::slice::from_ref(msg),
        )? {
            Some(found) => found,
            None => return Ok(None),
        };
        let proof = link_proof(rng, IDENTIFY_DOMAIN, self.code(), &key.sk, &sigs, msg)?;
        Ok(Some(Proof::from_typed(self.code(), &proof)?))
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
        let (key, sigs) = match self.member_signatures(memkey, grpkey, sigs, msgs)? {
            Some(found) => found,
            None => return Ok(None),
        };
        let proof = link_proof(rng, LINK_DOMAIN, self.code(), &key.sk, &sigs, msg)?;
        Ok(Some(Proof::from_typed(self.code(), &proof)?))
    }

    fn verify_link(
        &self,
        grpkey: &GroupKey,
        proof: &Proof,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<bool, GroupSigError> {
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        let sigs = match self.decode_valid(sigs, msgs, &ipk)? {
            Some(sigs) => sigs,
            None => return Ok(false),
        };
        let proof = proof.to_typed::<EqualDiscreteLogs<G1Affine>>()?;
        verify_link_proof(LINK_DOMAIN, self.code(), &proof, &sigs, msg)
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
        if !self.sequential {
            return Err(self.unsupported("seqlink"));
        }
        let (key, sigs) = match self.member_signatures(memkey, grpkey, sigs, msgs)? {
            Some(found) => found,
            None => return Ok(None),
        };
        let key_bytes = prf_key(&key.sk)?;
        let mut revealed = Vec::with_capacity(sigs.len());
        for sig in &sigs {
            let sealed = match &sig.sequence {
                Some(tags) => tags.sealed_position,
                None => return Ok(None),
            };
            let position = sealed ^ seal_mask(&key_bytes, &sig.nym)?;
            revealed.push(prf(&key_bytes, position));
        }
        let proof = SeqLinkProof {
            link: link_proof(rng, SEQLINK_DOMAIN, self.code(), &key.sk, &sigs, msg)?,
            revealed,
        };
        Ok(Some(Proof::from_typed(self.code(), &proof)?))
    }

    fn verify_seqlink(
        &self,
        grpkey: &GroupKey,
        proof: &Proof,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<bool, GroupSigError> {
        if !self.sequential {
            return Err(self.unsupported("verify_seqlink"));
        }
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        let sigs = match self.decode_valid(sigs, msgs, &ipk)? {
            Some(sigs) => sigs,
            None => return Ok(false),
        };
        let proof = proof.to_typed::<SeqLinkProof>()?;
        if proof.revealed.len() != sigs.len() {
            return Ok(false);
        }
        for (j, (sig, x)) in sigs.iter().zip(&proof.revealed).enumerate() {
            let tags = match &sig.sequence {
                Some(tags) => tags,
                None => return Ok(false),
            };
            if tags.current != current_tag(x) {
                return Ok(false);
            }
            if j > 0 && tags.chain != chain_tag(&proof.revealed[j - 1], x) {
                log::debug!("DL21SEQ signature {} does not follow signature {}", j, j - 1);
                return Ok(false);
            }
        }
        verify_link_proof(SEQLINK_DOMAIN, self.code(), &proof.link, &sigs, msg)
    }
}

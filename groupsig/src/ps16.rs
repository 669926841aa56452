//! PS16 group signatures, from the paper [Short Randomizable Signatures](https://eprint.iacr.org/2015/525).
//!
//! A signature is a randomized credential together with a signature of knowledge of the member
//! secret it certifies. The manager issues credentials and opens signatures: the group membership
//! list stores `ttau = Y * sk` of every member, and `e(sigma1, ttau)` equals the statement target
//! of a signature exactly for its signer. Revealing a member puts its `ttau` in the revocation list
//! so that anyone holding the list can trace that member's signatures.

use crate::{
    common::{self, Curve, Fr, G1Affine, G2Affine, SetupParams},
    credential::{self, Credential, CredentialKey, IssuerPublicKey, IssuerSecretKey, MemberRecord},
    crl::Crl,
    error::GroupSigError,
    gml::Gml,
    join::JoinStep,
    message::Message,
    objects::{GroupKey, JoinMessage, ManagerKey, MemberKey, Proof, SchemeParams, Signature, Trapdoor},
    scheme::{GroupSignatureScheme, ManagerRole, Opening, SchemeCode, SchemeDescription},
};
use ark_ec::pairing::Pairing;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, vec::Vec, UniformRand};
use blake2::Blake2b512;
use groupsig_spk::target_group::{
    PokG2InPairing, PokG2InPairingProtocol, PokTargetGroupDiscreteLog,
    PokTargetGroupDiscreteLogProtocol,
};
use groupsig_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

const SIGN_DOMAIN: &[u8] = b"PS16-SIGN";
const OPEN_DOMAIN: &[u8] = b"PS16-OPEN";
const CLAIM_DOMAIN: &[u8] = b"PS16-CLAIM";
const EQUALITY_DOMAIN: &[u8] = b"PS16-PROVE-EQUALITY";

static DESCRIPTION: SchemeDescription = SchemeDescription {
    code: SchemeCode::PS16,
    name: "PS16",
    has_gml: true,
    has_crl: true,
    has_open_proof: true,
    join_start: 0,
    join_seq: 3,
};

pub struct Ps16;

#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Ps16Signature {
    pub credential: Credential<Curve>,
    pub spk: PokTargetGroupDiscreteLog<Curve>,
}

/// Proof that a signature opens to the member with the given `tau`
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct OpenProof {
    #[serde_as(as = "ArkObjectBytes")]
    pub tau: G1Affine,
    pub spk: PokG2InPairing<Curve>,
}

impl Ps16Signature {
    fn transcript(&self, domain: &[u8]) -> Result<Vec<u8>, GroupSigError> {
        let mut transcript = common::transcript(domain, SchemeCode::PS16);
        self.credential.serialize_compressed(&mut transcript)?;
        Ok(transcript)
    }
}

/// Anchors and targets of the opening statement: `e(sigma1, ttau)` is the signature's target and
/// `e(g, ttau) = e(tau, Y)` ties `ttau` to the member's `tau`.
fn open_statement(
    sig: &Ps16Signature,
    ipk: &IssuerPublicKey<Curve>,
    tau: &G1Affine,
) -> ([G1Affine; 2], [common::Gt; 2]) {
    let (_, target) = sig.credential.statement(ipk);
    (
        [sig.credential.sigma1, ipk.g],
        [target, Curve::pairing(*tau, ipk.Y)],
    )
}

/// Signature of knowledge of the single secret behind the statements of all `sigs`, or `None`
/// when `sk` is not that secret
fn prove_secret(
    rng: &mut dyn RngCore,
    domain: &[u8],
    sk: &Fr,
    sigs: &[Ps16Signature],
    ipk: &IssuerPublicKey<Curve>,
) -> Result<Option<PokTargetGroupDiscreteLog<Curve>>, GroupSigError> {
    let (bases, targets): (Vec<_>, Vec<_>) = sigs.iter().map(|s| s.credential.statement(ipk)).unzip();
    if bases.iter().zip(&targets).any(|(b, t)| *b * sk != *t) {
        return Ok(None);
    }
    let protocol = PokTargetGroupDiscreteLogProtocol::init(*sk, Fr::rand(rng), &bases)?;
    let mut transcript = common::transcript(domain, SchemeCode::PS16);
    for sig in sigs {
        sig.credential.serialize_compressed(&mut transcript)?;
    }
    protocol.challenge_contribution(&bases, &targets, &mut transcript)?;
    Ok(Some(protocol.gen_proof(&common::challenge(&transcript))))
}

fn verify_secret(
    domain: &[u8],
    spk: &PokTargetGroupDiscreteLog<Curve>,
    sigs: &[Ps16Signature],
    ipk: &IssuerPublicKey<Curve>,
) -> Result<bool, GroupSigError> {
    if sigs.is_empty() || sigs.iter().any(|s| !s.credential.is_well_formed()) {
        return Ok(false);
    }
    let (bases, targets): (Vec<_>, Vec<_>) = sigs.iter().map(|s| s.credential.statement(ipk)).unzip();
    let mut transcript = common::transcript(domain, SchemeCode::PS16);
    for sig in sigs {
        sig.credential.serialize_compressed(&mut transcript)?;
    }
    if spk.t.len() != bases.len() {
        return Ok(false);
    }
    spk.challenge_contribution(&bases, &targets, &mut transcript)?;
    Ok(spk.verify(&targets, &bases, &common::challenge(&transcript))?)
}

fn prove_with_key(
    rng: &mut dyn RngCore,
    domain: &[u8],
    memkey: &MemberKey,
    grpkey: &GroupKey,
    sigs: &[Signature],
) -> Result<Option<Proof>, GroupSigError> {
    let key = memkey.to_typed::<CredentialKey<Curve>>()?;
    let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
    let sigs = decode_signatures(sigs)?;
    prove_secret(rng, domain, &key.sk, &sigs, &ipk)?
        .map(|spk| Proof::from_typed(SchemeCode::PS16, &spk))
        .transpose()
}

fn decode_signatures(sigs: &[Signature]) -> Result<Vec<Ps16Signature>, GroupSigError> {
    sigs.iter().map(|s| s.to_typed()).collect()
}

impl GroupSignatureScheme for Ps16 {
    fn description(&self) -> &'static SchemeDescription {
        &DESCRIPTION
    }

    fn init(&self) -> Result<SchemeParams, GroupSigError> {
        SchemeParams::from_typed(
            SchemeCode::PS16,
            &SetupParams::<Curve>::new::<Blake2b512>(b"PS16 : setup params"),
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
            GroupKey::from_typed(SchemeCode::PS16, &ipk)?,
            ManagerKey::from_typed(SchemeCode::PS16, ManagerRole::Manager, &isk)?,
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
        credential::manager_join_step(rng, SchemeCode::PS16, seq, msg_in, &isk, &ipk, gml)
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
        credential::member_join_step(rng, SchemeCode::PS16, seq, msg_in, memkey, &ipk)
    }

    fn sign(
        &self,
        rng: &mut dyn RngCore,
        msg: &Message,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        _seed: u32,
    ) -> Result<Signature, GroupSigError> {
        let key = memkey.to_typed::<CredentialKey<Curve>>()?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        let credential = key.credential()?.randomize(rng);
        let (base, target) = credential.statement(&ipk);

        let protocol = PokTargetGroupDiscreteLogProtocol::init(key.sk, Fr::rand(rng), &[base])?;
        let mut transcript = common::transcript(SIGN_DOMAIN, SchemeCode::PS16);
        credential.serialize_compressed(&mut transcript)?;
        protocol.challenge_contribution(&[base], &[target], &mut transcript)?;
        common::append_message(&mut transcript, msg);
        let spk = protocol.gen_proof(&common::challenge(&transcript));
        Signature::from_typed(SchemeCode::PS16, &Ps16Signature { credential, spk })
    }

    fn verify(
        &self,
        sig: &Signature,
        msg: &Message,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        let sig = match sig.to_typed::<Ps16Signature>() {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        if !sig.credential.is_well_formed() || sig.spk.t.len() != 1 {
            return Ok(false);
        }
        let (base, target) = sig.credential.statement(&ipk);
        let mut transcript = sig.transcript(SIGN_DOMAIN)?;
        sig.spk
            .challenge_contribution(&[base], &[target], &mut transcript)?;
        common::append_message(&mut transcript, msg);
        Ok(sig
            .spk
            .verify(&[target], &[base], &common::challenge(&transcript))?)
    }

    fn open(
        &self,
        rng: &mut dyn RngCore,
        sig: &Signature,
        grpkey: &GroupKey,
        _mgrkey: &ManagerKey,
        gml: &Gml,
    ) -> Result<Opening, GroupSigError> {
        let sig = sig.to_typed::<Ps16Signature>()?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        if !sig.credential.is_well_formed() {
            return Err(GroupSigError::OpenFailure);
        }
        let (_, target) = sig.credential.statement(&ipk);
        for entry in gml.iter() {
            let record = entry.to_typed::<MemberRecord<Curve>>()?;
            if Curve::pairing(sig.credential.sigma1, record.ttau) != target {
                continue;
            }
            let (anchors, targets) = open_statement(&sig, &ipk, &record.tau);
            let protocol = PokG2InPairingProtocol::<Curve>::init(
                record.ttau,
                G2Affine::rand(rng),
                &anchors,
            )?;
            let mut transcript = sig.transcript(OPEN_DOMAIN)?;
            record.tau.serialize_compressed(&mut transcript)?;
            protocol.challenge_contribution(&anchors, &targets, &mut transcript)?;
            let proof = OpenProof {
                tau: record.tau,
                spk: protocol.gen_proof(&common::challenge(&transcript)),
            };
            log::trace!("PS16 signature opened to member {}", entry.index);
            return Ok(Opening {
                index: entry.index,
                proof: Some(Proof::from_typed(SchemeCode::PS16, &proof)?),
            });
        }
        Err(GroupSigError::OpenFailure)
    }

    fn open_verify(
        &self,
        proof: &Proof,
        sig: &Signature,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        let proof = proof.to_typed::<OpenProof>()?;
        let sig = sig.to_typed::<Ps16Signature>()?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        if !sig.credential.is_well_formed() || proof.spk.t.len() != 2 {
            return Ok(false);
        }
        let (anchors, targets) = open_statement(&sig, &ipk, &proof.tau);
        let mut transcript = sig.transcript(OPEN_DOMAIN)?;
        proof.tau.serialize_compressed(&mut transcript)?;
        proof
            .spk
            .challenge_contribution(&anchors, &targets, &mut transcript)?;
        Ok(proof
            .spk
            .verify(&targets, &anchors, &common::challenge(&transcript))?)
    }

    fn reveal(&self, crl: &mut Crl, gml: &Gml, index: u64) -> Result<Trapdoor, GroupSigError> {
        if let Some(trapdoor) = crl.get(index) {
            return Ok(trapdoor.clone());
        }
        let record = gml
            .get(index)
            .ok_or(GroupSigError::UnknownMember(index))?
            .to_typed::<MemberRecord<Curve>>()?;
        let trapdoor = Trapdoor::from_typed(SchemeCode::PS16, &record.ttau)?;
        crl.insert(index, trapdoor.clone());
        Ok(trapdoor)
    }

    fn trace(
        &self,
        sig: &Signature,
        grpkey: &GroupKey,
        crl: &Crl,
        _mgrkey: &ManagerKey,
        _gml: &Gml,
    ) -> Result<bool, GroupSigError> {
        let sig = sig.to_typed::<Ps16Signature>()?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        if !sig.credential.is_well_formed() {
            return Ok(false);
        }
        let (_, target) = sig.credential.statement(&ipk);
        for entry in crl.iter() {
            let ttau = entry.trapdoor.to_typed::<G2Affine>()?;
            if Curve::pairing(sig.credential.sigma1, ttau) == target {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn claim(
        &self,
        rng: &mut dyn RngCore,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        sig: &Signature,
    ) -> Result<Option<Proof>, GroupSigError> {
        prove_with_key(rng, CLAIM_DOMAIN, memkey, grpkey, ark_std::slice::from_ref(sig))
    }

    fn claim_verify(
        &self,
        proof: &Proof,
        sig: &Signature,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        let spk = proof.to_typed::<PokTargetGroupDiscreteLog<Curve>>()?;
        let sigs = decode_signatures(ark_std::slice::from_ref(sig))?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        verify_secret(CLAIM_DOMAIN, &spk, &sigs, &ipk)
    }

    fn prove_equality(
        &self,
        rng: &mut dyn RngCore,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        sigs: &[Signature],
    ) -> Result<Option<Proof>, GroupSigError> {
        if sigs.is_empty() {
            return Ok(None);
        }
        prove_with_key(rng, EQUALITY_DOMAIN, memkey, grpkey, sigs)
    }

    fn prove_equality_verify(
        &self,
        proof: &Proof,
        grpkey: &GroupKey,
        sigs: &[Signature],
    ) -> Result<bool, GroupSigError> {
        let spk = proof.to_typed::<PokTargetGroupDiscreteLog<Curve>>()?;
        let sigs = decode_signatures(sigs)?;
        let ipk = grpkey.to_typed::<IssuerPublicKey<Curve>>()?;
        verify_secret(EQUALITY_DOMAIN, &spk, &sigs, &ipk)
    }
}

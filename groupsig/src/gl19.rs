//! GL19 group signatures with blind conversion.
//!
//! Two authorities share the group: the issuer runs the join protocol and the converter holds the
//! secret `z` of the encryption key `epk = g * z`. Every signature carries a randomized credential
//! and an ElGamal encryption of the member's identity element `h * sk` under `epk`, both proven to
//! be on the same secret.
//!
//! Conversion lets a requester learn which of a batch of signatures were produced by the same
//! member and nothing more:
//! 1. The requester blinds each signature under its blinding public key `bpk = g * bsk`, turning
//!    the identity ciphertext into a double encryption under `epk` and `bpk`.
//! 2. The converter strips its layer, raises every identity element to a single random `rho` for
//!    the whole batch, rerandomizes and shuffles.
//! 3. The requester decrypts each result to `h * (sk * rho)`. Equal values mean equal signers within
//!    one batch, while batches converted separately use unrelated `rho`.

use crate::{
    common::{self, Curve, Fr, G1Affine, SetupParams},
    credential::{self, Credential, CredentialKey, IssuerPublicKey, IssuerSecretKey},
    error::GroupSigError,
    gml::Gml,
    join::JoinStep,
    message::Message,
    objects::{
        BlindSignature, BlindingKey, GroupKey, Identity, JoinMessage, ManagerKey, MemberKey,
        SchemeParams, Signature,
    },
    scheme::{GroupSignatureScheme, ManagerRole, SchemeCode, SchemeDescription},
};
use ark_ec::{AffineRepr, CurveGroup};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    rand::{seq::SliceRandom, RngCore},
    vec::Vec,
    UniformRand,
};
use blake2::Blake2b512;
use groupsig_spk::{
    discrete_log::{
        PokDiscreteLog, PokDiscreteLogProtocol, PokTwoDiscreteLogs, PokTwoDiscreteLogsProtocol,
    },
    target_group::{PokTargetGroupDiscreteLog, PokTargetGroupDiscreteLogProtocol},
};
use groupsig_utils::{
    elgamal::{self, Ciphertext},
    serde_utils::ArkObjectBytes,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

const SIGN_DOMAIN: &[u8] = b"GL19-SIGN";

static DESCRIPTION: SchemeDescription = SchemeDescription {
    code: SchemeCode::GL19,
    name: "GL19",
    has_gml: true,
    has_crl: false,
    has_open_proof: false,
    join_start: 0,
    join_seq: 3,
};

pub struct Gl19;

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Gl19GroupKey {
    pub issuer: IssuerPublicKey<Curve>,
    /// Base of member identity elements
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G1Affine,
    /// Converter encryption key, set by the second setup call
    #[serde_as(as = "Option<ArkObjectBytes>")]
    pub converter: Option<G1Affine>,
}

#[serde_as]
#[derive(
    Clone,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
pub struct ConverterKey {
    #[serde_as(as = "ArkObjectBytes")]
    pub z: Fr,
}

#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Gl19Signature {
    pub credential: Credential<Curve>,
    /// Encryption of `h * sk` under the converter key
    pub identity: Ciphertext<G1Affine>,
    pub spk_credential: PokTargetGroupDiscreteLog<Curve>,
    /// Knowledge of the encryption randomness `r` in `enc2 = g * r`
    pub spk_randomness: PokDiscreteLog<G1Affine>,
    /// Knowledge of `r` and `sk` in `enc1 = epk * r + h * sk`
    pub spk_identity: PokTwoDiscreteLogs<G1Affine>,
}

/// Output of `blind`: the identity element encrypted under both the converter key and the
/// blinding key. The converter key layer has randomness in `outer.enc2`, the blinding key layer
/// in `inner_ephemeral`.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct BlindedSignature {
    pub outer: Ciphertext<G1Affine>,
    #[serde_as(as = "ArkObjectBytes")]
    pub inner_ephemeral: G1Affine,
}

impl Gl19GroupKey {
    fn converter_key(&self) -> Result<&G1Affine, GroupSigError> {
        self.converter
            .as_ref()
            .ok_or(GroupSigError::IncompleteGroupKey)
    }
}

impl Gl19Signature {
    fn is_valid(&self, msg: &Message, gpk: &Gl19GroupKey) -> Result<bool, GroupSigError> {
        let epk = gpk.converter_key()?;
        let g = &gpk.issuer.g;
        if !self.credential.is_well_formed()
            || self.spk_credential.t.len() != 1
            || self.spk_randomness.response != self.spk_identity.response1
            || self.spk_credential.response != self.spk_identity.response2
        {
            return Ok(false);
        }
        let (base, target) = self.credential.statement(&gpk.issuer);
        let mut transcript = common::transcript(SIGN_DOMAIN, SchemeCode::GL19);
        self.credential.serialize_compressed(&mut transcript)?;
        self.identity.serialize_compressed(&mut transcript)?;
        self.spk_credential
            .challenge_contribution(&[base], &[target], &mut transcript)?;
        self.spk_randomness
            .challenge_contribution(g, &self.identity.enc2, &mut transcript)?;
        self.spk_identity.challenge_contribution(
            epk,
            &gpk.h,
            &self.identity.enc1,
            &mut transcript,
        )?;
        common::append_message(&mut transcript, msg);
        let challenge = common::challenge::<Fr>(&transcript);
        Ok(self.spk_randomness.verify(&self.identity.enc2, g, &challenge)
            && self
                .spk_identity
                .verify(&self.identity.enc1, epk, &gpk.h, &challenge)
            && self
                .spk_credential
                .verify(&[target], &[base], &challenge)?)
    }
}

impl GroupSignatureScheme for Gl19 {
    fn description(&self) -> &'static SchemeDescription {
        &DESCRIPTION
    }

    fn init(&self) -> Result<SchemeParams, GroupSigError> {
        SchemeParams::from_typed(
            SchemeCode::GL19,
            &SetupParams::<Curve>::new::<Blake2b512>(b"GL19 : setup params"),
        )
    }

    /// The first call creates the issuer key, the second the converter key. Only the group key
    /// returned by the second call can be used to sign.
    fn setup(
        &self,
        rng: &mut dyn RngCore,
        params: &SchemeParams,
        grpkey: Option<&GroupKey>,
    ) -> Result<(GroupKey, ManagerKey), GroupSigError> {
        match grpkey {
            None => {
                let params = params.to_typed::<SetupParams<Curve>>()?;
                let (isk, issuer) = credential::issuer_setup(rng, &params);
                let gpk = Gl19GroupKey {
                    issuer,
                    h: params.h,
                    converter: None,
                };
                Ok((
                    GroupKey::from_typed(SchemeCode::GL19, &gpk)?,
                    ManagerKey::from_typed(SchemeCode::GL19, ManagerRole::Issuer, &isk)?,
                ))
            }
            Some(grpkey) => {
                let mut gpk = grpkey.to_typed::<Gl19GroupKey>()?;
                if gpk.converter.is_some() {
                    return Err(GroupSigError::SetupAlreadyComplete);
                }
                let (z, epk) = elgamal::keygen(rng, &gpk.issuer.g);
                let csk = ConverterKey { z: z.0 };
                gpk.converter = Some(epk.0);
                Ok((
                    GroupKey::from_typed(SchemeCode::GL19, &gpk)?,
                    ManagerKey::from_typed(SchemeCode::GL19, ManagerRole::Converter, &csk)?,
                ))
            }
        }
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
        let gpk = grpkey.to_typed::<Gl19GroupKey>()?;
        credential::manager_join_step(rng, SchemeCode::GL19, seq, msg_in, &isk, &gpk.issuer, gml)
    }

    fn join_mem(
        &self,
        rng: &mut dyn RngCore,
        seq: u8,
        msg_in: Option<&JoinMessage>,
        memkey: Option<&MemberKey>,
        grpkey: &GroupKey,
    ) -> Result<JoinStep, GroupSigError> {
        let gpk = grpkey.to_typed::<Gl19GroupKey>()?;
        credential::member_join_step(rng, SchemeCode::GL19, seq, msg_in, memkey, &gpk.issuer)
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
        let gpk = grpkey.to_typed::<Gl19GroupKey>()?;
        let epk = gpk.converter_key()?;
        let g = &gpk.issuer.g;

        let credential = key.credential()?.randomize(rng);
        let (base, target) = credential.statement(&gpk.issuer);
        let identity_elem = (gpk.h * key.sk).into_affine();
        let (identity, r) = Ciphertext::new(rng, &identity_elem, epk, g);

        // Shared blindings tie `sk` and `r` across the three proofs
        let blinding_sk = Fr::rand(rng);
        let blinding_r = Fr::rand(rng);
        let protocol_credential =
            PokTargetGroupDiscreteLogProtocol::init(key.sk, blinding_sk, &[base])?;
        let protocol_randomness = PokDiscreteLogProtocol::init(r, blinding_r, g);
        let protocol_identity =
            PokTwoDiscreteLogsProtocol::init(r, blinding_r, epk, key.sk, blinding_sk, &gpk.h);

        let mut transcript = common::transcript(SIGN_DOMAIN, SchemeCode::GL19);
        credential.serialize_compressed(&mut transcript)?;
        identity.serialize_compressed(&mut transcript)?;
        protocol_credential.challenge_contribution(&[base], &[target], &mut transcript)?;
        protocol_randomness.challenge_contribution(g, &identity.enc2, &mut transcript)?;
        protocol_identity.challenge_contribution(epk, &gpk.h, &identity.enc1, &mut transcript)?;
        common::append_message(&mut transcript, msg);
        let challenge = common::challenge::<Fr>(&transcript);

        let sig = Gl19Signature {
            credential,
            identity,
            spk_credential: protocol_credential.gen_proof(&challenge),
            spk_randomness: protocol_randomness.gen_proof(&challenge),
            spk_identity: protocol_identity.gen_proof(&challenge),
        };
        Signature::from_typed(SchemeCode::GL19, &sig)
    }

    fn verify(
        &self,
        sig: &Signature,
        msg: &Message,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        let sig = match sig.to_typed::<Gl19Signature>() {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        let gpk = grpkey.to_typed::<Gl19GroupKey>()?;
        sig.is_valid(msg, &gpk)
    }

    fn blinding_keygen(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
    ) -> Result<BlindingKey, GroupSigError> {
        let gpk = grpkey.to_typed::<Gl19GroupKey>()?;
        let (bsk, bpk) = elgamal::keygen(rng, &gpk.issuer.g);
        BlindingKey::from_typed(SchemeCode::GL19, &bpk.0, Some(&bsk.0))
    }

    fn blind(
        &self,
        rng: &mut dyn RngCore,
        grpkey: &GroupKey,
        sig: &Signature,
        msg: &Message,
        bldkey: &BlindingKey,
    ) -> Result<BlindSignature, GroupSigError> {
        let sig = sig
            .to_typed::<Gl19Signature>()
            .map_err(|_| GroupSigError::InvalidSignature)?;
        let gpk = grpkey.to_typed::<Gl19GroupKey>()?;
        if !sig.is_valid(msg, &gpk)? {
            return Err(GroupSigError::InvalidSignature);
        }
        let epk = gpk.converter_key()?;
        let g = &gpk.issuer.g;
        let bpk = bldkey.public_to_typed::<G1Affine>()?;

        let b = Fr::rand(rng);
        let mut outer = sig.identity.add_randomness(&Fr::rand(rng), epk, g);
        outer.enc1 = (bpk * b + outer.enc1).into_affine();
        let blinded = BlindedSignature {
            outer,
            inner_ephemeral: (*g * b).into_affine(),
        };
        BlindSignature::from_typed(SchemeCode::GL19, false, &blinded)
    }

    fn convert(
        &self,
        rng: &mut dyn RngCore,
        bsigs: &[BlindSignature],
        grpkey: &GroupKey,
        mgrkey: &ManagerKey,
        bldkey: &BlindingKey,
        _msg: Option<&Message>,
    ) -> Result<Vec<BlindSignature>, GroupSigError> {
        let gpk = grpkey.to_typed::<Gl19GroupKey>()?;
        let csk = mgrkey.to_typed::<ConverterKey>()?;
        let bpk = bldkey.public_to_typed::<G1Affine>()?;
        let g = &gpk.issuer.g;

        // One exponent for the whole batch
        let rho = Fr::rand(rng);
        let mut converted = bsigs
            .iter()
            .map(|bsig| {
                let blinded = bsig.to_typed::<BlindedSignature>()?;
                let inner = Ciphertext {
                    enc1: blinded.outer.decrypt(&csk.z),
                    enc2: blinded.inner_ephemeral,
                }
                .scale(&rho)
                .rerandomize(&mut *rng, &bpk, g);
                BlindSignature::from_typed(SchemeCode::GL19, true, &inner)
            })
            .collect::<Result<Vec<_>, _>>()?;
        converted.shuffle(rng);
        Ok(converted)
    }

    fn unblind(
        &self,
        csig: &BlindSignature,
        bldkey: &BlindingKey,
    ) -> Result<Identity, GroupSigError> {
        let bsk = bldkey.secret_to_typed::<Fr>()?;
        let inner = csig.to_typed::<Ciphertext<G1Affine>>()?;
        let pseudonym = inner.decrypt(&bsk);
        if pseudonym.is_zero() {
            log::warn!("GL19 unblind produced the identity element");
        }
        Identity::from_typed(SchemeCode::GL19, &pseudonym)
    }
}

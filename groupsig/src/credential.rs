#![allow(non_snake_case)]

//! Pointcheval-Sanders credential on a member secret, shared by all shipped schemes.
//!
//! The issuer has secret `(x, y)` and public `X = gg * x` and `Y = gg * y`. A credential on member
//! secret `sk` is `(sigma1, sigma2)` with `sigma1 = g * u` for random `u` and
//! `sigma2 = sigma1 * (x + y * sk)`, which satisfies `e(sigma1, X + Y * sk) = e(sigma2, gg)`.
//! Multiplying both elements by the same random scalar gives an unlinkable credential on the same
//! secret, and knowledge of `sk` is then proved in the target group with the statement
//! `e(sigma1, Y) * sk = e(sigma2, gg) - e(sigma1, X)`.
//!
//! Issuance is the 4 step join protocol:
//! 0. Manager sends a fresh nonce with a tag only it can compute from the nonce.
//! 1. Member picks `sk` and sends `tau = g * sk`, `ttau = Y * sk` and a proof of knowledge of `sk`,
//!    bound to the nonce and tag.
//! 2. Manager checks the tag, the proof and `e(g, ttau) = e(tau, Y)`, records `(tau, ttau)` in the
//!    group membership list and sends a credential on `sk`.
//! 3. Member checks the credential against `sk`.

use crate::{
    common::{self, SetupParams},
    error::GroupSigError,
    gml::Gml,
    join::JoinStep,
    objects::{JoinMessage, MemberKey},
    scheme::SchemeCode,
};
use ark_ec::{
    pairing::{Pairing, PairingOutput},
    AffineRepr, CurveGroup,
};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, vec::Vec, UniformRand};
use blake2::Blake2b512;
use groupsig_spk::discrete_log::{PokDiscreteLog, PokDiscreteLogProtocol};
use groupsig_utils::{hashing_utils::hash_to_field, serde_utils::ArkObjectBytes, text};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

const JOIN_TAG_DST: &[u8] = b"GROUPSIG-JOIN-TAG";
const JOIN_DOMAIN: &[u8] = b"GROUPSIG-JOIN-REQUEST";

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct IssuerPublicKey<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub g: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub gg: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub X: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub Y: E::G2Affine,
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
pub struct IssuerSecretKey<F: PrimeField> {
    #[serde_as(as = "ArkObjectBytes")]
    pub x: F,
    #[serde_as(as = "ArkObjectBytes")]
    pub y: F,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Credential<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub sigma1: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub sigma2: E::G1Affine,
}

/// What the group membership list stores for a member
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct MemberRecord<E: Pairing> {
    /// `g * sk`
    #[serde_as(as = "ArkObjectBytes")]
    pub tau: E::G1Affine,
    /// `Y * sk`
    #[serde_as(as = "ArkObjectBytes")]
    pub ttau: E::G2Affine,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct JoinChallenge<F: PrimeField> {
    #[serde_as(as = "ArkObjectBytes")]
    pub nonce: F,
    #[serde_as(as = "ArkObjectBytes")]
    pub tag: F,
}

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct JoinRequest<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub nonce: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub tag: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub tau: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub ttau: E::G2Affine,
    pub pok: PokDiscreteLog<E::G1Affine>,
}

/// Member key of all shipped schemes. The credential is set by the member's last join step.
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
#[serde(bound = "")]
pub struct CredentialKey<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub sk: E::ScalarField,
    #[zeroize(skip)]
    pub credential: Option<Credential<E>>,
}

pub fn issuer_setup<E: Pairing, R: RngCore + ?Sized>(
    rng: &mut R,
    params: &SetupParams<E>,
) -> (IssuerSecretKey<E::ScalarField>, IssuerPublicKey<E>) {
    let x = E::ScalarField::rand(rng);
    let y = E::ScalarField::rand(rng);
    let XY = E::G2::normalize_batch(&[params.gg * x, params.gg * y]);
    (
        IssuerSecretKey { x, y },
        IssuerPublicKey {
            g: params.g,
            gg: params.gg,
            X: XY[0],
            Y: XY[1],
        },
    )
}

impl<F: PrimeField> IssuerSecretKey<F> {
    /// Tag binding a join nonce to this key
    pub fn join_tag(&self, nonce: &F) -> Result<F, GroupSigError> {
        let mut bytes = text::canonical_bytes(&(self.x, self.y, *nonce))?;
        let tag = hash_to_field::<F, Blake2b512>(JOIN_TAG_DST, &bytes);
        bytes.zeroize();
        Ok(tag)
    }
}

impl<E: Pairing> Credential<E> {
    pub fn is_well_formed(&self) -> bool {
        !self.sigma1.is_zero()
    }

    /// Same credential, unlinkable to this one
    pub fn randomize<R: RngCore + ?Sized>(&self, rng: &mut R) -> Self {
        let t = E::ScalarField::rand(rng);
        let s = E::G1::normalize_batch(&[self.sigma1 * t, self.sigma2 * t]);
        Self {
            sigma1: s[0],
            sigma2: s[1],
        }
    }

    /// Base `e(sigma1, Y)` and target `e(sigma2, gg) - e(sigma1, X)` in the target group. The
    /// discrete log of the target to the base is the member secret.
    pub fn statement(&self, ipk: &IssuerPublicKey<E>) -> (PairingOutput<E>, PairingOutput<E>) {
        let base = E::pairing(self.sigma1, ipk.Y);
        let target = E::multi_pairing(
            [self.sigma2.into_group(), -self.sigma1.into_group()],
            [ipk.gg, ipk.X],
        );
        (base, target)
    }

    pub fn verify(&self, sk: &E::ScalarField, ipk: &IssuerPublicKey<E>) -> bool {
        if !self.is_well_formed() {
            return false;
        }
        let (base, target) = self.statement(ipk);
        base * sk == target
    }
}

impl<E: Pairing> JoinRequest<E> {
    fn transcript(
        code: SchemeCode,
        nonce: &E::ScalarField,
        tag: &E::ScalarField,
        tau: &E::G1Affine,
        ttau: &E::G2Affine,
    ) -> Result<Vec<u8>, GroupSigError> {
        let mut transcript = common::transcript(JOIN_DOMAIN, code);
        nonce.serialize_compressed(&mut transcript)?;
        tag.serialize_compressed(&mut transcript)?;
        tau.serialize_compressed(&mut transcript)?;
        ttau.serialize_compressed(&mut transcript)?;
        Ok(transcript)
    }

    /// Returns the request and the member secret it commits to
    pub fn new<R: RngCore + ?Sized>(
        rng: &mut R,
        code: SchemeCode,
        challenge: &JoinChallenge<E::ScalarField>,
        ipk: &IssuerPublicKey<E>,
    ) -> Result<(Self, E::ScalarField), GroupSigError> {
        let sk = E::ScalarField::rand(rng);
        let tau = (ipk.g * sk).into_affine();
        let ttau = (ipk.Y * sk).into_affine();
        let protocol = PokDiscreteLogProtocol::init(sk, E::ScalarField::rand(rng), &ipk.g);
        let mut transcript =
            Self::transcript(code, &challenge.nonce, &challenge.tag, &tau, &ttau)?;
        protocol.challenge_contribution(&ipk.g, &tau, &mut transcript)?;
        let pok = protocol.gen_proof(&common::challenge(&transcript));
        Ok((
            Self {
                nonce: challenge.nonce,
                tag: challenge.tag,
                tau,
                ttau,
                pok,
            },
            sk,
        ))
    }

    pub fn verify(
        &self,
        code: SchemeCode,
        ipk: &IssuerPublicKey<E>,
    ) -> Result<bool, GroupSigError> {
        if self.tau.is_zero() {
            return Ok(false);
        }
        let mut transcript = Self::transcript(code, &self.nonce, &self.tag, &self.tau, &self.ttau)?;
        self.pok
            .challenge_contribution(&ipk.g, &self.tau, &mut transcript)?;
        if !self
            .pok
            .verify(&self.tau, &ipk.g, &common::challenge(&transcript))
        {
            return Ok(false);
        }
        Ok(E::pairing(ipk.g, self.ttau) == E::pairing(self.tau, ipk.Y))
    }
}

impl<E: Pairing> CredentialKey<E> {
    /// The credential of a key that completed the join protocol
    pub fn credential(&self) -> Result<&Credential<E>, GroupSigError> {
        self.credential
            .as_ref()
            .ok_or(GroupSigError::IncompleteMemberKey)
    }
}

fn reject(seq: u8, reason: &'static str) -> GroupSigError {
    GroupSigError::ProtocolSequence { seq, reason }
}

/// Manager side of the join protocol, steps 0 and 2
pub(crate) fn manager_join_step<E: Pairing>(
    rng: &mut dyn RngCore,
    code: SchemeCode,
    seq: u8,
    msg_in: Option<&JoinMessage>,
    isk: &IssuerSecretKey<E::ScalarField>,
    ipk: &IssuerPublicKey<E>,
    gml: &mut Gml,
) -> Result<JoinMessage, GroupSigError> {
    match (seq, msg_in) {
        (0, _) => {
            let nonce = E::ScalarField::rand(rng);
            let challenge = JoinChallenge {
                nonce,
                tag: isk.join_tag(&nonce)?,
            };
            JoinMessage::from_typed(code, 0, &challenge)
        }
        (2, Some(msg)) => {
            let request = msg
                .to_typed::<JoinRequest<E>>()
                .map_err(|_| reject(seq, "join request does not decode"))?;
            if isk.join_tag(&request.nonce)? != request.tag {
                return Err(reject(seq, "join request answers a challenge of another manager key"));
            }
            if !request.verify(code, ipk)? {
                return Err(reject(seq, "invalid proof of knowledge of the member secret"));
            }
            let record = text::canonical_bytes(&MemberRecord::<E> {
                tau: request.tau,
                ttau: request.ttau,
            })?;
            if gml.contains(&record) {
                return Err(reject(seq, "member is already in the group membership list"));
            }
            let u = E::ScalarField::rand(rng);
            let sigma1 = (ipk.g * u).into_affine();
            let sigma2 = (sigma1 * isk.x + request.tau * (isk.y * u)).into_affine();
            let out = JoinMessage::from_typed(code, 2, &Credential::<E> { sigma1, sigma2 })?;
            let index = gml.append(record);
            log::debug!("{} join: issued credential for member {}", code, index);
            Ok(out)
        }
        _ => Err(reject(seq, "no manager step at this index")),
    }
}

/// Member side of the join protocol, steps 1 and 3
pub(crate) fn member_join_step<E: Pairing>(
    rng: &mut dyn RngCore,
    code: SchemeCode,
    seq: u8,
    msg_in: Option<&JoinMessage>,
    memkey: Option<&MemberKey>,
    ipk: &IssuerPublicKey<E>,
) -> Result<JoinStep, GroupSigError> {
    match (seq, msg_in, memkey) {
        (1, Some(msg), _) => {
            let challenge = msg
                .to_typed::<JoinChallenge<E::ScalarField>>()
                .map_err(|_| reject(seq, "join challenge does not decode"))?;
            let (request, sk) = JoinRequest::new(rng, code, &challenge, ipk)?;
            let key = CredentialKey::<E> {
                sk,
                credential: None,
            };
            Ok(JoinStep {
                memkey: MemberKey::from_typed(code, &key)?,
                msg_out: Some(JoinMessage::from_typed(code, 1, &request)?),
            })
        }
        (3, Some(msg), Some(memkey)) => {
            let key = memkey.to_typed::<CredentialKey<E>>()?;
            let credential = msg
                .to_typed::<Credential<E>>()
                .map_err(|_| reject(seq, "credential does not decode"))?;
            if !credential.verify(&key.sk, ipk) {
                return Err(reject(seq, "credential does not match the member secret"));
            }
            let key = CredentialKey::<E> {
                sk: key.sk,
                credential: Some(credential),
            };
            Ok(JoinStep {
                memkey: MemberKey::from_typed(code, &key)?,
                msg_out: None,
            })
        }
        _ => Err(reject(seq, "no member step at this index")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Curve, Fr, G1Affine};
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    fn setup(rng: &mut StdRng) -> (IssuerSecretKey<Fr>, IssuerPublicKey<Curve>) {
        let params = SetupParams::<Curve>::new::<Blake2b512>(b"test");
        issuer_setup(rng, &params)
    }

    #[test]
    fn credential_on_member_secret() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let (isk, ipk) = setup(&mut rng);
        let sk = Fr::rand(&mut rng);
        let u = Fr::rand(&mut rng);
        let sigma1 = (ipk.g * u).into_affine();
        let sigma2 = (sigma1 * (isk.x + isk.y * sk)).into_affine();
        let credential = Credential::<Curve> { sigma1, sigma2 };
        assert!(credential.verify(&sk, &ipk));
        assert!(!credential.verify(&Fr::rand(&mut rng), &ipk));

        let randomized = credential.randomize(&mut rng);
        assert_ne!(randomized, credential);
        assert!(randomized.verify(&sk, &ipk));

        let zero = Credential::<Curve> {
            sigma1: G1Affine::zero(),
            sigma2: G1Affine::zero(),
        };
        assert!(!zero.is_well_formed());
        assert!(!zero.verify(&sk, &ipk));
        test_utils::test_serialization!(Credential<Curve>, randomized);
    }

    #[test]
    fn join_request() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let (isk, ipk) = setup(&mut rng);
        let nonce = Fr::rand(&mut rng);
        let challenge = JoinChallenge {
            nonce,
            tag: isk.join_tag(&nonce).unwrap(),
        };
        let (request, sk) =
            JoinRequest::<Curve>::new(&mut rng, SchemeCode::PS16, &challenge, &ipk).unwrap();
        assert_eq!(request.tau, (ipk.g * sk).into_affine());
        assert!(request.verify(SchemeCode::PS16, &ipk).unwrap());
        // Bound to the scheme it was made for
        assert!(!request.verify(SchemeCode::DL21, &ipk).unwrap());
        test_utils::test_serialization!(JoinRequest<Curve>, request);

        let mut bad = request.clone();
        bad.nonce = Fr::rand(&mut rng);
        assert!(!bad.verify(SchemeCode::PS16, &ipk).unwrap());

        // `ttau` for another secret
        let mut bad = request.clone();
        bad.ttau = (ipk.Y * Fr::rand(&mut rng)).into_affine();
        assert!(!bad.verify(SchemeCode::PS16, &ipk).unwrap());

        let (other_isk, _) = setup(&mut rng);
        assert_ne!(
            other_isk.join_tag(&nonce).unwrap(),
            isk.join_tag(&nonce).unwrap()
        );
    }
}

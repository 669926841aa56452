use crate::{message::Message, scheme::SchemeCode};
use ark_bls12_381::Bls12_381;
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use blake2::Blake2b512;
use digest::Digest;
use groupsig_spk::compute_random_oracle_challenge;
use groupsig_utils::{
    concat_slices, hashing_utils::affine_group_elem_from_label, serde_utils::ArkObjectBytes,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Curve all shipped schemes are instantiated on
pub type Curve = Bls12_381;
pub type Fr = <Curve as Pairing>::ScalarField;
pub type G1Affine = <Curve as Pairing>::G1Affine;
pub type G2Affine = <Curve as Pairing>::G2Affine;
pub type Gt = PairingOutput<Curve>;

/// Generators shared by every group of a scheme
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SetupParams<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub g: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub gg: E::G2Affine,
    /// Independent of `g`, used where a second G1 base with unknown discrete log is needed
    #[serde_as(as = "ArkObjectBytes")]
    pub h: E::G1Affine,
}

impl<E: Pairing> SetupParams<E> {
    pub fn new<D: Digest>(label: &[u8]) -> Self {
        Self {
            g: affine_group_elem_from_label::<E::G1Affine, D>(&concat_slices!(label, b" : g")),
            gg: affine_group_elem_from_label::<E::G2Affine, D>(&concat_slices!(label, b" : gg")),
            h: affine_group_elem_from_label::<E::G1Affine, D>(&concat_slices!(label, b" : h")),
        }
    }
}

/// Start of a challenge transcript, separated by protocol and scheme
pub(crate) fn transcript(domain: &[u8], code: SchemeCode) -> Vec<u8> {
    concat_slices!(domain, [code.0])
}

/// Length prefixed so that the message boundary is unambiguous
pub(crate) fn append_message(transcript: &mut Vec<u8>, msg: &Message) {
    transcript.extend_from_slice(&(msg.len() as u64).to_le_bytes());
    transcript.extend_from_slice(msg.as_bytes());
}

pub(crate) fn challenge<F: PrimeField>(transcript: &[u8]) -> F {
    compute_random_oracle_challenge::<F, Blake2b512>(transcript)
}

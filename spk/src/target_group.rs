//! Proofs of knowledge involving the pairing target group.
//!
//! [`PokTargetGroupDiscreteLog`]: given public `Y_i` and `B_i` in the target group, knowledge of a
//! single scalar `x` with `B_i * x = Y_i` for all `i`.
//! 1. Prover chooses a random `r` and computes `T_i = B_i * r`
//! 2. Hashes all `T_i` towards getting a challenge `c`.
//! 3. Computes response `s = r + c*x`.
//! 4. Verifier checks if `B_i * s = T_i + Y_i*c` for all `i`.
//!
//! [`PokG2InPairing`]: given public `A_i` in G1 and `Y_i` in the target group, knowledge of a single
//! `B` in G2 with `e(A_i, B) = Y_i` for all `i`. Commitments are `T_i = e(A_i, R)` for a random `R`
//! in G2, the response is `S = R + B*c` and the verifier checks `e(A_i, S) = T_i + Y_i*c`.

use crate::error::SpkError;
use ark_ec::{
    pairing::{Pairing, PairingOutput},
    CurveGroup,
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{cfg_iter, io::Write, vec::Vec};
use groupsig_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[serde_as]
#[derive(
    Default,
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
pub struct PokTargetGroupDiscreteLogProtocol<E: Pairing> {
    /// Commitment to randomness, one per base
    #[zeroize(skip)]
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub t: Vec<PairingOutput<E>>,
    #[serde_as(as = "ArkObjectBytes")]
    blinding: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    witness: E::ScalarField,
}

#[serde_as]
#[derive(
    Default,
    Clone,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct PokTargetGroupDiscreteLog<E: Pairing> {
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub t: Vec<PairingOutput<E>>,
    #[serde_as(as = "ArkObjectBytes")]
    pub response: E::ScalarField,
}

#[serde_as]
#[derive(
    Default,
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
pub struct PokG2InPairingProtocol<E: Pairing> {
    #[zeroize(skip)]
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub t: Vec<PairingOutput<E>>,
    #[serde_as(as = "ArkObjectBytes")]
    blinding: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    witness: E::G2Affine,
}

#[serde_as]
#[derive(
    Default,
    Clone,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct PokG2InPairing<E: Pairing> {
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub t: Vec<PairingOutput<E>>,
    #[serde_as(as = "ArkObjectBytes")]
    pub response: E::G2Affine,
}

fn write_statements<E: Pairing, B: CanonicalSerialize, W: Write>(
    bases: &[B],
    y: &[PairingOutput<E>],
    t: &[PairingOutput<E>],
    mut writer: W,
) -> Result<(), SpkError> {
    if bases.len() != y.len() {
        return Err(SpkError::ExpectedSameSizeSequences(bases.len(), y.len()));
    }
    if bases.len() != t.len() {
        return Err(SpkError::ExpectedSameSizeSequences(bases.len(), t.len()));
    }
    for ((b, y), t) in bases.iter().zip(y).zip(t) {
        b.serialize_compressed(&mut writer)?;
        y.serialize_compressed(&mut writer)?;
        t.serialize_compressed(&mut writer)?;
    }
    Ok(())
}

impl<E: Pairing> PokTargetGroupDiscreteLogProtocol<E> {
    pub fn init(
        witness: E::ScalarField,
        blinding: E::ScalarField,
        bases: &[PairingOutput<E>],
    ) -> Result<Self, SpkError> {
        if bases.is_empty() {
            return Err(SpkError::EmptyStatement);
        }
        Ok(Self {
            t: cfg_iter!(bases).map(|b| *b * blinding).collect(),
            blinding,
            witness,
        })
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        bases: &[PairingOutput<E>],
        y: &[PairingOutput<E>],
        writer: W,
    ) -> Result<(), SpkError> {
        write_statements(bases, y, &self.t, writer)
    }

    pub fn gen_proof(self, challenge: &E::ScalarField) -> PokTargetGroupDiscreteLog<E> {
        PokTargetGroupDiscreteLog {
            t: self.t.clone(),
            response: self.blinding + self.witness * challenge,
        }
    }
}

impl<E: Pairing> PokTargetGroupDiscreteLog<E> {
    pub fn challenge_contribution<W: Write>(
        &self,
        bases: &[PairingOutput<E>],
        y: &[PairingOutput<E>],
        writer: W,
    ) -> Result<(), SpkError> {
        write_statements(bases, y, &self.t, writer)
    }

    /// `bases[i]*response - y[i]*challenge == t[i]` for all `i`
    pub fn verify(
        &self,
        y: &[PairingOutput<E>],
        bases: &[PairingOutput<E>],
        challenge: &E::ScalarField,
    ) -> Result<bool, SpkError> {
        if bases.len() != y.len() {
            return Err(SpkError::ExpectedSameSizeSequences(bases.len(), y.len()));
        }
        if bases.len() != self.t.len() {
            return Ok(false);
        }
        Ok(cfg_iter!(bases)
            .zip(cfg_iter!(y))
            .zip(cfg_iter!(self.t))
            .all(|((b, y), t)| *b * self.response == *t + *y * challenge))
    }
}

impl<E: Pairing> PokG2InPairingProtocol<E> {
    pub fn init(
        witness: E::G2Affine,
        blinding: E::G2Affine,
        anchors: &[E::G1Affine],
    ) -> Result<Self, SpkError> {
        if anchors.is_empty() {
            return Err(SpkError::EmptyStatement);
        }
        Ok(Self {
            t: cfg_iter!(anchors)
                .map(|a| E::pairing(*a, blinding))
                .collect(),
            blinding,
            witness,
        })
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        anchors: &[E::G1Affine],
        y: &[PairingOutput<E>],
        writer: W,
    ) -> Result<(), SpkError> {
        write_statements(anchors, y, &self.t, writer)
    }

    pub fn gen_proof(self, challenge: &E::ScalarField) -> PokG2InPairing<E> {
        PokG2InPairing {
            t: self.t.clone(),
            response: (self.witness * challenge + self.blinding).into_affine(),
        }
    }
}

impl<E: Pairing> PokG2InPairing<E> {
    pub fn challenge_contribution<W: Write>(
        &self,
        anchors: &[E::G1Affine],
        y: &[PairingOutput<E>],
        writer: W,
    ) -> Result<(), SpkError> {
        write_statements(anchors, y, &self.t, writer)
    }

    /// `e(anchors[i], response) == t[i] + y[i]*challenge` for all `i`
    pub fn verify(
        &self,
        y: &[PairingOutput<E>],
        anchors: &[E::G1Affine],
        challenge: &E::ScalarField,
    ) -> Result<bool, SpkError> {
        if anchors.len() != y.len() {
            return Err(SpkError::ExpectedSameSizeSequences(anchors.len(), y.len()));
        }
        if anchors.len() != self.t.len() {
            return Ok(false);
        }
        Ok(cfg_iter!(anchors)
            .zip(cfg_iter!(y))
            .zip(cfg_iter!(self.t))
            .all(|((a, y), t)| E::pairing(*a, self.response) == *t + *y * challenge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_random_oracle_challenge, test_serialization};
    use ark_bls12_381::{Bls12_381, Fr, G1Affine, G2Affine};
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };
    use blake2::Blake2b512;

    type Gt = PairingOutput<Bls12_381>;

    #[test]
    fn discrete_log_in_target_group() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let witness = Fr::rand(&mut rng);
        let bases = (0..3)
            .map(|_| Bls12_381::pairing(G1Affine::rand(&mut rng), G2Affine::rand(&mut rng)))
            .collect::<Vec<_>>();
        let y = bases.iter().map(|b| *b * witness).collect::<Vec<_>>();

        let protocol =
            PokTargetGroupDiscreteLogProtocol::<Bls12_381>::init(witness, Fr::rand(&mut rng), &bases)
                .unwrap();
        let mut chal_contrib_prover = vec![];
        protocol
            .challenge_contribution(&bases, &y, &mut chal_contrib_prover)
            .unwrap();
        test_serialization!(PokTargetGroupDiscreteLogProtocol<Bls12_381>, protocol);
        let challenge = compute_random_oracle_challenge::<Fr, Blake2b512>(&chal_contrib_prover);
        let proof = protocol.gen_proof(&challenge);

        let mut chal_contrib_verifier = vec![];
        proof
            .challenge_contribution(&bases, &y, &mut chal_contrib_verifier)
            .unwrap();
        assert_eq!(chal_contrib_prover, chal_contrib_verifier);
        assert!(proof.verify(&y, &bases, &challenge).unwrap());
        test_serialization!(PokTargetGroupDiscreteLog<Bls12_381>, proof);

        let mut y_bad = y.clone();
        y_bad[1] = y_bad[1] + Gt::rand(&mut rng);
        assert!(!proof.verify(&y_bad, &bases, &challenge).unwrap());
        assert!(proof.verify(&y[..2], &bases, &challenge).is_err());
    }

    #[test]
    fn g2_witness_in_pairing() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let witness = G2Affine::rand(&mut rng);
        let anchors = (0..2).map(|_| G1Affine::rand(&mut rng)).collect::<Vec<_>>();
        let y = anchors
            .iter()
            .map(|a| Bls12_381::pairing(*a, witness))
            .collect::<Vec<_>>();

        let protocol =
            PokG2InPairingProtocol::<Bls12_381>::init(witness, G2Affine::rand(&mut rng), &anchors)
                .unwrap();
        let mut chal_contrib = vec![];
        protocol
            .challenge_contribution(&anchors, &y, &mut chal_contrib)
            .unwrap();
        test_serialization!(PokG2InPairingProtocol<Bls12_381>, protocol);
        let challenge = compute_random_oracle_challenge::<Fr, Blake2b512>(&chal_contrib);
        let proof = protocol.gen_proof(&challenge);
        assert!(proof.verify(&y, &anchors, &challenge).unwrap());
        test_serialization!(PokG2InPairing<Bls12_381>, proof);

        // Statement for a different G2 element in the second pairing
        let y_bad = vec![y[0], Bls12_381::pairing(anchors[1], G2Affine::rand(&mut rng))];
        assert!(!proof.verify(&y_bad, &anchors, &challenge).unwrap());
        assert!(PokG2InPairingProtocol::<Bls12_381>::init(witness, witness, &[]).is_err());
    }
}

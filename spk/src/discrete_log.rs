//! Proofs of knowledge of discrete logs in an elliptic curve group.
//!
//! - [`PokDiscreteLog`]: given public `y` and `g`, knowledge of `x` in `g * x = y`. Verifier
//!   checks `g * s = t + y * c`.
//! - [`PokTwoDiscreteLogs`]: given public `y`, `g1` and `g2`, knowledge of `x1` and `x2` in
//!   `g1 * x1 + g2 * x2 = y`. Verifier checks `g1 * s1 + g2 * s2 = t + y * c`.
//! - [`EqualDiscreteLogs`]: given public `y_i` and `g_i`, knowledge of a single `x` with
//!   `g_i * x = y_i` for every `i`. One commitment `t_i = g_i * r` per statement and a single
//!   response.

use crate::error::SpkError;
use ark_ec::{AffineRepr, CurveGroup};
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
pub struct PokDiscreteLogProtocol<G: AffineRepr> {
    /// Commitment to randomness
    #[zeroize(skip)]
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G,
    #[serde_as(as = "ArkObjectBytes")]
    blinding: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    witness: G::ScalarField,
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
pub struct PokDiscreteLog<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub response: G::ScalarField,
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
pub struct PokTwoDiscreteLogsProtocol<G: AffineRepr> {
    #[zeroize(skip)]
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G,
    #[serde_as(as = "ArkObjectBytes")]
    blinding1: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    witness1: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    blinding2: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    witness2: G::ScalarField,
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
pub struct PokTwoDiscreteLogs<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub response1: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub response2: G::ScalarField,
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
pub struct EqualDiscreteLogsProtocol<G: AffineRepr> {
    /// One commitment per base
    #[zeroize(skip)]
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub t: Vec<G>,
    #[serde_as(as = "ArkObjectBytes")]
    blinding: G::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    witness: G::ScalarField,
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
pub struct EqualDiscreteLogs<G: AffineRepr> {
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub t: Vec<G>,
    #[serde_as(as = "ArkObjectBytes")]
    pub response: G::ScalarField,
}

impl<G: AffineRepr> PokDiscreteLogProtocol<G> {
    pub fn init(witness: G::ScalarField, blinding: G::ScalarField, base: &G) -> Self {
        Self {
            t: (*base * blinding).into_affine(),
            blinding,
            witness,
        }
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        base: &G,
        y: &G,
        writer: W,
    ) -> Result<(), SpkError> {
        Self::compute_challenge_contribution(base, y, &self.t, writer)
    }

    pub fn gen_proof(self, challenge: &G::ScalarField) -> PokDiscreteLog<G> {
        PokDiscreteLog {
            t: self.t,
            response: self.blinding + self.witness * challenge,
        }
    }

    pub fn compute_challenge_contribution<W: Write>(
        base: &G,
        y: &G,
        t: &G,
        mut writer: W,
    ) -> Result<(), SpkError> {
        base.serialize_compressed(&mut writer)?;
        y.serialize_compressed(&mut writer)?;
        t.serialize_compressed(writer).map_err(|e| e.into())
    }
}

impl<G: AffineRepr> PokDiscreteLog<G> {
    pub fn challenge_contribution<W: Write>(
        &self,
        base: &G,
        y: &G,
        writer: W,
    ) -> Result<(), SpkError> {
        PokDiscreteLogProtocol::compute_challenge_contribution(base, y, &self.t, writer)
    }

    /// `base*response - y*challenge == t`
    pub fn verify(&self, y: &G, base: &G, challenge: &G::ScalarField) -> bool {
        (*base * self.response - *y * challenge).into_affine() == self.t
    }
}

impl<G: AffineRepr> PokTwoDiscreteLogsProtocol<G> {
    pub fn init(
        witness1: G::ScalarField,
        blinding1: G::ScalarField,
        base1: &G,
        witness2: G::ScalarField,
        blinding2: G::ScalarField,
        base2: &G,
    ) -> Self {
        Self {
            t: (*base1 * blinding1 + *base2 * blinding2).into_affine(),
            blinding1,
            witness1,
            blinding2,
            witness2,
        }
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        base1: &G,
        base2: &G,
        y: &G,
        writer: W,
    ) -> Result<(), SpkError> {
        Self::compute_challenge_contribution(base1, base2, y, &self.t, writer)
    }

    pub fn gen_proof(self, challenge: &G::ScalarField) -> PokTwoDiscreteLogs<G> {
        PokTwoDiscreteLogs {
            t: self.t,
            response1: self.blinding1 + self.witness1 * challenge,
            response2: self.blinding2 + self.witness2 * challenge,
        }
    }

    pub fn compute_challenge_contribution<W: Write>(
        base1: &G,
        base2: &G,
        y: &G,
        t: &G,
        mut writer: W,
    ) -> Result<(), SpkError> {
        base1.serialize_compressed(&mut writer)?;
        base2.serialize_compressed(&mut writer)?;
        y.serialize_compressed(&mut writer)?;
        t.serialize_compressed(&mut writer)?;
        Ok(())
    }
}

impl<G: AffineRepr> PokTwoDiscreteLogs<G> {
    pub fn challenge_contribution<W: Write>(
        &self,
        base1: &G,
        base2: &G,
        y: &G,
        writer: W,
    ) -> Result<(), SpkError> {
        PokTwoDiscreteLogsProtocol::compute_challenge_contribution(base1, base2, y, &self.t, writer)
    }

    /// `base1*response1 + base2*response2 - y*challenge == t`
    pub fn verify(&self, y: &G, base1: &G, base2: &G, challenge: &G::ScalarField) -> bool {
        (*base1 * self.response1 + *base2 * self.response2 - *y * challenge).into_affine() == self.t
    }
}

impl<G: AffineRepr> EqualDiscreteLogsProtocol<G> {
    pub fn init(
        witness: G::ScalarField,
        blinding: G::ScalarField,
        bases: &[G],
    ) -> Result<Self, SpkError> {
        if bases.is_empty() {
            return Err(SpkError::EmptyStatement);
        }
        let t = cfg_iter!(bases)
            .map(|b| *b * blinding)
            .collect::<Vec<_>>();
        Ok(Self {
            t: G::Group::normalize_batch(&t),
            blinding,
            witness,
        })
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        bases: &[G],
        y: &[G],
        writer: W,
    ) -> Result<(), SpkError> {
        Self::compute_challenge_contribution(bases, y, &self.t, writer)
    }

    pub fn gen_proof(self, challenge: &G::ScalarField) -> EqualDiscreteLogs<G> {
        EqualDiscreteLogs {
            t: self.t.clone(),
            response: self.blinding + self.witness * challenge,
        }
    }

    pub fn compute_challenge_contribution<W: Write>(
        bases: &[G],
        y: &[G],
        t: &[G],
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
}

impl<G: AffineRepr> EqualDiscreteLogs<G> {
    pub fn challenge_contribution<W: Write>(
        &self,
        bases: &[G],
        y: &[G],
        writer: W,
    ) -> Result<(), SpkError> {
        EqualDiscreteLogsProtocol::compute_challenge_contribution(bases, y, &self.t, writer)
    }

    /// `bases[i]*response - y[i]*challenge == t[i]` for all `i`
    pub fn verify(
        &self,
        y: &[G],
        bases: &[G],
        challenge: &G::ScalarField,
    ) -> Result<bool, SpkError> {
        if bases.len() != y.len() {
            return Err(SpkError::ExpectedSameSizeSequences(bases.len(), y.len()));
        }
        if bases.len() != self.t.len() {
            return Ok(false);
        }
        let expected = cfg_iter!(bases)
            .zip(cfg_iter!(y))
            .map(|(b, y)| *b * self.response - *y * challenge)
            .collect::<Vec<_>>();
        Ok(G::Group::normalize_batch(&expected) == self.t)
    }
}

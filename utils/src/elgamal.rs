//! Elgamal encryption of group elements.
//!
//! Besides plain encryption and decryption, ciphertexts can be rerandomized, gain extra randomness
//! under the same key and be raised to a scalar, which is what the blind conversion of group
//! signatures is built from.

use crate::serde_utils::ArkObjectBytes;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{ops::Neg, rand::RngCore, UniformRand};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Zeroize,
    ZeroizeOnDrop,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct SecretKey<F: PrimeField>(#[serde_as(as = "ArkObjectBytes")] pub F);

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PublicKey<G: AffineRepr>(#[serde_as(as = "ArkObjectBytes")] pub G);

impl<F: PrimeField> SecretKey<F> {
    pub fn new<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self(F::rand(rng))
    }
}

impl<G: AffineRepr> PublicKey<G> {
    pub fn new(secret_key: &SecretKey<G::ScalarField>, gen: &G) -> Self {
        Self((*gen * secret_key.0).into_affine())
    }
}

pub fn keygen<R: RngCore + ?Sized, G: AffineRepr>(
    rng: &mut R,
    gen: &G,
) -> (SecretKey<G::ScalarField>, PublicKey<G>) {
    let sk = SecretKey::new(rng);
    let pk = PublicKey::new(&sk, gen);
    (sk, pk)
}

/// Elgamal encryption of a group element `m`
#[serde_as]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Ciphertext<G: AffineRepr> {
    /// `m + r * pk`
    #[serde_as(as = "ArkObjectBytes")]
    pub enc1: G,
    /// Ephemeral public key `r * gen`
    #[serde_as(as = "ArkObjectBytes")]
    pub enc2: G,
}

impl<G: AffineRepr> Ciphertext<G> {
    /// Returns the ciphertext and randomness created for encryption
    pub fn new<R: RngCore + ?Sized>(
        rng: &mut R,
        msg: &G,
        public_key: &G,
        gen: &G,
    ) -> (Self, G::ScalarField) {
        let randomness = G::ScalarField::rand(rng);
        (
            Self::new_with_randomness(msg, public_key, gen, &randomness),
            randomness,
        )
    }

    pub fn new_with_randomness(
        msg: &G,
        public_key: &G,
        gen: &G,
        randomness: &G::ScalarField,
    ) -> Self {
        let enc1 = (*public_key * randomness + msg).into_affine();
        let enc2 = (*gen * randomness).into_affine();
        Self { enc1, enc2 }
    }

    pub fn decrypt(&self, secret_key: &G::ScalarField) -> G {
        ((self.enc2 * secret_key).neg() + self.enc1).into_affine()
    }

    /// Adds `extra` to the encryption randomness, so the result encrypts the same message with
    /// randomness `r + extra`.
    pub fn add_randomness(&self, extra: &G::ScalarField, public_key: &G, gen: &G) -> Self {
        Self {
            enc1: (*public_key * extra + self.enc1).into_affine(),
            enc2: (*gen * extra + self.enc2).into_affine(),
        }
    }

    /// Fresh ciphertext of the same message, unlinkable to this one without the secret key.
    pub fn rerandomize<R: RngCore + ?Sized>(&self, rng: &mut R, public_key: &G, gen: &G) -> Self {
        self.add_randomness(&G::ScalarField::rand(rng), public_key, gen)
    }

    /// Encryption of `m * factor` with randomness `r * factor`.
    pub fn scale(&self, factor: &G::ScalarField) -> Self {
        Self {
            enc1: (self.enc1 * factor).into_affine(),
            enc2: (self.enc2 * factor).into_affine(),
        }
    }
}

//! Signatures of knowledge, i.e. Schnorr protocols made non-interactive with the Fiat-Shamir
//! heuristic, for the relations group signatures are built from.
//!
//! Every protocol follows the same 3 steps:
//! 1. `init` with the witness and a blinding, which commits to the blinding.
//! 2. Write the statement and commitment to a challenge transcript using `challenge_contribution`
//!    and hash it with [`compute_random_oracle_challenge`] along with anything else the proof
//!    should be bound to, like the message being signed.
//! 3. `gen_proof` with the challenge gives the response `blinding + witness * challenge`.
//!
//! When several protocols are initialized with the same blinding for the same witness, their
//! responses are equal and a verifier checks that equality to learn the witnesses are equal.

use ark_ff::PrimeField;
use digest::Digest;
use groupsig_utils::hashing_utils::field_elem_from_try_and_incr;

pub mod discrete_log;
pub mod error;
pub mod target_group;

pub use error::SpkError;

/// Hash the challenge transcript to a field element.
pub fn compute_random_oracle_challenge<F: PrimeField, D: Digest>(challenge_bytes: &[u8]) -> F {
    field_elem_from_try_and_incr::<F, D>(challenge_bytes)
}

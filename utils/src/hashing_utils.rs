use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{
    field_hashers::{DefaultFieldHasher, HashToField},
    PrimeField,
};
use ark_std::{
    rand::{rngs::StdRng, SeedableRng},
    UniformRand,
};
use digest::{Digest, DynDigest};

/// Hash bytes to a field element using the field hasher of the IETF hash-to-curve draft. `dst` is
/// the domain separation tag.
pub fn hash_to_field<F: PrimeField, D: Default + DynDigest + Clone>(dst: &[u8], bytes: &[u8]) -> F {
    let hasher = <DefaultFieldHasher<D> as HashToField<F>>::new(dst);
    hasher.hash_to_field(bytes, 1).pop().unwrap_or_default()
}

/// Hash bytes to a field element. This is vulnerable to timing attack and is only used when input
/// is public anyway like when generating a challenge
pub fn field_elem_from_try_and_incr<F: PrimeField, D: Digest>(bytes: &[u8]) -> F {
    let mut hash = D::digest(bytes);
    let mut j = 1u64;
    loop {
        if let Some(f) = F::from_random_bytes(&hash) {
            return f;
        }
        hash = D::digest(concat_slices!(bytes, b"-attempt-", j.to_le_bytes()));
        j += 1;
    }
}

/// Deterministic generator seeded with the digest of `label`. Anyone can recompute the same stream
/// so it must only be used for public values.
pub fn rng_from_label<D: Digest>(label: &[u8]) -> StdRng {
    let digest = D::digest(label);
    let mut seed = <StdRng as SeedableRng>::Seed::default();
    for (s, d) in seed.iter_mut().zip(digest.iter()) {
        *s = *d;
    }
    StdRng::from_seed(seed)
}

/// Derive a group element from a public label such that its discrete log relative to any other
/// derived element is unknown to everyone. Used for setup parameters.
pub fn affine_group_elem_from_label<G: AffineRepr, D: Digest>(label: &[u8]) -> G {
    let mut rng = rng_from_label::<D>(label);
    G::Group::rand(&mut rng).into_affine()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Fr, G1Affine, G2Affine};
    use blake2::Blake2b512;

    #[test]
    fn label_derivation_is_deterministic() {
        let a = affine_group_elem_from_label::<G1Affine, Blake2b512>(b"label-1");
        let b = affine_group_elem_from_label::<G1Affine, Blake2b512>(b"label-1");
        let c = affine_group_elem_from_label::<G1Affine, Blake2b512>(b"label-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_zero());

        let d = affine_group_elem_from_label::<G2Affine, Blake2b512>(b"label-1");
        assert!(d.is_on_curve());
        assert!(d.is_in_correct_subgroup_assuming_on_curve());
    }

    #[test]
    fn hashing_to_field() {
        let f1 = hash_to_field::<Fr, Blake2b512>(b"dst-1", b"msg");
        let f2 = hash_to_field::<Fr, Blake2b512>(b"dst-1", b"msg");
        let f3 = hash_to_field::<Fr, Blake2b512>(b"dst-2", b"msg");
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);

        let f4 = field_elem_from_try_and_incr::<Fr, Blake2b512>(b"msg");
        assert_eq!(f4, field_elem_from_try_and_incr::<Fr, Blake2b512>(b"msg"));
        assert_ne!(f4, field_elem_from_try_and_incr::<Fr, Blake2b512>(b"msh"));
    }
}

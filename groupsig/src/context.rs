//! Entry point of the library: a context bound to one scheme through which every operation runs.
//!
//! The context checks what is common to all schemes before dispatching to the scheme:
//! that every object passed in belongs to the context's scheme, the order and the parties of join
//! steps, that member keys completed the join protocol, that manager keys have the role an
//! operation needs and that paired sequences have the same length.

use crate::{
    crl::Crl,
    error::GroupSigError,
    gml::Gml,
    join::{self, JoinStep},
    message::Message,
    objects::{
        BlindSignature, BlindingKey, GroupKey, Identity, JoinMessage, ManagerKey, MemberKey,
        Proof, SchemeParams, Signature, Trapdoor,
    },
    registry,
    scheme::{
        GroupSignatureScheme, JoinParty, ManagerRole, Opening, SchemeCode, SchemeDescription,
    },
};
use ark_std::{
    rand::{rngs::StdRng, RngCore, SeedableRng},
    vec::Vec,
};
use blake2::Blake2b512;
use core::sync::atomic::{AtomicU64, Ordering};
use groupsig_utils::{concat_slices, hashing_utils::rng_from_label};

pub struct SchemeContext {
    scheme: &'static dyn GroupSignatureScheme,
    params: SchemeParams,
    seed: u64,
    rng_counter: AtomicU64,
}

macro_rules! ensure_scheme {
    ($ctx: expr, $($obj: expr),+) => {
        $( $obj.ensure_scheme($ctx.code())?; )+
    };
}

impl SchemeContext {
    /// Context for the scheme with `code`. With a `seed` of 0 the generators returned by
    /// [`Self::rng`] are seeded from the OS, otherwise they are a reproducible sequence derived from
    /// the seed.
    pub fn init(code: SchemeCode, seed: u64) -> Result<Self, GroupSigError> {
        let scheme = registry::resolve(code)?;
        let params = scheme.init()?;
        log::debug!("{} context initialized", code);
        Ok(Self {
            scheme,
            params,
            seed,
            rng_counter: AtomicU64::new(0),
        })
    }

    /// Release the context. Consuming it guarantees no operation on it is still running.
    pub fn clear(self) {
        log::debug!("{} context cleared", self.code());
    }

    pub fn code(&self) -> SchemeCode {
        self.description().code
    }

    pub fn description(&self) -> &'static SchemeDescription {
        self.scheme.description()
    }

    pub fn join_start(&self) -> u8 {
        self.description().join_start
    }

    pub fn join_seq(&self) -> u8 {
        self.description().join_seq
    }

    pub fn params(&self) -> &SchemeParams {
        &self.params
    }

    /// A fresh random number generator
    pub fn rng(&self) -> StdRng {
        if self.seed == 0 {
            return StdRng::from_entropy();
        }
        let n = self.rng_counter.fetch_add(1, Ordering::Relaxed);
        rng_from_label::<Blake2b512>(&concat_slices!(
            b"groupsig-context-rng",
            self.seed.to_le_bytes(),
            n.to_le_bytes()
        ))
    }

    /// Create a group. Schemes with several authorities are set up by calling this once per
    /// authority, passing the group key returned by the previous call.
    pub fn setup<R: RngCore>(
        &self,
        rng: &mut R,
        grpkey: Option<&GroupKey>,
    ) -> Result<(GroupKey, ManagerKey), GroupSigError> {
        if let Some(grpkey) = grpkey {
            ensure_scheme!(self, grpkey);
        }
        let (grpkey, mgrkey) = self.scheme.setup(rng, &self.params, grpkey)?;
        log::debug!("{} setup produced a {:?} key", self.code(), mgrkey.role());
        Ok((grpkey, mgrkey))
    }

    /// Run manager join step `seq`. The step that issues the member's credential appends the member
    /// to `gml`. A failed step leaves `gml` unchanged.
    pub fn join_mgr<R: RngCore>(
        &self,
        rng: &mut R,
        seq: u8,
        msg_in: Option<&JoinMessage>,
        mgrkey: &ManagerKey,
        grpkey: &GroupKey,
        gml: &mut Gml,
    ) -> Result<JoinMessage, GroupSigError> {
        ensure_scheme!(self, mgrkey, grpkey, gml);
        self.check_role(mgrkey, "join_mgr", |r| r.can_issue())?;
        join::check_step(self.description(), seq, JoinParty::Manager, msg_in)?;
        log::trace!("{} join step {} (manager)", self.code(), seq);
        let out = self
            .scheme
            .join_mgr(rng, seq, msg_in, mgrkey, grpkey, gml)
            .map_err(|e| {
                log::warn!("{} join step {} failed: {}", self.code(), seq, e);
                e
            })?;
        debug_assert_eq!(out.seq(), seq);
        Ok(out)
    }

    /// Run member join step `seq`. `memkey` is the partial key returned by the member's previous
    /// step and is ignored at the member's first step.
    pub fn join_mem<R: RngCore>(
        &self,
        rng: &mut R,
        seq: u8,
        msg_in: Option<&JoinMessage>,
        memkey: Option<&MemberKey>,
        grpkey: &GroupKey,
    ) -> Result<JoinStep, GroupSigError> {
        ensure_scheme!(self, grpkey);
        let desc = self.description();
        join::check_step(desc, seq, JoinParty::Member, msg_in)?;
        let memkey = join::check_partial_key(desc, seq, memkey)?;
        log::trace!("{} join step {} (member)", self.code(), seq);
        let step = self
            .scheme
            .join_mem(rng, seq, msg_in, memkey, grpkey)
            .map_err(|e| {
                log::warn!("{} join step {} failed: {}", self.code(), seq, e);
                e
            })?;
        Ok(join::stamp(desc, seq, step))
    }

    /// Sign `msg`. `seed` is the position of the signature in the member's sequence for schemes
    /// with sequence tags and ignored otherwise.
    pub fn sign<R: RngCore>(
        &self,
        rng: &mut R,
        msg: &Message,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        seed: u32,
    ) -> Result<Signature, GroupSigError> {
        self.check_member_key(memkey)?;
        ensure_scheme!(self, grpkey);
        self.scheme.sign(rng, msg, memkey, grpkey, seed)
    }

    pub fn verify(
        &self,
        sig: &Signature,
        msg: &Message,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        ensure_scheme!(self, sig, grpkey);
        let valid = self.scheme.verify(sig, msg, grpkey)?;
        if !valid {
            log::debug!("{} signature did not verify", self.code());
        }
        Ok(valid)
    }

    /// True only if every signature verifies with the message at the same index
    pub fn verify_batch(
        &self,
        sigs: &[Signature],
        msgs: &[Message],
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        check_same_size(sigs, msgs)?;
        ensure_scheme!(self, grpkey);
        for sig in sigs {
            ensure_scheme!(self, sig);
        }
        self.scheme.verify_batch(sigs, msgs, grpkey)
    }

    /// Index of the signer in `gml` along with a proof of it for schemes that have one
    pub fn open<R: RngCore>(
        &self,
        rng: &mut R,
        sig: &Signature,
        grpkey: &GroupKey,
        mgrkey: &ManagerKey,
        gml: &Gml,
    ) -> Result<Opening, GroupSigError> {
        ensure_scheme!(self, sig, grpkey, mgrkey, gml);
        self.check_role(mgrkey, "open", |r| r.can_open())?;
        self.scheme.open(rng, sig, grpkey, mgrkey, gml)
    }

    pub fn open_verify(
        &self,
        proof: &Proof,
        sig: &Signature,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        ensure_scheme!(self, proof, sig, grpkey);
        self.scheme.open_verify(proof, sig, grpkey)
    }

    /// Tracing trapdoor of member `index`, which is added to `crl`. Revealing a member twice
    /// returns the same trapdoor and leaves `crl` unchanged.
    pub fn reveal(&self, crl: &mut Crl, gml: &Gml, index: u64) -> Result<Trapdoor, GroupSigError> {
        ensure_scheme!(self, crl, gml);
        let trapdoor = self.scheme.reveal(crl, gml, index)?;
        log::debug!("{} revealed member {}", self.code(), index);
        Ok(trapdoor)
    }

    /// Whether `sig` was produced by a member in `crl`
    pub fn trace(
        &self,
        sig: &Signature,
        grpkey: &GroupKey,
        crl: &Crl,
        mgrkey: &ManagerKey,
        gml: &Gml,
    ) -> Result<bool, GroupSigError> {
        ensure_scheme!(self, sig, grpkey, crl, mgrkey, gml);
        self.check_role(mgrkey, "trace", |r| r.can_open())?;
        self.scheme.trace(sig, grpkey, crl, mgrkey, gml)
    }

    /// Proof that `memkey` produced `sig`, `None` if it did not
    pub fn claim<R: RngCore>(
        &self,
        rng: &mut R,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        sig: &Signature,
    ) -> Result<Option<Proof>, GroupSigError> {
        self.check_member_key(memkey)?;
        ensure_scheme!(self, grpkey, sig);
        self.scheme.claim(rng, memkey, grpkey, sig)
    }

    pub fn claim_verify(
        &self,
        proof: &Proof,
        sig: &Signature,
        grpkey: &GroupKey,
    ) -> Result<bool, GroupSigError> {
        ensure_scheme!(self, proof, sig, grpkey);
        self.scheme.claim_verify(proof, sig, grpkey)
    }

    /// Proof that all `sigs` were produced by `memkey`, `None` if some were not
    pub fn prove_equality<R: RngCore>(
        &self,
        rng: &mut R,
        memkey: &MemberKey,
        grpkey: &GroupKey,
        sigs: &[Signature],
    ) -> Result<Option<Proof>, GroupSigError> {
        self.check_member_key(memkey)?;
        ensure_scheme!(self, grpkey);
        for sig in sigs {
            ensure_scheme!(self, sig);
        }
        self.scheme.prove_equality(rng, memkey, grpkey, sigs)
    }

    pub fn prove_equality_verify(
        &self,
        proof: &Proof,
        grpkey: &GroupKey,
        sigs: &[Signature],
    ) -> Result<bool, GroupSigError> {
        ensure_scheme!(self, proof, grpkey);
        for sig in sigs {
            ensure_scheme!(self, sig);
        }
        self.scheme.prove_equality_verify(proof, grpkey, sigs)
    }

    pub fn blinding_keygen<R: RngCore>(
        &self,
        rng: &mut R,
        grpkey: &GroupKey,
    ) -> Result<BlindingKey, GroupSigError> {
        ensure_scheme!(self, grpkey);
        self.scheme.blinding_keygen(rng, grpkey)
    }

    /// Blind `sig` for conversion under `bldkey`. Fails with [`GroupSigError::InvalidSignature`]
    /// if `sig` does not verify with `msg`.
    pub fn blind<R: RngCore>(
        &self,
        rng: &mut R,
        grpkey: &GroupKey,
        sig: &Signature,
        msg: &Message,
        bldkey: &BlindingKey,
    ) -> Result<BlindSignature, GroupSigError> {
        ensure_scheme!(self, grpkey, sig, bldkey);
        self.scheme.blind(rng, grpkey, sig, msg, bldkey)
    }

    /// Convert a batch of blinded signatures. Signatures of the same member in one batch unblind to
    /// the same identity. The output is in random order.
    pub fn convert<R: RngCore>(
        &self,
        rng: &mut R,
        bsigs: &[BlindSignature],
        grpkey: &GroupKey,
        mgrkey: &ManagerKey,
        bldkey: &BlindingKey,
        msg: Option<&Message>,
    ) -> Result<Vec<BlindSignature>, GroupSigError> {
        ensure_scheme!(self, grpkey, mgrkey, bldkey);
        self.check_role(mgrkey, "convert", |r| r.can_convert())?;
        for bsig in bsigs {
            ensure_scheme!(self, bsig);
            if bsig.is_converted() {
                return Err(GroupSigError::BlindSignatureStage {
                    expected: "blinded",
                    found: bsig.stage(),
                });
            }
        }
        log::debug!("{} converting {} blind signatures", self.code(), bsigs.len());
        self.scheme.convert(rng, bsigs, grpkey, mgrkey, bldkey, msg)
    }

    /// Identity of the signer of a converted signature. Needs the secret half of `bldkey`.
    pub fn unblind(
        &self,
        csig: &BlindSignature,
        bldkey: &BlindingKey,
    ) -> Result<Identity, GroupSigError> {
        ensure_scheme!(self, csig, bldkey);
        if !csig.is_converted() {
            return Err(GroupSigError::BlindSignatureStage {
                expected: "converted",
                found: csig.stage(),
            });
        }
        if !bldkey.has_secret() {
            return Err(GroupSigError::MissingBlindingSecret);
        }
        self.scheme.unblind(csig, bldkey)
    }

    /// Proof that `memkey` produced `sig`, `None` if it did not or `sig` is invalid for `msg`
    pub fn identify<R: RngCore>(
        &self,
        rng: &mut R,
        grpkey: &GroupKey,
        memkey: &MemberKey,
        sig: &Signature,
        msg: &Message,
    ) -> Result<Option<Proof>, GroupSigError> {
        self.check_member_key(memkey)?;
        ensure_scheme!(self, grpkey, sig);
        self.scheme.identify(rng, grpkey, memkey, sig, msg)
    }

    /// Proof, bound to `msg`, that all `sigs` on `msgs` were produced by `memkey`. `None` if some
    /// signature is invalid or of another member.
    pub fn link<R: RngCore>(
        &self,
        rng: &mut R,
        grpkey: &GroupKey,
        memkey: &MemberKey,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<Option<Proof>, GroupSigError> {
        self.check_member_key(memkey)?;
        self.check_signature_batch(grpkey, sigs, msgs)?;
        self.scheme.link(rng, grpkey, memkey, msg, sigs, msgs)
    }

    pub fn verify_link(
        &self,
        grpkey: &GroupKey,
        proof: &Proof,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<bool, GroupSigError> {
        ensure_scheme!(self, proof);
        self.check_signature_batch(grpkey, sigs, msgs)?;
        self.scheme.verify_link(grpkey, proof, msg, sigs, msgs)
    }

    /// Like [`Self::link`] and additionally proves that `sigs` were produced at consecutive
    /// positions in the given order
    pub fn seqlink<R: RngCore>(
        &self,
        rng: &mut R,
        grpkey: &GroupKey,
        memkey: &MemberKey,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<Option<Proof>, GroupSigError> {
        self.check_member_key(memkey)?;
        self.check_signature_batch(grpkey, sigs, msgs)?;
        self.scheme.seqlink(rng, grpkey, memkey, msg, sigs, msgs)
    }

    pub fn verify_seqlink(
        &self,
        grpkey: &GroupKey,
        proof: &Proof,
        msg: &Message,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<bool, GroupSigError> {
        ensure_scheme!(self, proof);
        self.check_signature_batch(grpkey, sigs, msgs)?;
        self.scheme.verify_seqlink(grpkey, proof, msg, sigs, msgs)
    }

    fn check_member_key(&self, memkey: &MemberKey) -> Result<(), GroupSigError> {
        ensure_scheme!(self, memkey);
        if !memkey.is_usable() {
            return Err(GroupSigError::IncompleteMemberKey);
        }
        Ok(())
    }

    fn check_role(
        &self,
        mgrkey: &ManagerKey,
        operation: &'static str,
        allowed: impl Fn(&ManagerRole) -> bool,
    ) -> Result<(), GroupSigError> {
        if !allowed(&mgrkey.role()) {
            return Err(GroupSigError::WrongKeyRole {
                role: mgrkey.role(),
                operation,
            });
        }
        Ok(())
    }

    fn check_signature_batch(
        &self,
        grpkey: &GroupKey,
        sigs: &[Signature],
        msgs: &[Message],
    ) -> Result<(), GroupSigError> {
        check_same_size(sigs, msgs)?;
        ensure_scheme!(self, grpkey);
        for sig in sigs {
            ensure_scheme!(self, sig);
        }
        Ok(())
    }
}

fn check_same_size(sigs: &[Signature], msgs: &[Message]) -> Result<(), GroupSigError> {
    if sigs.len() != msgs.len() {
        return Err(GroupSigError::ExpectedSameSizeSequences(
            sigs.len(),
            msgs.len(),
        ));
    }
    Ok(())
}

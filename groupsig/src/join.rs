//! Sequencing of the join protocol.
//!
//! The manager and the member alternate steps `0..=join_seq`. Every step but the last produces
//! the message numbered by its index which the other party consumes at the next index. Nothing is
//! kept between steps: the manager's continuation state travels inside the messages and the
//! member's inside the partial member key the caller passes back in.

use crate::{
    error::GroupSigError,
    objects::{JoinMessage, MemberKey},
    scheme::{JoinParty, SchemeDescription},
};

/// Output of a member join step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinStep {
    /// Member key after this step, usable for signing once the member's final step ran
    pub memkey: MemberKey,
    /// Message for the manager, `None` after the terminal step
    pub msg_out: Option<JoinMessage>,
}

/// Check that `party` may run step `seq` with input `msg_in`
pub(crate) fn check_step(
    desc: &SchemeDescription,
    seq: u8,
    party: JoinParty,
    msg_in: Option<&JoinMessage>,
) -> Result<(), GroupSigError> {
    let fail = |reason| Err(GroupSigError::ProtocolSequence { seq, reason });
    match desc.party_at(seq) {
        None => return fail("step is beyond the end of the join protocol"),
        Some(p) if p != party => return fail("step belongs to the other party"),
        _ => (),
    }
    match (seq, msg_in) {
        (0, Some(_)) => fail("the first step takes no input message"),
        (0, None) => Ok(()),
        (_, None) => fail("missing input message"),
        (_, Some(msg)) => {
            if msg.code() != desc.code {
                fail("input message belongs to another scheme")
            } else if msg.seq().checked_add(1) != Some(seq) {
                fail("input message is not from the previous step")
            } else {
                Ok(())
            }
        }
    }
}

/// Partial member key a member step continues from. At the member's first step there is none and
/// any key passed in is ignored.
pub(crate) fn check_partial_key<'a>(
    desc: &SchemeDescription,
    seq: u8,
    memkey: Option<&'a MemberKey>,
) -> Result<Option<&'a MemberKey>, GroupSigError> {
    if seq == desc.first_step_of(JoinParty::Member) {
        return Ok(None);
    }
    let fail = |reason| Err(GroupSigError::ProtocolSequence { seq, reason });
    match memkey {
        None => fail("missing partial member key"),
        Some(key) if key.code() != desc.code => fail("member key belongs to another scheme"),
        Some(key) if key.is_usable() => fail("member key already completed the join protocol"),
        Some(key) if u16::from(key.join_step()) + 2 != u16::from(seq) => {
            fail("member key is not from the previous member step")
        }
        Some(key) => Ok(Some(key)),
    }
}

/// Record on the member key which step produced it
pub(crate) fn stamp(desc: &SchemeDescription, seq: u8, mut step: JoinStep) -> JoinStep {
    step.memkey.step = seq;
    step.memkey.usable = seq == desc.final_member_step();
    step
}

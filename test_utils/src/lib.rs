//! Helpers for tests and benchmarks of the group signature schemes

use ark_std::rand::RngCore;
use groupsig::{
    GroupKey, GroupSigError, Gml, JoinMessage, JoinParty, ManagerKey, MemberKey, Message,
    SchemeCode, SchemeContext, Signature,
};

#[macro_use]
pub mod serialization;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A group with every authority key created
pub struct Group {
    pub grpkey: GroupKey,
    /// Key that runs the join protocol and, if the scheme has one, opens signatures
    pub mgrkey: ManagerKey,
    /// Key of the second authority of schemes that have one
    pub converter: Option<ManagerKey>,
    pub gml: Gml,
}

pub fn setup_group<R: RngCore>(
    ctx: &SchemeContext,
    rng: &mut R,
) -> Result<Group, GroupSigError> {
    let (grpkey, mgrkey) = ctx.setup(rng, None)?;
    let (grpkey, converter) = if ctx.code() == SchemeCode::GL19 {
        let (grpkey, converter) = ctx.setup(rng, Some(&grpkey))?;
        (grpkey, Some(converter))
    } else {
        (grpkey, None)
    };
    Ok(Group {
        grpkey,
        mgrkey,
        converter,
        gml: Gml::new(ctx.code()),
    })
}

/// Run every step of the join protocol in order, alternating parties as the scheme describes
pub fn add_member<R: RngCore>(
    ctx: &SchemeContext,
    rng: &mut R,
    group: &mut Group,
) -> Result<MemberKey, GroupSigError> {
    let desc = ctx.description();
    let mut msg: Option<JoinMessage> = None;
    let mut memkey: Option<MemberKey> = None;
    for seq in 0..=desc.join_seq {
        match desc.party_at(seq) {
            Some(JoinParty::Manager) => {
                msg = Some(ctx.join_mgr(
                    rng,
                    seq,
                    msg.as_ref(),
                    &group.mgrkey,
                    &group.grpkey,
                    &mut group.gml,
                )?);
            }
            Some(JoinParty::Member) => {
                let step = ctx.join_mem(rng, seq, msg.as_ref(), memkey.as_ref(), &group.grpkey)?;
                msg = step.msg_out;
                memkey = Some(step.memkey);
            }
            None => unreachable!("join step {} beyond the protocol", seq),
        }
    }
    memkey.ok_or(GroupSigError::IncompleteMemberKey)
}

/// `count` distinct messages
pub fn messages(count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| Message::from(format!("message number {}", i)))
        .collect()
}

/// Sign each of `msgs` with `memkey`, using the message index as the sequence position
pub fn sign_all<R: RngCore>(
    ctx: &SchemeContext,
    rng: &mut R,
    memkey: &MemberKey,
    grpkey: &GroupKey,
    msgs: &[Message],
) -> Result<Vec<Signature>, GroupSigError> {
    msgs.iter()
        .enumerate()
        .map(|(i, msg)| ctx.sign(rng, msg, memkey, grpkey, i as u32))
        .collect()
}

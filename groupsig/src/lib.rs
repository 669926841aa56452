//! # Group signatures
//!
//! A group signature lets a member of a group sign on behalf of the group. Verifiers learn that
//! some member signed but not which one, while a manager holding the right key can identify the
//! signer. This crate implements several such schemes behind one scheme-agnostic API.
//!
//! | Scheme    | Code | Capabilities                                                            |
//! |-----------|------|-------------------------------------------------------------------------|
//! | `GL19`    | 3    | Two authorities. Signatures are blinded and converted in batches so that a blinding key holder learns which signatures came from the same member |
//! | `PS16`    | 4    | Open with a verifiable proof, reveal and trace, claim and prove equality |
//! | `DL21`    | 6    | No opener. Members identify their own signatures and link them          |
//! | `DL21SEQ` | 7    | `DL21` where members additionally prove that linked signatures are consecutive |
//!
//! All schemes use the BLS12-381 curve and Pointcheval-Sanders credentials issued in a 4 message
//! join protocol.
//!
//! Every operation runs through a [`SchemeContext`] created for one scheme. Keys, signatures and
//! proofs are opaque objects tagged with their scheme code which the context checks before
//! dispatching. Objects are exported to and imported from base64 text.
//!
//! ```ignore
//! let ctx = SchemeContext::init(SchemeCode::PS16, 0)?;
//! let mut rng = ctx.rng();
//! let (grpkey, mgrkey) = ctx.setup(&mut rng, None)?;
//! let mut gml = Gml::new(ctx.code());
//!
//! let m0 = ctx.join_mgr(&mut rng, 0, None, &mgrkey, &grpkey, &mut gml)?;
//! let s1 = ctx.join_mem(&mut rng, 1, Some(&m0), None, &grpkey)?;
//! let m2 = ctx.join_mgr(&mut rng, 2, s1.msg_out.as_ref(), &mgrkey, &grpkey, &mut gml)?;
//! let s3 = ctx.join_mem(&mut rng, 3, Some(&m2), Some(&s1.memkey), &grpkey)?;
//!
//! let msg = Message::from("hello");
//! let sig = ctx.sign(&mut rng, &msg, &s3.memkey, &grpkey, 0)?;
//! assert!(ctx.verify(&sig, &msg, &grpkey)?);
//! ```

pub mod common;
pub mod context;
pub mod credential;
pub mod crl;
pub mod dl21;
pub mod error;
pub mod gl19;
pub mod gml;
pub mod join;
pub mod message;
pub mod objects;
pub mod ps16;
pub mod registry;
pub mod scheme;

pub use context::SchemeContext;
pub use crl::Crl;
pub use error::GroupSigError;
pub use gml::Gml;
pub use join::JoinStep;
pub use message::Message;
pub use objects::{
    BlindSignature, BlindingKey, GroupKey, Identity, JoinMessage, ManagerKey, MemberKey, Proof,
    SchemeParams, Signature, Trapdoor,
};
pub use scheme::{
    GroupSignatureScheme, JoinParty, ManagerRole, Opening, SchemeCode, SchemeDescription,
};

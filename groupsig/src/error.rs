use crate::scheme::{ManagerRole, SchemeCode};
use ark_serialize::SerializationError;
use groupsig_spk::SpkError;
use groupsig_utils::text::TextError;

#[derive(Debug, thiserror::Error)]
pub enum GroupSigError {
    #[error("scheme code {0} is not supported")]
    UnknownScheme(u8),
    #[error("no supported scheme is named {0:?}")]
    UnknownSchemeName(String),
    #[error("object belongs to scheme {found} but the operation is for {expected}")]
    SchemeMismatch {
        expected: SchemeCode,
        found: SchemeCode,
    },
    #[error("imported object belongs to scheme {found}, expected {expected}")]
    ImportSchemeMismatch {
        expected: SchemeCode,
        found: SchemeCode,
    },
    /// A join step was invoked out of order, for the wrong party or with an input that does not
    /// belong to the handshake.
    #[error("join step {seq} rejected: {reason}")]
    ProtocolSequence { seq: u8, reason: &'static str },
    #[error("signature does not open to any entry of the group membership list")]
    OpenFailure,
    #[error("serialization failed: {0}")]
    Serialization(#[from] SerializationError),
    #[error(transparent)]
    Text(#[from] TextError),
    #[error("{scheme} does not support {operation}")]
    UnsupportedOperation {
        scheme: &'static str,
        operation: &'static str,
    },
    #[error("member key has not completed the join protocol")]
    IncompleteMemberKey,
    #[error("group key does not carry the converter public key yet")]
    IncompleteGroupKey,
    #[error("setup already produced every key of this group")]
    SetupAlreadyComplete,
    #[error("a manager key with role {role:?} cannot {operation}")]
    WrongKeyRole {
        role: ManagerRole,
        operation: &'static str,
    },
    #[error("expected sequences of the same size but found {0} and {1}")]
    ExpectedSameSizeSequences(usize, usize),
    #[error("signature does not verify")]
    InvalidSignature,
    #[error("no member with index {0} in the group membership list")]
    UnknownMember(u64),
    #[error("blinding key has no secret part")]
    MissingBlindingSecret,
    #[error("operation needs a {expected} blind signature but got a {found} one")]
    BlindSignatureStage {
        expected: &'static str,
        found: &'static str,
    },
    #[error("signature of knowledge failed: {0:?}")]
    Spk(SpkError),
}

impl From<SpkError> for GroupSigError {
    fn from(e: SpkError) -> Self {
        Self::Spk(e)
    }
}

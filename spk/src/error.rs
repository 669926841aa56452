use ark_serialize::SerializationError;

#[derive(Debug)]
pub enum SpkError {
    ExpectedSameSizeSequences(usize, usize),
    /// The relation has no statements
    EmptyStatement,
    InvalidResponse,
    Serialization(SerializationError),
}

impl From<SerializationError> for SpkError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}

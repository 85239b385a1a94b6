use thiserror::Error;

/// Reasons a buffer or message could not become a `SpectrogramFrame`
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Declared size fields disagree with the bytes actually present
    #[error("truncated buffer: layout needs {expected} bytes, got {actual}")]
    TruncatedBuffer { expected: usize, actual: usize },

    #[error("invalid frequency range: end {end} Hz is below begin {begin} Hz")]
    InvalidRange { begin: u64, end: u64 },

    /// Names the discriminant (tag, message type or shape) that matched nothing
    #[error("unknown wire format: {0}")]
    UnknownFormat(String),

    #[error("structured message carries {frequencies} frequencies but {powers} powers")]
    LengthMismatch { frequencies: usize, powers: usize },

    #[error("malformed structured message: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl DecodeError {
    /// Short stable label, used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TruncatedBuffer { .. } => "truncated_buffer",
            Self::InvalidRange { .. } => "invalid_range",
            Self::UnknownFormat(_) => "unknown_format",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::Malformed(_) => "malformed",
        }
    }
}

/// Reasons a frame cannot be written in a given layout
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("frequency {0} Hz does not fit in 32 bits")]
    FrequencyOutOfRange(u64),

    #[error("{0} samples exceed the 32-bit sample count field")]
    TooManySamples(usize),

    #[error("{0} is not a concrete layout")]
    NotConcrete(&'static str),

    #[error("structured encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

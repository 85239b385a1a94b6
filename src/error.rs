use crate::protocol::DecodeError;
use crate::registry::ChannelKey;
use thiserror::Error;

/// Why a delivered frame was dropped
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A row disagreed with its channel's established width
    #[error("channel {key}: row has {actual} samples, buffer rows are {expected} wide")]
    SampleCountMismatch {
        key: ChannelKey,
        expected: usize,
        actual: usize,
    },
}

impl IngestError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(e) => e.kind(),
            Self::SampleCountMismatch { .. } => "sample_count_mismatch",
        }
    }
}

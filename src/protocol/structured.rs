//! Self-describing JSON envelope
//!
//! ```json
//! {"type": "spectrogram", "timestamp": 1700000000000,
//!  "frequencies": [100000000, 100500000], "powers": [-42.5, -40.0]}
//! ```

use super::{DecodeError, EncodeError};
use crate::core::SpectrogramFrame;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message type carried by spectrogram envelopes
pub const SPECTROGRAM_TYPE: &str = "spectrogram";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredMessage {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,

    pub frequencies: Vec<u64>,
    pub powers: Vec<f32>,
}

/// Decode an already-parsed message
pub fn decode_message(message: &Value) -> Result<SpectrogramFrame, DecodeError> {
    let kind = message
        .get("type")
        .ok_or_else(|| DecodeError::UnknownFormat("message without a type field".to_string()))?;

    if kind != SPECTROGRAM_TYPE {
        return Err(DecodeError::UnknownFormat(format!("message type {}", kind)));
    }

    let message = StructuredMessage::deserialize(message)?;
    SpectrogramFrame::from_bins(message.timestamp, message.frequencies, message.powers)
}

/// Decode a UTF-8 JSON buffer
pub fn decode_structured(bytes: &[u8]) -> Result<SpectrogramFrame, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    decode_message(&value)
}

pub fn encode_structured(frame: &SpectrogramFrame) -> Result<Vec<u8>, EncodeError> {
    let frequencies = (0..frame.sample_count())
        .map(|index| frame.frequency_at(index).unwrap_or(frame.begin_frequency()))
        .collect();

    let message = StructuredMessage {
        kind: SPECTROGRAM_TYPE.to_string(),
        timestamp: frame.timestamp(),
        frequencies,
        powers: frame.powers().to_vec(),
    };

    Ok(serde_json::to_vec(&message)?)
}

use super::binary::{
    self, expected_size, BINS_HEADER_SIZE, FORM_A_COMPACT_ELEMENT_SIZE, FORM_A_ELEMENT_SIZE,
    FORM_B_ELEMENT_SIZE, RANGE_HEADER_SIZE,
};
use super::reader::{FrameReader, FrameWriter};
use super::structured;
use super::{DecodeError, EncodeError};
use crate::core::SpectrogramFrame;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire layouts a producer may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Pick a layout from the buffer's shape
    #[default]
    Auto,
    /// One leading version byte selects the layout of the rest
    Tagged,
    Structured,
    BinaryA,
    BinaryACompact,
    BinaryB,
}

impl WireFormat {
    /// Envelope byte for concrete layouts
    pub fn tag(&self) -> Option<u8> {
        match self {
            Self::BinaryA => Some(0x01),
            Self::BinaryACompact => Some(0x02),
            Self::BinaryB => Some(0x03),
            Self::Structured => Some(0x04),
            Self::Auto | Self::Tagged => None,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(Self::BinaryA),
            0x02 => Some(Self::BinaryACompact),
            0x03 => Some(Self::BinaryB),
            0x04 => Some(Self::Structured),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Tagged => "tagged",
            Self::Structured => "structured",
            Self::BinaryA => "binary_a",
            Self::BinaryACompact => "binary_a_compact",
            Self::BinaryB => "binary_b",
        }
    }
}

/// Decode `bytes` as `format`
pub fn decode(bytes: &[u8], format: WireFormat) -> Result<SpectrogramFrame, DecodeError> {
    match format {
        WireFormat::Auto => decode(bytes, detect(bytes)?),
        WireFormat::Tagged => decode_tagged(bytes),
        WireFormat::Structured => structured::decode_structured(bytes),
        WireFormat::BinaryA => binary::decode_form_a(bytes),
        WireFormat::BinaryACompact => binary::decode_form_a_compact(bytes),
        WireFormat::BinaryB => binary::decode_form_b(bytes),
    }
}

/// Decode a buffer whose first byte names its layout
pub fn decode_tagged(bytes: &[u8]) -> Result<SpectrogramFrame, DecodeError> {
    let (&tag, rest) = bytes
        .split_first()
        .ok_or(DecodeError::TruncatedBuffer { expected: 1, actual: 0 })?;

    match WireFormat::from_tag(tag) {
        Some(format) => decode(rest, format),
        None => Err(DecodeError::UnknownFormat(format!("envelope tag 0x{:02x}", tag))),
    }
}

/// Pick a layout from the buffer's shape
///
/// Exact binary size matches win first, in the order form A, form A-compact,
/// form B. A JSON object is only assumed after that, since the leading byte of
/// a binary frame is the low timestamp byte and may well be `{`. ASCII text
/// never satisfies a binary count field, which reads as at least 0x20202020.
///
/// When nothing matches exactly, the binary layout whose declared size is
/// closest is returned so decoding reports `TruncatedBuffer` for it.
pub fn detect(bytes: &[u8]) -> Result<WireFormat, DecodeError> {
    let candidates = binary_candidates(bytes)?;

    if let Some((format, _)) = candidates.iter().find(|(_, expected)| *expected == Some(bytes.len())) {
        return Ok(*format);
    }

    if bytes.first() == Some(&b'{') && (looks_like_object(bytes) || candidates.is_empty()) {
        return Ok(WireFormat::Structured);
    }

    candidates
        .iter()
        .min_by_key(|(_, expected)| expected.map_or(usize::MAX, |e| e.abs_diff(bytes.len())))
        .map(|(format, _)| *format)
        .ok_or_else(|| {
            DecodeError::UnknownFormat(format!("no layout matches a {}-byte buffer", bytes.len()))
        })
}

/// Binary layouts whose header fits, with the size their count implies
fn binary_candidates(bytes: &[u8]) -> Result<Vec<(WireFormat, Option<usize>)>, DecodeError> {
    let mut candidates = Vec::with_capacity(3);

    if bytes.len() >= BINS_HEADER_SIZE {
        let count = count_at(bytes, 8)?;
        candidates.push((
            WireFormat::BinaryA,
            expected_size(BINS_HEADER_SIZE, count, FORM_A_ELEMENT_SIZE),
        ));
        candidates.push((
            WireFormat::BinaryACompact,
            expected_size(BINS_HEADER_SIZE, count, FORM_A_COMPACT_ELEMENT_SIZE),
        ));
    }

    if bytes.len() >= RANGE_HEADER_SIZE {
        let count = count_at(bytes, 20)?;
        candidates.push((
            WireFormat::BinaryB,
            expected_size(RANGE_HEADER_SIZE, count, FORM_B_ELEMENT_SIZE),
        ));
    }

    Ok(candidates)
}

fn looks_like_object(bytes: &[u8]) -> bool {
    bytes.iter().rev().find(|b| !b.is_ascii_whitespace()) == Some(&b'}')
}

fn count_at(bytes: &[u8], offset: usize) -> Result<u32, DecodeError> {
    let header = bytes.get(offset..).ok_or(DecodeError::TruncatedBuffer {
        expected: offset,
        actual: bytes.len(),
    })?;
    FrameReader::new(header).take_u32()
}

/// Encode `frame` in a concrete layout
pub fn encode(frame: &SpectrogramFrame, format: WireFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        WireFormat::Structured => structured::encode_structured(frame),
        WireFormat::BinaryA => binary::encode_form_a(frame),
        WireFormat::BinaryACompact => binary::encode_form_a_compact(frame),
        WireFormat::BinaryB => binary::encode_form_b(frame),
        WireFormat::Auto | WireFormat::Tagged => Err(EncodeError::NotConcrete(format.name())),
    }
}

/// Encode `frame` as `inner` behind its envelope byte
pub fn encode_tagged(frame: &SpectrogramFrame, inner: WireFormat) -> Result<Vec<u8>, EncodeError> {
    let tag = inner.tag().ok_or(EncodeError::NotConcrete(inner.name()))?;
    let body = encode(frame, inner)?;

    let mut w = FrameWriter::with_capacity(body.len() + 1);
    w.put_u8(tag);
    w.put_slice(&body);
    Ok(w.finish())
}

/// Stateless decoder bound to one configured layout
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder {
    format: WireFormat,
}

impl FrameDecoder {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<SpectrogramFrame, DecodeError> {
        decode(bytes, self.format)
    }

    /// Text payloads are always structured, whatever the binary layout
    pub fn decode_text(&self, text: &str) -> Result<SpectrogramFrame, DecodeError> {
        structured::decode_structured(text.as_bytes())
    }

    pub fn decode_message(&self, message: &Value) -> Result<SpectrogramFrame, DecodeError> {
        structured::decode_message(message)
    }
}

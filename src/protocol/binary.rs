//! Fixed-header binary layouts
//!
//! All integers are little-endian.
//!
//! Form A, `12 + 8n` bytes:
//! `u64 timestamp | u32 n | n x u32 frequency | n x f32 power`
//!
//! Form A-compact, `12 + 5n` bytes:
//! `u64 timestamp | u32 n | n x u32 frequency | n x i8 power`
//!
//! Form B, `24 + n` bytes:
//! `u64 timestamp | u32 begin | u32 end | u32 step | u32 n | n x i8 power`

use super::reader::{FrameReader, FrameWriter};
use super::{DecodeError, EncodeError};
use crate::core::SpectrogramFrame;

/// Header size shared by form A and form A-compact
pub const BINS_HEADER_SIZE: usize = 12;

/// Header size of form B
pub const RANGE_HEADER_SIZE: usize = 24;

/// Bytes per bin in form A: frequency + f32 power
pub const FORM_A_ELEMENT_SIZE: usize = 8;

/// Bytes per bin in form A-compact: frequency + i8 power
pub const FORM_A_COMPACT_ELEMENT_SIZE: usize = 5;

/// Bytes per bin in form B: i8 power
pub const FORM_B_ELEMENT_SIZE: usize = 1;

/// Total size a layout implies, `None` when it cannot be addressed
pub(crate) fn expected_size(header: usize, count: u32, element: usize) -> Option<usize> {
    (count as usize).checked_mul(element)?.checked_add(header)
}

fn check_header(bytes: &[u8], header: usize) -> Result<(), DecodeError> {
    if bytes.len() < header {
        return Err(DecodeError::TruncatedBuffer {
            expected: header,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn check_size(actual: usize, header: usize, count: u32, element: usize) -> Result<usize, DecodeError> {
    let expected = expected_size(header, count, element).unwrap_or(usize::MAX);
    if expected != actual {
        return Err(DecodeError::TruncatedBuffer { expected, actual });
    }
    Ok(count as usize)
}

pub fn decode_form_a(bytes: &[u8]) -> Result<SpectrogramFrame, DecodeError> {
    decode_bins(bytes, FORM_A_ELEMENT_SIZE, |r| r.take_f32())
}

pub fn decode_form_a_compact(bytes: &[u8]) -> Result<SpectrogramFrame, DecodeError> {
    decode_bins(bytes, FORM_A_COMPACT_ELEMENT_SIZE, |r| r.take_i8().map(f32::from))
}

fn decode_bins(
    bytes: &[u8],
    element_size: usize,
    read_power: impl Fn(&mut FrameReader<'_>) -> Result<f32, DecodeError>,
) -> Result<SpectrogramFrame, DecodeError> {
    check_header(bytes, BINS_HEADER_SIZE)?;

    let mut r = FrameReader::new(bytes);
    let timestamp = r.take_u64()?;
    let count = r.take_u32()?;
    let count = check_size(bytes.len(), BINS_HEADER_SIZE, count, element_size)?;

    let frequencies = (0..count)
        .map(|_| r.take_u32().map(u64::from))
        .collect::<Result<Vec<_>, _>>()?;
    let powers = (0..count)
        .map(|_| read_power(&mut r))
        .collect::<Result<Vec<_>, _>>()?;

    SpectrogramFrame::from_bins(Some(timestamp), frequencies, powers)
}

pub fn decode_form_b(bytes: &[u8]) -> Result<SpectrogramFrame, DecodeError> {
    check_header(bytes, RANGE_HEADER_SIZE)?;

    let mut r = FrameReader::new(bytes);
    let timestamp = r.take_u64()?;
    let begin = r.take_u32()?;
    let end = r.take_u32()?;
    let step = r.take_u32()?;
    let count = r.take_u32()?;
    let count = check_size(bytes.len(), RANGE_HEADER_SIZE, count, FORM_B_ELEMENT_SIZE)?;

    let powers = (0..count)
        .map(|_| r.take_i8().map(f32::from))
        .collect::<Result<Vec<_>, _>>()?;

    let step = (step != 0).then_some(u64::from(step));
    SpectrogramFrame::from_range(Some(timestamp), begin.into(), end.into(), step, powers)
}

pub fn encode_form_a(frame: &SpectrogramFrame) -> Result<Vec<u8>, EncodeError> {
    encode_bins(frame, FORM_A_ELEMENT_SIZE, |w, p| w.put_f32(p))
}

pub fn encode_form_a_compact(frame: &SpectrogramFrame) -> Result<Vec<u8>, EncodeError> {
    encode_bins(frame, FORM_A_COMPACT_ELEMENT_SIZE, |w, p| w.put_i8(quantize(p)))
}

fn encode_bins(
    frame: &SpectrogramFrame,
    element_size: usize,
    put_power: impl Fn(&mut FrameWriter, f32),
) -> Result<Vec<u8>, EncodeError> {
    let count = count_field(frame)?;
    let mut w = FrameWriter::with_capacity(BINS_HEADER_SIZE + frame.sample_count() * element_size);

    w.put_u64(frame.timestamp().unwrap_or(0));
    w.put_u32(count);
    for index in 0..frame.sample_count() {
        let frequency = frame.frequency_at(index).unwrap_or(frame.begin_frequency());
        w.put_u32(narrow(frequency)?);
    }
    for &power in frame.powers() {
        put_power(&mut w, power);
    }

    Ok(w.finish())
}

pub fn encode_form_b(frame: &SpectrogramFrame) -> Result<Vec<u8>, EncodeError> {
    let count = count_field(frame)?;
    let mut w = FrameWriter::with_capacity(RANGE_HEADER_SIZE + frame.sample_count());

    w.put_u64(frame.timestamp().unwrap_or(0));
    w.put_u32(narrow(frame.begin_frequency())?);
    w.put_u32(narrow(frame.end_frequency())?);
    w.put_u32(narrow(frame.step_frequency().unwrap_or(0))?);
    w.put_u32(count);
    for &power in frame.powers() {
        w.put_i8(quantize(power));
    }

    Ok(w.finish())
}

/// Round to the nearest whole dB and saturate into `i8`
pub(crate) fn quantize(power: f32) -> i8 {
    if power.is_nan() {
        return 0;
    }
    power.round().clamp(f32::from(i8::MIN), f32::from(i8::MAX)) as i8
}

fn narrow(frequency: u64) -> Result<u32, EncodeError> {
    u32::try_from(frequency).map_err(|_| EncodeError::FrequencyOutOfRange(frequency))
}

fn count_field(frame: &SpectrogramFrame) -> Result<u32, EncodeError> {
    u32::try_from(frame.sample_count()).map_err(|_| EncodeError::TooManySamples(frame.sample_count()))
}

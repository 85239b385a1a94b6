//! Little-endian cursor over untrusted bytes
//!
//! Each `take_*` checks the remaining length before touching the slice, so a
//! short buffer surfaces as `TruncatedBuffer` instead of a panic.

use super::DecodeError;

pub(crate) struct FrameReader<'a> {
    buf: &'a [u8],
    cursor: usize,
}

impl<'a> FrameReader<'a> {
    pub(crate) const fn new(buf: &'a [u8]) -> Self {
        Self { buf, cursor: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        if self.remaining() < N {
            return Err(DecodeError::TruncatedBuffer {
                expected: self.cursor + N,
                actual: self.buf.len(),
            });
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(&self.buf[self.cursor..self.cursor + N]);
        self.cursor += N;
        Ok(arr)
    }

    pub(crate) fn take_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    pub(crate) fn take_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    pub(crate) fn take_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.take::<8>()?))
    }

    pub(crate) fn take_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.take::<4>()?))
    }
}

/// Writer counterpart used by the encoders
pub(crate) struct FrameWriter {
    buf: Vec<u8>,
}

impl FrameWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn put_i8(&mut self, v: i8) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_read_reports_needed_length() {
        let mut r = FrameReader::new(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(r.take_u32().unwrap(), 0x0403_0201);

        match r.take_u32() {
            Err(DecodeError::TruncatedBuffer { expected, actual }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 6);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // Failed read does not advance
        assert_eq!(r.remaining(), 2);
    }
}

//! Low-level wire primitives shared by both protocol codecs.
//!
//! Field encoding rules:
//! - multi-byte integers are big-endian
//! - market-data timestamps are 48-bit (6 bytes on the wire)
//! - fixed character fields are copied byte-for-byte at their declared
//!   width, unpadded and unterminated

use std::fmt;

/// Errors that can arise when encoding/decoding a wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer shorter than the message kind's fixed layout.
    Truncated,
    /// Payload too large for the 2-byte length prefix.
    Oversized,
    /// Tag byte outside the closed event set (event decoding only;
    /// inbound dispatch maps unmapped tags to an `Unknown` variant).
    UnknownTag(u8),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Truncated => write!(f, "buffer truncated"),
            CodecError::Oversized => write!(f, "payload exceeds length-prefix range"),
            CodecError::UnknownTag(tag) => write!(f, "unknown message tag: 0x{tag:02x}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Sequential writer over a pre-sized output slice.
///
/// Callers check the slice is at least `WIRE_SIZE` bytes before writing;
/// the writer itself does not re-validate.
pub(crate) struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn u8(&mut self, v: u8) {
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    pub fn u16(&mut self, v: u16) {
        self.bytes(&v.to_be_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.bytes(&v.to_be_bytes());
    }

    /// Low 48 bits of `v`, big-endian.
    pub fn u48(&mut self, v: u64) {
        self.bytes(&v.to_be_bytes()[2..]);
    }

    pub fn u64(&mut self, v: u64) {
        self.bytes(&v.to_be_bytes());
    }

    pub fn bytes(&mut self, v: &[u8]) {
        self.buf[self.pos..self.pos + v.len()].copy_from_slice(v);
        self.pos += v.len();
    }
}

/// Sequential reader over a length-checked input slice.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at `pos` (past an already-inspected tag byte).
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn u8(&mut self) -> u8 {
        let v = self.buf[self.pos];
        self.pos += 1;
        v
    }

    pub fn u16(&mut self) -> u16 {
        u16::from_be_bytes(self.array())
    }

    pub fn u32(&mut self) -> u32 {
        u32::from_be_bytes(self.array())
    }

    pub fn u48(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes[2..].copy_from_slice(&self.buf[self.pos..self.pos + 6]);
        self.pos += 6;
        u64::from_be_bytes(bytes)
    }

    pub fn u64(&mut self) -> u64 {
        u64::from_be_bytes(self.array())
    }

    pub fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }
}

/// Fail with [`CodecError::Truncated`] unless `buf` holds a full layout.
pub(crate) fn need(buf: &[u8], size: usize) -> Result<(), CodecError> {
    if buf.len() < size {
        Err(CodecError::Truncated)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u48_round_trip_masks_high_bits() {
        let mut buf = [0u8; 6];
        let mut w = Writer::new(&mut buf);
        w.u48(0x0000_1234_5678_9abc);
        let mut r = Reader::at(&buf, 0);
        assert_eq!(r.u48(), 0x0000_1234_5678_9abc);
    }

    #[test]
    fn writer_reader_agree_on_layout() {
        let mut buf = [0u8; 15];
        let mut w = Writer::new(&mut buf);
        w.u8(b'A');
        w.u16(0xbeef);
        w.u32(7);
        w.u64(u64::MAX);

        let mut r = Reader::at(&buf, 0);
        assert_eq!(r.u8(), b'A');
        assert_eq!(r.u16(), 0xbeef);
        assert_eq!(r.u32(), 7);
        assert_eq!(r.u64(), u64::MAX);
    }
}

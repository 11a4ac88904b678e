//! The 4-byte container header.
//!
//! The value `0x1E` has no documented meaning; it is validated bit-exactly
//! and never interpreted.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CodecError, CodecResult};

pub const HEADER_MAGIC: i32 = 0x1E;
pub const HEADER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: i32,
}

impl Default for Header {
    fn default() -> Self {
        Self { magic: HEADER_MAGIC }
    }
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut raw = [0u8; HEADER_SIZE];
        LittleEndian::write_i32(&mut raw, self.magic);
        raw
    }

    /// Validates the first four bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> CodecResult<Self> {
        let head = bytes.get(..HEADER_SIZE).ok_or(CodecError::TruncatedData {
            offset:    0,
            needed:    HEADER_SIZE as u64,
            available: bytes.len() as u64,
        })?;
        let magic = LittleEndian::read_i32(head);
        if magic != HEADER_MAGIC {
            return Err(CodecError::InvalidHeader { found: magic });
        }
        Ok(Self { magic })
    }
}

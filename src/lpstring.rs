//! Length-prefixed strings — the only serialization primitive of the format.
//!
//! ```text
//! int32 n            little-endian, signed
//! n == 0             empty string, nothing follows
//! n  > 0             n bytes: text[n-1] followed by one 0x00
//! n  < 0             two-byte-per-unit text; rejected
//! ```
//!
//! Text is single-byte.  Each byte decodes to the char with the same scalar
//! value (ISO-8859-1), so every byte sequence decodes and round-trips.  On
//! encode, chars above U+00FF have no single-byte form and are written as
//! `?`.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{CodecError, CodecResult};

/// Size of the length field.
pub const LENGTH_SIZE: usize = 4;
/// Written in place of chars that have no single-byte form.
pub const REPLACEMENT_BYTE: u8 = b'?';

// ── Encoding ─────────────────────────────────────────────────────────────────

/// Value of the length field for `text`: `0` when empty, otherwise the
/// number of text bytes plus the terminator.
pub fn length_prefix(text: &str) -> CodecResult<i32> {
    let len = text.chars().count();
    if len == 0 {
        return Ok(0);
    }
    i32::try_from(len + 1).map_err(|_| CodecError::StringTooLong { len })
}

/// Total encoded size of `text`, prefix included.
pub fn encoded_len(text: &str) -> CodecResult<usize> {
    Ok(LENGTH_SIZE + length_prefix(text)? as usize)
}

fn to_single_byte(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(REPLACEMENT_BYTE)
}

/// Single-byte form of `text`, without prefix or terminator.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(to_single_byte).collect()
}

/// Inverse of [`encode_text`] for every byte sequence.
pub fn decode_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Append the encoded form of `text` to `buf`.
pub fn put_lpstring(buf: &mut Vec<u8>, text: &str) -> CodecResult<()> {
    let n = length_prefix(text)?;
    let mut prefix = [0u8; LENGTH_SIZE];
    LittleEndian::write_i32(&mut prefix, n);
    buf.extend_from_slice(&prefix);
    if n > 0 {
        buf.reserve(n as usize);
        buf.extend(text.chars().map(to_single_byte));
        buf.push(0);
    }
    Ok(())
}

// ── Decoding ─────────────────────────────────────────────────────────────────

fn remaining(cur: &Cursor<&[u8]>) -> u64 {
    (cur.get_ref().len() as u64).saturating_sub(cur.position())
}

/// Read one length-prefixed string at the cursor's position.
///
/// On success the cursor sits immediately after the string.  On failure its
/// position is unspecified; callers abandon the parse.
pub fn read_lpstring(cur: &mut Cursor<&[u8]>) -> CodecResult<String> {
    let offset = cur.position();
    let available = remaining(cur);
    let length = cur.read_i32::<LittleEndian>().map_err(|_| CodecError::TruncatedData {
        offset,
        needed: LENGTH_SIZE as u64,
        available,
    })?;

    if length == 0 {
        return Ok(String::new());
    }
    if length < 0 {
        return Err(CodecError::UnsupportedEncoding { offset, length });
    }

    let needed = length as u64;
    let available = remaining(cur);
    if needed > available {
        return Err(CodecError::TruncatedData { offset: cur.position(), needed, available });
    }

    let start = cur.position() as usize;
    let end = start + length as usize;
    let bytes = &cur.get_ref()[start..end];
    cur.set_position(end as u64);

    match bytes.split_last() {
        Some((0, text)) => Ok(decode_text(text)),
        _ => Err(CodecError::MissingTerminator { offset }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        put_lpstring(&mut buf, text).unwrap();
        buf
    }

    #[test]
    fn empty_string_has_no_terminator() {
        assert_eq!(encode(""), [0, 0, 0, 0]);
    }

    #[test]
    fn non_empty_string_counts_terminator() {
        assert_eq!(encode("x=1"), [4, 0, 0, 0, b'x', b'=', b'1', 0]);
        assert_eq!(encoded_len("x=1").unwrap(), 8);
    }

    #[test]
    fn wide_chars_are_replaced() {
        assert_eq!(encode("a\u{20AC}"), [3, 0, 0, 0, b'a', b'?', 0]);
    }

    #[test]
    fn latin1_roundtrips() {
        let bytes = encode("caf\u{E9}");
        assert_eq!(bytes[7], 0xE9);
        let mut cur = Cursor::new(&bytes[..]);
        assert_eq!(read_lpstring(&mut cur).unwrap(), "caf\u{E9}");
        assert_eq!(cur.position(), bytes.len() as u64);
    }

    #[test]
    fn read_stops_after_declared_length() {
        let data = [2u8, 0, 0, 0, b'a', 0, 0xFF, 0xFF];
        let mut cur = Cursor::new(&data[..]);
        assert_eq!(read_lpstring(&mut cur).unwrap(), "a");
        assert_eq!(cur.position(), 6);
    }

    #[test]
    fn negative_length_is_wide_text() {
        let data = [0xFFu8, 0xFF, 0xFF, 0xFF];
        let err = read_lpstring(&mut Cursor::new(&data[..])).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedEncoding { offset: 0, length: -1 });
    }

    #[test]
    fn short_length_field_is_truncated() {
        let data = [0x05u8, 0x00];
        let err = read_lpstring(&mut Cursor::new(&data[..])).unwrap_err();
        assert_eq!(err, CodecError::TruncatedData { offset: 0, needed: 4, available: 2 });
    }

    #[test]
    fn missing_terminator_is_rejected() {
        let data = [2u8, 0, 0, 0, b'a', b'b'];
        let err = read_lpstring(&mut Cursor::new(&data[..])).unwrap_err();
        assert_eq!(err, CodecError::MissingTerminator { offset: 0 });
    }

    #[test]
    fn interior_nul_is_kept() {
        let data = [4u8, 0, 0, 0, b'a', 0, b'b', 0];
        let s = read_lpstring(&mut Cursor::new(&data[..])).unwrap();
        assert_eq!(s, "a\0b");
    }
}

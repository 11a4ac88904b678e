//! Container encode/decode.
//!
//! ```text
//! Container := Header Entry*
//! Header    := int32 0x0000001E
//! Entry     := LPString(name) LPString(body)
//! ```
//!
//! There is no entry count and no padding.  The decoder alternates
//! name/body reads until the input is exhausted, and the input must end
//! exactly on an entry boundary.
//!
//! Decoding is all-or-nothing through [`decode`]; [`ContainerReader`]
//! exposes the same parse incrementally for callers that want entry
//! offsets as they go.

use std::io::Cursor;

use crate::entry::{virtual_path, Entry, LocatedEntry};
use crate::error::{CodecError, CodecResult};
use crate::header::{Header, HEADER_SIZE};
use crate::lpstring::{encoded_len, put_lpstring, read_lpstring};

// ── Encode ───────────────────────────────────────────────────────────────────

/// Exact byte size [`encode`] will produce for `entries`.
pub fn encoded_size(entries: &[Entry]) -> CodecResult<usize> {
    entries.iter().try_fold(HEADER_SIZE, |acc, e| -> CodecResult<usize> {
        Ok(acc + encoded_len(&virtual_path(&e.name))? + encoded_len(&e.body)?)
    })
}

/// Serialize `entries` in order.  Each name is stored as
/// [`virtual_path`] of its base file name.
pub fn encode(entries: &[Entry]) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_size(entries)?);
    buf.extend_from_slice(&Header::default().to_bytes());
    for entry in entries {
        put_lpstring(&mut buf, &virtual_path(&entry.name))?;
        put_lpstring(&mut buf, &entry.body)?;
    }
    Ok(buf)
}

// ── Decode ───────────────────────────────────────────────────────────────────

/// Parse a whole container.  Any structural violation fails the call; no
/// partial entry list is ever returned.
pub fn decode(data: &[u8]) -> CodecResult<Vec<Entry>> {
    Ok(decode_located(data)?.into_iter().map(|l| l.entry).collect())
}

/// Like [`decode`], keeping the offset each entry starts at.
pub fn decode_located(data: &[u8]) -> CodecResult<Vec<LocatedEntry>> {
    ContainerReader::new(data).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    AwaitingHeader,
    ReadingEntries,
    Done,
    Failed,
}

/// Incremental decoder over an in-memory container.
///
/// Yields `Ok` entries until the input ends on an entry boundary.  The
/// first error is yielded once, after which the reader is exhausted.
pub struct ContainerReader<'a> {
    cursor: Cursor<&'a [u8]>,
    state:  ReaderState,
}

impl<'a> ContainerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(data), state: ReaderState::AwaitingHeader }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Current byte offset into the container.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn fail<T>(&mut self, err: CodecError) -> CodecResult<T> {
        self.state = ReaderState::Failed;
        Err(err)
    }

    /// Validate the header.  Called implicitly by the first
    /// [`next_entry`](Self::next_entry).
    pub fn read_header(&mut self) -> CodecResult<Header> {
        match Header::parse(self.cursor.get_ref()) {
            Ok(header) => {
                self.cursor.set_position(HEADER_SIZE as u64);
                self.state = ReaderState::ReadingEntries;
                Ok(header)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Read the next entry, or `None` once the input is exhausted.
    pub fn next_entry(&mut self) -> CodecResult<Option<LocatedEntry>> {
        match self.state {
            ReaderState::AwaitingHeader => {
                self.read_header()?;
            }
            ReaderState::ReadingEntries => {}
            ReaderState::Done | ReaderState::Failed => return Ok(None),
        }

        let offset = self.cursor.position();
        if offset >= self.cursor.get_ref().len() as u64 {
            self.state = ReaderState::Done;
            return Ok(None);
        }

        let name = match read_lpstring(&mut self.cursor) {
            Ok(s) => s,
            Err(e) => return self.fail(e),
        };
        let body = match read_lpstring(&mut self.cursor) {
            Ok(s) => s,
            Err(e) => return self.fail(e),
        };
        Ok(Some(LocatedEntry { offset, entry: Entry { name, body } }))
    }
}

impl Iterator for ContainerReader<'_> {
    type Item = CodecResult<LocatedEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

impl std::iter::FusedIterator for ContainerReader<'_> {}

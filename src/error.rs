use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Structural failures raised while encoding or parsing a container.
///
/// Every variant is terminal for the call that produced it: entry
/// boundaries are derived from previous length fields, so there is no
/// point at which a parse could resynchronise.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("first 4 bytes were 0x{found:08X}, expected 0x0000001E; not a Coalesced container")]
    InvalidHeader { found: i32 },
    #[error("truncated data at offset {offset}: needed {needed} byte(s), {available} available")]
    TruncatedData { offset: u64, needed: u64, available: u64 },
    #[error("wide-character string at offset {offset} (length {length}) is not supported")]
    UnsupportedEncoding { offset: u64, length: i32 },
    #[error("string at offset {offset} is not null terminated")]
    MissingTerminator { offset: u64 },
    #[error("string of {len} bytes does not fit a 32-bit length prefix")]
    StringTooLong { len: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Failures at the filesystem / command-line boundary.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Usage(String),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("can only decompile files named Coalesced.ini: {0}")]
    NotCoalesced(PathBuf),
    #[error("entry name {name:?} does not resolve to a file name")]
    UnsafeEntryName { name: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArchiveError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

//! Filesystem boundary — the embedding surface used by the CLI.
//!
//! ```no_run
//! use coalesced::archive::{compile_dir, extract_file, CompileOptions, ExtractOptions};
//!
//! let report = compile_dir("Config", &CompileOptions::default())?;
//! extract_file(&report.output, &ExtractOptions::default())?;
//! # Ok::<(), coalesced::ArchiveError>(())
//! ```
//!
//! Compilation reads every matching file before anything is written, and
//! extraction decodes the whole container before the first file is
//! created, so a malformed container never leaves partial output behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::container::{decode_located, encode};
use crate::entry::{Entry, LocatedEntry};
use crate::error::{ArchiveError, ArchiveResult};
use crate::lpstring::{decode_text, encode_text};

/// File name a container is written to and the only name accepted for
/// extraction.
pub const CONTAINER_FILE_NAME: &str = "Coalesced.ini";

// ── Options ──────────────────────────────────────────────────────────────────

/// Configuration for [`compile_dir`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Extension of the files to pack, compared case-insensitively.
    pub extension:   String,
    /// Name of the container written into the input directory.  A file of
    /// this name is never packed.
    pub output_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            extension:   "ini".to_owned(),
            output_name: CONTAINER_FILE_NAME.to_owned(),
        }
    }
}

/// Configuration for [`extract_file`].
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Destination directory; the container's own directory when unset.
    pub output_dir: Option<PathBuf>,
}

// ── Mode ─────────────────────────────────────────────────────────────────────

/// What a single command-line path asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Compile(PathBuf),
    Extract(PathBuf),
}

impl Mode {
    pub fn from_path<P: AsRef<Path>>(path: P) -> ArchiveResult<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(Mode::Compile(path.to_owned()));
        }
        if is_container_name(path) {
            return Ok(Mode::Extract(path.to_owned()));
        }
        Err(ArchiveError::Usage(format!(
            "expected a directory (to compile) or a {CONTAINER_FILE_NAME} file (to decompile), got {}",
            path.display()
        )))
    }
}

fn is_container_name(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == CONTAINER_FILE_NAME)
}

// ── Compile ──────────────────────────────────────────────────────────────────

/// Summary of a [`compile_dir`] run.
#[derive(Debug, Clone)]
pub struct CompileReport {
    pub output:  PathBuf,
    pub files:   Vec<String>,
    pub size:    usize,
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks(2).map(|c| unit([c[0], c.get(1).copied().unwrap_or(0)]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> String {
    bytes
        .chunks(4)
        .map(|c| {
            let mut raw = [0u8; 4];
            raw[..c.len()].copy_from_slice(c);
            char::from_u32(unit(raw)).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

/// Read a source file as text.  A UTF-32 or UTF-16 byte-order mark selects
/// that encoding; otherwise UTF-8 (with or without a BOM) is taken as text
/// and anything else is read byte-for-char.  Chars without a single-byte
/// form become `?` when encoded.
fn read_text(path: &Path) -> ArchiveResult<String> {
    let bytes = fs::read(path)?;
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE, 0x00, 0x00]) {
        return Ok(decode_utf32(rest, u32::from_le_bytes));
    }
    if let Some(rest) = bytes.strip_prefix(&[0x00, 0x00, 0xFE, 0xFF]) {
        return Ok(decode_utf32(rest, u32::from_be_bytes));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return Ok(decode_utf16(rest, u16::from_le_bytes));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return Ok(decode_utf16(rest, u16::from_be_bytes));
    }
    Ok(match String::from_utf8(bytes) {
        Ok(text) => match text.strip_prefix('\u{FEFF}') {
            Some(stripped) => stripped.to_owned(),
            None => text,
        },
        Err(e) => decode_text(e.as_bytes()),
    })
}

/// Gather the entries [`compile_dir`] would pack, sorted by file name
/// ignoring ASCII case.
pub fn collect_entries<P: AsRef<Path>>(dir: P, opts: &CompileOptions) -> ArchiveResult<Vec<Entry>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ArchiveError::NotADirectory(dir.to_owned()));
    }

    let mut paths = Vec::new();
    for item in fs::read_dir(dir)? {
        let path = item?.path();
        if !path.is_file() {
            continue;
        }
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&opts.extension));
        let is_output = path.file_name().is_some_and(|n| n == opts.output_name.as_str());
        if matches_ext && !is_output {
            paths.push(path);
        }
    }
    paths.sort_by_cached_key(|p| {
        let name = p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        (name.to_ascii_lowercase(), name)
    });

    paths
        .iter()
        .map(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            Ok(Entry { name, body: read_text(path)? })
        })
        .collect()
}

/// Pack every matching file of `dir` into `dir/<output_name>`.
pub fn compile_dir<P: AsRef<Path>>(dir: P, opts: &CompileOptions) -> ArchiveResult<CompileReport> {
    let dir = dir.as_ref();
    let entries = collect_entries(dir, opts)?;
    info!(count = entries.len(), dir = %dir.display(), "number of files to compile");
    for entry in &entries {
        info!(file = %entry.name, "coalescing");
    }

    let bytes = encode(&entries)?;
    let output = dir.join(&opts.output_name);
    fs::write(&output, &bytes)?;
    info!(path = %output.display(), size = bytes.len(), "wrote container");

    Ok(CompileReport {
        output,
        files: entries.into_iter().map(|e| e.name).collect(),
        size:  bytes.len(),
    })
}

// ── Extract / list ───────────────────────────────────────────────────────────

/// Listing row for one decoded entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub offset:    u64,
    pub file_name: String,
    pub name:      String,
    pub body_len:  usize,
}

fn read_container(path: &Path) -> ArchiveResult<Vec<LocatedEntry>> {
    if !is_container_name(path) {
        return Err(ArchiveError::NotCoalesced(path.to_owned()));
    }
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), size = bytes.len(), "decoding container");
    Ok(decode_located(&bytes)?)
}

/// Decode `path` and describe its entries without writing anything.
pub fn list_file<P: AsRef<Path>>(path: P) -> ArchiveResult<Vec<EntryInfo>> {
    Ok(read_container(path.as_ref())?
        .into_iter()
        .map(|l| EntryInfo {
            offset:    l.offset,
            file_name: l.entry.file_name().to_owned(),
            body_len:  l.entry.body.chars().count(),
            name:      l.entry.name,
        })
        .collect())
}

fn checked_file_name(entry: &Entry) -> ArchiveResult<&str> {
    match entry.file_name() {
        "" | "." | ".." => Err(ArchiveError::UnsafeEntryName { name: entry.name.clone() }),
        name => Ok(name),
    }
}

/// Write every entry of the container at `path` as its own file, named by
/// the trailing component of the stored name.  Returns the written paths in
/// container order.
pub fn extract_file<P: AsRef<Path>>(path: P, opts: &ExtractOptions) -> ArchiveResult<Vec<PathBuf>> {
    let path = path.as_ref();
    let located = read_container(path)?;
    for l in &located {
        checked_file_name(&l.entry)?;
    }

    let dest = match &opts.output_dir {
        Some(dir) => dir.clone(),
        None => match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
            _ => PathBuf::from("."),
        },
    };
    if !dest.exists() {
        fs::create_dir_all(&dest)?;
    }

    let mut written = Vec::with_capacity(located.len());
    for l in &located {
        let file_name = checked_file_name(&l.entry)?;
        info!(file = file_name, position = %format!("0x{:06X}", l.offset), "writing out file");
        let out = dest.join(file_name);
        fs::write(&out, encode_text(&l.entry.body))?;
        written.push(out);
    }
    Ok(written)
}

pub mod error;
pub mod header;
pub mod lpstring;
pub mod entry;
pub mod container;
pub mod archive;

pub use error::{ArchiveError, CodecError};
pub use header::{Header, HEADER_MAGIC};
pub use entry::{Entry, LocatedEntry, VIRTUAL_PREFIX};
pub use container::{decode, decode_located, encode, ContainerReader};

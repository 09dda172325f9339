use thiserror::Error;

use crate::tag::TagId;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid file magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u32),

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("truncated input at offset {offset}: need {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("unknown tag id {id} at offset {offset}")]
    UnknownTagId { id: u8, offset: usize },

    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("negative list length {length} at offset {offset}")]
    NegativeLength { length: i32, offset: usize },

    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),

    #[error("list holds {expected} elements, cannot add {actual}")]
    MixedList { expected: TagId, actual: TagId },

    #[error("tag name of {0} bytes exceeds the 65535-byte limit")]
    NameTooLong(usize),

    #[error("root tag must be a compound, got {0}")]
    RootNotCompound(TagId),

    #[error("{0} trailing bytes after root compound")]
    TrailingBytes(usize),

    #[error("uncompressed size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("encoded tree of {0} bytes exceeds the size limit")]
    TooLarge(usize),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TreeResult<T> = Result<T, TreeError>;

use std::path::PathBuf;

use tagstore_codec::CodecError;
use tagstore_tree::TreeError;
use tagstore_types::TypeError;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record or its descriptor cannot be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A registered descriptor is inconsistent.
    #[error("invalid type descriptor: {0}")]
    Type(#[from] TypeError),

    /// No descriptor is registered for the record type.
    #[error("record type not registered: {0}")]
    UnknownType(String),

    /// The record has no key field, or its key is null or has no string form.
    #[error("record of type {type_name} has no usable key")]
    MissingKey { type_name: String },

    /// The key cannot be used as a file name.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The type name cannot be used as a directory name.
    #[error("invalid type name {name:?}: {reason}")]
    InvalidTypeName { name: String, reason: &'static str },

    /// The previous file could not be removed before replacing it.
    #[error("failed to remove {0} before replacing it")]
    ReplaceFailed(PathBuf),

    /// The stored tree could not be encoded or decoded.
    #[error("tag tree error: {0}")]
    Tree(#[from] TreeError),

    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns `true` for errors caused by a misconfigured descriptor,
    /// record, or call rather than by the storage medium. These abort the
    /// calling operation; everything else degrades to `false` / `None`.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Codec(_)
                | Self::Type(_)
                | Self::UnknownType(_)
                | Self::MissingKey { .. }
                | Self::InvalidKey { .. }
                | Self::InvalidTypeName { .. }
                | Self::Config(_)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

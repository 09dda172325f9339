//! Named tag trees for tagstore.
//!
//! A tag tree is a self-describing document of named, typed nodes: scalars
//! (byte, int, float, double, string), ordered lists of named elements, and
//! nested compounds. A root [`Compound`] is the unit written to and read from
//! a single storage file.
//!
//! # Layers
//!
//! - [`tag`] / [`compound`]: the in-memory tree
//! - [`binary`]: uncompressed big-endian encoding of a document
//! - [`file`]: zstd compression with a magic/version/CRC32 header
//!
//! Decoding never panics on malformed input: every structural problem is a
//! [`TreeError`].

pub mod binary;
pub mod compound;
pub mod error;
pub mod file;
pub mod tag;

pub use compound::Compound;
pub use error::{TreeError, TreeResult};
pub use file::{from_bytes, read_from, to_bytes, write_to, DEFAULT_COMPRESSION_LEVEL};
pub use tag::{NamedTag, Tag, TagId, TagList};

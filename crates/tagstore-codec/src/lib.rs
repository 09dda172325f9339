//! Type-directed codec between tagstore records and tag trees.
//!
//! - [`field`]: one typed value to and from a single node (scalar, list of
//!   named elements, or nested compound)
//! - [`record`]: a whole [`Record`](tagstore_types::Record) to and from a
//!   [`Compound`](tagstore_tree::Compound), driven by its type descriptor
//!
//! Encoding happens entirely in memory, so a record that cannot be encoded is
//! rejected before any storage I/O is attempted. Every [`CodecError`] signals
//! a misconfigured descriptor or record, never bad data on disk: missing
//! nodes decode to their kind's zero value.

pub mod error;
pub mod field;
pub mod record;

pub use error::{CodecError, CodecResult};
pub use field::{decode_field, element_name, encode_field};
pub use record::{decode_record, encode, encode_record, RecordCodec};

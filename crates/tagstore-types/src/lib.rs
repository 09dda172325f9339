//! Foundation types for tagstore.
//!
//! This crate provides the in-memory record model that every other tagstore
//! crate works against. It owns no I/O and knows nothing about the on-disk
//! format.
//!
//! # Key Types
//!
//! - [`FieldKind`]: Closed set of declared field types
//! - [`Value`]: A concrete field value, one variant per supported kind
//! - [`FieldValue`]: A `(name, kind, value)` triple; `None` is the null marker
//! - [`Record`]: A set of uniquely named fields plus an optional key field
//! - [`TypeDescriptor`] / [`DescriptorRegistry`]: Declarative field metadata
//!   supplied by the caller
//! - [`RecordDescriptor`] / [`TypeRegistry`]: Plain-data implementations of
//!   the descriptor traits
//!
//! # Preconditions
//!
//! Record types may nest other record types, but the type graph must be finite
//! and acyclic. Nothing here detects cycles.

pub mod descriptor;
pub mod error;
pub mod kind;
pub mod record;
pub mod value;

pub use descriptor::{DescriptorRegistry, RecordDescriptor, TypeDescriptor, TypeRegistry};
pub use error::TypeError;
pub use kind::FieldKind;
pub use record::{FieldValue, Record};
pub use value::Value;

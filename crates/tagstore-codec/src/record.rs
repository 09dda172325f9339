//! Record codec: a whole record to and from a compound, driven by its type
//! descriptor.

use tagstore_tree::Compound;
use tagstore_types::{DescriptorRegistry, FieldValue, Record, TypeDescriptor};

use crate::error::{CodecError, CodecResult};
use crate::field::{decode_field, encode_field};

/// Encode every field of `record` into `compound`.
///
/// Fields are keyed independently, so iteration order does not matter.
pub fn encode_record(compound: &mut Compound, record: &Record) -> CodecResult<()> {
    for field in record.fields() {
        encode_field(compound, field)?;
    }
    Ok(())
}

/// Encode `record` into a fresh compound.
pub fn encode(record: &Record) -> CodecResult<Compound> {
    let mut compound = Compound::new();
    encode_record(&mut compound, record)?;
    Ok(compound)
}

/// Build a record from `compound` using `descriptor`.
///
/// The key field, if the descriptor declares one, is decoded first and
/// designated as the record key. Every persisted field is then decoded in
/// declaration order. Fields missing from `compound` take their kind's zero
/// value; they are never `None`.
pub fn decode_record(
    compound: &Compound,
    descriptor: &dyn TypeDescriptor,
    registry: &dyn DescriptorRegistry,
) -> CodecResult<Record> {
    let mut record = Record::new();

    if let Some(key) = descriptor.unique_key_field() {
        let field = decode_declared(compound, descriptor, key, registry)?;
        record.set_key(field);
    }

    for name in descriptor.persisted_fields() {
        if record.key_field() == Some(name.as_str()) {
            continue;
        }
        let field = decode_declared(compound, descriptor, name, registry)?;
        record.insert(field);
    }

    Ok(record)
}

fn decode_declared(
    compound: &Compound,
    descriptor: &dyn TypeDescriptor,
    name: &str,
    registry: &dyn DescriptorRegistry,
) -> CodecResult<FieldValue> {
    let kind = descriptor
        .declared_kind(name)
        .ok_or_else(|| CodecError::UndeclaredField {
            type_name: descriptor.type_name().to_string(),
            field: name.to_string(),
        })?
        .clone();
    let value = decode_field(compound, name, &kind, registry)?;
    Ok(FieldValue {
        name: name.to_string(),
        kind,
        value: Some(value),
    })
}

/// Record codec bound to a descriptor registry.
///
/// Resolves top-level types by name so callers only deal in type names.
#[derive(Clone, Copy)]
pub struct RecordCodec<'r> {
    registry: &'r dyn DescriptorRegistry,
}

impl<'r> RecordCodec<'r> {
    pub fn new(registry: &'r dyn DescriptorRegistry) -> Self {
        Self { registry }
    }

    /// Encode a record. The registry is not consulted: each field carries its
    /// own declared kind.
    pub fn encode(&self, record: &Record) -> CodecResult<Compound> {
        encode(record)
    }

    /// Decode a compound as a record of `type_name`.
    pub fn decode(&self, type_name: &str, compound: &Compound) -> CodecResult<Record> {
        let descriptor = self
            .registry
            .descriptor(type_name)
            .ok_or_else(|| CodecError::UnknownType(type_name.to_string()))?;
        decode_record(compound, descriptor, self.registry)
    }

    /// The descriptor for `type_name`, if registered.
    pub fn descriptor(&self, type_name: &str) -> Option<&'r dyn TypeDescriptor> {
        self.registry.descriptor(type_name)
    }
}

impl std::fmt::Debug for RecordCodec<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCodec").finish_non_exhaustive()
    }
}

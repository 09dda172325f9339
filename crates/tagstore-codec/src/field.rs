//! Field codec: one typed value to and from a tag tree node.

use tagstore_tree::{Compound, Tag, TagList};
use tagstore_types::{DescriptorRegistry, FieldKind, FieldValue, Value};
use tracing::warn;

use crate::error::{CodecError, CodecResult};
use crate::record::{decode_record, encode_record};

/// Name of the `index`-th element of an array field.
pub fn element_name(field: &str, index: usize) -> String {
    format!("{field}_{index}")
}

/// Write `field` into `compound` under its name.
///
/// Null fields are skipped, leaving no trace in the output. Scalars become
/// single nodes, arrays become lists of named elements, and nested records
/// become child compounds.
pub fn encode_field(compound: &mut Compound, field: &FieldValue) -> CodecResult<()> {
    let Some(value) = &field.value else {
        return Ok(());
    };
    let name = field.name.as_str();

    match (&field.kind, value) {
        (FieldKind::Unsupported(kind), _) => {
            return Err(CodecError::UnsupportedFieldType {
                field: field.name.clone(),
                kind: kind.clone(),
            })
        }
        (FieldKind::Int, Value::Int(v)) => compound.set_int(name, *v),
        (FieldKind::Float, Value::Float(v)) => compound.set_float(name, *v),
        (FieldKind::Double, Value::Double(v)) => compound.set_double(name, *v),
        (FieldKind::Bool, Value::Bool(v)) => compound.set_bool(name, *v),
        (FieldKind::String, Value::String(v)) => compound.set_string(name, v.as_str()),
        (FieldKind::IntArray, Value::IntArray(items)) => {
            let list = array_list(name, items.iter().map(|v| Tag::Int(*v)))?;
            compound.set_list(name, list);
        }
        (FieldKind::DoubleArray, Value::DoubleArray(items)) => {
            let list = array_list(name, items.iter().map(|v| Tag::Double(*v)))?;
            compound.set_list(name, list);
        }
        (FieldKind::BoolArray, Value::BoolArray(items)) => {
            let list = array_list(name, items.iter().map(|v| Tag::Byte(i8::from(*v))))?;
            compound.set_list(name, list);
        }
        (FieldKind::StringArray, Value::StringArray(items)) => {
            let list = array_list(name, items.iter().map(|v| Tag::String(v.clone())))?;
            compound.set_list(name, list);
        }
        (FieldKind::Record(_), Value::Record(nested)) => {
            let mut child = Compound::new();
            encode_record(&mut child, nested)?;
            compound.set_compound(name, child);
        }
        (declared, value) => {
            return Err(CodecError::KindMismatch {
                field: field.name.clone(),
                declared: declared.clone(),
                actual: value.kind_name(),
            })
        }
    }
    Ok(())
}

/// Read the field `name` of declared `kind` from `compound`.
///
/// A missing node decodes to the kind's zero value rather than failing. A
/// nested record is decoded with the nested type's descriptor; if its node is
/// missing, it is decoded from an empty compound so every nested field takes
/// its default.
pub fn decode_field(
    compound: &Compound,
    name: &str,
    kind: &FieldKind,
    registry: &dyn DescriptorRegistry,
) -> CodecResult<Value> {
    let value = match kind {
        FieldKind::Int => Value::Int(compound.get_int(name)),
        FieldKind::Float => Value::Float(compound.get_float(name)),
        FieldKind::Double => Value::Double(compound.get_double(name)),
        FieldKind::Bool => Value::Bool(compound.get_bool(name)),
        FieldKind::String => Value::String(compound.get_string(name).to_owned()),
        FieldKind::IntArray => Value::IntArray(read_array(compound, name, |tag| match tag {
            Tag::Int(v) => Some(*v),
            _ => None,
        })),
        FieldKind::DoubleArray => {
            Value::DoubleArray(read_array(compound, name, |tag| match tag {
                Tag::Double(v) => Some(*v),
                _ => None,
            }))
        }
        FieldKind::BoolArray => Value::BoolArray(read_array(compound, name, |tag| match tag {
            Tag::Byte(v) => Some(*v != 0),
            _ => None,
        })),
        FieldKind::StringArray => {
            Value::StringArray(read_array(compound, name, |tag| match tag {
                Tag::String(v) => Some(v.clone()),
                _ => None,
            }))
        }
        FieldKind::Record(type_name) => {
            let descriptor = registry
                .descriptor(type_name)
                .ok_or_else(|| CodecError::UnknownType(type_name.clone()))?;
            let empty = Compound::new();
            let child = compound.get_compound(name).unwrap_or(&empty);
            Value::Record(decode_record(child, descriptor, registry)?)
        }
        FieldKind::Unsupported(kind) => {
            return Err(CodecError::UnsupportedFieldType {
                field: name.to_string(),
                kind: kind.clone(),
            })
        }
    };
    Ok(value)
}

fn array_list(name: &str, tags: impl Iterator<Item = Tag>) -> CodecResult<TagList> {
    let mut list = TagList::new();
    for (i, tag) in tags.enumerate() {
        list.push(element_name(name, i), tag)?;
    }
    Ok(list)
}

/// Collect list elements in stored order. A list of the wrong element type is
/// read as empty.
fn read_array<T>(compound: &Compound, name: &str, extract: impl Fn(&Tag) -> Option<T>) -> Vec<T> {
    let Some(list) = compound.get_list(name) else {
        return Vec::new();
    };
    let items: Vec<T> = list.iter().filter_map(|item| extract(&item.tag)).collect();
    if items.len() != list.len() {
        warn!(
            field = name,
            element = ?list.element_id(),
            "array field holds elements of the wrong type; reading as empty"
        );
        return Vec::new();
    }
    items
}

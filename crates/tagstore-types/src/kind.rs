use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Declared type of a persisted field.
///
/// The set is closed: the codec handles every variant except
/// [`FieldKind::Unsupported`], which exists so a descriptor can report a type
/// it knows nothing about without the codec having to guess.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// 32-bit signed integer.
    Int,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    Bool,
    String,
    IntArray,
    DoubleArray,
    BoolArray,
    StringArray,
    /// A nested record of the named type.
    Record(String),
    /// A declared type outside the supported set.
    Unsupported(String),
}

impl FieldKind {
    /// Returns `true` if the codec can persist values of this kind.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Returns `true` for the four array kinds.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::IntArray | Self::DoubleArray | Self::BoolArray | Self::StringArray
        )
    }

    /// Returns `true` if a value of this kind can serve as a record key.
    pub fn is_key_kind(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Float | Self::Double | Self::Bool | Self::String
        )
    }

    /// The zero value decoded for a field whose node is missing from storage.
    ///
    /// Returns `None` for nested records (the default depends on the nested
    /// type's descriptor) and for unsupported kinds.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Int => Some(Value::Int(0)),
            Self::Float => Some(Value::Float(0.0)),
            Self::Double => Some(Value::Double(0.0)),
            Self::Bool => Some(Value::Bool(false)),
            Self::String => Some(Value::String(String::new())),
            Self::IntArray => Some(Value::IntArray(Vec::new())),
            Self::DoubleArray => Some(Value::DoubleArray(Vec::new())),
            Self::BoolArray => Some(Value::BoolArray(Vec::new())),
            Self::StringArray => Some(Value::StringArray(Vec::new())),
            Self::Record(_) | Self::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::IntArray => write!(f, "int[]"),
            Self::DoubleArray => write!(f, "double[]"),
            Self::BoolArray => write!(f, "bool[]"),
            Self::StringArray => write!(f, "string[]"),
            Self::Record(name) => write!(f, "record<{name}>"),
            Self::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_is_the_only_unsupported_kind() {
        assert!(FieldKind::Int.is_supported());
        assert!(FieldKind::Record("Home".into()).is_supported());
        assert!(!FieldKind::Unsupported("java.util.UUID".into()).is_supported());
    }

    #[test]
    fn defaults_for_scalars_and_arrays() {
        assert_eq!(FieldKind::Int.default_value(), Some(Value::Int(0)));
        assert_eq!(FieldKind::Bool.default_value(), Some(Value::Bool(false)));
        assert_eq!(
            FieldKind::String.default_value(),
            Some(Value::String(String::new()))
        );
        assert_eq!(
            FieldKind::StringArray.default_value(),
            Some(Value::StringArray(vec![]))
        );
        assert_eq!(FieldKind::Record("Home".into()).default_value(), None);
    }

    #[test]
    fn key_kinds() {
        assert!(FieldKind::String.is_key_kind());
        assert!(FieldKind::Int.is_key_kind());
        assert!(!FieldKind::IntArray.is_key_kind());
        assert!(!FieldKind::Record("Home".into()).is_key_kind());
    }

    #[test]
    fn display() {
        assert_eq!(FieldKind::DoubleArray.to_string(), "double[]");
        assert_eq!(FieldKind::Record("Warp".into()).to_string(), "record<Warp>");
    }
}

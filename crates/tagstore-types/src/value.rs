use serde::{Deserialize, Serialize};

use crate::kind::FieldKind;
use crate::record::Record;

/// A concrete field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    IntArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    BoolArray(Vec<bool>),
    StringArray(Vec<String>),
    Record(Record),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::IntArray(_) => "int[]",
            Self::DoubleArray(_) => "double[]",
            Self::BoolArray(_) => "bool[]",
            Self::StringArray(_) => "string[]",
            Self::Record(_) => "record",
        }
    }

    /// Returns `true` if this value can be stored under the declared kind.
    ///
    /// Nested records match any `FieldKind::Record`; the record itself does
    /// not carry its type name.
    pub fn matches(&self, kind: &FieldKind) -> bool {
        matches!(
            (self, kind),
            (Self::Int(_), FieldKind::Int)
                | (Self::Float(_), FieldKind::Float)
                | (Self::Double(_), FieldKind::Double)
                | (Self::Bool(_), FieldKind::Bool)
                | (Self::String(_), FieldKind::String)
                | (Self::IntArray(_), FieldKind::IntArray)
                | (Self::DoubleArray(_), FieldKind::DoubleArray)
                | (Self::BoolArray(_), FieldKind::BoolArray)
                | (Self::StringArray(_), FieldKind::StringArray)
                | (Self::Record(_), FieldKind::Record(_))
        )
    }

    /// String form used as a storage key, if this value can be one.
    pub fn as_key_string(&self) -> Option<String> {
        match self {
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Double(v) => Some(v.to_string()),
            Self::Bool(v) => Some(v.to_string()),
            Self::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Self::IntArray(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::DoubleArray(v)
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Self::BoolArray(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::StringArray(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_declared_kind() {
        assert!(Value::Int(1).matches(&FieldKind::Int));
        assert!(!Value::Int(1).matches(&FieldKind::Double));
        assert!(Value::Record(Record::new()).matches(&FieldKind::Record("Home".into())));
        assert!(!Value::String("x".into()).matches(&FieldKind::Unsupported("x".into())));
    }

    #[test]
    fn key_strings() {
        assert_eq!(Value::Int(42).as_key_string().as_deref(), Some("42"));
        assert_eq!(Value::from("steve").as_key_string().as_deref(), Some("steve"));
        assert_eq!(Value::Bool(true).as_key_string().as_deref(), Some("true"));
        assert_eq!(Value::IntArray(vec![1]).as_key_string(), None);
    }

    #[test]
    fn serde_json_roundtrip() {
        let v = Value::StringArray(vec!["a".into(), "b".into()]);
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}

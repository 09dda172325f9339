use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::FieldKind;
use crate::value::Value;

/// A single persisted field: name, declared kind, and current value.
///
/// A `None` value is the null marker. Null fields are skipped when encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub kind: FieldKind,
    pub value: Option<Value>,
}

impl FieldValue {
    /// Create a field holding a value.
    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: Some(value.into()),
        }
    }

    /// Create a null field.
    pub fn null(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value: None,
        }
    }

    /// Returns `true` if the field carries no value.
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// An in-memory persisted object.
///
/// Fields are keyed by name, so names are unique by construction. One field
/// may be designated as the record key; it lives in the same field map and
/// determines where the record is stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
    key_field: Option<String>,
}

impl Record {
    /// Create an empty record with no key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any field with the same name.
    pub fn insert(&mut self, field: FieldValue) -> Option<FieldValue> {
        self.fields.insert(field.name.clone(), field)
    }

    /// Insert a field and designate it as the record key.
    pub fn set_key(&mut self, field: FieldValue) -> Option<FieldValue> {
        self.key_field = Some(field.name.clone());
        self.insert(field)
    }

    /// Builder form of [`Record::insert`].
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(FieldValue::new(name, kind, value));
        self
    }

    /// Builder form of [`Record::set_key`].
    pub fn with_key(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        value: impl Into<Value>,
    ) -> Self {
        self.set_key(FieldValue::new(name, kind, value));
        self
    }

    /// Builder that adds a null field.
    pub fn with_null(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.insert(FieldValue::null(name, kind));
        self
    }

    /// Remove a field by name. Clears the key designation if it was the key.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        if self.key_field.as_deref() == Some(name) {
            self.key_field = None;
        }
        self.fields.remove(name)
    }

    /// Name of the designated key field.
    pub fn key_field(&self) -> Option<&str> {
        self.key_field.as_deref()
    }

    /// The designated key field, if one is set and present.
    pub fn key(&self) -> Option<&FieldValue> {
        self.key_field.as_deref().and_then(|name| self.fields.get(name))
    }

    /// The key value as a string identifier.
    ///
    /// Returns `None` if there is no key, the key is null, or its value kind
    /// has no string form.
    pub fn key_string(&self) -> Option<String> {
        self.key()?.value.as_ref()?.as_key_string()
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a field's value by name. Null fields yield `None`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)?.value.as_ref()
    }

    /// Iterate over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }

    /// Number of fields, including null fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

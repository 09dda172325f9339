//! Type descriptors: the declarative metadata a caller supplies for each
//! record type.
//!
//! The engine never inspects Rust types directly. It learns which fields to
//! persist, their declared kinds, and which field is the key from a
//! [`TypeDescriptor`], and resolves nested record types through a
//! [`DescriptorRegistry`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::kind::FieldKind;

/// Field metadata for one record type.
pub trait TypeDescriptor: Send + Sync {
    /// Name of the record type; also the storage directory name.
    fn type_name(&self) -> &str;

    /// Name of the field that serves as the unique key, if any.
    fn unique_key_field(&self) -> Option<&str>;

    /// Names of the persisted fields, in declaration order.
    fn persisted_fields(&self) -> &[String];

    /// Declared kind of a field. `None` if the field is not declared.
    fn declared_kind(&self, field: &str) -> Option<&FieldKind>;
}

/// Resolves record type names to their descriptors.
pub trait DescriptorRegistry: Send + Sync {
    fn descriptor(&self, type_name: &str) -> Option<&dyn TypeDescriptor>;
}

/// Plain-data [`TypeDescriptor`] built with a small builder API.
///
/// ```
/// use tagstore_types::{FieldKind, RecordDescriptor, TypeDescriptor};
///
/// let warp = RecordDescriptor::new("Warp")
///     .key("name", FieldKind::String)
///     .field("position", FieldKind::DoubleArray)
///     .field("dimension", FieldKind::Int);
///
/// assert_eq!(warp.unique_key_field(), Some("name"));
/// assert_eq!(warp.persisted_fields().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    type_name: String,
    key_field: Option<String>,
    fields: Vec<String>,
    kinds: BTreeMap<String, FieldKind>,
}

impl RecordDescriptor {
    /// Create a descriptor with no fields.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key_field: None,
            fields: Vec::new(),
            kinds: BTreeMap::new(),
        }
    }

    /// Declare the unique key field.
    ///
    /// The key is declared separately from the persisted field list; it is
    /// always decoded first.
    pub fn key(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        self.kinds.insert(name.clone(), kind);
        self.key_field = Some(name);
        self
    }

    /// Declare a persisted field. Re-declaring a field replaces its kind and
    /// keeps its original position.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        if !self.fields.contains(&name) {
            self.fields.push(name.clone());
        }
        self.kinds.insert(name, kind);
        self
    }

    /// Check that every persisted field is declared with a supported kind and
    /// that the key field, if any, has a kind that can form a key.
    pub fn validate(&self) -> Result<(), TypeError> {
        for name in self.key_field.iter().chain(self.fields.iter()) {
            let kind = self
                .kinds
                .get(name)
                .ok_or_else(|| TypeError::UndeclaredField {
                    type_name: self.type_name.clone(),
                    field: name.clone(),
                })?;
            if !kind.is_supported() {
                return Err(TypeError::UnsupportedKind {
                    type_name: self.type_name.clone(),
                    field: name.clone(),
                    kind: kind.to_string(),
                });
            }
        }
        if let Some(key) = &self.key_field {
            let kind = &self.kinds[key];
            if !kind.is_key_kind() {
                return Err(TypeError::InvalidKeyKind {
                    type_name: self.type_name.clone(),
                    field: key.clone(),
                    kind: kind.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl TypeDescriptor for RecordDescriptor {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn unique_key_field(&self) -> Option<&str> {
        self.key_field.as_deref()
    }

    fn persisted_fields(&self) -> &[String] {
        &self.fields
    }

    fn declared_kind(&self, field: &str) -> Option<&FieldKind> {
        self.kinds.get(field)
    }
}

/// Map-backed [`DescriptorRegistry`].
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, RecordDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, returning the one it replaced.
    pub fn register(&mut self, descriptor: RecordDescriptor) -> Option<RecordDescriptor> {
        self.types.insert(descriptor.type_name.clone(), descriptor)
    }

    /// Builder form of [`TypeRegistry::register`].
    pub fn with(mut self, descriptor: RecordDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&RecordDescriptor> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Validate every registered descriptor.
    pub fn validate(&self) -> Result<(), TypeError> {
        self.types.values().try_for_each(RecordDescriptor::validate)
    }
}

impl DescriptorRegistry for TypeRegistry {
    fn descriptor(&self, type_name: &str) -> Option<&dyn TypeDescriptor> {
        self.types.get(type_name).map(|d| d as &dyn TypeDescriptor)
    }
}

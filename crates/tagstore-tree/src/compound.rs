use std::collections::BTreeMap;

use serde::Serialize;

use crate::tag::{Tag, TagList};

/// A named collection of tags; the unit of storage.
///
/// Typed getters return the type's zero value when the entry is missing or
/// holds a different tag type, so readers never fail on absent data. Use
/// [`Compound::contains`] to tell an absent entry from a stored zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Compound {
    entries: BTreeMap<String, Tag>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, tag: Tag) -> Option<Tag> {
        self.entries.insert(name.into(), tag)
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set_byte(&mut self, name: impl Into<String>, value: i8) {
        self.insert(name, Tag::Byte(value));
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i32) {
        self.insert(name, Tag::Int(value));
    }

    pub fn set_float(&mut self, name: impl Into<String>, value: f32) {
        self.insert(name, Tag::Float(value));
    }

    pub fn set_double(&mut self, name: impl Into<String>, value: f64) {
        self.insert(name, Tag::Double(value));
    }

    /// Booleans are stored as bytes, `1` for true.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set_byte(name, i8::from(value));
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name, Tag::String(value.into()));
    }

    pub fn set_list(&mut self, name: impl Into<String>, list: TagList) {
        self.insert(name, Tag::List(list));
    }

    pub fn set_compound(&mut self, name: impl Into<String>, compound: Compound) {
        self.insert(name, Tag::Compound(compound));
    }

    pub fn get_byte(&self, name: &str) -> i8 {
        match self.get(name) {
            Some(Tag::Byte(v)) => *v,
            _ => 0,
        }
    }

    pub fn get_int(&self, name: &str) -> i32 {
        match self.get(name) {
            Some(Tag::Int(v)) => *v,
            _ => 0,
        }
    }

    pub fn get_float(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(Tag::Float(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn get_double(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(Tag::Double(v)) => *v,
            _ => 0.0,
        }
    }

    /// Any non-zero byte reads as `true`.
    pub fn get_bool(&self, name: &str) -> bool {
        self.get_byte(name) != 0
    }

    pub fn get_string(&self, name: &str) -> &str {
        match self.get(name) {
            Some(Tag::String(v)) => v,
            _ => "",
        }
    }

    /// The list stored under `name`, if present.
    pub fn get_list(&self, name: &str) -> Option<&TagList> {
        match self.get(name) {
            Some(Tag::List(list)) => Some(list),
            _ => None,
        }
    }

    /// The compound stored under `name`, if present.
    pub fn get_compound(&self, name: &str) -> Option<&Compound> {
        match self.get(name) {
            Some(Tag::Compound(c)) => Some(c),
            _ => None,
        }
    }
}

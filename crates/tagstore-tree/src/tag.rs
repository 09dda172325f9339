use std::fmt;

use serde::Serialize;

use crate::compound::Compound;
use crate::error::{TreeError, TreeResult};

/// Wire identifier for each tag type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum TagId {
    /// Terminates a compound's entry list. Never stored as a value.
    End = 0,
    Byte = 1,
    Int = 3,
    Float = 5,
    Double = 6,
    String = 8,
    List = 9,
    Compound = 10,
}

impl TagId {
    /// The byte written on the wire.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::End),
            1 => Some(Self::Byte),
            3 => Some(Self::Int),
            5 => Some(Self::Float),
            6 => Some(Self::Double),
            8 => Some(Self::String),
            9 => Some(Self::List),
            10 => Some(Self::Compound),
            _ => None,
        }
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::End => "end",
            Self::Byte => "byte",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::List => "list",
            Self::Compound => "compound",
        };
        f.write_str(name)
    }
}

/// A node in a tag tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Tag {
    Byte(i8),
    Int(i32),
    Float(f32),
    Double(f64),
    String(String),
    List(TagList),
    Compound(Compound),
}

impl Tag {
    pub fn id(&self) -> TagId {
        match self {
            Self::Byte(_) => TagId::Byte,
            Self::Int(_) => TagId::Int,
            Self::Float(_) => TagId::Float,
            Self::Double(_) => TagId::Double,
            Self::String(_) => TagId::String,
            Self::List(_) => TagId::List,
            Self::Compound(_) => TagId::Compound,
        }
    }
}

/// A list element. Unlike compound entries, list elements keep their names in
/// order rather than being keyed by them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedTag {
    pub name: String,
    pub tag: Tag,
}

/// An ordered, homogeneous list of named tags.
///
/// The element type is fixed by the first element pushed. An empty list has no
/// element type and is written with [`TagId::End`] as its element id.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TagList {
    #[serde(skip)]
    element: Option<TagId>,
    items: Vec<NamedTag>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element. Fails if its type differs from the list's.
    pub fn push(&mut self, name: impl Into<String>, tag: Tag) -> TreeResult<()> {
        let id = tag.id();
        match self.element {
            Some(expected) if expected != id => {
                return Err(TreeError::MixedList {
                    expected,
                    actual: id,
                })
            }
            _ => self.element = Some(id),
        }
        self.items.push(NamedTag {
            name: name.into(),
            tag,
        });
        Ok(())
    }

    /// Element type, or `None` for an empty list.
    pub fn element_id(&self) -> Option<TagId> {
        self.element
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index).map(|item| &item.tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedTag> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

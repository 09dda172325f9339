//! Uncompressed binary encoding of tag trees.
//!
//! All integers are big-endian. Layout:
//!
//! ```text
//! named tag := [id: u8] [name] [payload]
//! name      := [len: u16] [UTF-8 bytes]
//! string    := [len: u32] [UTF-8 bytes]
//! compound  := named tag* [End: u8 = 0]
//! list      := [element id: u8] [count: i32] ([name: string] [payload])*
//! ```
//!
//! A document is a single named compound with an empty name.

use crate::compound::Compound;
use crate::error::{TreeError, TreeResult};
use crate::tag::{Tag, TagId, TagList};

/// Maximum nesting of compounds and lists accepted by the decoder.
pub const MAX_DEPTH: usize = 512;

/// Encode a root compound into a document.
pub fn encode_root(root: &Compound) -> TreeResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.push(TagId::Compound.as_byte());
    write_name(&mut buf, "")?;
    write_compound(&mut buf, root)?;
    Ok(buf)
}

/// Decode a document into its root compound.
///
/// The whole input must be consumed; trailing bytes are an error.
pub fn decode_root(data: &[u8]) -> TreeResult<Compound> {
    let mut reader = Reader::new(data);
    let offset = reader.pos;
    let id = reader.tag_id()?;
    let _name = reader.name()?;
    let root = match id {
        TagId::Compound => reader.compound(0)?,
        TagId::End => {
            return Err(TreeError::UnknownTagId {
                id: id.as_byte(),
                offset,
            })
        }
        other => return Err(TreeError::RootNotCompound(other)),
    };
    let rest = reader.remaining();
    if rest > 0 {
        return Err(TreeError::TrailingBytes(rest));
    }
    Ok(root)
}

fn write_name(buf: &mut Vec<u8>, name: &str) -> TreeResult<()> {
    let len = u16::try_from(name.len()).map_err(|_| TreeError::NameTooLong(name.len()))?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(name.as_bytes());
    Ok(())
}

fn write_text(buf: &mut Vec<u8>, s: &str) -> TreeResult<()> {
    let len = u32::try_from(s.len()).map_err(|_| TreeError::TooLarge(s.len()))?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_compound(buf: &mut Vec<u8>, compound: &Compound) -> TreeResult<()> {
    for (name, tag) in compound.iter() {
        buf.push(tag.id().as_byte());
        write_name(buf, name)?;
        write_payload(buf, tag)?;
    }
    buf.push(TagId::End.as_byte());
    Ok(())
}

fn write_list(buf: &mut Vec<u8>, list: &TagList) -> TreeResult<()> {
    let element = list.element_id().unwrap_or(TagId::End);
    buf.push(element.as_byte());
    let count = i32::try_from(list.len()).map_err(|_| TreeError::TooLarge(list.len()))?;
    buf.extend_from_slice(&count.to_be_bytes());
    for item in list.iter() {
        write_name(buf, &item.name)?;
        write_payload(buf, &item.tag)?;
    }
    Ok(())
}

fn write_payload(buf: &mut Vec<u8>, tag: &Tag) -> TreeResult<()> {
    match tag {
        Tag::Byte(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Tag::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Tag::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Tag::Double(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Tag::String(v) => write_text(buf, v)?,
        Tag::List(list) => write_list(buf, list)?,
        Tag::Compound(c) => write_compound(buf, c)?,
    }
    Ok(())
}

/// Cursor over an encoded document.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> TreeResult<[u8; N]> {
        let bytes = self.slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn slice(&mut self, len: usize) -> TreeResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(TreeError::Truncated {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn tag_id(&mut self) -> TreeResult<TagId> {
        let offset = self.pos;
        let [byte] = self.take::<1>()?;
        TagId::from_byte(byte).ok_or(TreeError::UnknownTagId { id: byte, offset })
    }

    fn name(&mut self) -> TreeResult<String> {
        let len = u16::from_be_bytes(self.take::<2>()?) as usize;
        self.utf8(len)
    }

    fn text(&mut self) -> TreeResult<String> {
        let len = u32::from_be_bytes(self.take::<4>()?) as usize;
        self.utf8(len)
    }

    fn utf8(&mut self, len: usize) -> TreeResult<String> {
        let offset = self.pos;
        let bytes = self.slice(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| TreeError::InvalidUtf8 { offset })
    }

    fn compound(&mut self, depth: usize) -> TreeResult<Compound> {
        if depth >= MAX_DEPTH {
            return Err(TreeError::DepthExceeded(MAX_DEPTH));
        }
        let mut compound = Compound::new();
        loop {
            let id = self.tag_id()?;
            if id == TagId::End {
                return Ok(compound);
            }
            let name = self.name()?;
            let tag = self.payload(id, depth + 1)?;
            compound.insert(name, tag);
        }
    }

    fn list(&mut self, depth: usize) -> TreeResult<TagList> {
        if depth >= MAX_DEPTH {
            return Err(TreeError::DepthExceeded(MAX_DEPTH));
        }
        let element = self.tag_id()?;
        let offset = self.pos;
        let count = i32::from_be_bytes(self.take::<4>()?);
        if count < 0 {
            return Err(TreeError::NegativeLength {
                length: count,
                offset,
            });
        }
        let mut list = TagList::new();
        if element == TagId::End {
            return Ok(list);
        }
        for _ in 0..count {
            let name = self.name()?;
            let tag = self.payload(element, depth + 1)?;
            list.push(name, tag)?;
        }
        Ok(list)
    }

    fn payload(&mut self, id: TagId, depth: usize) -> TreeResult<Tag> {
        let tag = match id {
            TagId::Byte => Tag::Byte(i8::from_be_bytes(self.take::<1>()?)),
            TagId::Int => Tag::Int(i32::from_be_bytes(self.take::<4>()?)),
            TagId::Float => Tag::Float(f32::from_be_bytes(self.take::<4>()?)),
            TagId::Double => Tag::Double(f64::from_be_bytes(self.take::<8>()?)),
            TagId::String => Tag::String(self.text()?),
            TagId::List => Tag::List(self.list(depth)?),
            TagId::Compound => Tag::Compound(self.compound(depth)?),
            TagId::End => {
                return Err(TreeError::UnknownTagId {
                    id: id.as_byte(),
                    offset: self.pos,
                })
            }
        };
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Compound {
        let mut homes = TagList::new();
        homes.push("homes_0", Tag::Double(1.5)).unwrap();
        homes.push("homes_1", Tag::Double(-2.0)).unwrap();

        let mut spawn = Compound::new();
        spawn.set_int("dim", -1);

        let mut root = Compound::new();
        root.set_string("name", "steve");
        root.set_int("money", 250);
        root.set_bool("op", true);
        root.set_float("speed", 0.25);
        root.set_list("homes", homes);
        root.set_list("empty", TagList::new());
        root.set_compound("spawn", spawn);
        root
    }

    #[test]
    fn document_roundtrip() {
        let root = sample();
        let bytes = encode_root(&root).unwrap();
        assert_eq!(decode_root(&bytes).unwrap(), root);
    }

    #[test]
    fn empty_root_layout() {
        let bytes = encode_root(&Compound::new()).unwrap();
        // compound id, empty name, end marker
        assert_eq!(bytes, vec![10, 0, 0, 0]);
    }

    #[test]
    fn int_layout_is_big_endian() {
        let mut root = Compound::new();
        root.set_int("a", 0x01020304);
        let bytes = encode_root(&root).unwrap();
        assert_eq!(&bytes[3..], &[3, 0, 1, b'a', 1, 2, 3, 4, 0]);
    }

    #[test]
    fn every_truncation_is_an_error() {
        let bytes = encode_root(&sample()).unwrap();
        for len in 0..bytes.len() {
            assert!(decode_root(&bytes[..len]).is_err(), "prefix {len} decoded");
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = encode_root(&sample()).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode_root(&bytes),
            Err(TreeError::TrailingBytes(1))
        ));
    }

    #[test]
    fn root_must_be_compound() {
        let bytes = [3u8, 0, 0, 0, 0, 0, 1];
        assert!(matches!(
            decode_root(&bytes),
            Err(TreeError::RootNotCompound(TagId::Int))
        ));
    }

    #[test]
    fn unknown_tag_id_rejected() {
        let bytes = [10u8, 0, 0, 42, 0, 1, b'x', 0];
        assert!(matches!(
            decode_root(&bytes),
            Err(TreeError::UnknownTagId { id: 42, offset: 3 })
        ));
    }

    #[test]
    fn negative_list_count_rejected() {
        let mut bytes = vec![10u8, 0, 0, 9, 0, 1, b'l', 3];
        bytes.extend_from_slice(&(-1i32).to_be_bytes());
        bytes.push(0);
        assert!(matches!(
            decode_root(&bytes),
            Err(TreeError::NegativeLength { length: -1, .. })
        ));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let bytes = [10u8, 0, 0, 8, 0, 1, b's', 0, 0, 0, 1, 0xFF, 0];
        assert!(matches!(
            decode_root(&bytes),
            Err(TreeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn string_values_beyond_u16_roundtrip() {
        let mut root = Compound::new();
        root.set_string("motd", "x".repeat(70_000));
        let bytes = encode_root(&root).unwrap();
        assert_eq!(decode_root(&bytes).unwrap(), root);
    }

    #[test]
    fn string_layout_uses_u32_length() {
        let mut root = Compound::new();
        root.set_string("s", "hi");
        let bytes = encode_root(&root).unwrap();
        assert_eq!(&bytes[3..], &[8, 0, 1, b's', 0, 0, 0, 2, b'h', b'i', 0]);
    }

    #[test]
    fn overlong_name_rejected_on_encode() {
        let mut root = Compound::new();
        root.set_int("n".repeat(70_000), 1);
        assert!(matches!(
            encode_root(&root),
            Err(TreeError::NameTooLong(70_000))
        ));
    }

    #[test]
    fn excessive_nesting_rejected() {
        let mut bytes = vec![10u8, 0, 0];
        for _ in 0..MAX_DEPTH + 1 {
            bytes.extend_from_slice(&[10, 0, 1, b'n']);
        }
        bytes.extend(std::iter::repeat(0).take(MAX_DEPTH + 2));
        assert!(matches!(
            decode_root(&bytes),
            Err(TreeError::DepthExceeded(MAX_DEPTH))
        ));
    }
}

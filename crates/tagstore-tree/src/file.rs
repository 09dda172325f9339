//! Compressed, checksummed file framing for tag tree documents.
//!
//! On-disk format:
//! ```text
//! [4 bytes: magic "TAGS"]
//! [4 bytes: format version (big-endian u32)]
//! [4 bytes: CRC32 of the compressed body (big-endian u32)]
//! [4 bytes: uncompressed body length (big-endian u32)]
//! [N bytes: zstd-compressed binary document]
//! ```

use std::io::{Read, Write};

use tracing::trace;

use crate::binary::{decode_root, encode_root};
use crate::compound::Compound;
use crate::error::{TreeError, TreeResult};

pub const MAGIC: &[u8; 4] = b"TAGS";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 16;
/// Default zstd level.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
/// Largest uncompressed document the reader will allocate for.
pub const MAX_DOCUMENT_LEN: usize = 256 * 1024 * 1024;

/// Encode, compress, and frame a compound.
pub fn to_bytes(root: &Compound, level: i32) -> TreeResult<Vec<u8>> {
    let raw = encode_root(root)?;
    if raw.len() > MAX_DOCUMENT_LEN {
        return Err(TreeError::TooLarge(raw.len()));
    }
    let compressed = zstd::encode_all(raw.as_slice(), level)
        .map_err(|e| TreeError::CompressionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
    out.extend_from_slice(&crc32fast::hash(&compressed).to_be_bytes());
    out.extend_from_slice(&(raw.len() as u32).to_be_bytes());
    out.extend_from_slice(&compressed);

    trace!(raw = raw.len(), compressed = compressed.len(), "framed tag tree");
    Ok(out)
}

/// Verify framing, decompress, and decode a compound.
pub fn from_bytes(data: &[u8]) -> TreeResult<Compound> {
    if data.len() < HEADER_LEN {
        return Err(TreeError::Truncated {
            offset: data.len(),
            needed: HEADER_LEN - data.len(),
        });
    }
    if &data[0..4] != MAGIC {
        return Err(TreeError::InvalidMagic {
            expected: String::from_utf8_lossy(MAGIC).into(),
            actual: String::from_utf8_lossy(&data[0..4]).into(),
        });
    }
    let version = read_u32(&data[4..8]);
    if version != FORMAT_VERSION {
        return Err(TreeError::UnsupportedVersion(version));
    }
    let expected_crc = read_u32(&data[8..12]);
    let raw_len = read_u32(&data[12..16]) as usize;
    if raw_len > MAX_DOCUMENT_LEN {
        return Err(TreeError::TooLarge(raw_len));
    }

    let body = &data[HEADER_LEN..];
    let actual_crc = crc32fast::hash(body);
    if actual_crc != expected_crc {
        return Err(TreeError::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }

    // The buffer grows with the data actually produced, never with the
    // length the header claims.
    let mut raw = Vec::new();
    zstd::stream::read::Decoder::with_buffer(body)
        .map_err(|e| TreeError::DecompressionFailed(e.to_string()))?
        .take(raw_len as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| TreeError::DecompressionFailed(e.to_string()))?;
    if raw.len() != raw_len {
        return Err(TreeError::SizeMismatch {
            expected: raw_len,
            actual: raw.len(),
        });
    }
    decode_root(&raw)
}

/// Write a framed compound to `writer`.
pub fn write_to<W: Write>(writer: &mut W, root: &Compound, level: i32) -> TreeResult<()> {
    let bytes = to_bytes(root, level)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Read a framed compound from `reader` until EOF.
pub fn read_from<R: Read>(reader: &mut R) -> TreeResult<Compound> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    from_bytes(&data)
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::{Tag, TagList};

    fn sample() -> Compound {
        let mut flags = TagList::new();
        for i in 0..4 {
            flags.push(format!("flags_{i}"), Tag::Byte((i % 2) as i8)).unwrap();
        }
        let mut root = Compound::new();
        root.set_string("owner", "alex");
        root.set_double("balance", 1234.5);
        root.set_list("flags", flags);
        root
    }

    #[test]
    fn bytes_roundtrip() {
        let root = sample();
        let bytes = to_bytes(&root, DEFAULT_COMPRESSION_LEVEL).unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(from_bytes(&bytes).unwrap(), root);
    }

    #[test]
    fn reader_writer_roundtrip() {
        let root = sample();
        let mut buf = Vec::new();
        write_to(&mut buf, &root, 1).unwrap();
        let decoded = read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, root);
    }

    #[test]
    fn large_repetitive_tree_compresses() {
        let mut root = Compound::new();
        root.set_string("motd", "a".repeat(60_000));
        let bytes = to_bytes(&root, DEFAULT_COMPRESSION_LEVEL).unwrap();
        assert!(bytes.len() < 60_000 / 10);
        assert_eq!(from_bytes(&bytes).unwrap(), root);
    }

    #[test]
    fn bad_magic() {
        let mut bytes = to_bytes(&sample(), 3).unwrap();
        bytes[0..4].copy_from_slice(b"NOPE");
        assert!(matches!(
            from_bytes(&bytes),
            Err(TreeError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn bad_version() {
        let mut bytes = to_bytes(&sample(), 3).unwrap();
        bytes[4..8].copy_from_slice(&99u32.to_be_bytes());
        assert!(matches!(
            from_bytes(&bytes),
            Err(TreeError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn corrupted_body_fails_checksum() {
        let mut bytes = to_bytes(&sample(), 3).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            from_bytes(&bytes),
            Err(TreeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn truncated_file() {
        let bytes = to_bytes(&sample(), 3).unwrap();
        assert!(matches!(
            from_bytes(&bytes[..10]),
            Err(TreeError::Truncated { .. })
        ));
        // Header intact, body cut short: checksum no longer matches.
        assert!(from_bytes(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn overstated_length_is_a_size_mismatch() {
        let mut bytes = to_bytes(&sample(), 3).unwrap();
        let actual = encode_root(&sample()).unwrap().len();
        bytes[12..16].copy_from_slice(&(MAX_DOCUMENT_LEN as u32).to_be_bytes());
        assert!(matches!(
            from_bytes(&bytes),
            Err(TreeError::SizeMismatch { expected, actual: a })
                if expected == MAX_DOCUMENT_LEN && a == actual
        ));
    }

    #[test]
    fn understated_length_stops_one_byte_past() {
        let mut bytes = to_bytes(&sample(), 3).unwrap();
        bytes[12..16].copy_from_slice(&4u32.to_be_bytes());
        assert!(matches!(
            from_bytes(&bytes),
            Err(TreeError::SizeMismatch { expected: 4, actual: 5 })
        ));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(
            from_bytes(&[]),
            Err(TreeError::Truncated {
                offset: 0,
                needed: HEADER_LEN
            })
        ));
    }
}

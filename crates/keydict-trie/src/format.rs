// Dictionary binary format: header layout, validation and raw readers.

use bytemuck::{Pod, Zeroable};

use crate::TrieError;

/// Magic bytes at the start of every dictionary buffer.
pub const MAGIC: [u8; 4] = *b"KDIC";

/// Format version written by [`crate::DictionaryBuilder`].
pub const VERSION: u8 = 1;

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Offset of the root child group.
pub const ROOT_OFFSET: usize = HEADER_SIZE;

/// Header flag: bigram lists are present.
pub const HEADER_HAS_BIGRAMS: u8 = 0x01;

/// Largest offset a 3-byte pointer can hold.
pub const MAX_OFFSET: usize = 0x00FF_FFFF;

// ============================================================================
// Node layout
// ============================================================================

/// Node flag: the node completes a stored word and carries a frequency byte.
pub const NODE_TERMINAL: u8 = 0x80;
/// Node flag: a 3-byte child group offset follows the character.
pub const NODE_HAS_CHILDREN: u8 = 0x40;
/// Node flag: the character is stored as a 3-byte code point.
pub const NODE_WIDE_CHAR: u8 = 0x20;
/// Node flag: a 3-byte bigram list offset follows the frequency.
pub const NODE_HAS_BIGRAMS: u8 = 0x10;

/// Group counts at or above this value use the 2-byte encoding.
pub const GROUP_COUNT_WIDE: u8 = 0x80;
/// Largest number of nodes in one child group.
pub const MAX_GROUP_SIZE: usize = 0x7FFF;

/// Raw 8-byte header as stored in the buffer.
///
/// - bytes 0..4: magic `KDIC`
/// - byte 4: format version
/// - byte 5: flags (bit 0: bigram lists present)
/// - bytes 6..8: reserved (zero)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct RawHeader {
    pub magic: [u8; 4],
    pub version: u8,
    pub flags: u8,
    pub reserved: [u8; 2],
}

impl RawHeader {
    pub fn new(has_bigrams: bool) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: if has_bigrams { HEADER_HAS_BIGRAMS } else { 0 },
            reserved: [0; 2],
        }
    }
}

/// Parsed dictionary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryHeader {
    pub version: u8,
    /// Whether the buffer contains bigram lists.
    pub has_bigrams: bool,
}

/// Parses and validates the 8-byte dictionary header.
///
/// A zero-length buffer is a valid empty dictionary, but it has no header;
/// callers check for that case before calling this.
pub fn parse_header(data: &[u8]) -> Result<DictionaryHeader, TrieError> {
    // The root group count must follow the header.
    if data.len() <= HEADER_SIZE {
        return Err(TrieError::TooShort {
            expected: HEADER_SIZE + 1,
            actual: data.len(),
        });
    }

    let raw: &RawHeader = bytemuck::from_bytes(&data[..HEADER_SIZE]);
    if raw.magic != MAGIC {
        return Err(TrieError::InvalidMagic);
    }
    if raw.version != VERSION {
        return Err(TrieError::UnsupportedVersion(raw.version));
    }

    Ok(DictionaryHeader {
        version: raw.version,
        has_bigrams: raw.flags & HEADER_HAS_BIGRAMS != 0,
    })
}

// ----------------------------------------------------------------------------
// Little-endian readers
// ----------------------------------------------------------------------------

#[inline]
pub(crate) fn read_u8(data: &[u8], offset: usize) -> Result<u8, TrieError> {
    data.get(offset).copied().ok_or(TrieError::OutOfBounds {
        offset,
        len: data.len(),
    })
}

#[inline]
pub(crate) fn read_u24(data: &[u8], offset: usize) -> Result<u32, TrieError> {
    match data.get(offset..offset + 3) {
        Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], 0])),
        None => Err(TrieError::OutOfBounds {
            offset,
            len: data.len(),
        }),
    }
}

#[inline]
pub(crate) fn write_u24(out: &mut [u8], value: u32) {
    let b = value.to_le_bytes();
    out[..3].copy_from_slice(&b[..3]);
}

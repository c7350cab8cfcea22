//! Binary trie format for keyboard dictionaries.
//!
//! A dictionary is one contiguous little-endian byte buffer: a small header
//! followed by child groups laid out in pre-order, with bigram lists at the
//! end. Everything here reads straight from `&[u8]` without building a node
//! graph; every read is bounds-checked and reported as [`TrieError`].
//!
//! # Architecture
//!
//! - [`format`] -- Header layout, validation and little-endian readers
//! - [`node`] -- Child group and node decoding
//! - [`bigram`] -- Bigram list decoding
//! - [`lookup`] -- Exact descent and offset-to-word resolution
//! - [`builder`] -- Writer producing the binary format from word lists

pub mod bigram;
pub mod builder;
pub mod format;
pub mod lookup;
pub mod node;

pub use builder::{BuildError, DictionaryBuilder};

/// Error type for decoding a dictionary buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("invalid magic number in dictionary header")]
    InvalidMagic,
    #[error("unsupported dictionary format version {0}")]
    UnsupportedVersion(u8),
    #[error("read at offset {offset} is outside the {len}-byte buffer")]
    OutOfBounds { offset: usize, len: usize },
    #[error("node at offset {from} points backwards to offset {to}")]
    InvalidOffset { from: usize, to: usize },
    #[error("invalid character code {value:#x} at offset {offset}")]
    InvalidChar { offset: usize, value: u32 },
    #[error("bigram target {offset} is not a stored word")]
    InvalidBigramTarget { offset: usize },
}

// Dictionary blob assembly.
//
// A dictionary may ship as one file, a region inside a larger asset, several
// split parts, or bytes already in memory. All of them end up as a single
// immutable buffer the trie reader can walk with plain offsets.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

/// Error type for assembling a dictionary buffer.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read dictionary source {index}: {source}")]
    Io {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error("dictionary source {index} is short: expected {expected} bytes, got {actual}")]
    ShortRead {
        index: usize,
        expected: u64,
        actual: u64,
    },
    #[error("cannot allocate {requested} bytes for the dictionary buffer")]
    OutOfMemory { requested: u64 },
}

/// One piece of a dictionary.
pub enum DictionarySource {
    /// A file, or a byte range of one.
    File {
        path: PathBuf,
        offset: u64,
        /// Bytes to read from `offset`; `None` reads to the end of the file.
        length: Option<u64>,
    },
    /// Bytes already in memory.
    Bytes(Vec<u8>),
    /// Any reader. With an expected length, fewer bytes is a short read.
    Reader {
        reader: Box<dyn Read + Send>,
        expected_len: Option<u64>,
    },
}

impl DictionarySource {
    /// A whole file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            offset: 0,
            length: None,
        }
    }

    /// `length` bytes of a file starting at `offset`.
    pub fn file_range(path: impl Into<PathBuf>, offset: u64, length: u64) -> Self {
        Self::File {
            path: path.into(),
            offset,
            length: Some(length),
        }
    }

    pub fn reader(reader: impl Read + Send + 'static, expected_len: Option<u64>) -> Self {
        Self::Reader {
            reader: Box::new(reader),
            expected_len,
        }
    }

    /// Length known before reading, if any.
    fn size_hint(&self) -> u64 {
        match self {
            Self::File { length: Some(l), .. } => *l,
            Self::File { path, offset, .. } => std::fs::metadata(path)
                .map(|m| m.len().saturating_sub(*offset))
                .unwrap_or(0),
            Self::Bytes(b) => b.len() as u64,
            Self::Reader { expected_len, .. } => expected_len.unwrap_or(0),
        }
    }
}

impl fmt::Debug for DictionarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File {
                path,
                offset,
                length,
            } => f
                .debug_struct("File")
                .field("path", path)
                .field("offset", offset)
                .field("length", length)
                .finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::Reader { expected_len, .. } => f
                .debug_struct("Reader")
                .field("expected_len", expected_len)
                .finish_non_exhaustive(),
        }
    }
}

/// The immutable bytes backing one dictionary.
pub enum DictionaryBuffer {
    Empty,
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl DictionaryBuffer {
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Owned(v) => v,
            Self::Mapped(m) => m,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the bytes are a memory-mapped file.
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl AsRef<[u8]> for DictionaryBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for DictionaryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Empty => "Empty",
            Self::Owned(_) => "Owned",
            Self::Mapped(_) => "Mapped",
        };
        f.debug_struct("DictionaryBuffer")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Concatenate `sources` into one buffer.
///
/// No sources give an empty buffer. A single file source is memory-mapped;
/// anything else is copied into one heap buffer reserved up front. Every
/// source is closed before this returns.
pub fn assemble(sources: Vec<DictionarySource>) -> Result<DictionaryBuffer, LoadError> {
    if sources.is_empty() {
        return Ok(DictionaryBuffer::Empty);
    }
    if sources.len() == 1 {
        if let DictionarySource::File {
            path,
            offset,
            length,
        } = &sources[0]
        {
            return map_file(path, *offset, *length);
        }
    }

    let total: u64 = sources.iter().map(DictionarySource::size_hint).sum();
    let mut buf = Vec::new();
    let reserve = usize::try_from(total).map_err(|_| LoadError::OutOfMemory { requested: total })?;
    buf.try_reserve_exact(reserve)
        .map_err(|_| LoadError::OutOfMemory { requested: total })?;

    for (index, source) in sources.into_iter().enumerate() {
        append(index, source, &mut buf)?;
    }

    if buf.is_empty() {
        Ok(DictionaryBuffer::Empty)
    } else {
        Ok(DictionaryBuffer::Owned(buf))
    }
}

fn map_file(path: &Path, offset: u64, length: Option<u64>) -> Result<DictionaryBuffer, LoadError> {
    let io_err = |source: io::Error| LoadError::Io { index: 0, source };
    let file = File::open(path).map_err(io_err)?;
    let file_len = file.metadata().map_err(io_err)?.len();
    let available = file_len.saturating_sub(offset);
    let len = length.unwrap_or(available);
    if len > available {
        return Err(LoadError::ShortRead {
            index: 0,
            expected: len,
            actual: available,
        });
    }
    if len == 0 {
        return Ok(DictionaryBuffer::Empty);
    }
    let map_len = usize::try_from(len).map_err(|_| LoadError::OutOfMemory { requested: len })?;
    // SAFETY: The file is opened read-only and the mapping is immutable. The
    // Mmap is owned by the buffer for its whole lifetime. Dictionary files are
    // not modified while a keyboard is using them.
    let mmap = unsafe { MmapOptions::new().offset(offset).len(map_len).map(&file) }.map_err(io_err)?;
    Ok(DictionaryBuffer::Mapped(mmap))
}

fn append(index: usize, source: DictionarySource, buf: &mut Vec<u8>) -> Result<(), LoadError> {
    let io_err = |source: io::Error| LoadError::Io { index, source };
    match source {
        DictionarySource::Bytes(bytes) => {
            buf.try_reserve(bytes.len()).map_err(|_| LoadError::OutOfMemory {
                requested: (buf.len() + bytes.len()) as u64,
            })?;
            buf.extend_from_slice(&bytes);
        }
        DictionarySource::File {
            path,
            offset,
            length,
        } => {
            let mut file = File::open(&path).map_err(io_err)?;
            file.seek(SeekFrom::Start(offset)).map_err(io_err)?;
            read_into(index, &mut file, length, buf)?;
        }
        DictionarySource::Reader {
            mut reader,
            expected_len,
        } => {
            read_into(index, &mut reader, expected_len, buf)?;
        }
    }
    Ok(())
}

fn read_into(index: usize, reader: &mut dyn Read, expected: Option<u64>, buf: &mut Vec<u8>) -> Result<(), LoadError> {
    let io_err = |source: io::Error| LoadError::Io { index, source };
    match expected {
        Some(expected) => {
            let got = reader.take(expected).read_to_end(buf).map_err(io_err)? as u64;
            if got < expected {
                return Err(LoadError::ShortRead {
                    index,
                    expected,
                    actual: got,
                });
            }
        }
        None => {
            reader.read_to_end(buf).map_err(io_err)?;
        }
    }
    Ok(())
}

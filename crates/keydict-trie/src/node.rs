// Child group and node decoding.
//
// A group is a count followed by its nodes back to back. Nodes are variable
// length, so a group can only be walked front to back; `ChildIter` does that
// without allocating.

use crate::TrieError;
use crate::format::{
    GROUP_COUNT_WIDE, NODE_HAS_BIGRAMS, NODE_HAS_CHILDREN, NODE_TERMINAL, NODE_WIDE_CHAR, read_u8,
    read_u24,
};

/// One decoded trie node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEntry {
    /// Offset of the node's flag byte. Identifies the node.
    pub offset: usize,
    /// Character label.
    pub ch: char,
    /// Offset of the child group, if any.
    pub children: Option<usize>,
    /// Whether a stored word ends at this node.
    pub terminal: bool,
    /// Word frequency; zero for non-terminal nodes.
    pub frequency: u8,
    /// Offset of the bigram list, if any.
    pub bigrams: Option<usize>,
    /// Offset of the next sibling (the byte after this node).
    pub end: usize,
}

/// Decode the node starting at `offset`.
///
/// Child offsets must point forward; anything else means the buffer is
/// corrupt, and following it could loop.
pub fn decode_node(data: &[u8], offset: usize) -> Result<NodeEntry, TrieError> {
    let flags = read_u8(data, offset)?;
    let mut pos = offset + 1;

    let ch = if flags & NODE_WIDE_CHAR != 0 {
        let value = read_u24(data, pos)?;
        pos += 3;
        char::from_u32(value).ok_or(TrieError::InvalidChar { offset, value })?
    } else {
        let value = read_u8(data, pos)?;
        pos += 1;
        char::from(value)
    };

    let children = if flags & NODE_HAS_CHILDREN != 0 {
        let target = read_u24(data, pos)? as usize;
        pos += 3;
        if target <= offset {
            return Err(TrieError::InvalidOffset {
                from: offset,
                to: target,
            });
        }
        if target >= data.len() {
            return Err(TrieError::OutOfBounds {
                offset: target,
                len: data.len(),
            });
        }
        Some(target)
    } else {
        None
    };

    let terminal = flags & NODE_TERMINAL != 0;
    let frequency = if terminal {
        let f = read_u8(data, pos)?;
        pos += 1;
        f
    } else {
        0
    };

    let bigrams = if flags & NODE_HAS_BIGRAMS != 0 {
        let target = read_u24(data, pos)? as usize;
        pos += 3;
        if target >= data.len() {
            return Err(TrieError::OutOfBounds {
                offset: target,
                len: data.len(),
            });
        }
        Some(target)
    } else {
        None
    };

    Ok(NodeEntry {
        offset,
        ch,
        children,
        terminal,
        frequency,
        bigrams,
        end: pos,
    })
}

/// Read a group count. Returns `(count, offset of the first node)`.
pub fn read_group_count(data: &[u8], offset: usize) -> Result<(usize, usize), TrieError> {
    let b0 = read_u8(data, offset)?;
    if b0 & GROUP_COUNT_WIDE != 0 {
        let b1 = read_u8(data, offset + 1)?;
        Ok(((((b0 & 0x7F) as usize) << 8) | b1 as usize, offset + 2))
    } else {
        Ok((b0 as usize, offset + 1))
    }
}

/// Iterator over the nodes of one child group.
///
/// Yields an error at most once, then stops.
#[derive(Debug, Clone)]
pub struct ChildIter<'a> {
    data: &'a [u8],
    next: usize,
    remaining: usize,
}

impl<'a> ChildIter<'a> {
    /// Open the group at `offset`.
    pub fn new(data: &'a [u8], offset: usize) -> Result<Self, TrieError> {
        let (count, first) = read_group_count(data, offset)?;
        Ok(Self {
            data,
            next: first,
            remaining: count,
        })
    }

    /// Nodes not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for ChildIter<'_> {
    type Item = Result<NodeEntry, TrieError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match decode_node(self.data, self.next) {
            Ok(node) => {
                self.remaining -= 1;
                self.next = node.end;
                Some(Ok(node))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Find the child labelled exactly `ch` in the group at `group`.
pub fn find_child(data: &[u8], group: usize, ch: char) -> Result<Option<NodeEntry>, TrieError> {
    for node in ChildIter::new(data, group)? {
        let node = node?;
        if node.ch == ch {
            return Ok(Some(node));
        }
    }
    Ok(None)
}

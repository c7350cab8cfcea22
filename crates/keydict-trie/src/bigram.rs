// Bigram list decoding.
//
// A list is a run of 4-byte entries hanging off the previous word's terminal
// node. Each entry names the terminal node of a likely next word.

use bytemuck::{Pod, Zeroable};
use keydict_core::enums::MAXIMUM_BIGRAM_FREQUENCY;

use crate::TrieError;
use crate::format::ROOT_OFFSET;

/// Size of one stored bigram entry.
pub const BIGRAM_ENTRY_SIZE: usize = 4;

/// Entry flag: another entry follows this one.
pub const BIGRAM_HAS_NEXT: u8 = 0x80;

/// Raw bigram entry as stored in the buffer.
///
/// - byte 0: bit 7 set when another entry follows, bits 0-6 pair frequency
/// - bytes 1..4: target node offset (LE)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct RawBigramEntry {
    pub flags_freq: u8,
    pub target: [u8; 3],
}

impl RawBigramEntry {
    pub fn new(frequency: u8, target: u32, has_next: bool) -> Self {
        let t = target.to_le_bytes();
        Self {
            flags_freq: (frequency & MAXIMUM_BIGRAM_FREQUENCY) | if has_next { BIGRAM_HAS_NEXT } else { 0 },
            target: [t[0], t[1], t[2]],
        }
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.flags_freq & BIGRAM_HAS_NEXT != 0
    }

    #[inline]
    pub fn frequency(&self) -> u8 {
        self.flags_freq & MAXIMUM_BIGRAM_FREQUENCY
    }

    #[inline]
    pub fn target(&self) -> usize {
        u32::from_le_bytes([self.target[0], self.target[1], self.target[2], 0]) as usize
    }
}

/// A decoded continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigramEntry {
    /// Pair frequency, 0..=127.
    pub frequency: u8,
    /// Terminal node offset of the next word.
    pub target: usize,
}

/// Iterator over the bigram list at a given offset.
///
/// Stops after the last entry, after an error, or when the buffer ends.
#[derive(Debug, Clone)]
pub struct BigramIter<'a> {
    data: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> BigramIter<'a> {
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            offset,
            done: false,
        }
    }
}

impl Iterator for BigramIter<'_> {
    type Item = Result<BigramEntry, TrieError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(bytes) = self.data.get(self.offset..self.offset + BIGRAM_ENTRY_SIZE) else {
            self.done = true;
            return Some(Err(TrieError::OutOfBounds {
                offset: self.offset,
                len: self.data.len(),
            }));
        };
        let raw: RawBigramEntry = bytemuck::pod_read_unaligned(bytes);
        let target = raw.target();
        if target < ROOT_OFFSET || target >= self.data.len() {
            self.done = true;
            return Some(Err(TrieError::OutOfBounds {
                offset: target,
                len: self.data.len(),
            }));
        }
        self.done = !raw.has_next();
        self.offset += BIGRAM_ENTRY_SIZE;
        Some(Ok(BigramEntry {
            frequency: raw.frequency(),
            target,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[(u8, u32)]) -> Vec<u8> {
        // pad so targets >= ROOT_OFFSET are in bounds
        let mut data = vec![0u8; 64];
        for (i, &(f, t)) in entries.iter().enumerate() {
            let e = RawBigramEntry::new(f, t, i + 1 < entries.len());
            data.extend_from_slice(bytemuck::bytes_of(&e));
        }
        data
    }

    #[test]
    fn raw_entry_layout() {
        assert_eq!(std::mem::size_of::<RawBigramEntry>(), BIGRAM_ENTRY_SIZE);
        let e = RawBigramEntry::new(100, 0x01_0203, true);
        assert_eq!(bytemuck::bytes_of(&e), &[0x80 | 100, 0x03, 0x02, 0x01]);
        assert!(e.has_next());
        assert_eq!(e.frequency(), 100);
        assert_eq!(e.target(), 0x01_0203);
    }

    #[test]
    fn iterates_until_last_flag() {
        let data = list(&[(90, 10), (40, 20), (5, 30)]);
        let entries: Vec<_> = BigramIter::new(&data, 64).map(|e| e.unwrap()).collect();
        assert_eq!(
            entries,
            vec![
                BigramEntry {
                    frequency: 90,
                    target: 10
                },
                BigramEntry {
                    frequency: 40,
                    target: 20
                },
                BigramEntry {
                    frequency: 5,
                    target: 30
                },
            ]
        );
    }

    #[test]
    fn target_outside_buffer_is_corrupt() {
        let data = list(&[(1, 0x00FF_0000)]);
        let mut iter = BigramIter::new(&data, 64);
        assert!(matches!(iter.next(), Some(Err(TrieError::OutOfBounds { .. }))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn unterminated_list_hits_end_of_buffer() {
        let mut data = list(&[(1, 10)]);
        data[64] |= BIGRAM_HAS_NEXT;
        let results: Vec<_> = BigramIter::new(&data, 64).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}

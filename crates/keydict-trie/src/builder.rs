// Dictionary writer.
//
// Words are collected in sorted maps, turned into an arena trie, and written
// in pre-order: a group, then the subtree of each of its nodes in turn. Child
// and bigram offsets are written as placeholders and patched once the target
// position is known. Bigram lists go after the whole trie.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use keydict_core::enums::{MAX_WORD_LENGTH, MAXIMUM_BIGRAM_FREQUENCY};

use crate::bigram::RawBigramEntry;
use crate::format::{
    GROUP_COUNT_WIDE, MAX_GROUP_SIZE, MAX_OFFSET, NODE_HAS_BIGRAMS, NODE_HAS_CHILDREN, NODE_TERMINAL,
    NODE_WIDE_CHAR, RawHeader, write_u24,
};

/// Error type for building a dictionary buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("empty word")]
    EmptyWord,
    #[error("word has {len} characters, at most {max} are allowed")]
    WordTooLong { len: usize, max: usize },
    #[error("bigram refers to unknown word {0:?}")]
    UnknownBigramWord(String),
    #[error("child group of {size} nodes exceeds the format limit")]
    GroupTooLarge { size: usize },
    #[error("dictionary of {size} bytes does not fit 24-bit offsets")]
    TooLarge { size: usize },
    #[error("frequency {value} is out of range")]
    InvalidFrequency { value: u32 },
}

/// Collects words and bigrams and writes the binary dictionary format.
///
/// Identical input always produces identical bytes.
#[derive(Debug, Clone, Default)]
pub struct DictionaryBuilder {
    words: BTreeMap<Vec<char>, u8>,
    bigrams: BTreeMap<Vec<char>, BTreeMap<Vec<char>, u8>>,
}

fn to_chars(word: &str) -> Result<Vec<char>, BuildError> {
    let chars: Vec<char> = word.chars().collect();
    if chars.is_empty() {
        return Err(BuildError::EmptyWord);
    }
    if chars.len() > MAX_WORD_LENGTH {
        return Err(BuildError::WordTooLong {
            len: chars.len(),
            max: MAX_WORD_LENGTH,
        });
    }
    Ok(chars)
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word. Adding a word again keeps the higher frequency.
    pub fn add_word(&mut self, word: &str, frequency: u8) -> Result<(), BuildError> {
        if frequency == 0 {
            return Err(BuildError::InvalidFrequency { value: 0 });
        }
        let chars = to_chars(word)?;
        let slot = self.words.entry(chars).or_insert(frequency);
        *slot = (*slot).max(frequency);
        Ok(())
    }

    /// Set the frequency of a word, adding it if needed.
    pub fn set_frequency(&mut self, word: &str, frequency: u8) -> Result<(), BuildError> {
        if frequency == 0 {
            return Err(BuildError::InvalidFrequency { value: 0 });
        }
        let chars = to_chars(word)?;
        self.words.insert(chars, frequency);
        Ok(())
    }

    /// Remove a word together with every bigram mentioning it.
    pub fn remove_word(&mut self, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if self.words.remove(&chars).is_none() {
            return false;
        }
        self.bigrams.remove(&chars);
        for nexts in self.bigrams.values_mut() {
            nexts.remove(&chars);
        }
        self.bigrams.retain(|_, nexts| !nexts.is_empty());
        true
    }

    /// Add a bigram `previous -> next`. Re-adding keeps the higher frequency.
    ///
    /// Both words must have been added by the time [`build`](Self::build) runs.
    pub fn add_bigram(&mut self, previous: &str, next: &str, frequency: u8) -> Result<(), BuildError> {
        if frequency > MAXIMUM_BIGRAM_FREQUENCY {
            return Err(BuildError::InvalidFrequency {
                value: u32::from(frequency),
            });
        }
        let prev = to_chars(previous)?;
        let next = to_chars(next)?;
        let slot = self.bigrams.entry(prev).or_default().entry(next).or_insert(frequency);
        *slot = (*slot).max(frequency);
        Ok(())
    }

    /// Stored frequency of `word`.
    pub fn frequency(&self, word: &str) -> Option<u8> {
        let chars: Vec<char> = word.chars().collect();
        self.words.get(&chars).copied()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of stored bigram pairs.
    pub fn bigram_count(&self) -> usize {
        self.bigrams.values().map(BTreeMap::len).sum()
    }

    /// All words with their frequencies, in code point order.
    pub fn words(&self) -> impl Iterator<Item = (String, u8)> + '_ {
        self.words.iter().map(|(w, &f)| (w.iter().collect(), f))
    }

    /// Write the binary dictionary.
    pub fn build(&self) -> Result<Vec<u8>, BuildError> {
        let mut arena = vec![BuildNode::new('\0')];
        let mut terminals: HashMap<&[char], u32> = HashMap::with_capacity(self.words.len());

        for (word, &frequency) in &self.words {
            let mut current = 0u32;
            for &c in word {
                current = arena_child(&mut arena, current, c);
            }
            arena[current as usize].frequency = frequency;
            terminals.insert(word.as_slice(), current);
        }

        for (prev, nexts) in &self.bigrams {
            let Some(&from) = terminals.get(prev.as_slice()) else {
                return Err(BuildError::UnknownBigramWord(prev.iter().collect()));
            };
            let mut list = Vec::with_capacity(nexts.len());
            for (next, &frequency) in nexts {
                let Some(&to) = terminals.get(next.as_slice()) else {
                    return Err(BuildError::UnknownBigramWord(next.iter().collect()));
                };
                list.push((to, frequency));
            }
            // strongest continuations first, ties in word order
            list.sort_by(|a, b| b.1.cmp(&a.1));
            arena[from as usize].bigrams = list;
        }

        let mut writer = Writer {
            arena: &arena,
            out: Vec::new(),
            node_offsets: vec![0; arena.len()],
            bigram_patches: Vec::new(),
        };
        writer
            .out
            .extend_from_slice(bytemuck::bytes_of(&RawHeader::new(!self.bigrams.is_empty())));
        writer.write_group(&arena[0].children)?;
        writer.write_bigrams()?;
        Ok(writer.out)
    }
}

#[derive(Debug, Clone)]
struct BuildNode {
    ch: char,
    children: Vec<u32>,
    /// Zero for nodes that do not end a word.
    frequency: u8,
    bigrams: Vec<(u32, u8)>,
}

impl BuildNode {
    fn new(ch: char) -> Self {
        Self {
            ch,
            children: Vec::new(),
            frequency: 0,
            bigrams: Vec::new(),
        }
    }
}

/// Child of `parent` labelled `c`, created if missing. Words arrive sorted,
/// so new children are always appended in order.
fn arena_child(arena: &mut Vec<BuildNode>, parent: u32, c: char) -> u32 {
    let found = arena[parent as usize]
        .children
        .iter()
        .copied()
        .find(|&i| arena[i as usize].ch == c);
    if let Some(i) = found {
        return i;
    }
    let index = arena.len() as u32;
    arena.push(BuildNode::new(c));
    arena[parent as usize].children.push(index);
    index
}

struct Writer<'a> {
    arena: &'a [BuildNode],
    out: Vec<u8>,
    node_offsets: Vec<usize>,
    bigram_patches: Vec<(usize, u32)>,
}

impl Writer<'_> {
    fn current_offset(&self) -> Result<usize, BuildError> {
        let offset = self.out.len();
        if offset > MAX_OFFSET {
            return Err(BuildError::TooLarge { size: offset });
        }
        Ok(offset)
    }

    fn write_group(&mut self, group: &[u32]) -> Result<(), BuildError> {
        let arena = self.arena;
        if group.len() > MAX_GROUP_SIZE {
            return Err(BuildError::GroupTooLarge { size: group.len() });
        }
        if group.len() >= GROUP_COUNT_WIDE as usize {
            self.out.push(GROUP_COUNT_WIDE | (group.len() >> 8) as u8);
            self.out.push((group.len() & 0xFF) as u8);
        } else {
            self.out.push(group.len() as u8);
        }

        let mut child_patches = Vec::with_capacity(group.len());
        for &index in group {
            let node = &arena[index as usize];
            self.node_offsets[index as usize] = self.current_offset()?;

            let code = node.ch as u32;
            let mut flags = 0u8;
            if node.frequency > 0 {
                flags |= NODE_TERMINAL;
            }
            if !node.children.is_empty() {
                flags |= NODE_HAS_CHILDREN;
            }
            if code > 0xFF {
                flags |= NODE_WIDE_CHAR;
            }
            if !node.bigrams.is_empty() {
                flags |= NODE_HAS_BIGRAMS;
            }

            self.out.push(flags);
            if code > 0xFF {
                self.out.extend_from_slice(&code.to_le_bytes()[..3]);
            } else {
                self.out.push(code as u8);
            }
            if !node.children.is_empty() {
                child_patches.push((self.out.len(), index));
                self.out.extend_from_slice(&[0; 3]);
            }
            if node.frequency > 0 {
                self.out.push(node.frequency);
            }
            if !node.bigrams.is_empty() {
                self.bigram_patches.push((self.out.len(), index));
                self.out.extend_from_slice(&[0; 3]);
            }
        }

        for (patch, index) in child_patches {
            let offset = self.current_offset()?;
            write_u24(&mut self.out[patch..], offset as u32);
            self.write_group(&arena[index as usize].children)?;
        }
        Ok(())
    }

    fn write_bigrams(&mut self) -> Result<(), BuildError> {
        let arena = self.arena;
        let patches = std::mem::take(&mut self.bigram_patches);
        for (patch, index) in patches {
            let offset = self.current_offset()?;
            write_u24(&mut self.out[patch..], offset as u32);
            let list = &arena[index as usize].bigrams;
            for (i, &(target, frequency)) in list.iter().enumerate() {
                let target = self.node_offsets[target as usize] as u32;
                let entry = RawBigramEntry::new(frequency, target, i + 1 < list.len());
                self.out.extend_from_slice(bytemuck::bytes_of(&entry));
            }
        }
        if self.out.len() > MAX_OFFSET + 1 {
            return Err(BuildError::TooLarge { size: self.out.len() });
        }
        Ok(())
    }
}

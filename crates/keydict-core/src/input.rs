// Per-position key candidates for one typed word.
//
// Touch input is imprecise, so every key press is reported as a short list of
// characters: the key that was hit first, followed by its neighbours ordered
// by proximity. The proximity table itself lives outside the engine; this
// type only carries its already-resolved output.

use crate::enums::{MAX_ALTERNATIVES, MAX_WORD_LENGTH};

/// Error type for building an input sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("key position has no candidate characters")]
    EmptyPosition,
    #[error("input exceeds {max} key positions")]
    TooLong { max: usize },
}

/// Candidate characters for a single key press. The primary key is first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCandidates {
    codes: [char; MAX_ALTERNATIVES],
    len: u8,
}

impl KeyCandidates {
    /// Build from a candidate list, keeping at most [`MAX_ALTERNATIVES`].
    pub fn new(alternatives: &[char]) -> Result<Self, InputError> {
        if alternatives.is_empty() {
            return Err(InputError::EmptyPosition);
        }
        let len = alternatives.len().min(MAX_ALTERNATIVES);
        let mut codes = ['\0'; MAX_ALTERNATIVES];
        codes[..len].copy_from_slice(&alternatives[..len]);
        Ok(Self {
            codes,
            len: len as u8,
        })
    }

    /// A position with a single, certain key.
    pub fn exact(c: char) -> Self {
        let mut codes = ['\0'; MAX_ALTERNATIVES];
        codes[0] = c;
        Self { codes, len: 1 }
    }

    /// The key that was actually pressed.
    #[inline]
    pub fn primary(&self) -> char {
        self.codes[0]
    }

    /// All candidates, primary first.
    #[inline]
    pub fn codes(&self) -> &[char] {
        &self.codes[..self.len as usize]
    }

    /// Whether `c` is one of the candidates.
    pub fn contains(&self, c: char) -> bool {
        self.codes().contains(&c)
    }
}

/// The ordered key positions of a word being typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputCandidates {
    positions: Vec<KeyCandidates>,
}

impl InputCandidates {
    /// An empty sequence (nothing typed yet).
    pub fn new() -> Self {
        Self {
            positions: Vec::with_capacity(MAX_WORD_LENGTH),
        }
    }

    /// One exact candidate per character of `word`.
    ///
    /// Characters beyond [`MAX_WORD_LENGTH`] positions are rejected.
    pub fn from_word(word: &str) -> Result<Self, InputError> {
        let mut input = Self::new();
        for c in word.chars() {
            input.push_key(KeyCandidates::exact(c))?;
        }
        Ok(input)
    }

    /// Build from one candidate list per position.
    pub fn from_positions<S: AsRef<[char]>>(positions: &[S]) -> Result<Self, InputError> {
        let mut input = Self::new();
        for alternatives in positions {
            input.push(alternatives.as_ref())?;
        }
        Ok(input)
    }

    /// Append a key position given its candidates, primary first.
    pub fn push(&mut self, alternatives: &[char]) -> Result<(), InputError> {
        self.push_key(KeyCandidates::new(alternatives)?)
    }

    /// Append an already-built key position.
    pub fn push_key(&mut self, key: KeyCandidates) -> Result<(), InputError> {
        if self.positions.len() >= MAX_WORD_LENGTH {
            return Err(InputError::TooLong {
                max: MAX_WORD_LENGTH,
            });
        }
        self.positions.push(key);
        Ok(())
    }

    /// Remove the last key position (backspace).
    pub fn pop(&mut self) -> Option<KeyCandidates> {
        self.positions.pop()
    }

    /// Forget all typed positions.
    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Number of key positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Candidates at position `index`.
    #[inline]
    pub fn codes_at(&self, index: usize) -> &[char] {
        self.positions[index].codes()
    }

    /// Primary key at position `index`.
    #[inline]
    pub fn primary_at(&self, index: usize) -> char {
        self.positions[index].primary()
    }

    /// All key positions in typing order.
    pub fn positions(&self) -> &[KeyCandidates] {
        &self.positions
    }

    /// The word formed by the primary keys.
    pub fn typed_word(&self) -> String {
        self.positions.iter().map(KeyCandidates::primary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_position_is_rejected() {
        assert_eq!(KeyCandidates::new(&[]), Err(InputError::EmptyPosition));
    }

    #[test]
    fn alternatives_are_truncated() {
        let many: Vec<char> = ('a'..='z').collect();
        let key = KeyCandidates::new(&many).unwrap();
        assert_eq!(key.codes().len(), MAX_ALTERNATIVES);
        assert_eq!(key.primary(), 'a');
    }

    #[test]
    fn from_word_is_exact_per_position() {
        let input = InputCandidates::from_word("cat").unwrap();
        assert_eq!(input.len(), 3);
        assert_eq!(input.codes_at(1), &['a']);
        assert_eq!(input.typed_word(), "cat");
    }

    #[test]
    fn from_positions_keeps_primary_first() {
        let input = InputCandidates::from_positions(&[vec!['c', 'b'], vec!['a'], vec!['t']]).unwrap();
        assert_eq!(input.primary_at(0), 'c');
        assert!(input.positions()[0].contains('b'));
        assert_eq!(input.typed_word(), "cat");
    }

    #[test]
    fn capacity_is_max_word_length() {
        let long = "x".repeat(MAX_WORD_LENGTH);
        let mut input = InputCandidates::from_word(&long).unwrap();
        assert_eq!(input.len(), MAX_WORD_LENGTH);
        assert_eq!(
            input.push(&['y']),
            Err(InputError::TooLong {
                max: MAX_WORD_LENGTH
            })
        );
    }

    #[test]
    fn pop_and_clear() {
        let mut input = InputCandidates::from_word("ab").unwrap();
        assert_eq!(input.pop().map(|k| k.primary()), Some('b'));
        assert_eq!(input.len(), 1);
        input.clear();
        assert!(input.is_empty());
    }
}

// Shared limits, dictionary type tags and lifecycle states.

/// Maximum number of characters in a stored word.
///
/// Some languages (German in particular) have very long words, so this stays
/// well above typical word lengths. Queries are limited to one less than this.
pub const MAX_WORD_LENGTH: usize = 48;

/// Maximum number of candidate characters considered per key position.
pub const MAX_ALTERNATIVES: usize = 16;

/// Default capacity of the ranked suggestion list.
pub const MAX_WORDS: usize = 18;

/// Default number of bigram continuations scanned per previous word.
pub const MAX_BIGRAMS: usize = 60;

/// Score multiplier applied for every position matched by its primary key.
pub const TYPED_LETTER_MULTIPLIER: u32 = 2;

/// Score multiplier applied when a hit is a complete word (not a completion).
pub const FULL_WORD_MULTIPLIER: u32 = 2;

/// Highest pair frequency a bigram entry can store (7 bits).
pub const MAXIMUM_BIGRAM_FREQUENCY: u8 = 127;

/// Number of counters in a next-letter frequency table (ASCII range).
pub const NEXT_LETTERS_SIZE: usize = 128;

/// Apostrophe, transparent during matching unless typed explicitly.
pub const QUOTE: char = '\'';

/// Identifies which kind of dictionary produced a suggestion.
///
/// The engine never interprets the value; it is passed through to the sink so
/// that callers merging several dictionaries can tell the sources apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DictionaryTypeId(pub i32);

impl DictionaryTypeId {
    /// The bundled main dictionary.
    pub const MAIN: Self = Self(0);
    /// Words added by the user.
    pub const USER: Self = Self(1);
    /// Names from the address book.
    pub const CONTACTS: Self = Self(2);
    /// Words learned automatically from typing.
    pub const AUTO: Self = Self(3);
}

impl Default for DictionaryTypeId {
    fn default() -> Self {
        Self::MAIN
    }
}

/// How a suggestion was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Matched in the word trie from typed input.
    #[default]
    Unigram,
    /// Predicted from the previous word only.
    Bigram,
}

/// Lifecycle of a dictionary instance.
///
/// `Unloaded -> Loading -> Ready -> Closed`. A failed load falls back to
/// `Unloaded`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryState {
    /// No buffer: never loaded, or loading failed.
    Unloaded,
    /// Sources are being assembled into the buffer.
    Loading,
    /// Buffer available; queries are answered.
    Ready,
    /// Buffer released; queries return nothing.
    Closed,
}

impl DictionaryState {
    /// Whether queries can be answered in this state.
    pub fn accepts_queries(self) -> bool {
        self == Self::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_limit_leaves_room_for_terminator() {
        assert_eq!(MAX_WORD_LENGTH - 1, 47);
    }

    #[test]
    fn only_ready_accepts_queries() {
        assert!(DictionaryState::Ready.accepts_queries());
        assert!(!DictionaryState::Unloaded.accepts_queries());
        assert!(!DictionaryState::Loading.accepts_queries());
        assert!(!DictionaryState::Closed.accepts_queries());
    }

    #[test]
    fn default_type_is_main() {
        assert_eq!(DictionaryTypeId::default(), DictionaryTypeId::MAIN);
        assert_eq!(DataType::default(), DataType::Unigram);
    }
}

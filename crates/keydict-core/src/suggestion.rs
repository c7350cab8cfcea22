// Result delivery: the sink trait, the owned suggestion record and the
// next-letter frequency table filled alongside every query.

use crate::enums::{DataType, DictionaryTypeId, NEXT_LETTERS_SIZE};

/// One ranked word returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedSuggestion {
    pub word: String,
    pub score: u64,
    pub dict_type: DictionaryTypeId,
    pub data_type: DataType,
}

impl RankedSuggestion {
    pub fn new(word: impl Into<String>, score: u64, dict_type: DictionaryTypeId, data_type: DataType) -> Self {
        Self {
            word: word.into(),
            score,
            dict_type,
            data_type,
        }
    }
}

/// Receiver of ranked suggestions.
///
/// Words arrive synchronously, in descending score order, while the query is
/// still running. Returning `false` stops delivery for the current query.
pub trait SuggestionSink {
    fn add_word(&mut self, word: &[char], score: u64, dict_type: DictionaryTypeId, data_type: DataType) -> bool;
}

impl SuggestionSink for Vec<RankedSuggestion> {
    fn add_word(&mut self, word: &[char], score: u64, dict_type: DictionaryTypeId, data_type: DataType) -> bool {
        self.push(RankedSuggestion {
            word: word.iter().collect(),
            score,
            dict_type,
            data_type,
        });
        true
    }
}

/// Per-letter counters for the letter that would follow the typed prefix.
///
/// Keyboards use the table to enlarge the touch area of likely next keys.
/// Only the ASCII range is tracked; other letters are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextLetterFrequencies {
    counts: [u32; NEXT_LETTERS_SIZE],
}

impl Default for NextLetterFrequencies {
    fn default() -> Self {
        Self::new()
    }
}

impl NextLetterFrequencies {
    pub fn new() -> Self {
        Self {
            counts: [0; NEXT_LETTERS_SIZE],
        }
    }

    /// Count one occurrence of `c`. Returns `false` if `c` is out of range.
    #[inline]
    pub fn register(&mut self, c: char) -> bool {
        let index = c as usize;
        if index < NEXT_LETTERS_SIZE {
            self.counts[index] = self.counts[index].saturating_add(1);
            true
        } else {
            false
        }
    }

    /// Counter for `c`, zero for characters outside the table.
    pub fn get(&self, c: char) -> u32 {
        self.counts.get(c as usize).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.counts = [0; NEXT_LETTERS_SIZE];
    }

    /// Add every counter of `other` to this table.
    pub fn merge(&mut self, other: &Self) {
        for (a, &b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a = a.saturating_add(b);
        }
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&n| u64::from(n)).sum()
    }

    /// Raw counters indexed by code point.
    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    /// Letters with a nonzero count, in code point order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(i, &n)| (i as u8 as char, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn vec_sink_collects_everything() {
        let mut sink: Vec<RankedSuggestion> = Vec::new();
        assert!(sink.add_word(&chars("cat"), 10, DictionaryTypeId::MAIN, DataType::Unigram));
        assert!(sink.add_word(&chars("car"), 5, DictionaryTypeId::USER, DataType::Bigram));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].word, "cat");
        assert_eq!(sink[1].dict_type, DictionaryTypeId::USER);
        assert_eq!(sink[1].data_type, DataType::Bigram);
    }

    #[test]
    fn next_letters_ignore_non_ascii() {
        let mut next = NextLetterFrequencies::new();
        assert!(next.register('s'));
        assert!(next.register('s'));
        assert!(next.register('t'));
        assert!(!next.register('\u{00E9}'));
        assert_eq!(next.get('s'), 2);
        assert_eq!(next.get('\u{00E9}'), 0);
        assert_eq!(next.total(), 3);
        let letters: Vec<_> = next.iter().collect();
        assert_eq!(letters, vec![('s', 2), ('t', 1)]);
        next.clear();
        assert_eq!(next.total(), 0);
    }

    #[test]
    fn next_letters_merge_adds_counts() {
        let mut a = NextLetterFrequencies::new();
        let mut b = NextLetterFrequencies::new();
        a.register('a');
        b.register('a');
        b.register('z');
        a.merge(&b);
        assert_eq!(a.get('a'), 2);
        assert_eq!(a.get('z'), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn suggestion_serializes_as_json() {
        let s = RankedSuggestion::new("cat", 1600, DictionaryTypeId::MAIN, DataType::Unigram);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"word":"cat","score":1600,"dict_type":0,"data_type":"Unigram"}"#);
        let back: RankedSuggestion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}

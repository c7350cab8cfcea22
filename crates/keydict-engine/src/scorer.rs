// Scoring and the bounded ranked list.

use keydict_core::enums::{
    DataType, FULL_WORD_MULTIPLIER, MAX_WORD_LENGTH, MAX_WORDS, MAXIMUM_BIGRAM_FREQUENCY,
    TYPED_LETTER_MULTIPLIER,
};

/// Score multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringParams {
    /// Applied once per typed position not lost to penalties.
    pub typed_letter_multiplier: u32,
    /// Applied to words that end exactly where the input ends.
    pub full_word_multiplier: u32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            typed_letter_multiplier: TYPED_LETTER_MULTIPLIER,
            full_word_multiplier: FULL_WORD_MULTIPLIER,
        }
    }
}

impl ScoringParams {
    /// `frequency * typed^(input_len - cost) * (full if full_word)`, saturating.
    pub fn score(&self, frequency: u8, input_len: usize, cost: u32, full_word: bool) -> u64 {
        let exponent = (input_len as u32).saturating_sub(cost);
        let mut score = u64::from(frequency).saturating_mul(u64::from(self.typed_letter_multiplier).saturating_pow(exponent));
        if full_word {
            score = score.saturating_mul(u64::from(self.full_word_multiplier));
        }
        score
    }
}

/// `score * (1 + bigram_frequency / 127)`, rounded to nearest.
pub fn bigram_boost(score: u64, bigram_frequency: u8) -> u64 {
    let max = u128::from(MAXIMUM_BIGRAM_FREQUENCY);
    let f = u128::from(bigram_frequency.min(MAXIMUM_BIGRAM_FREQUENCY));
    let boosted = (u128::from(score) * (max + f) + max / 2) / max;
    u64::try_from(boosted).unwrap_or(u64::MAX)
}

/// One ranked entry with its word stored inline.
#[derive(Debug, Clone, Copy)]
pub struct RankedEntry {
    word: [char; MAX_WORD_LENGTH],
    len: u8,
    pub score: u64,
    pub data_type: DataType,
}

impl RankedEntry {
    #[inline]
    pub fn word(&self) -> &[char] {
        &self.word[..self.len as usize]
    }
}

/// Fixed-capacity list ordered by descending score.
///
/// An entry is placed after every entry with an equal or higher score, so
/// ties keep the order in which they were found. Once full, only a strictly
/// higher score gets in, evicting the lowest entry.
#[derive(Debug, Clone)]
pub struct RankedList {
    entries: Vec<RankedEntry>,
    capacity: usize,
}

impl Default for RankedList {
    fn default() -> Self {
        Self::new(MAX_WORDS)
    }
}

impl RankedList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the list and, if needed, change its capacity.
    pub fn reset(&mut self, capacity: usize) {
        self.entries.clear();
        if capacity != self.capacity {
            self.capacity = capacity;
            self.entries.shrink_to(capacity);
            self.entries.reserve_exact(capacity);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// Whether `word` is in the list.
    pub fn contains(&self, word: &[char]) -> bool {
        self.position(word).is_some()
    }

    fn position(&self, word: &[char]) -> Option<usize> {
        self.entries.iter().position(|e| e.word() == word)
    }

    /// Offer a word. Returns `true` if the list changed.
    ///
    /// Zero scores and words that do not fit are refused. A word already in
    /// the list only moves if the new score is higher.
    pub fn insert(&mut self, word: &[char], score: u64, data_type: DataType) -> bool {
        if score == 0 || word.is_empty() || word.len() > MAX_WORD_LENGTH || self.capacity == 0 {
            return false;
        }
        if let Some(i) = self.position(word) {
            if self.entries[i].score >= score {
                return false;
            }
            self.entries.remove(i);
        } else if self.entries.len() >= self.capacity {
            match self.entries.last() {
                Some(last) if last.score >= score => return false,
                _ => {
                    self.entries.pop();
                }
            }
        }

        let at = self.entries.partition_point(|e| e.score >= score);
        let mut entry = RankedEntry {
            word: ['\0'; MAX_WORD_LENGTH],
            len: word.len() as u8,
            score,
            data_type,
        };
        entry.word[..word.len()].copy_from_slice(word);
        self.entries.insert(at, entry);
        true
    }

    /// Multiply the score of `word` by its bigram boost. Call
    /// [`resort`](Self::resort) afterwards.
    pub fn boost(&mut self, word: &[char], bigram_frequency: u8) -> bool {
        match self.position(word) {
            Some(i) => {
                let e = &mut self.entries[i];
                e.score = bigram_boost(e.score, bigram_frequency);
                true
            }
            None => false,
        }
    }

    /// Restore descending order after boosts. Stable: equal scores keep their
    /// relative order.
    pub fn resort(&mut self) {
        for i in 1..self.entries.len() {
            let mut j = i;
            while j > 0 && self.entries[j - 1].score < self.entries[j].score {
                self.entries.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn words(list: &RankedList) -> Vec<String> {
        list.iter().map(|e| e.word().iter().collect()).collect()
    }

    #[test]
    fn score_formula() {
        let p = ScoringParams::default();
        // 200 * 2^3 * 2
        assert_eq!(p.score(200, 3, 0, true), 3200);
        assert_eq!(p.score(200, 3, 0, false), 1600);
        assert_eq!(p.score(200, 3, 1, true), 1600);
        // cost beyond input length floors the exponent at zero
        assert_eq!(p.score(7, 2, 5, false), 7);
        assert_eq!(p.score(0, 3, 0, true), 0);
    }

    #[test]
    fn one_correction_always_scores_lower() {
        let p = ScoringParams::default();
        for n in 1..20 {
            for f in [1u8, 100, 255] {
                assert!(p.score(f, n, 1, true) < p.score(f, n, 0, true));
            }
        }
    }

    #[test]
    fn score_saturates() {
        let p = ScoringParams {
            typed_letter_multiplier: u32::MAX,
            full_word_multiplier: u32::MAX,
        };
        assert_eq!(p.score(255, 47, 0, true), u64::MAX);
    }

    #[test]
    fn boost_formula() {
        assert_eq!(bigram_boost(1000, 0), 1000);
        assert_eq!(bigram_boost(1000, 127), 2000);
        // 1000 * 190 / 127 = 1496.06
        assert_eq!(bigram_boost(1000, 63), 1496);
        assert_eq!(bigram_boost(u64::MAX, 127), u64::MAX);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut list = RankedList::new(5);
        list.insert(&chars("b"), 10, DataType::Unigram);
        list.insert(&chars("a"), 10, DataType::Unigram);
        list.insert(&chars("c"), 20, DataType::Unigram);
        list.insert(&chars("d"), 10, DataType::Unigram);
        assert_eq!(words(&list), vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn full_list_admits_only_strictly_higher() {
        let mut list = RankedList::new(2);
        assert!(list.insert(&chars("a"), 30, DataType::Unigram));
        assert!(list.insert(&chars("b"), 20, DataType::Unigram));
        assert!(!list.insert(&chars("c"), 20, DataType::Unigram));
        assert!(list.insert(&chars("d"), 25, DataType::Unigram));
        assert_eq!(words(&list), vec!["a", "d"]);
    }

    #[test]
    fn duplicates_keep_higher_score() {
        let mut list = RankedList::new(4);
        list.insert(&chars("cat"), 10, DataType::Unigram);
        list.insert(&chars("car"), 20, DataType::Unigram);
        assert!(!list.insert(&chars("cat"), 5, DataType::Unigram));
        assert!(list.insert(&chars("cat"), 40, DataType::Unigram));
        assert_eq!(words(&list), vec!["cat", "car"]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].score, 40);
    }

    #[test]
    fn refuses_zero_and_oversized() {
        let mut list = RankedList::new(4);
        assert!(!list.insert(&chars("a"), 0, DataType::Unigram));
        assert!(!list.insert(&[], 5, DataType::Unigram));
        assert!(!list.insert(&['x'; MAX_WORD_LENGTH + 1], 5, DataType::Unigram));
        assert!(list.insert(&['x'; MAX_WORD_LENGTH], 5, DataType::Unigram));
        assert!(!RankedList::new(0).insert(&chars("a"), 1, DataType::Unigram));
    }

    #[test]
    fn boost_then_resort_is_stable() {
        let mut list = RankedList::new(4);
        list.insert(&chars("bat"), 2880, DataType::Unigram);
        list.insert(&chars("cat"), 1600, DataType::Unigram);
        list.insert(&chars("hat"), 1600, DataType::Unigram);
        assert!(list.boost(&chars("cat"), 127));
        assert!(!list.boost(&chars("dog"), 127));
        list.resort();
        assert_eq!(words(&list), vec!["cat", "bat", "hat"]);
        assert_eq!(list.entries()[0].score, 3200);
    }

    #[test]
    fn reset_changes_capacity() {
        let mut list = RankedList::new(2);
        list.insert(&chars("a"), 1, DataType::Unigram);
        list.reset(3);
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 3);
        for w in ["a", "b", "c", "d"] {
            list.insert(&chars(w), 1, DataType::Unigram);
        }
        assert_eq!(list.len(), 3);
    }
}

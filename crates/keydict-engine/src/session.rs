// Per-query scratch memory and result delivery.

use keydict_core::enums::{DataType, DictionaryTypeId, MAX_WORD_LENGTH, MAX_WORDS};
use keydict_core::suggestion::{NextLetterFrequencies, RankedSuggestion, SuggestionSink};

use crate::matcher::{Hit, HitCollector, MatchScratch};
use crate::scorer::{RankedEntry, RankedList, ScoringParams};

/// Everything a query writes to, allocated once and reused.
///
/// A session can serve any number of queries, on any dictionary, one at a
/// time. Results stay readable until the next query.
#[derive(Debug, Clone)]
pub struct QuerySession {
    pub(crate) matcher: MatchScratch,
    pub(crate) list: RankedList,
    pub(crate) word: [char; MAX_WORD_LENGTH],
    pub(crate) next_letters: NextLetterFrequencies,
}

impl Default for QuerySession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuerySession {
    pub fn new() -> Self {
        Self::with_capacity(MAX_WORDS)
    }

    /// A session whose ranked list holds `max_words` entries.
    pub fn with_capacity(max_words: usize) -> Self {
        Self {
            matcher: MatchScratch::new(),
            list: RankedList::new(max_words),
            word: ['\0'; MAX_WORD_LENGTH],
            next_letters: NextLetterFrequencies::new(),
        }
    }

    pub(crate) fn reset(&mut self, max_words: usize) {
        self.list.reset(max_words);
        self.next_letters.clear();
    }

    /// Forget the results of the last query.
    pub(crate) fn discard(&mut self) {
        let capacity = self.list.capacity();
        self.reset(capacity);
    }

    /// Ranked results of the last query, best first.
    pub fn results(&self) -> &[RankedEntry] {
        self.list.entries()
    }

    /// Next-letter counts gathered by the last query.
    pub fn next_letters(&self) -> &NextLetterFrequencies {
        &self.next_letters
    }

    /// Owned copies of the last results.
    pub fn to_suggestions(&self, dict_type: DictionaryTypeId) -> Vec<RankedSuggestion> {
        self.list
            .iter()
            .map(|e| RankedSuggestion::new(e.word().iter().collect::<String>(), e.score, dict_type, e.data_type))
            .collect()
    }

    /// Push the last results into `sink` in rank order and add the gathered
    /// next-letter counts to `next_letters`.
    pub fn deliver(
        &self,
        dict_type: DictionaryTypeId,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        for entry in self.list.iter() {
            if !sink.add_word(entry.word(), entry.score, dict_type, entry.data_type) {
                break;
            }
        }
        if let Some(out) = next_letters {
            out.merge(&self.next_letters);
        }
    }
}

/// Scores matcher hits into the ranked list.
pub(crate) struct UnigramCollector<'a> {
    list: &'a mut RankedList,
    scoring: &'a ScoringParams,
    input_len: usize,
    next_letters: &'a mut NextLetterFrequencies,
    admitted: usize,
}

impl<'a> UnigramCollector<'a> {
    pub(crate) fn new(
        list: &'a mut RankedList,
        scoring: &'a ScoringParams,
        input_len: usize,
        next_letters: &'a mut NextLetterFrequencies,
    ) -> Self {
        Self {
            list,
            scoring,
            input_len,
            next_letters,
            admitted: 0,
        }
    }
}

impl HitCollector for UnigramCollector<'_> {
    fn collect(&mut self, hit: &Hit<'_>) {
        if let Some(c) = hit.next_letter {
            self.next_letters.register(c);
        }
        // a word reached through a skip does not count as fully typed
        let full_word = hit.full_word && !hit.skipped;
        let score = self.scoring.score(hit.frequency, self.input_len, hit.cost, full_word);
        if self.list.insert(hit.word, score, DataType::Unigram) {
            self.admitted += 1;
        }
    }

    fn admitted(&self) -> usize {
        self.admitted
    }
}

// Several dictionaries queried as one.

use std::sync::Arc;

use hashbrown::HashMap;
use keydict_core::enums::{DictionaryTypeId, MAX_WORDS};
use keydict_core::input::InputCandidates;
use keydict_core::suggestion::{NextLetterFrequencies, RankedSuggestion, SuggestionSink};

use crate::dictionary::Dictionary;

/// Ordered group of dictionaries, typically main, user and contacts.
///
/// Each query runs on every member. Results are merged by word, keeping the
/// highest score; equal scores keep member order.
pub struct DictionarySet {
    members: Vec<Arc<dyn Dictionary>>,
    max_words: usize,
}

impl Default for DictionarySet {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionarySet {
    pub fn new() -> Self {
        Self::with_max_words(MAX_WORDS)
    }

    pub fn with_max_words(max_words: usize) -> Self {
        Self {
            members: Vec::new(),
            max_words,
        }
    }

    pub fn push(&mut self, dictionary: Arc<dyn Dictionary>) {
        self.members.push(dictionary);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Arc<dyn Dictionary>] {
        &self.members
    }

    /// Member with the given type, if any.
    pub fn get(&self, dict_type: DictionaryTypeId) -> Option<&Arc<dyn Dictionary>> {
        self.members.iter().find(|d| d.dictionary_type() == dict_type)
    }

    pub fn get_suggestions(
        &self,
        input: &InputCandidates,
        previous_word: Option<&str>,
        sink: &mut dyn SuggestionSink,
        mut next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        let mut merged = Merge::default();
        for d in &self.members {
            d.get_suggestions(input, previous_word, &mut merged, next_letters.as_deref_mut());
        }
        merged.deliver(self.max_words, sink);
    }

    pub fn get_bigram_suggestions(
        &self,
        previous_word: &str,
        sink: &mut dyn SuggestionSink,
        mut next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        let mut merged = Merge::default();
        for d in &self.members {
            d.get_bigram_suggestions(previous_word, &mut merged, next_letters.as_deref_mut());
        }
        merged.deliver(self.max_words, sink);
    }

    pub fn get_bigram_completions(
        &self,
        previous_word: &str,
        input: &InputCandidates,
        sink: &mut dyn SuggestionSink,
        mut next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        let mut merged = Merge::default();
        for d in &self.members {
            d.get_bigram_completions(previous_word, input, &mut merged, next_letters.as_deref_mut());
        }
        merged.deliver(self.max_words, sink);
    }

    /// Owned, merged suggestions for `input`.
    pub fn suggestions(&self, input: &InputCandidates, previous_word: Option<&str>) -> Vec<RankedSuggestion> {
        let mut out = Vec::new();
        self.get_suggestions(input, previous_word, &mut out, None);
        out
    }

    /// True if any member accepts `word`.
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.members.iter().any(|d| d.is_valid_word(word))
    }

    /// Total buffer size of all members.
    pub fn size(&self) -> usize {
        self.members.iter().map(|d| d.size()).sum()
    }

    pub fn close(&self) {
        for d in &self.members {
            d.close();
        }
    }
}

/// Sink that deduplicates by word.
#[derive(Default)]
struct Merge {
    entries: Vec<RankedSuggestion>,
    index: HashMap<String, usize>,
}

impl SuggestionSink for Merge {
    fn add_word(
        &mut self,
        word: &[char],
        score: u64,
        dict_type: DictionaryTypeId,
        data_type: keydict_core::enums::DataType,
    ) -> bool {
        let word: String = word.iter().collect();
        match self.index.get(&word) {
            Some(&i) => {
                if score > self.entries[i].score {
                    self.entries[i] = RankedSuggestion::new(word, score, dict_type, data_type);
                }
            }
            None => {
                self.index.insert(word.clone(), self.entries.len());
                self.entries.push(RankedSuggestion::new(word, score, dict_type, data_type));
            }
        }
        true
    }
}

impl Merge {
    fn deliver(mut self, limit: usize, sink: &mut dyn SuggestionSink) {
        // stable: ties stay in member order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        let mut word = Vec::new();
        for s in self.entries.into_iter().take(limit) {
            word.clear();
            word.extend(s.word.chars());
            if !sink.add_word(&word, s.score, s.dict_type, s.data_type) {
                break;
            }
        }
    }
}

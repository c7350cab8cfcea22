// Editable dictionary compiled to an immutable snapshot after every change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use keydict_core::enums::DictionaryTypeId;
use keydict_core::input::InputCandidates;
use keydict_core::suggestion::{NextLetterFrequencies, SuggestionSink};
use keydict_trie::DictionaryBuilder;
use tracing::debug;

use crate::dictionary::{BinaryDictionary, Dictionary, DictionaryError};
use crate::options::SuggestOptions;

/// A word list that can change while the keyboard is running.
///
/// Every edit rebuilds the binary trie and swaps it in. Queries already
/// running keep the snapshot they started with. A failed rebuild leaves both
/// the word list and the snapshot unchanged.
pub struct UserDictionary {
    dict_type: DictionaryTypeId,
    options: SuggestOptions,
    builder: Mutex<DictionaryBuilder>,
    snapshot: RwLock<Arc<BinaryDictionary>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for UserDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDictionary")
            .field("dict_type", &self.dict_type)
            .field("words", &self.len())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl UserDictionary {
    pub fn new(dict_type: DictionaryTypeId) -> Self {
        Self::with_options(dict_type, SuggestOptions::default())
    }

    pub fn with_options(dict_type: DictionaryTypeId, options: SuggestOptions) -> Self {
        Self {
            dict_type,
            options,
            builder: Mutex::new(DictionaryBuilder::new()),
            snapshot: RwLock::new(Arc::new(BinaryDictionary::empty(dict_type).with_options(options))),
            closed: AtomicBool::new(false),
        }
    }

    /// Start from an existing word list.
    pub fn from_builder(dict_type: DictionaryTypeId, builder: DictionaryBuilder) -> Result<Self, DictionaryError> {
        let dict = Self::new(dict_type);
        let bytes = builder.build()?;
        dict.publish(bytes);
        *dict.lock_builder() = builder;
        Ok(dict)
    }

    /// Add `word`, keeping the higher frequency if it is already present.
    pub fn add_word(&self, word: &str, frequency: u8) -> Result<(), DictionaryError> {
        self.edit(|b| b.add_word(word, frequency).map(|()| true))
    }

    /// Replace the frequency of `word`, adding it if needed.
    pub fn set_frequency(&self, word: &str, frequency: u8) -> Result<(), DictionaryError> {
        self.edit(|b| b.set_frequency(word, frequency).map(|()| true))
    }

    /// Remove `word` and every bigram that mentions it. Returns whether the
    /// word was present.
    pub fn remove_word(&self, word: &str) -> Result<bool, DictionaryError> {
        let mut removed = false;
        self.edit(|b| {
            removed = b.remove_word(word);
            Ok(removed)
        })?;
        Ok(removed)
    }

    pub fn add_bigram(&self, previous: &str, next: &str, frequency: u8) -> Result<(), DictionaryError> {
        self.edit(|b| b.add_bigram(previous, next, frequency).map(|()| true))
    }

    /// Current words with their frequencies, in code point order.
    pub fn words(&self) -> Vec<(String, u8)> {
        self.lock_builder().words().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_builder().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_builder().is_empty()
    }

    /// The snapshot queries currently run against.
    pub fn snapshot(&self) -> Arc<BinaryDictionary> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn lock_builder(&self) -> std::sync::MutexGuard<'_, DictionaryBuilder> {
        self.builder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to a copy of the word list; commit and rebuild if it
    /// reports a change.
    fn edit(
        &self,
        f: impl FnOnce(&mut DictionaryBuilder) -> Result<bool, keydict_trie::BuildError>,
    ) -> Result<(), DictionaryError> {
        let mut guard = self.lock_builder();
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        let mut next = guard.clone();
        if !f(&mut next)? {
            return Ok(());
        }
        let bytes = next.build()?;
        *guard = next;
        self.publish(bytes);
        debug!(dict_type = self.dict_type.0, words = guard.len(), "user dictionary rebuilt");
        Ok(())
    }

    fn publish(&self, bytes: Vec<u8>) {
        let dict = BinaryDictionary::from_bytes(bytes, self.dict_type).with_options(self.options);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(dict);
    }
}

impl Dictionary for UserDictionary {
    fn get_suggestions(
        &self,
        input: &InputCandidates,
        previous_word: Option<&str>,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        self.snapshot().get_suggestions(input, previous_word, sink, next_letters);
    }

    fn get_bigram_suggestions(
        &self,
        previous_word: &str,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        self.snapshot().get_bigram_suggestions(previous_word, sink, next_letters);
    }

    fn get_bigram_completions(
        &self,
        previous_word: &str,
        input: &InputCandidates,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        self.snapshot()
            .get_bigram_completions(previous_word, input, sink, next_letters);
    }

    fn is_valid_word(&self, word: &str) -> bool {
        self.snapshot().is_valid_word(word)
    }

    fn size(&self) -> usize {
        self.snapshot().size()
    }

    fn close(&self) {
        let _guard = self.lock_builder();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.snapshot().close();
    }

    fn dictionary_type(&self) -> DictionaryTypeId {
        self.dict_type
    }
}

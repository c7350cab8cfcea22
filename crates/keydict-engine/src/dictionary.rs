// The dictionary contract and its binary-trie implementation.
//
// A `BinaryDictionary` owns one immutable buffer. Queries share a read lock
// on it; `close` takes the write lock, so a buffer is never released while a
// query is still walking it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use keydict_core::enums::{DictionaryState, DictionaryTypeId, MAX_WORD_LENGTH};
use keydict_core::input::InputCandidates;
use keydict_core::suggestion::{NextLetterFrequencies, SuggestionSink};
use keydict_trie::format::parse_header;
use keydict_trie::{BuildError, TrieError, lookup};
use tracing::{debug, debug_span, info, warn};

use crate::bigram;
use crate::buffer::{DictionaryBuffer, DictionarySource, LoadError, assemble};
use crate::matcher::{self, MAX_DEPTH};
use crate::options::SuggestOptions;
use crate::session::{QuerySession, UnigramCollector};

/// Error type for dictionary operations.
///
/// The [`Dictionary`] query methods never return these; they answer with
/// nothing instead. The fallible inherent methods of [`BinaryDictionary`]
/// expose them.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to load dictionary: {0}")]
    LoadFailure(#[from] LoadError),
    #[error("corrupt dictionary: {0}")]
    CorruptDictionary(#[from] TrieError),
    #[error("query of {len} keys exceeds the limit of {max}")]
    QueryTooLong { len: usize, max: usize },
    #[error("failed to build dictionary: {0}")]
    Build(#[from] BuildError),
}

/// A source of word suggestions.
///
/// Main, user and contacts dictionaries all answer the same queries, so a
/// keyboard can hold any mix of them and merge their results.
pub trait Dictionary: Send + Sync {
    /// Rank words and completions for typed input.
    ///
    /// With `previous_word`, known continuations of it are boosted; with
    /// empty input they are predicted instead.
    fn get_suggestions(
        &self,
        input: &InputCandidates,
        previous_word: Option<&str>,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    );

    /// Predict next words from `previous_word` alone.
    fn get_bigram_suggestions(
        &self,
        previous_word: &str,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    );

    /// Predict next words whose first letter matches the first typed key.
    fn get_bigram_completions(
        &self,
        previous_word: &str,
        input: &InputCandidates,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    );

    /// Whether `word` is stored exactly, with a nonzero frequency.
    fn is_valid_word(&self, word: &str) -> bool;

    /// Size of the backing buffer in bytes; zero once closed.
    fn size(&self) -> usize;

    /// Release the backing buffer. Safe to call any number of times.
    fn close(&self);

    fn dictionary_type(&self) -> DictionaryTypeId;
}

struct Loaded {
    state: DictionaryState,
    buffer: DictionaryBuffer,
}

/// Dictionary backed by one buffer in the binary trie format.
pub struct BinaryDictionary {
    dict_type: DictionaryTypeId,
    options: SuggestOptions,
    inner: RwLock<Loaded>,
    corrupt: AtomicBool,
    session: Mutex<QuerySession>,
}

impl std::fmt::Debug for BinaryDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryDictionary")
            .field("dict_type", &self.dict_type)
            .field("state", &self.state())
            .field("size", &self.size())
            .field("corrupt", &self.is_corrupt())
            .finish()
    }
}

impl BinaryDictionary {
    fn with_state(dict_type: DictionaryTypeId, state: DictionaryState, buffer: DictionaryBuffer) -> Self {
        let options = SuggestOptions::default();
        Self {
            dict_type,
            options,
            inner: RwLock::new(Loaded { state, buffer }),
            corrupt: AtomicBool::new(false),
            session: Mutex::new(QuerySession::with_capacity(options.max_words)),
        }
    }

    /// Assemble `sources` and open the result.
    ///
    /// A load failure is logged and leaves the dictionary `Unloaded`. A buffer
    /// with a bad header is opened but marked corrupt. Either way every query
    /// answers with nothing.
    pub fn open(sources: Vec<DictionarySource>, dict_type: DictionaryTypeId) -> Self {
        let dict = Self::with_state(dict_type, DictionaryState::Loading, DictionaryBuffer::Empty);
        match assemble(sources) {
            Ok(buffer) => {
                dict.install(buffer);
            }
            Err(e) => {
                warn!(dict_type = dict_type.0, error = %e, "failed to load dictionary");
                dict.write_inner().state = DictionaryState::Unloaded;
            }
        }
        dict
    }

    /// Like [`open`](Self::open), but reports load failures and bad headers.
    pub fn try_open(sources: Vec<DictionarySource>, dict_type: DictionaryTypeId) -> Result<Self, DictionaryError> {
        let buffer = assemble(sources)?;
        if !buffer.is_empty() {
            parse_header(buffer.as_slice())?;
        }
        let dict = Self::with_state(dict_type, DictionaryState::Loading, DictionaryBuffer::Empty);
        dict.install(buffer);
        Ok(dict)
    }

    /// Open a dictionary from bytes already in memory.
    pub fn from_bytes(bytes: Vec<u8>, dict_type: DictionaryTypeId) -> Self {
        Self::open(vec![DictionarySource::Bytes(bytes)], dict_type)
    }

    /// An open dictionary with no words.
    pub fn empty(dict_type: DictionaryTypeId) -> Self {
        Self::open(Vec::new(), dict_type)
    }

    pub fn with_options(mut self, options: SuggestOptions) -> Self {
        self.set_options(options);
        self
    }

    pub fn set_options(&mut self, options: SuggestOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &SuggestOptions {
        &self.options
    }

    pub fn state(&self) -> DictionaryState {
        self.read_inner().state
    }

    /// Whether a decode error has disabled this dictionary.
    pub fn is_corrupt(&self) -> bool {
        self.corrupt.load(Ordering::Acquire)
    }

    fn install(&self, buffer: DictionaryBuffer) {
        if !buffer.is_empty() {
            if let Err(e) = parse_header(buffer.as_slice()) {
                self.mark_corrupt(&e);
            }
        }
        if buffer.is_empty() {
            debug!(dict_type = self.dict_type.0, "opened empty dictionary");
        } else {
            info!(
                dict_type = self.dict_type.0,
                size = buffer.len(),
                mapped = buffer.is_mapped(),
                "dictionary opened"
            );
        }
        let mut inner = self.write_inner();
        inner.buffer = buffer;
        inner.state = DictionaryState::Ready;
    }

    fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, Loaded> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> std::sync::RwLockWriteGuard<'_, Loaded> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_corrupt(&self, error: &TrieError) {
        if !self.corrupt.swap(true, Ordering::AcqRel) {
            warn!(dict_type = self.dict_type.0, %error, "corrupt dictionary, disabling it");
        }
    }

    /// Run `f` on the buffer if queries are possible; `default` otherwise.
    ///
    /// A decode error disables the dictionary for good.
    fn with_buffer<R>(&self, default: R, f: impl FnOnce(&[u8]) -> Result<R, TrieError>) -> Result<R, DictionaryError> {
        if self.is_corrupt() {
            return Ok(default);
        }
        let inner = self.read_inner();
        if !inner.state.accepts_queries() || inner.buffer.is_empty() {
            return Ok(default);
        }
        f(inner.buffer.as_slice()).map_err(|e| {
            self.mark_corrupt(&e);
            DictionaryError::CorruptDictionary(e)
        })
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut QuerySession) -> R) -> R {
        match self.session.try_lock() {
            Ok(mut session) => f(&mut session),
            Err(_) => f(&mut QuerySession::with_capacity(self.options.max_words)),
        }
    }

    /// Rank suggestions for `input` into `session`.
    ///
    /// On success the results are in [`QuerySession::results`]. On error the
    /// session holds no results.
    pub fn suggest(
        &self,
        session: &mut QuerySession,
        input: &InputCandidates,
        previous_word: Option<&str>,
    ) -> Result<(), DictionaryError> {
        session.reset(self.options.max_words);
        let n = input.len();
        if n > MAX_DEPTH {
            debug!(dict_type = self.dict_type.0, len = n, "query too long, ignoring");
            return Err(DictionaryError::QueryTooLong { len: n, max: MAX_DEPTH });
        }
        let _span = debug_span!("get_suggestions", dict_type = self.dict_type.0, n).entered();
        let options = &self.options;

        let result = self.with_buffer((), |data| {
            let QuerySession {
                matcher: scratch,
                list,
                word,
                next_letters,
            } = &mut *session;

            if n == 0 {
                if let Some(prev) = previous_word {
                    if let Some(node) = bigram::find_previous(data, prev)? {
                        bigram::predict(data, &node, options.max_bigrams, None, list, word, next_letters)?;
                    }
                }
                return Ok(());
            }

            let stats = {
                let mut collector = UnigramCollector::new(list, &options.scoring, n, next_letters);
                matcher::search(data, input, &options.policy, scratch, &mut collector)?
            };
            if let Some(prev) = previous_word {
                if let Some(node) = bigram::find_previous(data, prev)? {
                    bigram::rerank(data, &node, options.max_bigrams, list, word)?;
                }
            }
            debug!(
                visits = stats.visits,
                skip_pass = ?stats.skip_pass,
                ranked = list.len(),
                "suggestions ranked"
            );
            Ok(())
        });

        if result.is_err() {
            session.discard();
        }
        result
    }

    /// Predict continuations of `previous_word` into `session`, optionally
    /// filtered by the first position of `input`.
    pub fn predict(
        &self,
        session: &mut QuerySession,
        previous_word: &str,
        input: Option<&InputCandidates>,
    ) -> Result<(), DictionaryError> {
        session.reset(self.options.max_words);
        let _span = debug_span!("get_bigram_suggestions", dict_type = self.dict_type.0).entered();
        let options = &self.options;
        let first = input.filter(|i| !i.is_empty()).map(|i| i.codes_at(0));

        let result = self.with_buffer((), |data| {
            let QuerySession {
                list,
                word,
                next_letters,
                ..
            } = &mut *session;
            if let Some(node) = bigram::find_previous(data, previous_word)? {
                bigram::predict(data, &node, options.max_bigrams, first, list, word, next_letters)?;
            }
            Ok(())
        });

        if result.is_err() {
            session.discard();
        }
        result
    }

    /// Exact lookup, reporting decode errors.
    pub fn try_is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() || chars.len() > MAX_WORD_LENGTH {
            return Ok(false);
        }
        self.with_buffer(false, |data| lookup::is_valid_word(data, &chars))
    }
}

impl Dictionary for BinaryDictionary {
    fn get_suggestions(
        &self,
        input: &InputCandidates,
        previous_word: Option<&str>,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        self.with_session(|session| {
            if self.suggest(session, input, previous_word).is_ok() {
                session.deliver(self.dict_type, sink, next_letters);
            }
        });
    }

    fn get_bigram_suggestions(
        &self,
        previous_word: &str,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        self.with_session(|session| {
            if self.predict(session, previous_word, None).is_ok() {
                session.deliver(self.dict_type, sink, next_letters);
            }
        });
    }

    fn get_bigram_completions(
        &self,
        previous_word: &str,
        input: &InputCandidates,
        sink: &mut dyn SuggestionSink,
        next_letters: Option<&mut NextLetterFrequencies>,
    ) {
        self.with_session(|session| {
            if self.predict(session, previous_word, Some(input)).is_ok() {
                session.deliver(self.dict_type, sink, next_letters);
            }
        });
    }

    fn is_valid_word(&self, word: &str) -> bool {
        self.try_is_valid_word(word).unwrap_or(false)
    }

    fn size(&self) -> usize {
        let inner = self.read_inner();
        if inner.state == DictionaryState::Ready {
            inner.buffer.len()
        } else {
            0
        }
    }

    fn close(&self) {
        let mut inner = self.write_inner();
        if inner.state == DictionaryState::Closed {
            return;
        }
        inner.state = DictionaryState::Closed;
        inner.buffer = DictionaryBuffer::Empty;
        debug!(dict_type = self.dict_type.0, "dictionary closed");
    }

    fn dictionary_type(&self) -> DictionaryTypeId {
        self.dict_type
    }
}

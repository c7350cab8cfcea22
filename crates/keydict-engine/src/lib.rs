//! Suggestion engine for soft-keyboard dictionaries.
//!
//! Given the candidate keys of each typed position and, optionally, the
//! previous word, a [`BinaryDictionary`] walks its trie with a bounded
//! number of corrections, scores what it finds, boosts known continuations
//! of the previous word and hands the ranked words to a
//! [`SuggestionSink`](keydict_core::suggestion::SuggestionSink).
//!
//! # Architecture
//!
//! - [`buffer`] -- Assembling file regions, byte regions and readers into one buffer
//! - [`matcher`] -- Approximate trie walk with corrections, completions and skips
//! - [`scorer`] -- Score formula and the bounded ranked list
//! - [`bigram`] -- Previous-word reranking and next-word prediction
//! - [`session`] -- Reusable per-query scratch memory
//! - [`dictionary`] -- The [`Dictionary`] contract and the binary implementation
//! - [`user`] -- Editable dictionary rebuilt after each change
//! - [`set`] -- Several dictionaries merged into one result list

pub mod bigram;
pub mod buffer;
pub mod dictionary;
pub mod matcher;
pub mod options;
pub mod scorer;
pub mod session;
pub mod set;
pub mod user;

pub use buffer::{DictionaryBuffer, DictionarySource, LoadError};
pub use dictionary::{BinaryDictionary, Dictionary, DictionaryError};
pub use options::SuggestOptions;
pub use session::QuerySession;
pub use set::DictionarySet;
pub use user::UserDictionary;

pub use keydict_core::enums::{DataType, DictionaryState, DictionaryTypeId};
pub use keydict_core::input::{InputCandidates, KeyCandidates};
pub use keydict_core::suggestion::{NextLetterFrequencies, RankedSuggestion, SuggestionSink};
pub use keydict_trie::{DictionaryBuilder, TrieError};

// Bigram reranking and next-word prediction.
//
// The previous word's terminal node may carry a list of continuations. Each
// one names the terminal node of the next word, which is turned back into
// characters. A target that is not a stored word is a decode error, so
// nothing outside the dictionary can come out of here.

use keydict_core::character::{simple_lower, to_base_lower};
use keydict_core::enums::{DataType, MAX_WORD_LENGTH};
use keydict_core::suggestion::NextLetterFrequencies;
use keydict_trie::TrieError;
use keydict_trie::bigram::BigramIter;
use keydict_trie::lookup::{bigram_target_word, find_word};
use keydict_trie::node::NodeEntry;

use crate::scorer::RankedList;

/// Terminal node of `previous`, trying the word as given and then lowercased.
pub fn find_previous(data: &[u8], previous: &str) -> Result<Option<NodeEntry>, TrieError> {
    let mut buf = ['\0'; MAX_WORD_LENGTH];
    let mut len = 0;
    for c in previous.chars() {
        if len == MAX_WORD_LENGTH {
            return Ok(None);
        }
        buf[len] = c;
        len += 1;
    }
    if len == 0 {
        return Ok(None);
    }
    if let Some(node) = find_word(data, &buf[..len])? {
        return Ok(Some(node));
    }

    let mut changed = false;
    for c in &mut buf[..len] {
        let lower = simple_lower(*c);
        changed |= lower != *c;
        *c = lower;
    }
    if changed {
        find_word(data, &buf[..len])
    } else {
        Ok(None)
    }
}

/// Boost every listed word that follows `previous` and re-sort the list.
///
/// Membership never changes. Returns the number of boosted entries.
pub fn rerank(
    data: &[u8],
    previous: &NodeEntry,
    max_bigrams: usize,
    list: &mut RankedList,
    word: &mut [char; MAX_WORD_LENGTH],
) -> Result<usize, TrieError> {
    let Some(offset) = previous.bigrams else {
        return Ok(0);
    };
    let mut boosted = 0;
    for entry in BigramIter::new(data, offset).take(max_bigrams) {
        let entry = entry?;
        let len = bigram_target_word(data, entry.target, word)?;
        if list.boost(&word[..len], entry.frequency) {
            boosted += 1;
        }
    }
    if boosted > 0 {
        list.resort();
    }
    Ok(boosted)
}

/// Add the continuations of `previous` as bigram entries scored by their
/// pair frequency.
///
/// With `first`, only words whose first letter is one of those candidates
/// are kept. Each kept word counts its next letter: the one after the first
/// letter when filtered, otherwise the first letter itself.
pub fn predict(
    data: &[u8],
    previous: &NodeEntry,
    max_bigrams: usize,
    first: Option<&[char]>,
    list: &mut RankedList,
    word: &mut [char; MAX_WORD_LENGTH],
    next_letters: &mut NextLetterFrequencies,
) -> Result<usize, TrieError> {
    let Some(offset) = previous.bigrams else {
        return Ok(0);
    };
    let next_index = usize::from(first.is_some());
    let mut added = 0;
    for entry in BigramIter::new(data, offset).take(max_bigrams) {
        let entry = entry?;
        let len = bigram_target_word(data, entry.target, word)?;
        if let Some(codes) = first {
            let c = word[0];
            let folded = to_base_lower(c);
            if !codes.iter().any(|&k| k == c || k == folded) {
                continue;
            }
        }
        if len > next_index {
            next_letters.register(word[next_index]);
        }
        if list.insert(&word[..len], u64::from(entry.frequency), DataType::Bigram) {
            added += 1;
        }
    }
    Ok(added)
}

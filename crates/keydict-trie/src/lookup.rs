// Exact lookups: word to node and node offset back to word.

use keydict_core::enums::MAX_WORD_LENGTH;

use crate::TrieError;
use crate::format::ROOT_OFFSET;
use crate::node::{ChildIter, NodeEntry, decode_node, find_child};

/// Descend exactly along `word` and return the node of its last character.
///
/// The node may or may not be terminal. An empty buffer or an empty word
/// finds nothing.
pub fn find_node(data: &[u8], word: &[char]) -> Result<Option<NodeEntry>, TrieError> {
    if data.is_empty() || word.is_empty() {
        return Ok(None);
    }
    let mut group = ROOT_OFFSET;
    let last = word.len() - 1;
    for (i, &c) in word.iter().enumerate() {
        let Some(node) = find_child(data, group, c)? else {
            return Ok(None);
        };
        if i == last {
            return Ok(Some(node));
        }
        match node.children {
            Some(next) => group = next,
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// Terminal node for `word`, if the word is stored.
pub fn find_word(data: &[u8], word: &[char]) -> Result<Option<NodeEntry>, TrieError> {
    Ok(find_node(data, word)?.filter(|n| n.terminal))
}

/// Whether `word` is stored with a nonzero frequency.
pub fn is_valid_word(data: &[u8], word: &[char]) -> Result<bool, TrieError> {
    Ok(find_word(data, word)?.is_some_and(|n| n.frequency > 0))
}

/// Resolve a node offset back to the characters leading to it.
///
/// Writes the word into `out` and returns its length, or `None` when no node
/// starts at `target`. Relies on the pre-order layout: the subtree holding
/// `target` is the one under the last sibling whose child group does not
/// start after it.
pub fn word_at(data: &[u8], target: usize, out: &mut [char; MAX_WORD_LENGTH]) -> Result<Option<usize>, TrieError> {
    if data.is_empty() || target < ROOT_OFFSET {
        return Ok(None);
    }
    let mut group = ROOT_OFFSET;
    for depth in 0..MAX_WORD_LENGTH {
        let mut descend: Option<(char, usize)> = None;
        for node in ChildIter::new(data, group)? {
            let node = node?;
            if node.offset == target {
                out[depth] = node.ch;
                return Ok(Some(depth + 1));
            }
            if let Some(child) = node.children {
                if child <= target {
                    descend = Some((node.ch, child));
                }
            }
        }
        match descend {
            Some((ch, child)) => {
                out[depth] = ch;
                group = child;
            }
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// Word named by a bigram target.
///
/// The target must be the terminal node of a stored word. Anything else is a
/// corrupt buffer.
pub fn bigram_target_word(data: &[u8], target: usize, out: &mut [char; MAX_WORD_LENGTH]) -> Result<usize, TrieError> {
    let invalid = TrieError::InvalidBigramTarget { offset: target };
    let Some(len) = word_at(data, target, out)? else {
        return Err(invalid);
    };
    if decode_node(data, target)?.terminal {
        Ok(len)
    } else {
        Err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DictionaryBuilder;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn sample() -> Vec<u8> {
        let mut b = DictionaryBuilder::new();
        for (w, f) in [("cat", 200), ("cats", 50), ("car", 120), ("bat", 180), ("don't", 90)] {
            b.add_word(w, f).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn finds_stored_words() {
        let data = sample();
        assert_eq!(find_word(&data, &chars("cat")).unwrap().unwrap().frequency, 200);
        assert_eq!(find_word(&data, &chars("cats")).unwrap().unwrap().frequency, 50);
        assert!(is_valid_word(&data, &chars("don't")).unwrap());
    }

    #[test]
    fn prefixes_are_not_words() {
        let data = sample();
        assert!(find_node(&data, &chars("ca")).unwrap().is_some());
        assert!(find_word(&data, &chars("ca")).unwrap().is_none());
        assert!(!is_valid_word(&data, &chars("ca")).unwrap());
        assert!(!is_valid_word(&data, &chars("catsup")).unwrap());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let data = sample();
        assert!(!is_valid_word(&data, &chars("Cat")).unwrap());
    }

    #[test]
    fn empty_inputs_find_nothing() {
        assert!(find_node(&[], &chars("a")).unwrap().is_none());
        assert!(find_node(&sample(), &[]).unwrap().is_none());
    }

    #[test]
    fn word_at_resolves_every_terminal() {
        let data = sample();
        let mut out = ['\0'; MAX_WORD_LENGTH];
        for w in ["cat", "cats", "car", "bat", "don't"] {
            let node = find_word(&data, &chars(w)).unwrap().unwrap();
            let len = word_at(&data, node.offset, &mut out).unwrap().unwrap();
            assert_eq!(out[..len].iter().collect::<String>(), w);
        }
    }

    #[test]
    fn word_at_rejects_offsets_without_node() {
        let data = sample();
        let mut out = ['\0'; MAX_WORD_LENGTH];
        assert_eq!(word_at(&data, 0, &mut out).unwrap(), None);
        let cat = find_word(&data, &chars("cat")).unwrap().unwrap();
        // one byte into the node is not a node start
        assert_eq!(word_at(&data, cat.offset + 1, &mut out).unwrap(), None);
    }

    #[test]
    fn bigram_targets_must_be_stored_words() {
        let data = sample();
        let mut out = ['\0'; MAX_WORD_LENGTH];
        let cats = find_word(&data, &chars("cats")).unwrap().unwrap();
        let len = bigram_target_word(&data, cats.offset, &mut out).unwrap();
        assert_eq!(out[..len].iter().collect::<String>(), "cats");

        let ca = find_node(&data, &chars("ca")).unwrap().unwrap();
        assert_eq!(
            bigram_target_word(&data, ca.offset, &mut out),
            Err(TrieError::InvalidBigramTarget { offset: ca.offset })
        );
        assert_eq!(
            bigram_target_word(&data, ca.offset + 1, &mut out),
            Err(TrieError::InvalidBigramTarget { offset: ca.offset + 1 })
        );
    }
}

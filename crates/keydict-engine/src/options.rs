// Per-dictionary query configuration.

use keydict_core::enums::{MAX_BIGRAMS, MAX_WORDS};

use crate::matcher::MatchPolicy;
use crate::scorer::ScoringParams;

/// Knobs applied to every query of one dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Capacity of the ranked list handed to the sink.
    pub max_words: usize,
    /// Bigram entries scanned per previous word.
    pub max_bigrams: usize,
    pub policy: MatchPolicy,
    pub scoring: ScoringParams,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            max_words: MAX_WORDS,
            max_bigrams: MAX_BIGRAMS,
            policy: MatchPolicy::default(),
            scoring: ScoringParams::default(),
        }
    }
}

impl SuggestOptions {
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn with_max_bigrams(mut self, max_bigrams: usize) -> Self {
        self.max_bigrams = max_bigrams;
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringParams) -> Self {
        self.scoring = scoring;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_limits() {
        let o = SuggestOptions::default();
        assert_eq!(o.max_words, 18);
        assert_eq!(o.max_bigrams, 60);
        assert_eq!(o.scoring.typed_letter_multiplier, 2);
        assert!(o.policy.allow_completions);
    }

    #[test]
    fn builder_methods_override() {
        let o = SuggestOptions::default().with_max_words(5).with_max_bigrams(0);
        assert_eq!(o.max_words, 5);
        assert_eq!(o.max_bigrams, 0);
    }
}

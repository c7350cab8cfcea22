//! End-to-end behaviour of the suggestion engine on small built dictionaries.
//!
//! Run: cargo test -p keydict-engine --test properties

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use keydict_engine::matcher::MatchPolicy;
use keydict_engine::scorer::ScoringParams;
use keydict_engine::{
    BinaryDictionary, DataType, Dictionary, DictionaryBuilder, DictionarySet, DictionarySource, DictionaryState,
    DictionaryTypeId, InputCandidates, NextLetterFrequencies, QuerySession, RankedSuggestion, SuggestOptions,
    UserDictionary,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build(words: &[(&str, u8)], bigrams: &[(&str, &str, u8)]) -> Vec<u8> {
    let mut b = DictionaryBuilder::new();
    for &(w, f) in words {
        b.add_word(w, f).unwrap();
    }
    for &(p, n, f) in bigrams {
        b.add_bigram(p, n, f).unwrap();
    }
    b.build().unwrap()
}

fn cat_bat_the() -> BinaryDictionary {
    let data = build(&[("cat", 200), ("bat", 180), ("the", 250)], &[("the", "cat", 127)]);
    BinaryDictionary::from_bytes(data, DictionaryTypeId::MAIN)
}

fn suggest(dict: &dyn Dictionary, input: &InputCandidates, prev: Option<&str>) -> Vec<RankedSuggestion> {
    let mut out = Vec::new();
    dict.get_suggestions(input, prev, &mut out, None);
    out
}

fn words(out: &[RankedSuggestion]) -> Vec<&str> {
    out.iter().map(|s| s.word.as_str()).collect()
}

fn score_of(out: &[RankedSuggestion], word: &str) -> Option<u64> {
    out.iter().find(|s| s.word == word).map(|s| s.score)
}

fn positions(spec: &[&str]) -> InputCandidates {
    let sets: Vec<Vec<char>> = spec.iter().map(|s| s.chars().collect()).collect();
    InputCandidates::from_positions(&sets).unwrap()
}

// ---------------------------------------------------------------------------
// Matching and scoring
// ---------------------------------------------------------------------------

#[test]
fn exact_input_scores_at_zero_cost() {
    let dict = cat_bat_the();
    let out = suggest(&dict, &InputCandidates::from_word("cat").unwrap(), None);
    let scoring = ScoringParams::default();
    assert_eq!(score_of(&out, "cat"), Some(scoring.score(200, 3, 0, true)));
    assert_eq!(out[0].word, "cat");
}

#[test]
fn over_long_input_yields_nothing() {
    let long = "a".repeat(48);
    let dict = BinaryDictionary::from_bytes(build(&[(&long[..47], 10), ("a", 5)], &[]), DictionaryTypeId::MAIN);
    let input = InputCandidates::from_word(&long).unwrap();
    assert!(suggest(&dict, &input, None).is_empty());

    // 47 keys is still accepted
    let input = InputCandidates::from_word(&long[..47]).unwrap();
    assert_eq!(suggest(&dict, &input, None)[0].word.len(), 47);
}

#[test]
fn validity_is_exact_not_prefix() {
    let dict = BinaryDictionary::from_bytes(build(&[("hello", 100), ("help", 90)], &[]), DictionaryTypeId::MAIN);
    assert!(dict.is_valid_word("hello"));
    assert!(dict.is_valid_word("help"));
    assert!(!dict.is_valid_word("hel"));
    assert!(!dict.is_valid_word("helper"));
    assert!(!dict.is_valid_word("Hello"));
}

#[test]
fn one_substitution_lowers_the_score() {
    let dict = cat_bat_the();
    let exact = suggest(&dict, &InputCandidates::from_word("cat").unwrap(), None);
    let fuzzy = suggest(&dict, &positions(&["xc", "a", "t"]), None);
    let exact_score = score_of(&exact, "cat").unwrap();
    let fuzzy_score = score_of(&fuzzy, "cat").unwrap();
    assert!(fuzzy_score < exact_score);
}

#[test]
fn cat_ranks_above_bat_when_typed() {
    let dict = cat_bat_the();
    let out = suggest(&dict, &positions(&["cb", "a", "t"]), Some("the"));
    let w = words(&out);
    let cat = w.iter().position(|&x| x == "cat").unwrap();
    let bat = w.iter().position(|&x| x == "bat").unwrap();
    assert!(cat < bat);
}

#[test]
fn bigram_lifts_cat_over_a_closer_bat() {
    let dict = cat_bat_the();
    let input = positions(&["bc", "a", "t"]);

    let plain = suggest(&dict, &input, None);
    assert_eq!(words(&plain)[..2], ["bat", "cat"]);

    let boosted = suggest(&dict, &input, Some("the"));
    assert_eq!(words(&boosted)[..2], ["cat", "bat"]);
    assert_eq!(score_of(&boosted, "cat"), Some(3200));
    assert_eq!(score_of(&boosted, "bat"), score_of(&plain, "bat"));
}

#[test]
fn bigram_boost_never_adds_words() {
    let data = build(
        &[("the", 250), ("cat", 200), ("car", 100), ("dog", 90)],
        &[("the", "dog", 127), ("the", "cat", 50)],
    );
    let dict = BinaryDictionary::from_bytes(data, DictionaryTypeId::MAIN);
    let input = InputCandidates::from_word("ca").unwrap();
    let plain = suggest(&dict, &input, None);
    let boosted = suggest(&dict, &input, Some("the"));
    let mut a = words(&plain);
    let mut b = words(&boosted);
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
    assert!(!b.contains(&"dog"));
}

#[test]
fn results_arrive_in_descending_order() {
    let data = build(
        &[("tap", 40), ("tape", 90), ("taper", 20), ("tar", 60), ("top", 200), ("tip", 150)],
        &[],
    );
    let dict = BinaryDictionary::from_bytes(data, DictionaryTypeId::MAIN);
    let out = suggest(&dict, &positions(&["t", "ao", "p"]), None);
    assert!(out.len() >= 3);
    assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn previous_word_alone_predicts() {
    let dict = cat_bat_the();
    let out = suggest(&dict, &InputCandidates::new(), Some("The"));
    assert_eq!(words(&out), ["cat"]);
    assert_eq!(out[0].data_type, DataType::Bigram);
    assert_eq!(out[0].score, 127);

    let mut out = Vec::new();
    let mut next = NextLetterFrequencies::new();
    dict.get_bigram_suggestions("the", &mut out, Some(&mut next));
    assert_eq!(next.get('c'), 1);
}

#[test]
fn apostrophes_are_transparent() {
    let dict = BinaryDictionary::from_bytes(build(&[("don't", 120), ("done", 80)], &[]), DictionaryTypeId::MAIN);
    let out = suggest(&dict, &InputCandidates::from_word("dont").unwrap(), None);
    assert_eq!(out[0].word, "don't");
}

#[test]
fn missing_keystroke_is_recovered_by_skip() {
    let dict = BinaryDictionary::from_bytes(build(&[("keyboard", 150)], &[]), DictionaryTypeId::MAIN);
    let out = suggest(&dict, &InputCandidates::from_word("keybard").unwrap(), None);
    assert!(words(&out).contains(&"keyboard"));

    let strict = BinaryDictionary::from_bytes(build(&[("keyboard", 150)], &[]), DictionaryTypeId::MAIN).with_options(
        SuggestOptions::default().with_policy(MatchPolicy {
            allow_skips: false,
            ..MatchPolicy::default()
        }),
    );
    assert!(suggest(&strict, &InputCandidates::from_word("keybard").unwrap(), None).is_empty());
}

#[test]
fn session_is_reusable_across_dictionaries() {
    let a = cat_bat_the();
    let b = BinaryDictionary::from_bytes(build(&[("cab", 70)], &[]), DictionaryTypeId::CONTACTS);
    let mut session = QuerySession::new();
    a.suggest(&mut session, &InputCandidates::from_word("ca").unwrap(), None)
        .unwrap();
    assert!(session.to_suggestions(DictionaryTypeId::MAIN).iter().any(|s| s.word == "cat"));
    b.suggest(&mut session, &InputCandidates::from_word("ca").unwrap(), None)
        .unwrap();
    let owned = session.to_suggestions(DictionaryTypeId::CONTACTS);
    assert_eq!(words(&owned), ["cab"]);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn close_then_query_is_empty() {
    let dict = cat_bat_the();
    assert!(dict.size() > 0);
    dict.close();
    assert_eq!(dict.size(), 0);
    assert!(suggest(&dict, &InputCandidates::from_word("cat").unwrap(), None).is_empty());
    assert!(!dict.is_valid_word("cat"));
    dict.close();
    assert_eq!(dict.state(), DictionaryState::Closed);
}

#[test]
fn empty_buffer_is_ready_and_silent() {
    let dict = BinaryDictionary::from_bytes(Vec::new(), DictionaryTypeId::MAIN);
    assert_eq!(dict.state(), DictionaryState::Ready);
    assert_eq!(dict.size(), 0);
    assert!(suggest(&dict, &InputCandidates::from_word("cat").unwrap(), Some("the")).is_empty());
}

#[test]
fn corrupt_buffer_answers_nothing() {
    let mut data = build(&[("cat", 200), ("car", 100)], &[]);
    data[4] = 99;
    let dict = BinaryDictionary::from_bytes(data, DictionaryTypeId::MAIN);
    assert!(dict.is_corrupt());
    assert!(suggest(&dict, &InputCandidates::from_word("ca").unwrap(), None).is_empty());
    assert!(!dict.is_valid_word("cat"));
}

#[test]
fn bigram_pointing_at_a_prefix_disables_the_dictionary() {
    let mut data = build(&[("the", 250), ("cat", 200), ("catalog", 90)], &[("the", "catalog", 100)]);
    let chars = |s: &str| s.chars().collect::<Vec<char>>();
    let the = keydict_trie::lookup::find_word(&data, &chars("the")).unwrap().unwrap();
    let cata = keydict_trie::lookup::find_node(&data, &chars("cata")).unwrap().unwrap();
    let list = the.bigrams.unwrap();
    let target = (cata.offset as u32).to_le_bytes();
    data[list + 1..list + 4].copy_from_slice(&target[..3]);

    let dict = BinaryDictionary::from_bytes(data, DictionaryTypeId::MAIN);
    assert!(!dict.is_corrupt());
    let mut out = Vec::new();
    dict.get_bigram_suggestions("the", &mut out, None);
    assert!(out.is_empty());
    assert!(dict.is_corrupt());
    assert!(!dict.is_valid_word("cata"));
    assert!(suggest(&dict, &InputCandidates::from_word("cat").unwrap(), None).is_empty());
}

#[test]
fn file_sources_are_mapped_and_concatenated() {
    let data = build(&[("river", 90), ("rivet", 40)], &[]);
    let (head, tail) = data.split_at(data.len() / 2);

    let mut whole = tempfile::NamedTempFile::new().unwrap();
    whole.write_all(&data).unwrap();
    let dict = BinaryDictionary::open(vec![DictionarySource::file(whole.path())], DictionaryTypeId::MAIN);
    assert_eq!(dict.size(), data.len());
    assert!(dict.is_valid_word("rivet"));

    let mut padded = tempfile::NamedTempFile::new().unwrap();
    padded.write_all(b"junk").unwrap();
    padded.write_all(head).unwrap();
    let dict = BinaryDictionary::open(
        vec![
            DictionarySource::file_range(padded.path(), 4, head.len() as u64),
            DictionarySource::Bytes(tail.to_vec()),
        ],
        DictionaryTypeId::MAIN,
    );
    assert_eq!(dict.state(), DictionaryState::Ready);
    assert!(dict.is_valid_word("river"));
}

// ---------------------------------------------------------------------------
// User dictionary and sets
// ---------------------------------------------------------------------------

#[test]
fn user_words_merge_with_main() {
    let main: Arc<dyn Dictionary> = Arc::new(cat_bat_the());
    let user = Arc::new(UserDictionary::new(DictionaryTypeId::USER));
    user.add_word("catnip", 255).unwrap();

    let mut set = DictionarySet::new();
    set.push(main);
    set.push(user.clone());

    let out = set.suggestions(&InputCandidates::from_word("cat").unwrap(), None);
    assert!(words(&out).contains(&"catnip"));
    assert!(words(&out).contains(&"cat"));
    assert!(set.is_valid_word("catnip"));

    user.remove_word("catnip").unwrap();
    assert!(!set.is_valid_word("catnip"));

    set.close();
    assert_eq!(set.size(), 0);
}

#[test]
fn concurrent_queries_share_one_dictionary() {
    let dict = Arc::new(cat_bat_the());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dict = Arc::clone(&dict);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let out = suggest(&*dict, &positions(&["cb", "a", "t"]), None);
                    assert_eq!(out[0].word, "cat");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn close_races_in_flight_queries() {
    let dict = Arc::new(cat_bat_the());
    let served = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dict = Arc::clone(&dict);
            let served = Arc::clone(&served);
            std::thread::spawn(move || {
                let input = positions(&["cb", "a", "t"]);
                for _ in 0..2000 {
                    let out = suggest(&*dict, &input, Some("the"));
                    if let Some(first) = out.first() {
                        assert_eq!(first.word, "cat");
                    }
                    served.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    while served.load(Ordering::Relaxed) < 100 && !handles.iter().all(|h| h.is_finished()) {
        std::thread::yield_now();
    }
    dict.close();
    dict.close();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(dict.state(), DictionaryState::Closed);
    assert_eq!(dict.size(), 0);
    assert!(suggest(&*dict, &positions(&["cb", "a", "t"]), Some("the")).is_empty());
    let mut out = Vec::new();
    dict.get_bigram_suggestions("the", &mut out, None);
    assert!(out.is_empty());
}

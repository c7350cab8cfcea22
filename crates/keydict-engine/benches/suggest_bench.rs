// Criterion benchmarks for keydict-engine.
//
// Uses KEYDICT_PATH when it points at a compiled dictionary; otherwise a
// synthetic dictionary of generated words is built in memory.
//
// Run:
//   cargo bench -p keydict-engine
//   KEYDICT_PATH=/path/to/main.dict cargo bench -p keydict-engine

use criterion::{Criterion, criterion_group, criterion_main};
use keydict_engine::{
    BinaryDictionary, Dictionary, DictionaryBuilder, DictionarySource, DictionaryTypeId, InputCandidates,
    QuerySession, RankedSuggestion,
};

// ---------------------------------------------------------------------------
// Dictionary setup
// ---------------------------------------------------------------------------

const SYLLABLES: [&str; 16] = [
    "ka", "to", "ri", "ne", "sa", "lo", "mi", "du", "pe", "ta", "ko", "ra", "li", "se", "no", "ma",
];

fn synthetic() -> Vec<u8> {
    let mut b = DictionaryBuilder::new();
    for (i, a) in SYLLABLES.iter().enumerate() {
        for (j, c) in SYLLABLES.iter().enumerate() {
            for (k, d) in SYLLABLES.iter().enumerate() {
                let word = format!("{a}{c}{d}");
                let freq = ((i * 31 + j * 7 + k) % 254 + 1) as u8;
                b.add_word(&word, freq).expect("add_word");
            }
        }
    }
    b.add_word("the", 255).expect("add_word");
    for (n, s) in SYLLABLES.iter().enumerate() {
        let next = format!("{s}{s}{s}");
        b.add_bigram("the", &next, (n * 8 + 1) as u8).expect("add_bigram");
    }
    b.build().expect("build")
}

fn open_dictionary() -> BinaryDictionary {
    if let Ok(path) = std::env::var("KEYDICT_PATH") {
        let dict = BinaryDictionary::open(vec![DictionarySource::file(&path)], DictionaryTypeId::MAIN);
        if dict.size() > 0 {
            return dict;
        }
        eprintln!("[suggest_bench] {path} could not be loaded, using synthetic dictionary");
    }
    BinaryDictionary::from_bytes(synthetic(), DictionaryTypeId::MAIN)
}

/// Each typed key also offers its two keyboard-row neighbours.
fn noisy(word: &str) -> InputCandidates {
    const ROW: &str = "qwertyuiopasdfghjklzxcvbnm";
    let row: Vec<char> = ROW.chars().collect();
    let mut input = InputCandidates::new();
    for c in word.chars() {
        let mut keys = vec![c];
        if let Some(i) = row.iter().position(|&r| r == c) {
            if i > 0 {
                keys.push(row[i - 1]);
            }
            if i + 1 < row.len() {
                keys.push(row[i + 1]);
            }
        }
        input.push(&keys).expect("push");
    }
    input
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_exact(c: &mut Criterion) {
    let dict = open_dictionary();
    let inputs: Vec<InputCandidates> = ["kato", "rineso", "mi", "dupeta"]
        .iter()
        .map(|w| InputCandidates::from_word(w).expect("input"))
        .collect();
    let mut session = QuerySession::new();

    c.bench_function("suggest_exact_4_inputs", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = dict.suggest(&mut session, input, None);
                std::hint::black_box(session.results());
            }
        });
    });
}

fn bench_proximity(c: &mut Criterion) {
    let dict = open_dictionary();
    let inputs: Vec<InputCandidates> = ["katori", "losami", "neta"].iter().map(|w| noisy(w)).collect();
    let mut session = QuerySession::new();

    c.bench_function("suggest_proximity_3_inputs", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = dict.suggest(&mut session, input, Some("the"));
                std::hint::black_box(session.results());
            }
        });
    });
}

fn bench_skip_passes(c: &mut Criterion) {
    let dict = open_dictionary();
    // one dropped keystroke each, so the normal pass finds little
    let inputs: Vec<InputCandidates> = ["ktori", "rinso", "dupta"]
        .iter()
        .map(|w| InputCandidates::from_word(w).expect("input"))
        .collect();
    let mut session = QuerySession::new();

    c.bench_function("suggest_skip_3_inputs", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = dict.suggest(&mut session, input, None);
                std::hint::black_box(session.results());
            }
        });
    });
}

fn bench_prediction(c: &mut Criterion) {
    let dict = open_dictionary();

    c.bench_function("bigram_predict", |b| {
        b.iter(|| {
            let mut out: Vec<RankedSuggestion> = Vec::new();
            dict.get_bigram_suggestions("the", &mut out, None);
            std::hint::black_box(out);
        });
    });
}

criterion_group!(benches, bench_exact, bench_proximity, bench_skip_passes, bench_prediction);
criterion_main!(benches);

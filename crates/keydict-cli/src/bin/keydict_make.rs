// keydict-make: Compile word and bigram lists into a binary dictionary.
//
// WORDLIST holds `word<TAB>frequency` lines (frequency 1..=255, default 1).
// BIGRAMS holds `previous<TAB>next<TAB>frequency` lines (frequency 0..=127);
// both words of every pair must appear in WORDLIST.
//
// Usage:
//   keydict-make -o OUT WORDLIST [BIGRAMS]
//
// Options:
//   -o, --output PATH   Output dictionary file
//   -h, --help          Print help

use std::fs::File;
use std::io::BufReader;

use keydict_trie::DictionaryBuilder;

fn main() {
    keydict_cli::init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if keydict_cli::wants_help(&args) || args.is_empty() {
        println!("keydict-make: Compile word and bigram lists into a binary dictionary.");
        println!();
        println!("Usage: keydict-make -o OUT WORDLIST [BIGRAMS]");
        println!();
        println!("WORDLIST: word<TAB>frequency lines (frequency 1..=255)");
        println!("BIGRAMS:  previous<TAB>next<TAB>frequency lines (frequency 0..=127)");
        println!();
        println!("Options:");
        println!("  -o, --output PATH   Output dictionary file");
        println!("  -h, --help          Print this help");
        return;
    }

    let mut output: Option<String> = None;
    let mut files: Vec<String> = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix("--output=") {
            output = Some(val.to_string());
        } else if arg == "-o" || arg == "--output" {
            if i + 1 < args.len() {
                output = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                keydict_cli::fatal("--output requires a value");
            }
        } else if !arg.starts_with('-') {
            files.push(arg.clone());
        }
    }

    let output = output.unwrap_or_else(|| keydict_cli::fatal("missing -o OUT"));
    let (wordlist, bigrams) = match files.as_slice() {
        [w] => (w, None),
        [w, b] => (w, Some(b)),
        _ => keydict_cli::fatal("expected WORDLIST and an optional BIGRAMS file"),
    };

    let mut builder = DictionaryBuilder::new();
    let open = |path: &str| {
        File::open(path)
            .map(BufReader::new)
            .unwrap_or_else(|e| keydict_cli::fatal(&format!("failed to open {path}: {e}")))
    };

    let words = keydict_cli::read_wordlist(open(wordlist.as_str()), &mut builder)
        .unwrap_or_else(|e| keydict_cli::fatal(&format!("{wordlist}: {e}")));
    let pairs = match bigrams {
        Some(path) => keydict_cli::read_bigrams(open(path.as_str()), &mut builder)
            .unwrap_or_else(|e| keydict_cli::fatal(&format!("{path}: {e}"))),
        None => 0,
    };

    let bytes = builder
        .build()
        .unwrap_or_else(|e| keydict_cli::fatal(&format!("build failed: {e}")));
    std::fs::write(&output, &bytes).unwrap_or_else(|e| keydict_cli::fatal(&format!("failed to write {output}: {e}")));

    tracing::info!(words, pairs, size = bytes.len(), "dictionary written");
    eprintln!("{output}: {words} words, {pairs} bigrams, {} bytes", bytes.len());
}

// keydict-valid: Check whether words are stored in a dictionary.
//
// Prints one line per word:
//   C: word    (stored)
//   W: word    (not stored)
//
// Usage:
//   keydict-valid [-d DICT_PATH] [WORD...]
//
// Options:
//   -d, --dict-path PATH   Dictionary file (or directory with main.dict)
//   -h, --help             Print help

use std::io::{self, BufRead, Write};

use keydict_engine::Dictionary;

fn main() {
    keydict_cli::init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (dict_path, args) = keydict_cli::parse_dict_path(&args);

    if keydict_cli::wants_help(&args) {
        println!("keydict-valid: Check whether words are stored in a dictionary.");
        println!();
        println!("Usage: keydict-valid [-d DICT_PATH] [WORD...]");
        println!();
        println!("If no WORD is given, reads words from stdin (one per line). Prints:");
        println!("  C: word    (stored)");
        println!("  W: word    (not stored)");
        println!();
        println!("Options:");
        println!("  -d, --dict-path PATH   Dictionary file (or directory with main.dict)");
        println!("  -h, --help             Print this help");
        return;
    }

    let dict =
        keydict_cli::load_dictionary(dict_path.as_deref()).unwrap_or_else(|e| keydict_cli::fatal(&e));

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut check = |word: &str| {
        let tag = if dict.is_valid_word(word) { 'C' } else { 'W' };
        let _ = writeln!(out, "{tag}: {word}");
    };

    let words: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
    if words.is_empty() {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("error reading stdin: {e}");
                    break;
                }
            };
            let word = line.trim();
            if !word.is_empty() {
                check(word);
            }
        }
    } else {
        for word in words {
            check(word.as_str());
        }
    }
}

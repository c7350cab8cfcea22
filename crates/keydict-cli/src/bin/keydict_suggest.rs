// keydict-suggest: Rank keyboard suggestions for typed input.
//
// Each INPUT is either a word (one exact key per letter) or `/`-separated
// candidate sets such as `cb/a/t`, primary key first. With -p and no input,
// prints next-word predictions for the previous word.
//
// Usage:
//   keydict-suggest [-d DICT_PATH] [OPTIONS] [INPUT...]
//
// Options:
//   -d, --dict-path PATH   Dictionary file (or directory with main.dict)
//   -p, --previous WORD    Previous word for bigram boosting and prediction
//   -n, --max-words N      Maximum number of suggestions (default: 18)
//   --json                 Print suggestions as JSON lines
//   -h, --help             Print help

use std::io::{self, BufRead, Write};

use keydict_engine::{BinaryDictionary, Dictionary, RankedSuggestion, SuggestOptions};

fn main() {
    keydict_cli::init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (dict_path, args) = keydict_cli::parse_dict_path(&args);

    if keydict_cli::wants_help(&args) {
        println!("keydict-suggest: Rank keyboard suggestions for typed input.");
        println!();
        println!("Usage: keydict-suggest [-d DICT_PATH] [OPTIONS] [INPUT...]");
        println!();
        println!("INPUT is a word or per-position candidates such as cb/a/t.");
        println!("If no INPUT is given, reads inputs from stdin (one per line).");
        println!("With -p and no INPUT, prints predictions for the previous word.");
        println!();
        println!("Options:");
        println!("  -d, --dict-path PATH   Dictionary file (or directory with main.dict)");
        println!("  -p, --previous WORD    Previous word");
        println!("  -n, --max-words N      Maximum number of suggestions (default: 18)");
        println!("  --json                 Print suggestions as JSON lines");
        println!("  -h, --help             Print this help");
        return;
    }

    let mut previous: Option<String> = None;
    let mut max_words: Option<usize> = None;
    let mut json = false;
    let mut inputs: Vec<String> = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "-p" || arg == "--previous" {
            if i + 1 < args.len() {
                previous = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                keydict_cli::fatal("--previous requires a value");
            }
        } else if arg == "-n" || arg == "--max-words" {
            if i + 1 < args.len() {
                max_words = Some(
                    args[i + 1]
                        .parse()
                        .unwrap_or_else(|_| keydict_cli::fatal("invalid number for --max-words")),
                );
                skip_next = true;
            } else {
                keydict_cli::fatal("--max-words requires a value");
            }
        } else if arg == "--json" {
            json = true;
        } else if !arg.starts_with('-') {
            inputs.push(arg.clone());
        }
    }

    let mut dict =
        keydict_cli::load_dictionary(dict_path.as_deref()).unwrap_or_else(|e| keydict_cli::fatal(&e));
    if let Some(n) = max_words {
        dict.set_options(SuggestOptions::default().with_max_words(n));
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let prev = previous.as_deref();

    if inputs.is_empty() {
        if let Some(prev) = prev {
            let mut found: Vec<RankedSuggestion> = Vec::new();
            dict.get_bigram_suggestions(prev, &mut found, None);
            print_suggestions(&mut out, prev, &found, json);
            return;
        }
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("error reading stdin: {e}");
                    break;
                }
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            suggest_one(&dict, input, prev, json, &mut out);
        }
    } else {
        for input in &inputs {
            suggest_one(&dict, input, prev, json, &mut out);
        }
    }
}

fn suggest_one(dict: &BinaryDictionary, text: &str, prev: Option<&str>, json: bool, out: &mut impl Write) {
    let input = match keydict_cli::parse_input(text) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: {e}");
            return;
        }
    };
    let mut found: Vec<RankedSuggestion> = Vec::new();
    dict.get_suggestions(&input, prev, &mut found, None);
    print_suggestions(out, text, &found, json);
}

fn print_suggestions(out: &mut impl Write, label: &str, found: &[RankedSuggestion], json: bool) {
    if json {
        for s in found {
            match serde_json::to_string(s) {
                Ok(line) => {
                    let _ = writeln!(out, "{line}");
                }
                Err(e) => eprintln!("error: {e}"),
            }
        }
        return;
    }
    if found.is_empty() {
        let _ = writeln!(out, "{label}: (no suggestions)");
        return;
    }
    let _ = writeln!(out, "{label}:");
    for s in found {
        let _ = writeln!(out, "  {}\t{}\t{:?}", s.word, s.score, s.data_type);
    }
}

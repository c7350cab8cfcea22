// keydict-cli: shared utilities for CLI tools.

use std::io::BufRead;
use std::path::PathBuf;
use std::process;

use keydict_core::input::InputCandidates;
use keydict_engine::{BinaryDictionary, DictionarySource, DictionaryTypeId};
use keydict_trie::DictionaryBuilder;
use tracing_subscriber::EnvFilter;

/// Dictionary file name looked up in the default locations.
const DICT_FILE: &str = "main.dict";

/// Environment variable holding the log filter.
const LOG_ENV: &str = "KEYDICT_LOG";

/// Install a stderr subscriber filtered by `KEYDICT_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Find a dictionary file and open it.
///
/// Search order:
/// 1. `dict_path` argument (if provided)
/// 2. `KEYDICT_PATH` environment variable
/// 3. `~/.keydict/main.dict`
/// 4. `main.dict` in the current directory
pub fn load_dictionary(dict_path: Option<&str>) -> Result<BinaryDictionary, String> {
    let search_paths = build_search_paths(dict_path);

    for path in &search_paths {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "opening dictionary");
            return BinaryDictionary::try_open(vec![DictionarySource::file(path)], DictionaryTypeId::MAIN)
                .map_err(|e| format!("failed to open {}: {e}", path.display()));
        }
    }

    Err(format!(
        "could not find a dictionary in any of the search paths:\n{}",
        search_paths
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n")
    ))
}

/// Build the list of files to try, in order.
fn build_search_paths(dict_path: Option<&str>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = dict_path {
        let p = PathBuf::from(p);
        // a directory means "the dictionary inside it"
        if p.is_dir() {
            paths.push(p.join(DICT_FILE));
        } else {
            paths.push(p);
        }
    }

    if let Ok(env_path) = std::env::var("KEYDICT_PATH") {
        let p = PathBuf::from(env_path);
        if p.is_dir() {
            paths.push(p.join(DICT_FILE));
        } else {
            paths.push(p);
        }
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(".keydict").join(DICT_FILE));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(DICT_FILE));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Parse a `--dict-path=PATH` or `-d PATH` argument from command line args.
///
/// Returns `(dict_path, remaining_args)`.
pub fn parse_dict_path(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut dict_path = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix("--dict-path=") {
            dict_path = Some(val.to_string());
        } else if arg == "--dict-path" || arg == "-d" {
            if i + 1 < args.len() {
                dict_path = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                fatal(&format!("{arg} requires a value"));
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (dict_path, remaining)
}

/// Parse typed input: a plain word is one exact key per letter, and
/// `cb/a/t` gives the candidates of each position, primary first.
pub fn parse_input(text: &str) -> Result<InputCandidates, String> {
    if !text.contains('/') {
        return InputCandidates::from_word(text).map_err(|e| format!("{text}: {e}"));
    }
    let positions: Vec<Vec<char>> = text.split('/').map(|p| p.chars().collect()).collect();
    InputCandidates::from_positions(&positions).map_err(|e| format!("{text}: {e}"))
}

/// Read `word<TAB>frequency` lines into `builder`.
///
/// Blank lines and lines starting with `#` are skipped. A missing frequency
/// counts as 1. Returns the number of words read.
pub fn read_wordlist(reader: impl BufRead, builder: &mut DictionaryBuilder) -> Result<usize, String> {
    let mut count = 0;
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("line {}: {e}", n + 1))?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        let word = fields.next().unwrap_or_default();
        let frequency = match fields.next() {
            Some(f) => parse_frequency(f).map_err(|e| format!("line {}: {e}", n + 1))?,
            None => 1,
        };
        builder
            .add_word(word, frequency)
            .map_err(|e| format!("line {}: {e}", n + 1))?;
        count += 1;
    }
    Ok(count)
}

/// Read `previous<TAB>next<TAB>frequency` lines into `builder`.
pub fn read_bigrams(reader: impl BufRead, builder: &mut DictionaryBuilder) -> Result<usize, String> {
    let mut count = 0;
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("line {}: {e}", n + 1))?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let [previous, next, frequency] = fields[..] else {
            return Err(format!("line {}: expected previous<TAB>next<TAB>frequency", n + 1));
        };
        let frequency = parse_frequency(frequency).map_err(|e| format!("line {}: {e}", n + 1))?;
        builder
            .add_bigram(previous, next, frequency)
            .map_err(|e| format!("line {}: {e}", n + 1))?;
        count += 1;
    }
    Ok(count)
}

fn parse_frequency(field: &str) -> Result<u8, String> {
    field
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("invalid frequency {field:?}"))
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

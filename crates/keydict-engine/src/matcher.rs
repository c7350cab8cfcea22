// Approximate matcher: depth-first walk of the trie against key candidates.
//
// The walk keeps one frame per trie depth. A frame remembers where the next
// sibling of its group starts and the typing state on entry to the group, so
// the stack never grows past the maximum word length and nothing is allocated
// per node.
//
// A pass can be run with one deliberate skip:
// - a trie-depth skip accepts any character at one depth without consuming
//   input (the user dropped a keystroke);
// - an input-position skip ignores one typed position (an extra keystroke).
// Skip passes only follow primary keys and only report paths that used the
// skip.

use keydict_core::character::{is_quote, to_base_lower};
use keydict_core::enums::MAX_WORD_LENGTH;
use keydict_core::input::InputCandidates;
use keydict_trie::TrieError;
use keydict_trie::format::ROOT_OFFSET;
use keydict_trie::node::{decode_node, read_group_count};
use tracing::debug;

/// Longest word a query can produce, and the longest accepted input.
pub const MAX_DEPTH: usize = MAX_WORD_LENGTH - 1;

/// Default limit on trie nodes examined by one query, across all passes.
pub const MAX_NODE_VISITS: u32 = 500_000;

/// Tunable matching behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Enumerate words that extend past the typed input.
    pub allow_completions: bool,
    /// Completions go down to `input length * factor` characters.
    pub completion_depth_factor: usize,
    /// Fixed correction limit; `None` uses 2 below five keys, else half the keys.
    pub max_corrections: Option<usize>,
    /// Run skip passes when the normal pass finds too little.
    pub allow_skips: bool,
    /// Skip passes run when fewer hits than this were admitted.
    pub min_matches_before_skip: usize,
    /// Cost of matching a key through a proximity alternative.
    pub proximity_penalty: u32,
    /// Cost of one skipped trie character or typed key.
    pub skip_penalty: u32,
    /// Nodes examined per query before giving up.
    pub max_node_visits: u32,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            allow_completions: true,
            completion_depth_factor: 3,
            max_corrections: None,
            allow_skips: true,
            min_matches_before_skip: 5,
            proximity_penalty: 1,
            skip_penalty: 2,
            max_node_visits: MAX_NODE_VISITS,
        }
    }
}

impl MatchPolicy {
    /// Deepest word length explored for `input_len` keys.
    pub fn max_depth(&self, input_len: usize) -> usize {
        input_len
            .saturating_mul(self.completion_depth_factor)
            .max(input_len)
            .min(MAX_DEPTH)
    }

    /// Corrections allowed for `input_len` keys.
    pub fn max_corrections(&self, input_len: usize) -> usize {
        self.max_corrections
            .unwrap_or(if input_len < 5 { 2 } else { input_len / 2 })
    }
}

/// Which deliberate skip a pass makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipMode {
    None,
    /// Accept any trie character at this depth without consuming input.
    TrieDepth(usize),
    /// Ignore the typed key at this position.
    InputPosition(usize),
}

/// One word reached by the walk.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub word: &'a [char],
    pub frequency: u8,
    /// Accumulated penalties along the path.
    pub cost: u32,
    /// The typed input ends exactly at this word.
    pub full_word: bool,
    /// The path used its pass's skip.
    pub skipped: bool,
    /// For completions of the normal pass: the letter following the typed
    /// prefix.
    pub next_letter: Option<char>,
}

/// Receives hits while the trie is walked.
pub trait HitCollector {
    fn collect(&mut self, hit: &Hit<'_>);

    /// Number of hits admitted so far. Drives the skip-pass decisions.
    fn admitted(&self) -> usize;
}

/// Summary of one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub visits: u32,
    pub budget_exhausted: bool,
    /// The skip pass that produced results, if skip passes ran and one did.
    pub skip_pass: Option<SkipMode>,
}

#[derive(Debug, Clone, Copy)]
struct MatchFrame {
    /// Offset of the next sibling to examine.
    next: usize,
    /// Siblings left in the group.
    remaining: usize,
    /// Typed positions consumed before this depth.
    input_pos: usize,
    corrections: usize,
    cost: u32,
    skipped: bool,
    /// Word length at which the typed input ran out.
    exhausted_at: Option<usize>,
}

/// Reusable traversal memory.
#[derive(Debug, Clone)]
pub struct MatchScratch {
    frames: Vec<MatchFrame>,
    word: [char; MAX_WORD_LENGTH],
    visits: u32,
}

impl Default for MatchScratch {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchScratch {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(MAX_WORD_LENGTH + 1),
            word: ['\0'; MAX_WORD_LENGTH],
            visits: 0,
        }
    }
}

/// Walk the trie for `input`, feeding every hit to `collector`.
///
/// Runs the normal pass, then the skip passes when the policy allows them
/// and the normal pass admitted too few hits. Input longer than
/// [`MAX_DEPTH`] is not traversed at all.
pub fn search<C: HitCollector>(
    data: &[u8],
    input: &InputCandidates,
    policy: &MatchPolicy,
    scratch: &mut MatchScratch,
    collector: &mut C,
) -> Result<SearchStats, TrieError> {
    let n = input.len();
    let mut stats = SearchStats::default();
    if n == 0 || n > MAX_DEPTH || data.is_empty() {
        return Ok(stats);
    }
    scratch.visits = 0;

    run_pass(data, input, policy, SkipMode::None, scratch, collector, &mut stats)?;

    if policy.allow_skips && !stats.budget_exhausted && collector.admitted() < policy.min_matches_before_skip {
        debug!(n, admitted = collector.admitted(), "running skip passes");
        'passes: for p in 0..n {
            for mode in [SkipMode::TrieDepth(p), SkipMode::InputPosition(p)] {
                if matches!(mode, SkipMode::InputPosition(_)) && n < 2 {
                    continue;
                }
                let before = collector.admitted();
                run_pass(data, input, policy, mode, scratch, collector, &mut stats)?;
                if stats.budget_exhausted {
                    break 'passes;
                }
                if collector.admitted() > before {
                    stats.skip_pass = Some(mode);
                    break 'passes;
                }
            }
        }
    }

    stats.visits = scratch.visits;
    Ok(stats)
}

#[inline]
fn apply_input_skip(frame: &mut MatchFrame, skip: SkipMode, penalty: u32) {
    if let SkipMode::InputPosition(p) = skip {
        if !frame.skipped && frame.input_pos == p {
            frame.input_pos += 1;
            frame.skipped = true;
            frame.cost = frame.cost.saturating_add(penalty);
        }
    }
}

fn run_pass<C: HitCollector>(
    data: &[u8],
    input: &InputCandidates,
    policy: &MatchPolicy,
    skip: SkipMode,
    scratch: &mut MatchScratch,
    collector: &mut C,
    stats: &mut SearchStats,
) -> Result<(), TrieError> {
    let n = input.len();
    let max_depth = policy.max_depth(n);
    let max_corrections = policy.max_corrections(n);
    let primary_only = skip != SkipMode::None;

    let MatchScratch {
        frames,
        word,
        visits,
    } = scratch;
    frames.clear();

    let (count, first) = read_group_count(data, ROOT_OFFSET)?;
    let mut root = MatchFrame {
        next: first,
        remaining: count,
        input_pos: 0,
        corrections: 0,
        cost: 0,
        skipped: false,
        exhausted_at: None,
    };
    apply_input_skip(&mut root, skip, policy.skip_penalty);
    frames.push(root);

    while let Some(frame) = frames.last_mut() {
        if frame.remaining == 0 {
            frames.pop();
            continue;
        }
        if *visits >= policy.max_node_visits {
            debug!(visits = *visits, ?skip, "node visit budget exhausted");
            stats.budget_exhausted = true;
            return Ok(());
        }
        *visits += 1;

        let node = decode_node(data, frame.next)?;
        frame.next = node.end;
        frame.remaining -= 1;
        let state = *frame;

        let depth = frames.len() - 1;
        word[depth] = node.ch;
        let len = depth + 1;
        let mut child = state;

        if state.input_pos >= n {
            if node.terminal && (!primary_only || state.skipped) {
                let next_letter = if primary_only {
                    None
                } else {
                    state.exhausted_at.map(|i| word[i])
                };
                collector.collect(&Hit {
                    word: &word[..len],
                    frequency: node.frequency,
                    cost: state.cost,
                    full_word: false,
                    skipped: state.skipped,
                    next_letter,
                });
            }
        } else if skip == SkipMode::TrieDepth(depth) && !state.skipped {
            child.skipped = true;
            child.cost = child.cost.saturating_add(policy.skip_penalty);
        } else if is_quote(node.ch) && !is_quote(input.primary_at(state.input_pos)) {
            // apostrophes in stored words are free to pass over
        } else {
            let codes = input.codes_at(state.input_pos);
            let codes = if primary_only { &codes[..1] } else { codes };
            let folded = to_base_lower(node.ch);
            let Some(j) = codes.iter().position(|&k| k == node.ch || k == folded) else {
                continue;
            };
            if j > 0 {
                child.corrections += 1;
                if child.corrections > max_corrections {
                    continue;
                }
                child.cost = child.cost.saturating_add(policy.proximity_penalty);
            }
            child.input_pos += 1;
            apply_input_skip(&mut child, skip, policy.skip_penalty);
            if child.input_pos >= n {
                child.exhausted_at = Some(len);
                if node.terminal && (!primary_only || child.skipped) {
                    collector.collect(&Hit {
                        word: &word[..len],
                        frequency: node.frequency,
                        cost: child.cost,
                        full_word: true,
                        skipped: child.skipped,
                        next_letter: None,
                    });
                }
            }
        }

        let Some(group) = node.children else {
            continue;
        };
        let remaining_input = n.saturating_sub(child.input_pos);
        if remaining_input == 0 && !policy.allow_completions {
            continue;
        }
        if len + 1 > max_depth || len + remaining_input > MAX_DEPTH {
            continue;
        }
        let (count, first) = read_group_count(data, group)?;
        frames.push(MatchFrame {
            next: first,
            remaining: count,
            ..child
        });
    }
    Ok(())
}

//! Splitting a raw input line into an argument vector.

use tracing::debug;

/// Split `line` on spaces, keeping at most `max_args` tokens.
///
/// Runs of spaces never produce empty tokens. Tabs and quotes are ordinary
/// characters. Tokens beyond `max_args` are dropped without an error.
pub fn tokenize(line: &str, max_args: usize) -> Vec<String> {
    let mut words = line.split(' ').filter(|w| !w.is_empty());
    let argv: Vec<String> = words.by_ref().take(max_args).map(str::to_string).collect();

    let dropped = words.count();
    if dropped > 0 {
        debug!(kept = argv.len(), dropped, "argument vector truncated");
    }
    argv
}

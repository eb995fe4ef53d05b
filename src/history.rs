//! Bounded store of previously entered lines.

use crate::error::ShellError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Append-only list of raw input lines.
///
/// Once `capacity` lines are stored, further lines are dropped. The oldest
/// entries are never evicted.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Store `line` if there is room left.
    pub fn record(&mut self, line: &str) {
        if self.entries.len() < self.capacity {
            self.entries.push(line.to_string());
        }
    }

    /// Entries in insertion order, paired with their 1-based position.
    pub fn list(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, line)| (i + 1, line.as_str()))
    }

    /// Line stored at 1-based position `index`.
    pub fn recall(&self, index: i64) -> Result<&str, ShellError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
            .ok_or(ShellError::OutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fill the store from a newline-separated file, up to capacity.
    ///
    /// A missing file leaves the store untouched. A line that is not valid
    /// UTF-8 is kept with the bad bytes replaced.
    pub fn load(&mut self, path: &Path) -> io::Result<()> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        for line in BufReader::new(file).split(b'\n') {
            if self.entries.len() >= self.capacity {
                break;
            }
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            self.record(line.strip_suffix('\r').unwrap_or(&line));
        }
        debug!(path = %path.display(), entries = self.entries.len(), "history loaded");
        Ok(())
    }

    /// Overwrite `path` with one entry per line.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for line in &self.entries {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

/// Index requested by a `!n` line, or `None` when `line` is not a recall.
///
/// The text after `!` is read like C's `atoi`: leading spaces, an optional
/// sign, then as many digits as follow. Anything unparsable reads as 0,
/// which never names an entry.
pub fn recall_index(line: &str) -> Option<i64> {
    let rest = line.strip_prefix('!').filter(|rest| !rest.is_empty())?;
    let rest = rest.trim_start_matches([' ', '\t']);

    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn filled(n: usize) -> History {
        let mut history = History::with_capacity(100);
        for i in 1..=n {
            history.record(&format!("cmd {i}"));
        }
        history
    }

    #[test]
    fn recall_is_one_based() {
        let history = filled(3);
        assert_eq!(history.recall(1).unwrap(), "cmd 1");
        assert_eq!(history.recall(3).unwrap(), "cmd 3");
    }

    #[test]
    fn recall_outside_range_is_out_of_range() {
        let history = filled(3);
        for index in [i64::MIN, -5, -1, 0, 4, 100, i64::MAX] {
            assert!(
                matches!(history.recall(index), Err(ShellError::OutOfRange { count: 3, .. })),
                "index {index} should be out of range"
            );
        }
        assert!(History::with_capacity(100).recall(1).is_err());
    }

    #[test]
    fn full_store_drops_new_lines() {
        let mut history = filled(100);
        history.record("one too many");
        assert_eq!(history.len(), 100);
        assert_eq!(history.recall(1).unwrap(), "cmd 1");
        assert_eq!(history.recall(100).unwrap(), "cmd 100");
        assert!(history.list().all(|(_, line)| line != "one too many"));
    }

    #[test]
    fn list_is_restartable_and_ordered() {
        let history = filled(2);
        let first: Vec<_> = history.list().collect();
        let second: Vec<_> = history.list().collect();
        assert_eq!(first, vec![(1, "cmd 1"), (2, "cmd 2")]);
        assert_eq!(first, second);
    }

    #[test]
    fn recall_index_reads_like_atoi() {
        assert_eq!(recall_index("!3"), Some(3));
        assert_eq!(recall_index("!12abc"), Some(12));
        assert_eq!(recall_index("!-2"), Some(-2));
        assert_eq!(recall_index("! 7"), Some(7));
        assert_eq!(recall_index("!abc"), Some(0));
        assert_eq!(recall_index("!"), None);
        assert_eq!(recall_index("ls"), None);
    }

    #[test]
    fn save_then_load_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        filled(5).save(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 5);

        let mut loaded = History::with_capacity(3);
        loaded.load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.recall(3).unwrap(), "cmd 3");
    }

    #[test]
    fn invalid_utf8_line_does_not_discard_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        fs::write(&path, b"echo one\nbad \xff line\necho three\n").unwrap();

        let mut history = History::with_capacity(10);
        history.load(&path).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.recall(1).unwrap(), "echo one");
        assert_eq!(history.recall(2).unwrap(), "bad \u{fffd} line");
        assert_eq!(history.recall(3).unwrap(), "echo three");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = History::with_capacity(10);
        history.load(&dir.path().join("absent")).unwrap();
        assert!(history.is_empty());
    }
}

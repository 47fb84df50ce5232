/// Result types produced by a tally run.
///
/// A run produces a [`ResultTable`] mapping each distinct raw pattern to the
/// number of words it matched, plus a list of [`PatternFailure`]s for any
/// pattern whose counting task did not complete. Both travel together in
/// [`TallyOutput`] so that a failed pattern is reported rather than silently
/// missing from the table.
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::{TallyError, TallyResult};

/// Mapping from raw pattern string to match count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    counts: HashMap<String, usize>,
}

impl ResultTable {
    /// Creates a new empty table
    pub fn new() -> Self {
        Default::default()
    }

    /// Records the count for a pattern, replacing any previous value
    pub fn insert(&mut self, pattern: impl Into<String>, count: usize) {
        self.counts.insert(pattern.into(), count);
    }

    /// Count recorded for `pattern`, if any
    pub fn get(&self, pattern: &str) -> Option<usize> {
        self.counts.get(pattern).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(p, &n)| (p.as_str(), n))
    }

    /// Entries sorted by raw pattern
    pub fn sorted_entries(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Sum of all counts
    pub fn total_matches(&self) -> usize {
        self.counts.values().sum()
    }
}

impl FromIterator<(String, usize)> for ResultTable {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// A pattern whose counting task failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    /// The raw pattern as supplied
    pub pattern: String,
    /// What went wrong
    pub message: String,
}

/// Everything a tally run produces
#[derive(Debug, Clone, Default)]
pub struct TallyOutput {
    /// Counts for every pattern that completed
    pub table: ResultTable,
    /// Patterns that did not complete
    pub failures: Vec<PatternFailure>,
    /// Number of words the patterns were counted against
    pub words_scanned: usize,
}

impl TallyOutput {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Turns failed patterns into an error unless `allow_failures` is set
    pub fn check_failures(&self, allow_failures: bool) -> TallyResult<()> {
        if self.has_failures() && !allow_failures {
            return Err(TallyError::pattern_tasks_failed(self.failures.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_table_new() {
        let table = ResultTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.total_matches(), 0);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut table = ResultTable::new();
        table.insert("a2", 3);
        table.insert("a2", 5);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a2"), Some(5));
        assert_eq!(table.get("b2"), None);
    }

    #[test]
    fn test_sorted_entries() {
        let table: ResultTable = vec![
            ("c1".to_string(), 1),
            ("\"ap\"".to_string(), 2),
            ("a2b2".to_string(), 0),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            table.sorted_entries(),
            vec![("\"ap\"", 2), ("a2b2", 0), ("c1", 1)]
        );
        assert_eq!(table.total_matches(), 3);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut table = ResultTable::new();
        table.insert("x1", 4);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"x1":4}"#);
    }

    #[test]
    fn test_output_failures() {
        let mut output = TallyOutput::default();
        assert!(!output.has_failures());

        output.failures.push(PatternFailure {
            pattern: "a1".to_string(),
            message: "boom".to_string(),
        });
        assert!(output.has_failures());
    }

    #[test]
    fn test_check_failures() {
        let mut output = TallyOutput::default();
        assert!(output.check_failures(false).is_ok());

        for pattern in ["a1", "b1"] {
            output.failures.push(PatternFailure {
                pattern: pattern.to_string(),
                message: "boom".to_string(),
            });
        }
        let err = output.check_failures(false).unwrap_err();
        assert!(matches!(err, TallyError::PatternTasksFailed(2)));
        assert_eq!(err.to_string(), "2 pattern task(s) failed");

        assert!(output.check_failures(true).is_ok());
    }
}

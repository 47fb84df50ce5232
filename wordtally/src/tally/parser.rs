use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

const QUOTE: char = '"';

/// A parsed query pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Word must contain `sequence` as a contiguous substring
    Substring { sequence: String },
    /// Word must contain at least `n` occurrences of each `(c, n)`
    Frequency { requirements: HashMap<char, usize> },
}

impl Pattern {
    /// Short name of the pattern kind, used in logs and the `explain` command
    pub fn kind(&self) -> &'static str {
        match self {
            Pattern::Substring { .. } => "substring",
            Pattern::Frequency { .. } => "frequency",
        }
    }

    /// Returns the frequency requirements sorted by character.
    ///
    /// Substring patterns have no requirements and return an empty list.
    pub fn sorted_requirements(&self) -> Vec<(char, usize)> {
        match self {
            Pattern::Substring { .. } => Vec::new(),
            Pattern::Frequency { requirements } => {
                let mut reqs: Vec<(char, usize)> =
                    requirements.iter().map(|(&c, &n)| (c, n)).collect();
                reqs.sort_unstable();
                reqs
            }
        }
    }
}

/// Grammar used to read frequency patterns such as `a2b3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyGrammar {
    /// Compatible with existing pattern files, including the permissive
    /// fallback for patterns whose first character sorts at or below `'9'`.
    ///
    /// Only ASCII `0-9` are read as digits. Other Unicode decimal digits such
    /// as `'٣'` are ignored, so `a٣` parses as `a` with a count of zero.
    #[default]
    Legacy,
    /// Explicit `<letter><digits>` pairs; a letter without digits requires one
    /// occurrence and every other character is ignored
    Strict,
}

/// Parses a raw pattern with the legacy frequency grammar.
pub fn parse(raw: &str) -> Pattern {
    parse_with(raw, FrequencyGrammar::Legacy)
}

/// Parses a raw pattern with the given frequency grammar.
///
/// A pattern wrapped in double quotes (at least two characters long) is a
/// substring pattern; anything else is a frequency pattern. Parsing never
/// fails: malformed input degrades to a smaller or empty requirement set.
pub fn parse_with(raw: &str, grammar: FrequencyGrammar) -> Pattern {
    if let Some(sequence) = quoted_sequence(raw) {
        trace!("Pattern '{}' is a substring pattern", raw);
        return Pattern::Substring {
            sequence: sequence.to_string(),
        };
    }

    let requirements = match grammar {
        FrequencyGrammar::Legacy => legacy_requirements(raw),
        FrequencyGrammar::Strict => strict_requirements(raw),
    };
    trace!(
        "Pattern '{}' is a frequency pattern with {} requirement(s)",
        raw,
        requirements.len()
    );
    Pattern::Frequency { requirements }
}

fn quoted_sequence(raw: &str) -> Option<&str> {
    if raw.chars().count() < 2 {
        return None;
    }
    raw.strip_prefix(QUOTE)?.strip_suffix(QUOTE)
}

fn legacy_requirements(raw: &str) -> HashMap<char, usize> {
    let mut requirements = HashMap::new();
    let permissive = raw.chars().next().is_some_and(|first| first <= '9');

    let mut current: Option<char> = None;
    let mut count = 0usize;
    let mut in_segment = false;

    for c in raw.chars() {
        if (c.is_alphabetic() || permissive) && !in_segment {
            in_segment = true;
            current = Some(c);
            count = 0;
        } else if let Some(digit) = c.to_digit(10) {
            count = count.saturating_mul(10).saturating_add(digit as usize);
            in_segment = false;
        }

        if let Some(current) = current {
            requirements.insert(current, count);
        }
    }

    requirements
}

fn strict_requirements(raw: &str) -> HashMap<char, usize> {
    let mut requirements: HashMap<char, usize> = HashMap::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_alphabetic() {
            continue;
        }

        let mut digits: Option<usize> = None;
        while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
            let value = digits.unwrap_or(0);
            digits = Some(value.saturating_mul(10).saturating_add(digit as usize));
            chars.next();
        }

        let required = digits.unwrap_or(1);
        let entry = requirements.entry(c).or_insert(0);
        *entry = (*entry).max(required);
    }

    requirements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequency(pairs: &[(char, usize)]) -> Pattern {
        Pattern::Frequency {
            requirements: pairs.iter().copied().collect(),
        }
    }

    #[test]
    fn test_quoted_pattern_is_substring() {
        assert_eq!(
            parse("\"ap\""),
            Pattern::Substring {
                sequence: "ap".to_string()
            }
        );
    }

    #[test]
    fn test_empty_quotes_give_empty_sequence() {
        assert_eq!(
            parse("\"\""),
            Pattern::Substring {
                sequence: String::new()
            }
        );
    }

    #[test]
    fn test_single_quote_is_not_substring() {
        // Too short to be quoted; '"' sorts below '9' so it becomes a requirement
        assert_eq!(parse("\""), frequency(&[('"', 0)]));
    }

    #[test]
    fn test_half_quoted_is_frequency() {
        assert!(matches!(parse("\"abc"), Pattern::Frequency { .. }));
        assert!(matches!(parse("abc\""), Pattern::Frequency { .. }));
    }

    #[test]
    fn test_simple_frequency_pattern() {
        assert_eq!(parse("a2b2"), frequency(&[('a', 2), ('b', 2)]));
        assert_eq!(parse("c1a1t1"), frequency(&[('c', 1), ('a', 1), ('t', 1)]));
    }

    #[test]
    fn test_multi_digit_counts() {
        assert_eq!(parse("e12x3"), frequency(&[('e', 12), ('x', 3)]));
    }

    #[test]
    fn test_letter_without_digits_records_zero() {
        assert_eq!(parse("a"), frequency(&[('a', 0)]));
        assert_eq!(parse("a2b"), frequency(&[('a', 2), ('b', 0)]));
    }

    #[test]
    fn test_letters_inside_open_segment_are_skipped() {
        // 'b' arrives while the 'a' segment is still open
        assert_eq!(parse("ab2"), frequency(&[('a', 2)]));
    }

    #[test]
    fn test_repeated_letter_overwrites() {
        assert_eq!(parse("a3a1"), frequency(&[('a', 1)]));
    }

    #[test]
    fn test_permissive_fallback_for_leading_digit() {
        // First char sorts at or below '9', so '2' opens the segment itself
        assert_eq!(parse("2a3"), frequency(&[('2', 3)]));
    }

    #[test]
    fn test_empty_pattern_has_no_requirements() {
        assert_eq!(parse(""), frequency(&[]));
    }

    #[test]
    fn test_punctuation_only_pattern_is_degenerate() {
        // '~' sorts above '9' and is neither letter nor digit
        assert_eq!(parse("~~"), frequency(&[]));
        // '-' sorts below '9', which turns on the permissive fallback
        assert_eq!(parse("-"), frequency(&[('-', 0)]));
    }

    #[test]
    fn test_non_ascii_digits_are_not_counts() {
        assert_eq!(parse("a\u{0663}"), frequency(&[('a', 0)]));
        assert_eq!(parse("a\u{0663}2"), frequency(&[('a', 2)]));
    }

    #[test]
    fn test_huge_count_saturates() {
        let raw = format!("a{}", "9".repeat(40));
        assert_eq!(parse(&raw), frequency(&[('a', usize::MAX)]));
    }

    #[test]
    fn test_strict_grammar() {
        let strict = |raw| parse_with(raw, FrequencyGrammar::Strict);
        assert_eq!(strict("a2b2"), frequency(&[('a', 2), ('b', 2)]));
        assert_eq!(strict("ab2"), frequency(&[('a', 1), ('b', 2)]));
        assert_eq!(strict("2a3"), frequency(&[('a', 3)]));
        assert_eq!(strict("a1a4a2"), frequency(&[('a', 4)]));
        assert_eq!(strict("--"), frequency(&[]));
    }

    #[test]
    fn test_strict_grammar_keeps_substring_rule() {
        assert_eq!(
            parse_with("\"cat\"", FrequencyGrammar::Strict),
            Pattern::Substring {
                sequence: "cat".to_string()
            }
        );
    }

    #[test]
    fn test_sorted_requirements() {
        assert_eq!(
            parse("c1a1t1").sorted_requirements(),
            vec![('a', 1), ('c', 1), ('t', 1)]
        );
        assert!(parse("\"x\"").sorted_requirements().is_empty());
        assert_eq!(parse("\"x\"").kind(), "substring");
        assert_eq!(parse("x1").kind(), "frequency");
    }
}

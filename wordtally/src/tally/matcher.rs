use std::collections::HashMap;

use super::parser::Pattern;

/// Decides whether `word` satisfies `pattern`.
pub fn matches(word: &str, pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Substring { sequence } => word.contains(sequence.as_str()),
        Pattern::Frequency { requirements } => meets_requirements(word, requirements),
    }
}

/// Checks every `(char, minimum)` requirement against `word`, stopping at the
/// first character that occurs too few times.
fn meets_requirements(word: &str, requirements: &HashMap<char, usize>) -> bool {
    requirements
        .iter()
        .all(|(&c, &required)| required == 0 || occurrences(word, c) >= required)
}

fn occurrences(word: &str, c: char) -> usize {
    word.chars().filter(|&ch| ch == c).count()
}

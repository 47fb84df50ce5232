use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::matcher::matches;
use super::parser::Pattern;

const MIN_CHUNK_SIZE: usize = 1024; // Minimum words per chunk to reduce overhead
const MAX_CHUNK_SIZE: usize = 64 * 1024; // Maximum words per chunk to keep load balanced

/// How the word list is walked for a single pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStrategy {
    /// Plain loop over the words on the calling thread
    Sequential,
    /// Words are split into chunks counted on the rayon pool
    #[default]
    Parallel,
}

/// Counts the words in `words` that satisfy `pattern`.
pub fn count(words: &[String], pattern: &Pattern, strategy: CountStrategy) -> usize {
    match strategy {
        CountStrategy::Sequential => count_sequential(words, pattern),
        CountStrategy::Parallel => count_parallel(words, pattern),
    }
}

fn count_sequential(words: &[String], pattern: &Pattern) -> usize {
    words.iter().filter(|word| matches(word, pattern)).count()
}

fn count_parallel(words: &[String], pattern: &Pattern) -> usize {
    if words.len() <= MIN_CHUNK_SIZE {
        return count_sequential(words, pattern);
    }

    let chunk_size =
        (words.len() / rayon::current_num_threads()).clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);

    words
        .par_chunks(chunk_size)
        .map(|chunk| count_sequential(chunk, pattern))
        .sum()
}

/// This module implements the pattern tallying engine.
///
/// # Pattern Kinds
///
/// A raw pattern wrapped in double quotes is a **substring** pattern: a word
/// matches when it contains the quoted text. Anything else is a **frequency**
/// pattern: `a2b3` matches words with at least two `a`s and three `b`s.
///
/// # Pipeline
///
/// 1. [`parser`] turns each raw pattern string into a [`Pattern`]
/// 2. [`matcher`] decides whether a single word satisfies a [`Pattern`]
/// 3. [`counter`] counts the matching words of a list, sequentially or in
///    parallel chunks
/// 4. [`engine`] fans the patterns out across a thread pool and gathers the
///    counts into a [`ResultTable`](crate::results::ResultTable)
///
/// # Parallel Processing
///
/// The fan-out mirrors what .NET would write with PLINQ and a
/// `ConcurrentDictionary`:
/// ```csharp
/// var results = new ConcurrentDictionary<string, int>();
/// Parallel.ForEach(patterns, p => results[p] = CountMatches(words, p));
/// ```
///
/// With Rayon and DashMap the word list is borrowed immutably by every task,
/// so the compiler rules out writes to it at build time:
/// ```rust,ignore
/// let counts = DashMap::new();
/// patterns.par_iter().for_each(|raw| {
///     counts.insert(raw.clone(), count(&words, &parse(raw), strategy));
/// });
/// ```
pub mod counter;
pub mod engine;
pub mod matcher;
pub mod parser;

pub use counter::{count, CountStrategy};
pub use engine::{run, run_config, TallyEngine, TallyOptions};
pub use matcher::matches;
pub use parser::{parse, parse_with, FrequencyGrammar, Pattern};

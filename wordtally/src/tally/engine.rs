use dashmap::DashMap;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

use super::counter::{count, CountStrategy};
use super::parser::{parse_with, FrequencyGrammar, Pattern};
use crate::config::TallyConfig;
use crate::errors::{TallyError, TallyResult};
use crate::input::{read_tokens, InputOptions};
use crate::metrics::TallyMetrics;
use crate::results::{PatternFailure, ResultTable, TallyOutput};

/// Knobs that change how a batch is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyOptions {
    pub grammar: FrequencyGrammar,
    pub count_strategy: CountStrategy,
    pub thread_count: NonZeroUsize,
}

impl Default for TallyOptions {
    fn default() -> Self {
        Self {
            grammar: FrequencyGrammar::default(),
            count_strategy: CountStrategy::default(),
            thread_count: NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl From<&TallyConfig> for TallyOptions {
    fn from(config: &TallyConfig) -> Self {
        Self {
            grammar: config.grammar,
            count_strategy: config.count_strategy,
            thread_count: config.thread_count,
        }
    }
}

/// Runs every pattern of a batch against a shared word list
#[derive(Debug, Clone, Default)]
pub struct TallyEngine {
    options: TallyOptions,
    metrics: TallyMetrics,
}

impl TallyEngine {
    /// Creates a new engine with the given options
    pub fn new(options: TallyOptions) -> Self {
        Self {
            options,
            metrics: TallyMetrics::new(),
        }
    }

    /// Creates an engine configured from a [`TallyConfig`]
    pub fn from_config(config: &TallyConfig) -> Self {
        Self::new(TallyOptions::from(config))
    }

    pub fn options(&self) -> &TallyOptions {
        &self.options
    }

    /// Gets the counters for the most recent run
    pub fn metrics(&self) -> &TallyMetrics {
        &self.metrics
    }

    /// Counts the matching words for every raw pattern.
    ///
    /// Each distinct pattern becomes one task on a dedicated rayon pool sized
    /// by `thread_count`. Tasks share `words` read-only and insert their count
    /// into a concurrent map under their own key. The call returns only after
    /// every task has finished; a task that panics is reported in
    /// [`TallyOutput::failures`] and does not affect the others.
    pub fn run(&self, words: &[String], raw_patterns: &[String]) -> TallyResult<TallyOutput> {
        let strategy = self.options.count_strategy;
        self.run_with(words, raw_patterns, |words, pattern| {
            count(words, pattern, strategy)
        })
    }

    fn run_with<F>(
        &self,
        words: &[String],
        raw_patterns: &[String],
        count_fn: F,
    ) -> TallyResult<TallyOutput>
    where
        F: Fn(&[String], &Pattern) -> usize + Sync,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.thread_count.get())
            .build()
            .map_err(|e| TallyError::thread_pool(e.to_string()))?;

        Ok(pool.install(|| self.tally(words, raw_patterns, &count_fn)))
    }

    fn tally<F>(&self, words: &[String], raw_patterns: &[String], count_fn: &F) -> TallyOutput
    where
        F: Fn(&[String], &Pattern) -> usize + Sync,
    {
        info!(
            "Starting tally of {} patterns over {} words",
            raw_patterns.len(),
            words.len()
        );

        self.metrics.reset();

        let mut seen = HashSet::with_capacity(raw_patterns.len());
        let distinct: Vec<&str> = raw_patterns
            .iter()
            .map(String::as_str)
            .filter(|raw| seen.insert(*raw))
            .collect();
        if distinct.len() < raw_patterns.len() {
            debug!(
                "Skipping {} duplicate pattern(s)",
                raw_patterns.len() - distinct.len()
            );
        }

        let counts: DashMap<String, usize> = DashMap::with_capacity(distinct.len());

        let failures: Vec<PatternFailure> = distinct
            .par_iter()
            .filter_map(|&raw| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let pattern = parse_with(raw, self.options.grammar);
                    self.metrics.record_pattern(&pattern);
                    debug!("Counting {} pattern '{}'", pattern.kind(), raw);
                    count_fn(words, &pattern)
                }));

                match outcome {
                    Ok(matched) => {
                        self.metrics.record_count(words.len(), matched);
                        counts.insert(raw.to_string(), matched);
                        None
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!("Pattern '{}' failed: {}", raw, message);
                        self.metrics.record_failure();
                        Some(PatternFailure {
                            pattern: raw.to_string(),
                            message,
                        })
                    }
                }
            })
            .collect();

        let table: ResultTable = counts.into_iter().collect();

        self.metrics.log_stats();
        info!(
            "Tally complete: {} patterns counted, {} failed",
            table.len(),
            failures.len()
        );

        TallyOutput {
            table,
            failures,
            words_scanned: words.len(),
        }
    }
}

/// Counts matching words for every raw pattern with default options.
pub fn run(words: &[String], raw_patterns: &[String]) -> TallyResult<TallyOutput> {
    TallyEngine::default().run(words, raw_patterns)
}

/// Reads the text and pattern sources named in `config` and tallies them.
pub fn run_config(config: &TallyConfig) -> TallyResult<TallyOutput> {
    let input_options = InputOptions::from(config);
    let words = read_tokens(&config.text_path, &input_options)?;
    let raw_patterns = read_tokens(&config.patterns_path, &input_options)?;
    TallyEngine::from_config(config).run(&words, &raw_patterns)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "pattern task panicked".to_string()
    }
}

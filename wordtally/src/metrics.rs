use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::tally::Pattern;

/// Tracks work done by a tally run
#[derive(Debug, Clone)]
pub struct TallyMetrics {
    // Pattern metrics
    patterns_processed: Arc<AtomicU64>,
    substring_patterns: Arc<AtomicU64>,
    frequency_patterns: Arc<AtomicU64>,
    failed_patterns: Arc<AtomicU64>,

    // Word metrics
    words_evaluated: Arc<AtomicU64>,
    matches_found: Arc<AtomicU64>,
}

impl TallyMetrics {
    /// Creates a new TallyMetrics instance
    pub fn new() -> Self {
        Self {
            patterns_processed: Arc::new(AtomicU64::new(0)),
            substring_patterns: Arc::new(AtomicU64::new(0)),
            frequency_patterns: Arc::new(AtomicU64::new(0)),
            failed_patterns: Arc::new(AtomicU64::new(0)),
            words_evaluated: Arc::new(AtomicU64::new(0)),
            matches_found: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Zeroes every counter
    pub fn reset(&self) {
        for counter in [
            &self.patterns_processed,
            &self.substring_patterns,
            &self.frequency_patterns,
            &self.failed_patterns,
            &self.words_evaluated,
            &self.matches_found,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Records a parsed pattern by kind
    pub fn record_pattern(&self, pattern: &Pattern) {
        match pattern {
            Pattern::Substring { .. } => {
                self.substring_patterns.fetch_add(1, Ordering::Relaxed);
            }
            Pattern::Frequency { .. } => {
                self.frequency_patterns.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Records a completed count for one pattern
    pub fn record_count(&self, words: usize, matched: usize) {
        self.patterns_processed.fetch_add(1, Ordering::Relaxed);
        self.words_evaluated.fetch_add(words as u64, Ordering::Relaxed);
        let total = self
            .matches_found
            .fetch_add(matched as u64, Ordering::Relaxed)
            + matched as u64;
        debug!(
            "Counted {} of {} words, total matches: {}",
            matched, words, total
        );
    }

    /// Records a pattern task that did not complete
    pub fn record_failure(&self) {
        self.failed_patterns.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets a snapshot of the current counters
    pub fn get_stats(&self) -> TallyStats {
        TallyStats {
            patterns_processed: self.patterns_processed.load(Ordering::Relaxed),
            substring_patterns: self.substring_patterns.load(Ordering::Relaxed),
            frequency_patterns: self.frequency_patterns.load(Ordering::Relaxed),
            failed_patterns: self.failed_patterns.load(Ordering::Relaxed),
            words_evaluated: self.words_evaluated.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Tally stats:\n\
             Patterns processed: {}\n\
             Patterns (substring/frequency): {}/{}\n\
             Failed patterns: {}\n\
             Words evaluated: {}\n\
             Matches found: {}",
            stats.patterns_processed,
            stats.substring_patterns,
            stats.frequency_patterns,
            stats.failed_patterns,
            stats.words_evaluated,
            stats.matches_found
        );
    }
}

impl Default for TallyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the counters in [`TallyMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyStats {
    pub patterns_processed: u64,
    pub substring_patterns: u64,
    pub frequency_patterns: u64,
    pub failed_patterns: u64,
    pub words_evaluated: u64,
    pub matches_found: u64,
}

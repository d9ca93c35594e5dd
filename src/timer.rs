//! Step timing collection
//!
//! [`StepTimer`] accumulates named duration samples as the loop runs. The
//! reporters read these lists from the end: samples for a category are
//! appended in chronological order and never shortened or reordered, so
//! index arithmetic against the tail pairs the most recent measurements.

use std::collections::HashMap;
use std::time::Instant;

/// Append-only collection of named duration samples, in seconds
///
/// Owned and mutated by the loop on a single thread; no internal locking.
#[derive(Debug, Clone, Default)]
pub struct StepTimer {
    recorded: HashMap<String, Vec<f64>>,
}

impl StepTimer {
    /// Empty timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample to a category
    pub fn record(&mut self, category: impl Into<String>, seconds: f64) {
        self.recorded.entry(category.into()).or_default().push(seconds);
    }

    /// Run a closure, recording its elapsed time under `category`
    pub fn time<F, R>(&mut self, category: impl Into<String>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.record(category, start.elapsed().as_secs_f64());
        result
    }

    /// All recorded samples, keyed by category
    pub fn recorded_durations(&self) -> &HashMap<String, Vec<f64>> {
        &self.recorded
    }

    /// Samples for one category, oldest first
    pub fn durations(&self, category: &str) -> Option<&[f64]> {
        self.recorded.get(category).map(Vec::as_slice)
    }

    /// Most recent sample for a category
    pub fn last(&self, category: &str) -> Option<f64> {
        self.recorded.get(category).and_then(|samples| samples.last().copied())
    }
}

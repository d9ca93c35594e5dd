//! Metric sinks and the logger shapes adapted into them
//!
//! Reporters write through a single [`MetricSink`] contract: one named value
//! per step. Existing destinations keep their native verbs: a generic
//! [`MetricLogger`] exposes `log`, a summary-style [`ScalarWriter`] exposes
//! `add_scalar`. Each is adapted into a `MetricSink` at the construction
//! boundary with [`LoggerSink`] or [`WriterSink`], so reporter internals
//! never branch on the destination's concrete kind.
//!
//! # Example
//!
//! ```
//! use medir::sink::{ConsoleLogger, LoggerSink, MetricSink};
//!
//! # fn main() -> medir::Result<()> {
//! let mut sink = LoggerSink(ConsoleLogger::new());
//! sink.record("Train: Batches per second (step granularity)", 0.25, 1)?;
//! sink.flush()?;
//! # Ok(())
//! # }
//! ```

mod console;
mod csv;

pub use console::ConsoleLogger;
pub use csv::CsvScalarWriter;

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Destination for scalar metric values
pub trait MetricSink {
    /// Record one named value at a step
    fn record(&mut self, name: &str, value: f64, step: u64) -> Result<()>;

    /// Push buffered values to the destination
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Generic metric-logger shape: freeform name, value, step
pub trait MetricLogger {
    fn log(&mut self, name: &str, value: f64, step: u64) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Summary-writer shape: tagged scalar values
pub trait ScalarWriter {
    fn add_scalar(&mut self, tag: &str, value: f64, step: u64) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Adapts a [`MetricLogger`] into a [`MetricSink`]
#[derive(Debug, Clone)]
pub struct LoggerSink<L: MetricLogger>(pub L);

impl<L: MetricLogger> MetricSink for LoggerSink<L> {
    fn record(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        self.0.log(name, value, step)
    }

    fn flush(&mut self) -> Result<()> {
        self.0.flush()
    }
}

/// Adapts a [`ScalarWriter`] into a [`MetricSink`]
#[derive(Debug, Clone)]
pub struct WriterSink<W: ScalarWriter>(pub W);

impl<W: ScalarWriter> MetricSink for WriterSink<W> {
    fn record(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        self.0.add_scalar(name, value, step)
    }

    fn flush(&mut self) -> Result<()> {
        self.0.flush()
    }
}

/// A single recorded metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: f64,
    pub step: u64,
}

/// In-memory sink with a cloneable handle
///
/// All clones share one record list, so a test can hand a clone to a
/// reporter and inspect what was written through the original.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkInner>>,
}

#[derive(Debug, Default)]
struct MemorySinkInner {
    records: Vec<MetricRecord>,
    flushes: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in write order
    pub fn records(&self) -> Vec<MetricRecord> {
        self.lock().records.clone()
    }

    /// `(value, step)` pairs recorded under one metric name, oldest first
    pub fn values_for(&self, name: &str) -> Vec<(f64, u64)> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.name == name)
            .map(|r| (r.value, r.step))
            .collect()
    }

    /// Number of records written
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Number of times `flush` was called
    pub fn flush_count(&self) -> u64 {
        self.lock().flushes
    }

    /// Drop all records and reset the flush count
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.records.clear();
        inner.flushes = 0;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySinkInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricSink for MemorySink {
    fn record(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        self.lock().records.push(MetricRecord { name: name.to_string(), value, step });
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }
}

//! Step-level observability for machine-learning training loops
//!
//! medir is a thin callback layer over a training loop. The loop driver
//! ([`Runner`]) times every step: how long the batch took to arrive and how
//! long the iteration took to run. Reporter callbacks turn those timings
//! into metrics:
//!
//! - [`ThroughputCallback`] computes `count / (wait + iteration)` per second
//!   for each configured unit ("Batches", "Items", ...) at a step cadence.
//! - [`WaitTimeCallback`] republishes the newest batch wait time verbatim,
//!   gated to the coordinator process in distributed runs.
//!
//! Metrics flow through the [`MetricSink`] contract. Existing logger shapes
//! keep their own verbs and are adapted at construction with
//! [`LoggerSink`] and [`WriterSink`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use medir::{
//!     LoopState, MemorySink, Phase, Runner, RunnerOptions, ThroughputCallback, TrainUnit,
//! };
//!
//! struct Regression;
//!
//! impl TrainUnit for Regression {
//!     type Input = (f64, f64);
//!
//!     fn train_step(&mut self, _state: &LoopState, _input: (f64, f64)) -> medir::Result<()> {
//!         // forward, loss, backward
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> medir::Result<()> {
//! let sink = MemorySink::new();
//! let units = BTreeMap::from([("Batches".to_string(), 1_i64), ("Items".to_string(), 32)]);
//!
//! let mut runner = Runner::new(RunnerOptions { max_epochs: 2, ..RunnerOptions::default() })?;
//! runner.add_callback(ThroughputCallback::new(sink.clone(), units, 1)?);
//!
//! let mut unit = Regression;
//! let state = runner.train(&mut unit, || vec![(0.0, 1.0), (1.0, 3.0)])?;
//!
//! let trained = state.phase_state(Phase::Train).map(|ps| ps.progress().num_steps_completed);
//! assert_eq!(trained, Some(4));
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod distributed;
pub mod error;
pub mod progress;
pub mod runner;
pub mod sink;
pub mod state;
pub mod timer;

pub use callback::{Callback, CallbackHandler, ThroughputCallback, WaitTimeCallback};
pub use distributed::WorldInfo;
pub use error::{MedirError, Result};
pub use progress::Progress;
pub use runner::{EvalUnit, PredictUnit, Runner, RunnerOptions, TrainUnit};
pub use sink::{
    ConsoleLogger, CsvScalarWriter, LoggerSink, MemorySink, MetricLogger, MetricRecord,
    MetricSink, ScalarWriter, WriterSink,
};
pub use state::{LoopState, Phase, PhaseState, DATA_WAIT_TIME};
pub use timer::StepTimer;

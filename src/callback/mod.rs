//! Callback system for loop lifecycle events
//!
//! Provides hooks for every phase of a run: for train, eval, and predict
//! the loop fires `on_{phase}_start` / `on_{phase}_end`, epoch start/end,
//! and step start/end. Callbacks observe state and write metrics; they
//! cannot steer the loop, but any error they return stops it.
//!
//! # Example
//!
//! ```
//! use medir::{Callback, LoopState, Progress};
//!
//! struct StepPrinter;
//!
//! impl Callback for StepPrinter {
//!     fn on_train_step_end(&mut self, _state: &LoopState, progress: &Progress) -> medir::Result<()> {
//!         println!("completed step {}", progress.num_steps_completed);
//!         Ok(())
//!     }
//! }
//! ```

mod handler;
mod throughput;
mod traits;
mod wait_time;

pub use handler::CallbackHandler;
pub use throughput::ThroughputCallback;
pub use traits::Callback;
pub use wait_time::WaitTimeCallback;

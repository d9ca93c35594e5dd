//! Batch wait-time reporting callback

use crate::distributed::WorldInfo;
use crate::error::{MedirError, Result};
use crate::progress::Progress;
use crate::sink::MetricSink;
use crate::state::{LoopState, Phase, DATA_WAIT_TIME};

use super::traits::Callback;

/// Republishes the most recent batch wait time after each step
///
/// The loop already measures how long each batch took to arrive; this
/// callback forwards the newest sample verbatim under
/// `"Time Wait For Batch ({Phase})"`, tagged with the phase's completed-step
/// count. In a multi-process world only the coordinator emits, so the
/// metric appears once per step rather than once per rank.
#[derive(Debug)]
pub struct WaitTimeCallback<S: MetricSink> {
    sink: S,
    log_every_n_steps: u64,
    world: WorldInfo,
}

impl<S: MetricSink> WaitTimeCallback<S> {
    /// Report every step from a single-process world
    pub fn new(sink: S) -> Self {
        Self { sink, log_every_n_steps: 1, world: WorldInfo::single() }
    }

    /// Report only on steps divisible by `n`
    ///
    /// Fails if `n` is 0.
    pub fn with_log_every_n_steps(mut self, n: u64) -> Result<Self> {
        if n < 1 {
            return Err(MedirError::InvalidLogInterval(n));
        }
        self.log_every_n_steps = n;
        Ok(self)
    }

    /// Set the process-group identity used for coordinator gating
    pub fn with_world(mut self, world: WorldInfo) -> Self {
        self.world = world;
        self
    }

    fn step_end(&mut self, state: &LoopState, phase: Phase, progress: &Progress) -> Result<()> {
        if !self.world.is_coordinator() {
            return Ok(());
        }
        let step = progress.num_steps_completed;
        if !step.is_multiple_of(self.log_every_n_steps) {
            return Ok(());
        }
        let Some(phase_state) = state.phase_state(phase) else {
            return Ok(());
        };
        let Some(wait) = phase_state.timer().last(DATA_WAIT_TIME) else {
            return Ok(());
        };
        let name = format!("Time Wait For Batch ({})", phase.label());
        self.sink.record(&name, wait, step)
    }
}

impl<S: MetricSink + Send> Callback for WaitTimeCallback<S> {
    fn on_train_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.step_end(state, Phase::Train, progress)
    }

    fn on_train_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        self.sink.flush()
    }

    fn on_eval_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.step_end(state, Phase::Eval, progress)
    }

    fn on_eval_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        self.sink.flush()
    }

    fn on_predict_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.step_end(state, Phase::Predict, progress)
    }

    fn on_predict_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        self.sink.flush()
    }

    fn name(&self) -> &'static str {
        "WaitTimeCallback"
    }
}

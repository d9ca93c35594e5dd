//! Throughput reporting callback
//!
//! Computes per-second throughput from the loop's recorded wait and
//! iteration times and writes one metric per configured unit at a step
//! cadence. A step's cost is the wait for its batch plus the measured
//! iteration time; the throughput for a unit is `count / (wait + iteration)`.

use std::collections::BTreeMap;

use crate::error::{MedirError, Result};
use crate::progress::Progress;
use crate::sink::MetricSink;
use crate::state::{LoopState, Phase, DATA_WAIT_TIME};

use super::traits::Callback;

/// Where in the step lifecycle an evaluation happens
///
/// The wait sample paired with the newest iteration sample differs by site.
/// At a step-end hook the loop has already recorded the wait for the next
/// batch, so the relevant wait is the second-newest; at a step-start
/// evaluation the newest wait belongs to the step being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookSite {
    StepEnd,
    StepStart,
}

/// Reports computed throughput for configured units at a step cadence
///
/// `throughput_per_batch` maps a unit label, for example `"Batches"` or
/// `"Items"`, to how many of that unit one batch carries. For every logged
/// step the callback emits one value per unit under
/// `"{Phase}: {unit} per second (step granularity)"`.
///
/// Steps whose timings are not yet measurable are skipped silently: the
/// first step of a run has no completed iteration sample, and a non-positive
/// denominator is never divided by. Misconfiguration fails at construction
/// instead.
#[derive(Debug)]
pub struct ThroughputCallback<S: MetricSink> {
    sink: S,
    throughput_per_batch: BTreeMap<String, i64>,
    log_every_n_steps: u64,
}

impl<S: MetricSink> ThroughputCallback<S> {
    /// Create a reporter, validating its configuration
    ///
    /// Fails if the unit map is empty, any unit count is below 1, or
    /// `log_every_n_steps` is 0.
    pub fn new(
        sink: S,
        throughput_per_batch: BTreeMap<String, i64>,
        log_every_n_steps: u64,
    ) -> Result<Self> {
        if throughput_per_batch.is_empty() {
            return Err(MedirError::EmptyThroughput);
        }
        for (unit, count) in &throughput_per_batch {
            if *count < 1 {
                return Err(MedirError::InvalidThroughputCount {
                    unit: unit.clone(),
                    count: *count,
                });
            }
        }
        if log_every_n_steps < 1 {
            return Err(MedirError::InvalidLogInterval(log_every_n_steps));
        }
        Ok(Self { sink, throughput_per_batch, log_every_n_steps })
    }

    /// Evaluate one step against the phase's recorded durations
    ///
    /// Emits nothing unless `step_logging_for` is on the cadence, the phase
    /// has at least one iteration sample and two wait samples, and the
    /// combined time is positive.
    fn maybe_log_for_step(
        &mut self,
        state: &LoopState,
        phase: Phase,
        step_logging_for: u64,
        site: HookSite,
    ) -> Result<()> {
        if !step_logging_for.is_multiple_of(self.log_every_n_steps) {
            return Ok(());
        }
        let Some(phase_state) = state.phase_state(phase) else {
            return Ok(());
        };
        let timer = phase_state.timer();
        let Some(&iteration) = timer.durations(phase.iteration_time_key()).and_then(<[f64]>::last)
        else {
            return Ok(());
        };
        let waits = timer.durations(DATA_WAIT_TIME).unwrap_or(&[]);
        if waits.len() < 2 {
            return Ok(());
        }
        let wait = match site {
            HookSite::StepEnd => waits[waits.len() - 2],
            HookSite::StepStart => waits[waits.len() - 1],
        };
        let total = wait + iteration;
        if total <= 0.0 {
            return Ok(());
        }
        for (unit, count) in &self.throughput_per_batch {
            let name = format!("{}: {} per second (step granularity)", phase.label(), unit);
            self.sink.record(&name, *count as f64 / total, step_logging_for)?;
        }
        Ok(())
    }

    /// Step-end hook body: log for the previous step of this epoch
    ///
    /// The first step of each epoch is handled by the preceding epoch's
    /// epoch-end evaluation, so it is skipped here to emit each step once.
    fn step_end(&mut self, state: &LoopState, phase: Phase, progress: &Progress) -> Result<()> {
        if progress.num_steps_completed_in_epoch >= 2 {
            self.maybe_log_for_step(
                state,
                phase,
                progress.num_steps_completed - 1,
                HookSite::StepEnd,
            )?;
        }
        Ok(())
    }

    /// Epoch-end hook body: log for the epoch's final step
    fn epoch_end(&mut self, state: &LoopState, phase: Phase, progress: &Progress) -> Result<()> {
        if progress.num_steps_completed_in_epoch > 0 {
            self.maybe_log_for_step(
                state,
                phase,
                progress.num_steps_completed,
                HookSite::StepStart,
            )?;
        }
        Ok(())
    }
}

impl<S: MetricSink + Send> Callback for ThroughputCallback<S> {
    fn on_train_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.step_end(state, Phase::Train, progress)
    }

    fn on_train_epoch_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.epoch_end(state, Phase::Train, progress)
    }

    fn on_train_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        self.sink.flush()
    }

    fn on_eval_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.step_end(state, Phase::Eval, progress)
    }

    fn on_eval_epoch_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.epoch_end(state, Phase::Eval, progress)
    }

    fn on_eval_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        self.sink.flush()
    }

    fn on_predict_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.step_end(state, Phase::Predict, progress)
    }

    fn on_predict_epoch_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        self.epoch_end(state, Phase::Predict, progress)
    }

    fn on_predict_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        self.sink.flush()
    }

    fn name(&self) -> &'static str {
        "ThroughputCallback"
    }
}

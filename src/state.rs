//! Execution state shared between the loop and its callbacks
//!
//! A [`LoopState`] threads through a whole run. Each phase that starts gets
//! its own [`PhaseState`] holding a timer and progress counters, so a fit
//! run's evaluation steps never disturb the training phase's measurements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::progress::Progress;
use crate::timer::StepTimer;

/// Timer category for the wait between requesting a batch and its arrival
pub const DATA_WAIT_TIME: &str = "data_wait_time";

/// Execution phase of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Train,
    Eval,
    Predict,
}

impl Phase {
    /// Label used in metric names
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Train => "Train",
            Phase::Eval => "Eval",
            Phase::Predict => "Predict",
        }
    }

    /// Timer category for this phase's per-step iteration time
    pub fn iteration_time_key(&self) -> &'static str {
        match self {
            Phase::Train => "train_iteration_time",
            Phase::Eval => "eval_iteration_time",
            Phase::Predict => "predict_iteration_time",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Timer and progress for one phase
#[derive(Debug, Clone, Default)]
pub struct PhaseState {
    timer: StepTimer,
    progress: Progress,
}

impl PhaseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> &StepTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut StepTimer {
        &mut self.timer
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut Progress {
        &mut self.progress
    }
}

/// Mutable state for a loop run
///
/// Phase states are created lazily the first time the loop enters a phase
/// and live for the rest of the run, so timings accumulate across epochs
/// and across the interleaved passes of a fit.
#[derive(Debug, Clone, Default)]
pub struct LoopState {
    active_phase: Option<Phase>,
    train: Option<PhaseState>,
    eval: Option<PhaseState>,
    predict: Option<PhaseState>,
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `phase` active, creating its state on first entry
    pub fn enter_phase(&mut self, phase: Phase) -> &mut PhaseState {
        self.active_phase = Some(phase);
        self.slot_mut(phase).get_or_insert_with(PhaseState::new)
    }

    /// State for a phase, if that phase has started
    pub fn phase_state(&self, phase: Phase) -> Option<&PhaseState> {
        match phase {
            Phase::Train => self.train.as_ref(),
            Phase::Eval => self.eval.as_ref(),
            Phase::Predict => self.predict.as_ref(),
        }
    }

    /// Mutable state for a phase, if that phase has started
    pub fn phase_state_mut(&mut self, phase: Phase) -> Option<&mut PhaseState> {
        self.slot_mut(phase).as_mut()
    }

    /// Currently active phase, if any pass has started
    pub fn active_phase(&self) -> Option<Phase> {
        self.active_phase
    }

    /// State for the active phase
    pub fn active_state(&self) -> Option<&PhaseState> {
        self.active_phase.and_then(|phase| self.phase_state(phase))
    }

    fn slot_mut(&mut self, phase: Phase) -> &mut Option<PhaseState> {
        match phase {
            Phase::Train => &mut self.train,
            Phase::Eval => &mut self.eval,
            Phase::Predict => &mut self.predict,
        }
    }
}

//! Loop driver for train, evaluate, predict, and fit runs
//!
//! The runner owns the callbacks and the measurement discipline. For every
//! step it times the wait for the batch, opens an iteration span covering
//! the step hooks and the unit's work, and records both durations into the
//! active phase's timer. Reporters never measure anything themselves; they
//! read what the runner recorded.
//!
//! # Example
//!
//! ```
//! use medir::{LoopState, Runner, RunnerOptions, TrainUnit};
//!
//! struct Summer {
//!     total: u64,
//! }
//!
//! impl TrainUnit for Summer {
//!     type Input = u64;
//!
//!     fn train_step(&mut self, _state: &LoopState, input: u64) -> medir::Result<()> {
//!         self.total += input;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> medir::Result<()> {
//! let mut runner = Runner::new(RunnerOptions::default())?;
//! let mut unit = Summer { total: 0 };
//! runner.train(&mut unit, || vec![1, 2, 3])?;
//! assert_eq!(unit.total, 6);
//! # Ok(())
//! # }
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::callback::{Callback, CallbackHandler};
use crate::error::{MedirError, Result};
use crate::progress::Progress;
use crate::state::{LoopState, Phase, DATA_WAIT_TIME};

/// Unit of training work: one optimizer step per input
pub trait TrainUnit {
    type Input;

    fn train_step(&mut self, state: &LoopState, input: Self::Input) -> Result<()>;
}

/// Unit of evaluation work
pub trait EvalUnit {
    type Input;

    fn eval_step(&mut self, state: &LoopState, input: Self::Input) -> Result<()>;
}

/// Unit of prediction work
pub trait PredictUnit {
    type Input;

    fn predict_step(&mut self, state: &LoopState, input: Self::Input) -> Result<()>;
}

/// Loop bounds and evaluation cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerOptions {
    /// Training epochs to run
    pub max_epochs: u64,
    /// Per-epoch step cap; `None` runs each loader to exhaustion
    pub max_steps_per_epoch: Option<u64>,
    /// During fit, evaluate after every n-th training epoch
    pub evaluate_every_n_epochs: u64,
}

impl RunnerOptions {
    /// Check every bound is positive
    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(MedirError::InvalidMaxEpochs(self.max_epochs));
        }
        if let Some(cap) = self.max_steps_per_epoch {
            if cap == 0 {
                return Err(MedirError::InvalidStepCap(cap));
            }
        }
        if self.evaluate_every_n_epochs == 0 {
            return Err(MedirError::InvalidEvalInterval(self.evaluate_every_n_epochs));
        }
        Ok(())
    }
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self { max_epochs: 1, max_steps_per_epoch: None, evaluate_every_n_epochs: 1 }
    }
}

/// Drives unit steps while recording timings and firing callbacks
///
/// Entry points return the final [`LoopState`] so callers can inspect the
/// recorded durations and progress counters of each phase.
pub struct Runner {
    callbacks: CallbackHandler,
    options: RunnerOptions,
}

impl Runner {
    /// Create a runner, validating the options
    pub fn new(options: RunnerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { callbacks: CallbackHandler::new(), options })
    }

    /// Add a callback; dispatch order is registration order
    pub fn add_callback<C: Callback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Train for the configured number of epochs
    ///
    /// `loader_fn` is called once per epoch to produce that epoch's batches.
    pub fn train<U, B, I>(&mut self, unit: &mut U, loader_fn: B) -> Result<LoopState>
    where
        U: TrainUnit,
        B: Fn() -> I,
        I: IntoIterator<Item = U::Input>,
    {
        let mut state = LoopState::new();

        state.enter_phase(Phase::Train);
        let progress = progress_of(&state, Phase::Train);
        self.callbacks.on_train_start(&state, &progress)?;

        for _ in 0..self.options.max_epochs {
            state.enter_phase(Phase::Train);
            self.run_one_epoch(&mut state, Phase::Train, loader_fn(), &mut |st, input| {
                unit.train_step(st, input)
            })?;
        }

        let progress = progress_of(&state, Phase::Train);
        self.callbacks.on_train_end(&state, &progress)?;
        Ok(state)
    }

    /// Run a single evaluation pass over the loader
    pub fn evaluate<U, B, I>(&mut self, unit: &mut U, loader_fn: B) -> Result<LoopState>
    where
        U: EvalUnit,
        B: Fn() -> I,
        I: IntoIterator<Item = U::Input>,
    {
        let mut state = LoopState::new();
        self.eval_pass(&mut state, unit, &loader_fn)?;
        Ok(state)
    }

    /// Run a single prediction pass over the loader
    pub fn predict<U, B, I>(&mut self, unit: &mut U, loader_fn: B) -> Result<LoopState>
    where
        U: PredictUnit,
        B: Fn() -> I,
        I: IntoIterator<Item = U::Input>,
    {
        let mut state = LoopState::new();

        state.enter_phase(Phase::Predict);
        let progress = progress_of(&state, Phase::Predict);
        self.callbacks.on_predict_start(&state, &progress)?;

        self.run_one_epoch(&mut state, Phase::Predict, loader_fn(), &mut |st, input| {
            unit.predict_step(st, input)
        })?;

        let progress = progress_of(&state, Phase::Predict);
        self.callbacks.on_predict_end(&state, &progress)?;
        Ok(state)
    }

    /// Train with interleaved evaluation passes, sharing one state
    ///
    /// After every `evaluate_every_n_epochs`-th training epoch the runner
    /// makes one evaluation pass. Each phase keeps its own progress and
    /// timings in the shared [`LoopState`].
    pub fn fit<U, TB, TI, EB, EI>(
        &mut self,
        unit: &mut U,
        train_loader_fn: TB,
        eval_loader_fn: EB,
    ) -> Result<LoopState>
    where
        U: TrainUnit + EvalUnit,
        TB: Fn() -> TI,
        TI: IntoIterator<Item = <U as TrainUnit>::Input>,
        EB: Fn() -> EI,
        EI: IntoIterator<Item = <U as EvalUnit>::Input>,
    {
        let mut state = LoopState::new();

        state.enter_phase(Phase::Train);
        let progress = progress_of(&state, Phase::Train);
        self.callbacks.on_train_start(&state, &progress)?;

        for epoch in 1..=self.options.max_epochs {
            state.enter_phase(Phase::Train);
            self.run_one_epoch(&mut state, Phase::Train, train_loader_fn(), &mut |st, input| {
                TrainUnit::train_step(unit, st, input)
            })?;

            if epoch.is_multiple_of(self.options.evaluate_every_n_epochs) {
                self.eval_pass(&mut state, unit, &eval_loader_fn)?;
            }
        }

        let progress = progress_of(&state, Phase::Train);
        self.callbacks.on_train_end(&state, &progress)?;
        Ok(state)
    }

    fn eval_pass<U, B, I>(&mut self, state: &mut LoopState, unit: &mut U, loader_fn: &B) -> Result<()>
    where
        U: EvalUnit,
        B: Fn() -> I,
        I: IntoIterator<Item = U::Input>,
    {
        state.enter_phase(Phase::Eval);
        let progress = progress_of(state, Phase::Eval);
        self.callbacks.on_eval_start(state, &progress)?;

        self.run_one_epoch(state, Phase::Eval, loader_fn(), &mut |st, input| {
            unit.eval_step(st, input)
        })?;

        let progress = progress_of(state, Phase::Eval);
        self.callbacks.on_eval_end(state, &progress)
    }

    /// One pass over `batches` with the full measurement discipline
    ///
    /// Per step: time the wait for the batch (recorded only when one
    /// arrives), open the iteration span, fire step start, run the unit,
    /// advance progress, fire step end, then close the span. Epoch hooks
    /// bracket the loop; the epoch-end hook fires before the epoch counter
    /// advances so callbacks still see the epoch's step tally.
    fn run_one_epoch<I, F>(
        &mut self,
        state: &mut LoopState,
        phase: Phase,
        batches: I,
        step_fn: &mut F,
    ) -> Result<()>
    where
        I: IntoIterator,
        F: FnMut(&LoopState, I::Item) -> Result<()>,
    {
        let progress = progress_of(state, phase);
        self.dispatch_epoch_start(phase, state, &progress)?;

        let mut batches = batches.into_iter();
        let mut steps_this_epoch = 0u64;

        loop {
            if let Some(cap) = self.options.max_steps_per_epoch {
                if steps_this_epoch >= cap {
                    break;
                }
            }

            let fetch_start = Instant::now();
            let Some(input) = batches.next() else {
                break;
            };
            record_duration(state, phase, DATA_WAIT_TIME, fetch_start.elapsed().as_secs_f64());

            let iteration_start = Instant::now();

            let progress = progress_of(state, phase);
            self.dispatch_step_start(phase, state, &progress)?;

            step_fn(state, input)?;
            if let Some(phase_state) = state.phase_state_mut(phase) {
                phase_state.progress_mut().increment_step();
            }

            let progress = progress_of(state, phase);
            self.dispatch_step_end(phase, state, &progress)?;

            record_duration(
                state,
                phase,
                phase.iteration_time_key(),
                iteration_start.elapsed().as_secs_f64(),
            );
            steps_this_epoch += 1;
        }

        let progress = progress_of(state, phase);
        self.dispatch_epoch_end(phase, state, &progress)?;
        if let Some(phase_state) = state.phase_state_mut(phase) {
            phase_state.progress_mut().increment_epoch();
        }
        Ok(())
    }

    fn dispatch_epoch_start(
        &mut self,
        phase: Phase,
        state: &LoopState,
        progress: &Progress,
    ) -> Result<()> {
        match phase {
            Phase::Train => self.callbacks.on_train_epoch_start(state, progress),
            Phase::Eval => self.callbacks.on_eval_epoch_start(state, progress),
            Phase::Predict => self.callbacks.on_predict_epoch_start(state, progress),
        }
    }

    fn dispatch_step_start(
        &mut self,
        phase: Phase,
        state: &LoopState,
        progress: &Progress,
    ) -> Result<()> {
        match phase {
            Phase::Train => self.callbacks.on_train_step_start(state, progress),
            Phase::Eval => self.callbacks.on_eval_step_start(state, progress),
            Phase::Predict => self.callbacks.on_predict_step_start(state, progress),
        }
    }

    fn dispatch_step_end(
        &mut self,
        phase: Phase,
        state: &LoopState,
        progress: &Progress,
    ) -> Result<()> {
        match phase {
            Phase::Train => self.callbacks.on_train_step_end(state, progress),
            Phase::Eval => self.callbacks.on_eval_step_end(state, progress),
            Phase::Predict => self.callbacks.on_predict_step_end(state, progress),
        }
    }

    fn dispatch_epoch_end(
        &mut self,
        phase: Phase,
        state: &LoopState,
        progress: &Progress,
    ) -> Result<()> {
        match phase {
            Phase::Train => self.callbacks.on_train_epoch_end(state, progress),
            Phase::Eval => self.callbacks.on_eval_epoch_end(state, progress),
            Phase::Predict => self.callbacks.on_predict_epoch_end(state, progress),
        }
    }
}

/// Copy of a phase's progress, zero if the phase has not started
fn progress_of(state: &LoopState, phase: Phase) -> Progress {
    state.phase_state(phase).map_or_else(Progress::new, |ps| *ps.progress())
}

fn record_duration(state: &mut LoopState, phase: Phase, category: &str, seconds: f64) {
    if let Some(phase_state) = state.phase_state_mut(phase) {
        phase_state.timer_mut().record(category, seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::{Arc, Mutex, PoisonError};

    struct CountingUnit {
        train_steps: u64,
        eval_steps: u64,
        predict_steps: u64,
        fail_on_train_step: Option<u64>,
    }

    impl CountingUnit {
        fn new() -> Self {
            Self { train_steps: 0, eval_steps: 0, predict_steps: 0, fail_on_train_step: None }
        }
    }

    impl TrainUnit for CountingUnit {
        type Input = u64;

        fn train_step(&mut self, _state: &LoopState, _input: u64) -> Result<()> {
            self.train_steps += 1;
            if self.fail_on_train_step == Some(self.train_steps) {
                return Err(MedirError::StepFailed("loss diverged".to_string()));
            }
            Ok(())
        }
    }

    impl EvalUnit for CountingUnit {
        type Input = u64;

        fn eval_step(&mut self, _state: &LoopState, _input: u64) -> Result<()> {
            self.eval_steps += 1;
            Ok(())
        }
    }

    impl PredictUnit for CountingUnit {
        type Input = u64;

        fn predict_step(&mut self, _state: &LoopState, _input: u64) -> Result<()> {
            self.predict_steps += 1;
            Ok(())
        }
    }

    /// Records the order of fired hooks
    struct EventRecorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl EventRecorder {
        fn push(&self, event: &str) {
            self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.to_string());
        }
    }

    impl Callback for EventRecorder {
        fn on_train_start(&mut self, _: &LoopState, _: &Progress) -> Result<()> {
            self.push("train_start");
            Ok(())
        }

        fn on_train_epoch_start(&mut self, _: &LoopState, _: &Progress) -> Result<()> {
            self.push("epoch_start");
            Ok(())
        }

        fn on_train_step_start(&mut self, _: &LoopState, _: &Progress) -> Result<()> {
            self.push("step_start");
            Ok(())
        }

        fn on_train_step_end(&mut self, _: &LoopState, progress: &Progress) -> Result<()> {
            self.push(&format!("step_end:{}", progress.num_steps_completed));
            Ok(())
        }

        fn on_train_epoch_end(&mut self, _: &LoopState, progress: &Progress) -> Result<()> {
            self.push(&format!("epoch_end:{}", progress.num_steps_completed_in_epoch));
            Ok(())
        }

        fn on_train_end(&mut self, _: &LoopState, _: &Progress) -> Result<()> {
            self.push("train_end");
            Ok(())
        }

        fn on_eval_start(&mut self, _: &LoopState, _: &Progress) -> Result<()> {
            self.push("eval_start");
            Ok(())
        }

        fn on_eval_end(&mut self, _: &LoopState, _: &Progress) -> Result<()> {
            self.push("eval_end");
            Ok(())
        }

        fn name(&self) -> &'static str {
            "EventRecorder"
        }
    }

    fn options(max_epochs: u64) -> RunnerOptions {
        RunnerOptions { max_epochs, ..RunnerOptions::default() }
    }

    #[test]
    fn test_options_validation() {
        assert!(RunnerOptions::default().validate().is_ok());

        let err = options(0).validate().unwrap_err();
        assert!(err.to_string().contains("max epochs"));

        let bad_cap = RunnerOptions {
            max_steps_per_epoch: Some(0),
            ..RunnerOptions::default()
        };
        assert!(bad_cap.validate().unwrap_err().to_string().contains("max steps"));

        let bad_interval = RunnerOptions {
            evaluate_every_n_epochs: 0,
            ..RunnerOptions::default()
        };
        assert!(bad_interval.validate().unwrap_err().to_string().contains("evaluation interval"));

        assert!(Runner::new(options(0)).is_err());
    }

    #[test]
    fn test_options_serde_round_trip() {
        let opts = RunnerOptions {
            max_epochs: 3,
            max_steps_per_epoch: Some(7),
            evaluate_every_n_epochs: 2,
        };
        let json = serde_json::to_string(&opts).expect("serialize should succeed");
        let back: RunnerOptions = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(opts, back);
    }

    #[test]
    fn test_train_runs_epochs_times_steps() {
        let mut runner = Runner::new(options(3)).expect("options should be valid");
        let mut unit = CountingUnit::new();

        let state = runner.train(&mut unit, || vec![10, 20]).expect("train should succeed");

        assert_eq!(unit.train_steps, 6);
        let progress = state.phase_state(Phase::Train).map(|ps| *ps.progress());
        assert_eq!(
            progress,
            Some(Progress {
                num_steps_completed: 6,
                num_steps_completed_in_epoch: 0,
                num_epochs_completed: 3,
            })
        );
    }

    #[test]
    fn test_train_records_one_sample_per_step_per_category() {
        let mut runner = Runner::new(options(2)).expect("options should be valid");
        let mut unit = CountingUnit::new();

        let state = runner.train(&mut unit, || vec![1, 2, 3]).expect("train should succeed");

        let timer = state.phase_state(Phase::Train).map(|ps| ps.timer());
        let waits = timer.and_then(|t| t.durations(DATA_WAIT_TIME)).unwrap_or(&[]);
        let iterations =
            timer.and_then(|t| t.durations(Phase::Train.iteration_time_key())).unwrap_or(&[]);
        assert_eq!(waits.len(), 6);
        assert_eq!(iterations.len(), 6);
        assert!(waits.iter().all(|&w| w >= 0.0));
        assert!(iterations.iter().all(|&i| i >= 0.0));
    }

    #[test]
    fn test_step_cap_limits_each_epoch() {
        let opts = RunnerOptions {
            max_epochs: 2,
            max_steps_per_epoch: Some(2),
            evaluate_every_n_epochs: 1,
        };
        let mut runner = Runner::new(opts).expect("options should be valid");
        let mut unit = CountingUnit::new();

        runner.train(&mut unit, || vec![1, 2, 3, 4, 5]).expect("train should succeed");
        assert_eq!(unit.train_steps, 4);
    }

    #[test]
    fn test_loader_called_once_per_epoch() {
        let calls = Cell::new(0u64);
        let mut runner = Runner::new(options(3)).expect("options should be valid");
        let mut unit = CountingUnit::new();

        runner
            .train(&mut unit, || {
                calls.set(calls.get() + 1);
                vec![1]
            })
            .expect("train should succeed");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_hook_order_for_one_epoch() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut runner = Runner::new(options(1)).expect("options should be valid");
        runner.add_callback(EventRecorder { events: events.clone() });
        let mut unit = CountingUnit::new();

        runner.train(&mut unit, || vec![1, 2]).expect("train should succeed");

        let recorded = events.lock().unwrap_or_else(PoisonError::into_inner).clone();
        assert_eq!(
            recorded,
            vec![
                "train_start",
                "epoch_start",
                "step_start",
                "step_end:1",
                "step_start",
                "step_end:2",
                "epoch_end:2",
                "train_end",
            ]
        );
    }

    #[test]
    fn test_unit_error_stops_run() {
        let mut runner = Runner::new(options(1)).expect("options should be valid");
        let mut unit = CountingUnit::new();
        unit.fail_on_train_step = Some(2);

        let err = runner.train(&mut unit, || vec![1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("loss diverged"));
        assert_eq!(unit.train_steps, 2);
    }

    #[test]
    fn test_callback_error_stops_run() {
        struct Bomb;
        impl Callback for Bomb {
            fn on_train_step_end(&mut self, _: &LoopState, _: &Progress) -> Result<()> {
                Err(MedirError::Sink("unreachable backend".to_string()))
            }
        }

        let mut runner = Runner::new(options(1)).expect("options should be valid");
        runner.add_callback(Bomb);
        let mut unit = CountingUnit::new();

        let err = runner.train(&mut unit, || vec![1, 2]).unwrap_err();
        assert!(err.to_string().contains("unreachable backend"));
        assert_eq!(unit.train_steps, 1);
    }

    #[test]
    fn test_evaluate_is_single_pass() {
        let mut runner = Runner::new(options(5)).expect("options should be valid");
        let mut unit = CountingUnit::new();

        let state = runner.evaluate(&mut unit, || vec![1, 2, 3]).expect("evaluate should succeed");

        // max_epochs applies to training, not evaluation passes
        assert_eq!(unit.eval_steps, 3);
        let progress = state.phase_state(Phase::Eval).map(|ps| *ps.progress());
        assert_eq!(
            progress,
            Some(Progress {
                num_steps_completed: 3,
                num_steps_completed_in_epoch: 0,
                num_epochs_completed: 1,
            })
        );
        assert!(state.phase_state(Phase::Train).is_none());
    }

    #[test]
    fn test_predict_is_single_pass() {
        let mut runner = Runner::new(options(5)).expect("options should be valid");
        let mut unit = CountingUnit::new();

        let state = runner.predict(&mut unit, || vec![1, 2]).expect("predict should succeed");

        assert_eq!(unit.predict_steps, 2);
        let steps = state
            .phase_state(Phase::Predict)
            .map(|ps| ps.progress().num_steps_completed);
        assert_eq!(steps, Some(2));
    }

    #[test]
    fn test_fit_interleaves_eval_on_interval() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let opts = RunnerOptions {
            max_epochs: 4,
            max_steps_per_epoch: None,
            evaluate_every_n_epochs: 2,
        };
        let mut runner = Runner::new(opts).expect("options should be valid");
        runner.add_callback(EventRecorder { events: events.clone() });
        let mut unit = CountingUnit::new();

        let state = runner
            .fit(&mut unit, || vec![1], || vec![1, 2])
            .expect("fit should succeed");

        // Eval after epochs 2 and 4
        assert_eq!(unit.train_steps, 4);
        assert_eq!(unit.eval_steps, 4);
        let eval_epochs = state
            .phase_state(Phase::Eval)
            .map(|ps| ps.progress().num_epochs_completed);
        assert_eq!(eval_epochs, Some(2));

        let recorded = events.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let eval_starts = recorded.iter().filter(|e| *e == "eval_start").count();
        assert_eq!(eval_starts, 2);
        // Single train_start/train_end pair brackets the whole fit
        assert_eq!(recorded.first().map(String::as_str), Some("train_start"));
        assert_eq!(recorded.last().map(String::as_str), Some("train_end"));
    }

    #[test]
    fn test_fit_keeps_phase_progress_separate() {
        let opts = RunnerOptions {
            max_epochs: 2,
            max_steps_per_epoch: None,
            evaluate_every_n_epochs: 1,
        };
        let mut runner = Runner::new(opts).expect("options should be valid");
        let mut unit = CountingUnit::new();

        let state = runner
            .fit(&mut unit, || vec![1, 2, 3], || vec![1])
            .expect("fit should succeed");

        let train_steps = state
            .phase_state(Phase::Train)
            .map(|ps| ps.progress().num_steps_completed);
        let eval_steps = state
            .phase_state(Phase::Eval)
            .map(|ps| ps.progress().num_steps_completed);
        assert_eq!(train_steps, Some(6));
        assert_eq!(eval_steps, Some(2));
    }

    #[test]
    fn test_empty_loader_fires_epoch_hooks_only() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut runner = Runner::new(options(1)).expect("options should be valid");
        runner.add_callback(EventRecorder { events: events.clone() });
        let mut unit = CountingUnit::new();

        runner.train(&mut unit, Vec::new).expect("train should succeed");

        let recorded = events.lock().unwrap_or_else(PoisonError::into_inner).clone();
        assert_eq!(recorded, vec!["train_start", "epoch_start", "epoch_end:0", "train_end"]);
        assert_eq!(unit.train_steps, 0);
    }
}

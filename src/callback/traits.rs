//! The callback trait for loop lifecycle events

use crate::error::Result;
use crate::progress::Progress;
use crate::state::LoopState;

/// Trait for loop lifecycle callbacks
///
/// Every hook has a default no-op implementation, so a callback implements
/// only the events it cares about. Hooks receive read-only views: the full
/// [`LoopState`] and the running phase's [`Progress`]. Nothing flows back
/// into the loop except an error, which stops the run.
pub trait Callback: Send {
    /// Called once before the first training epoch
    fn on_train_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called before each training epoch
    fn on_train_epoch_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called before each training step, after its batch arrived
    fn on_train_step_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called after each training step, inside its iteration span
    fn on_train_step_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called after each training epoch, before the epoch counter advances
    fn on_train_epoch_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called once after the last training epoch
    fn on_train_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called once before an evaluation pass
    fn on_eval_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called before each evaluation epoch
    fn on_eval_epoch_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called before each evaluation step, after its batch arrived
    fn on_eval_step_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called after each evaluation step, inside its iteration span
    fn on_eval_step_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called after each evaluation epoch, before the epoch counter advances
    fn on_eval_epoch_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called once after an evaluation pass
    fn on_eval_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called once before a prediction pass
    fn on_predict_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called before each prediction epoch
    fn on_predict_epoch_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called before each prediction step, after its batch arrived
    fn on_predict_step_start(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called after each prediction step, inside its iteration span
    fn on_predict_step_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called after each prediction epoch, before the epoch counter advances
    fn on_predict_epoch_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Called once after a prediction pass
    fn on_predict_end(&mut self, _state: &LoopState, _progress: &Progress) -> Result<()> {
        Ok(())
    }

    /// Callback name for diagnostics
    fn name(&self) -> &'static str {
        "Callback"
    }
}

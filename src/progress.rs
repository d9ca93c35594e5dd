//! Per-phase progress counters

use serde::{Deserialize, Serialize};

/// Progress counters for one execution phase
///
/// Counts completed work only: a step or epoch is counted after it finishes.
/// Each phase of a loop run keeps its own `Progress`, so evaluation steps
/// never advance the training step count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Steps completed across all epochs of the phase
    pub num_steps_completed: u64,
    /// Steps completed in the current epoch
    pub num_steps_completed_in_epoch: u64,
    /// Epochs completed
    pub num_epochs_completed: u64,
}

impl Progress {
    /// Counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed step
    pub fn increment_step(&mut self) {
        self.num_steps_completed += 1;
        self.num_steps_completed_in_epoch += 1;
    }

    /// Record one completed epoch, resetting the in-epoch step count
    pub fn increment_epoch(&mut self) {
        self.num_epochs_completed += 1;
        self.num_steps_completed_in_epoch = 0;
    }
}

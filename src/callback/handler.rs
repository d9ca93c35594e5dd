//! Callback handler for dispatching loop events to multiple callbacks

use crate::error::Result;
use crate::progress::Progress;
use crate::state::LoopState;

use super::traits::Callback;

/// Dispatches loop events to registered callbacks in registration order
///
/// Dispatch is fail-fast: the first callback error aborts the event and
/// is returned to the loop unmodified.
pub struct CallbackHandler {
    callbacks: Vec<Box<dyn Callback>>,
}

impl CallbackHandler {
    /// Create an empty handler
    pub fn new() -> Self {
        Self { callbacks: Vec::new() }
    }

    /// Add a callback; it fires after all previously added callbacks
    pub fn add<C: Callback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Fire train start
    pub fn on_train_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire train epoch start
    pub fn on_train_epoch_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_epoch_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire train step start
    pub fn on_train_step_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_step_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire train step end
    pub fn on_train_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_step_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire train epoch end
    pub fn on_train_epoch_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_epoch_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire train end
    pub fn on_train_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_train_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire eval start
    pub fn on_eval_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_eval_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire eval epoch start
    pub fn on_eval_epoch_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_eval_epoch_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire eval step start
    pub fn on_eval_step_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_eval_step_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire eval step end
    pub fn on_eval_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_eval_step_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire eval epoch end
    pub fn on_eval_epoch_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_eval_epoch_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire eval end
    pub fn on_eval_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_eval_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire predict start
    pub fn on_predict_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_predict_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire predict epoch start
    pub fn on_predict_epoch_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_predict_epoch_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire predict step start
    pub fn on_predict_step_start(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_predict_step_start(state, progress)?;
        }
        Ok(())
    }

    /// Fire predict step end
    pub fn on_predict_step_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_predict_step_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire predict epoch end
    pub fn on_predict_epoch_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_predict_epoch_end(state, progress)?;
        }
        Ok(())
    }

    /// Fire predict end
    pub fn on_predict_end(&mut self, state: &LoopState, progress: &Progress) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_predict_end(state, progress)?;
        }
        Ok(())
    }
}

impl Default for CallbackHandler {
    fn default() -> Self {
        Self::new()
    }
}

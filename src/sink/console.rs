//! Console metric output

use crate::error::Result;

use super::MetricLogger;

/// Logger that prints one line per metric to stdout
///
/// Output format: `[step N] name = value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl ConsoleLogger {
    pub fn new() -> Self {
        Self
    }
}

impl MetricLogger for ConsoleLogger {
    fn log(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        println!("[step {step}] {name} = {value:.6}");
        Ok(())
    }
}

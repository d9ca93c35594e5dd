//! Error types for metric reporting and loop execution
//!
//! Reporter construction fails eagerly with an error naming the offending
//! field and value; per-step evaluation never fails for data reasons, it
//! skips. Sink write failures propagate out of the loop unmodified.

/// Crate-wide error type
#[derive(Debug, thiserror::Error)]
pub enum MedirError {
    #[error("throughput_per_batch cannot be empty")]
    EmptyThroughput,

    #[error("throughput_per_batch item {unit} must be at least 1, got {count}")]
    InvalidThroughputCount { unit: String, count: i64 },

    #[error("log_every_n_steps must be at least 1, got {0}")]
    InvalidLogInterval(u64),

    #[error("Invalid world size: {0} (must be > 0)")]
    InvalidWorldSize(u32),

    #[error("Invalid rank: {rank} (must be < world size {world_size})")]
    InvalidRank { rank: u32, world_size: u32 },

    #[error("Invalid max epochs: {0} (must be > 0)")]
    InvalidMaxEpochs(u64),

    #[error("Invalid max steps per epoch: {0} (must be > 0)")]
    InvalidStepCap(u64),

    #[error("Invalid evaluation interval: {0} (must be > 0)")]
    InvalidEvalInterval(u64),

    #[error("Unit step failed: {0}")]
    StepFailed(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for crate operations
pub type Result<T> = std::result::Result<T, MedirError>;

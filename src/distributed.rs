//! Process-group identity for coordinator-gated reporting

use serde::{Deserialize, Serialize};

use crate::error::{MedirError, Result};

/// Rank and world size of the running process
///
/// Reporters that must emit from exactly one process take a `WorldInfo` at
/// construction instead of consulting global process-group state. Tests pass
/// a non-coordinator rank directly; production code can use [`from_env`].
///
/// [`from_env`]: WorldInfo::from_env
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldInfo {
    rank: u32,
    world_size: u32,
}

impl WorldInfo {
    /// Create from an explicit rank and world size
    pub fn new(rank: u32, world_size: u32) -> Result<Self> {
        if world_size == 0 {
            return Err(MedirError::InvalidWorldSize(world_size));
        }
        if rank >= world_size {
            return Err(MedirError::InvalidRank { rank, world_size });
        }
        Ok(Self { rank, world_size })
    }

    /// Single-process world: rank 0 of 1
    pub fn single() -> Self {
        Self { rank: 0, world_size: 1 }
    }

    /// Read `RANK` and `WORLD_SIZE` from the environment
    ///
    /// Falls back to [`single`](WorldInfo::single) when either variable is
    /// absent, malformed, or inconsistent.
    pub fn from_env() -> Self {
        let rank = std::env::var("RANK").ok().and_then(|v| v.parse().ok());
        let world_size = std::env::var("WORLD_SIZE").ok().and_then(|v| v.parse().ok());
        match (rank, world_size) {
            (Some(rank), Some(world_size)) => {
                Self::new(rank, world_size).unwrap_or_else(|_| Self::single())
            }
            _ => Self::single(),
        }
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    /// Whether this process is the coordinator (rank 0)
    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    /// Whether more than one process participates
    pub fn is_distributed(&self) -> bool {
        self.world_size > 1
    }
}

impl Default for WorldInfo {
    fn default() -> Self {
        Self::single()
    }
}

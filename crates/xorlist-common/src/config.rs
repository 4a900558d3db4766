//! Configuration structures for xorlist.

use crate::error::{Result, XorListError};
use serde::{Deserialize, Serialize};

/// Default capacity of the first arena block, in nodes.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Default multiplier applied to each new block's capacity.
pub const DEFAULT_GROWTH_RATE: f64 = 2.0;

/// Startup options for a list and its node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Capacity of the first block, in nodes.
    pub block_size: usize,
    /// Multiplier applied to the previous block's capacity when growing.
    pub growth_rate: f64,
    /// Pre-allocates a first block of exactly this many nodes at creation,
    /// replacing `block_size` for block 1.
    pub initial_capacity: Option<usize>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            growth_rate: DEFAULT_GROWTH_RATE,
            initial_capacity: None,
        }
    }
}

impl ListConfig {
    /// Checks every option against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(invalid("block_size", self.block_size));
        }
        if !self.growth_rate.is_finite() || self.growth_rate <= 1.0 {
            return Err(invalid("growth_rate", self.growth_rate));
        }
        if self.initial_capacity == Some(0) {
            return Err(invalid("initial_capacity", 0));
        }
        Ok(())
    }

    /// Returns the capacity of the block allocated after one of `previous` nodes.
    ///
    /// Truncates toward zero and never returns less than one.
    pub fn next_capacity(&self, previous: usize) -> usize {
        let grown = previous as f64 * self.growth_rate;
        if grown >= usize::MAX as f64 {
            usize::MAX
        } else {
            (grown as usize).max(1)
        }
    }

    /// Returns the capacity of the first block.
    pub fn first_capacity(&self) -> usize {
        self.initial_capacity.unwrap_or(self.block_size)
    }
}

fn invalid(name: &str, value: impl std::fmt::Display) -> XorListError {
    XorListError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

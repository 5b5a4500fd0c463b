//! Configuration types for the resolver

use crate::resolver::DEFAULT_NUMBER_OF_FRAMES_TO_GET;
use serde::{Deserialize, Serialize};

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of frames fetched per caller walk
    pub frame_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_depth: DEFAULT_NUMBER_OF_FRAMES_TO_GET,
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.frame_depth < DEFAULT_NUMBER_OF_FRAMES_TO_GET {
            anyhow::bail!(
                "Frame depth must be at least {} (got {})",
                DEFAULT_NUMBER_OF_FRAMES_TO_GET,
                self.frame_depth
            );
        }

        Ok(())
    }
}

//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::filter::DEFAULT_FILTER_TIMEOUT;

/// Configuration for the filter pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum tracks running through the chain at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Timeout for filters that do not set their own, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_timeout_ms() -> u64 {
    DEFAULT_FILTER_TIMEOUT.as_millis() as u64
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

impl PipelineConfig {
    /// Sets the maximum concurrency.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the default filter timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Default filter timeout as a duration.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

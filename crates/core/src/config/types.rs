use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::filter::FilterSpec;
use crate::pipeline::PipelineConfig;
use crate::protocol::ProtocolVersion;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Single Legacy3 filter script, run before `filters`.
    #[serde(default)]
    pub filter_script: Option<PathBuf>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Filter chain, in execution order.
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

/// One `[[filters]]` entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Name used in logs (defaults to the path)
    #[serde(default)]
    pub name: Option<String>,
    /// Program to execute
    pub path: PathBuf,
    /// Program arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Wire format spoken by the program (default: legacy3)
    #[serde(default)]
    pub protocol: ProtocolVersion,
    /// Per-invocation timeout in milliseconds (default: pipeline.default_timeout_ms)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl FilterConfig {
    /// Resolve into an immutable spec, filling in the default timeout.
    pub fn to_spec(&self, default_timeout: Duration) -> FilterSpec {
        FilterSpec {
            name: self.name.clone(),
            executable: self.path.clone(),
            arguments: self.args.clone(),
            protocol: self.protocol,
            timeout: self
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(default_timeout),
        }
    }
}

impl Config {
    /// Resolve the configured chain in execution order.
    pub fn filter_chain(&self) -> Vec<FilterSpec> {
        let default_timeout = self.pipeline.default_timeout();
        let legacy = self
            .filter_script
            .as_ref()
            .map(|path| FilterSpec::new(path.clone()).with_timeout(default_timeout));

        legacy
            .into_iter()
            .chain(self.filters.iter().map(|f| f.to_spec(default_timeout)))
            .collect()
    }
}

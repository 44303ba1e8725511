//! Types for the filter module.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::ProtocolVersion;

/// Default timeout for one filter invocation.
pub const DEFAULT_FILTER_TIMEOUT: Duration = Duration::from_secs(10);

/// One configured filter in a chain.
///
/// Built once from configuration and shared read-only by every track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    /// Optional human-readable name used in logs.
    pub name: Option<String>,
    /// Program to execute.
    pub executable: PathBuf,
    /// Arguments passed to the program.
    pub arguments: Vec<String>,
    /// Wire format spoken by the program.
    pub protocol: ProtocolVersion,
    /// Deadline for a single invocation.
    #[serde(rename = "timeout_ms", serialize_with = "serialize_millis")]
    pub timeout: Duration,
}

impl FilterSpec {
    /// Creates a Legacy3 filter with the default timeout and no arguments.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            executable: executable.into(),
            arguments: Vec::new(),
            protocol: ProtocolVersion::Legacy3,
            timeout: DEFAULT_FILTER_TIMEOUT,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the program arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the protocol version.
    pub fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets the invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name used in logs: the configured name, or the program path.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.executable.display().to_string(),
        }
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let spec = FilterSpec::new("/usr/bin/ignore_genre.py")
            .with_name("ignore-genre")
            .with_args(["--strict"])
            .with_protocol(ProtocolVersion::Genre4)
            .with_timeout(Duration::from_millis(500));

        assert_eq!(spec.display_name(), "ignore-genre");
        assert_eq!(spec.arguments, vec!["--strict"]);
        assert_eq!(spec.protocol, ProtocolVersion::Genre4);
        assert_eq!(spec.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_defaults() {
        let spec = FilterSpec::new("filter.sh");
        assert_eq!(spec.display_name(), "filter.sh");
        assert_eq!(spec.protocol, ProtocolVersion::Legacy3);
        assert_eq!(spec.timeout, DEFAULT_FILTER_TIMEOUT);
        assert!(spec.arguments.is_empty());
    }

    #[test]
    fn test_serialization() {
        let spec = FilterSpec::new("f").with_timeout(Duration::from_millis(1500));
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"timeout_ms\":1500"));
        assert!(json.contains("\"protocol\":\"legacy3\""));
    }
}

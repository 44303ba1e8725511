//! Mock filter runner for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::cancel::CancelToken;
use crate::filter::{FilterError, FilterRunner, FilterSpec};
use crate::protocol::{encode, Record};

/// A recorded filter invocation for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedInvocation {
    /// Program the invocation was addressed to.
    pub executable: PathBuf,
    /// Record the filter received.
    pub input: Record,
}

/// What a mocked program does with its input.
#[derive(Clone)]
pub enum MockBehavior {
    /// Return the input unchanged.
    Echo,
    /// Drop the track.
    Drop,
    /// Return this record.
    Replace(Record),
    /// Fail with this error.
    Fail(FilterError),
    /// Compute the output from the input. `None` drops the track.
    Map(Arc<dyn Fn(&Record) -> Option<Record> + Send + Sync>),
}

impl fmt::Debug for MockBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Echo => f.write_str("Echo"),
            Self::Drop => f.write_str("Drop"),
            Self::Replace(record) => f.debug_tuple("Replace").field(record).finish(),
            Self::Fail(err) => f.debug_tuple("Fail").field(err).finish(),
            Self::Map(_) => f.write_str("Map(..)"),
        }
    }
}

impl MockBehavior {
    /// Wraps a closure as a [`MockBehavior::Map`].
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Option<Record> + Send + Sync + 'static,
    {
        Self::Map(Arc::new(f))
    }
}

/// Mock implementation of the FilterRunner trait.
///
/// Programs are addressed by their `FilterSpec::executable`. Provides
/// controllable behavior for testing:
/// - Scripted keep/transform/drop/fail per program
/// - Simulated run time that honours the filter's timeout and cancellation
/// - Recorded invocations for spy assertions
///
/// # Example
///
/// ```rust,ignore
/// use trackfilter_core::testing::{MockBehavior, MockFilter};
///
/// let runner = MockFilter::new();
/// runner.set_behavior("ignore-artists", MockBehavior::Drop).await;
/// runner.set_delay("slow", Duration::from_secs(60)).await;
///
/// // ... run a chain ...
///
/// assert_eq!(runner.invocation_count("after-drop").await, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFilter {
    /// Recorded invocations, in call order.
    invocations: Arc<RwLock<Vec<RecordedInvocation>>>,
    /// Behavior per program; unknown programs echo.
    behaviors: Arc<RwLock<HashMap<PathBuf, MockBehavior>>>,
    /// Simulated run time per program.
    delays: Arc<RwLock<HashMap<PathBuf, Duration>>>,
}

impl MockFilter {
    /// Create a new mock runner where every program echoes its input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the behavior of a program.
    pub async fn set_behavior(&self, executable: impl AsRef<Path>, behavior: MockBehavior) {
        self.behaviors
            .write()
            .await
            .insert(executable.as_ref().to_path_buf(), behavior);
    }

    /// Set the simulated run time of a program.
    pub async fn set_delay(&self, executable: impl AsRef<Path>, delay: Duration) {
        self.delays
            .write()
            .await
            .insert(executable.as_ref().to_path_buf(), delay);
    }

    /// Get all recorded invocations.
    pub async fn recorded_invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.read().await.clone()
    }

    /// Number of times a program was invoked.
    pub async fn invocation_count(&self, executable: impl AsRef<Path>) -> usize {
        let executable = executable.as_ref();
        self.invocations
            .read()
            .await
            .iter()
            .filter(|i| i.executable == executable)
            .count()
    }

    /// Total number of invocations across all programs.
    pub async fn total_invocations(&self) -> usize {
        self.invocations.read().await.len()
    }

    /// Clear recorded invocations.
    pub async fn clear_recorded(&self) {
        self.invocations.write().await.clear();
    }
}

#[async_trait]
impl FilterRunner for MockFilter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        spec: &FilterSpec,
        input: &Record,
        cancel: &CancelToken,
    ) -> Result<Option<Record>, FilterError> {
        // Same precondition as the process runner.
        encode(input, spec.protocol)?;

        if cancel.is_cancelled() {
            return Err(FilterError::Cancelled);
        }

        self.invocations.write().await.push(RecordedInvocation {
            executable: spec.executable.clone(),
            input: input.clone(),
        });

        let delay = self.delays.read().await.get(&spec.executable).copied();
        if let Some(delay) = delay {
            let timed_out = delay > spec.timeout;
            tokio::select! {
                _ = tokio::time::sleep(delay.min(spec.timeout)) => {
                    if timed_out {
                        return Err(FilterError::Timeout {
                            timeout_ms: spec.timeout.as_millis() as u64,
                        });
                    }
                }
                _ = cancel.cancelled() => return Err(FilterError::Cancelled),
            }
        }

        let behavior = self
            .behaviors
            .read()
            .await
            .get(&spec.executable)
            .cloned()
            .unwrap_or(MockBehavior::Echo);

        match behavior {
            MockBehavior::Echo => Ok(Some(input.clone())),
            MockBehavior::Drop => Ok(None),
            MockBehavior::Replace(record) => Ok(Some(record)),
            MockBehavior::Fail(err) => Err(err),
            MockBehavior::Map(f) => Ok(f(input)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelHandle;

    #[tokio::test]
    async fn test_default_echo_and_recording() {
        let runner = MockFilter::new();
        let input = Record::new("a", "t", "b");
        let output = runner
            .run(&FilterSpec::new("echo"), &input, &CancelToken::never())
            .await
            .unwrap();

        assert_eq!(output, Some(input.clone()));
        assert_eq!(runner.invocation_count("echo").await, 1);
        assert_eq!(runner.recorded_invocations().await[0].input, input);
    }

    #[tokio::test]
    async fn test_scripted_behaviors() {
        let runner = MockFilter::new();
        runner.set_behavior("drop", MockBehavior::Drop).await;
        runner
            .set_behavior("fail", MockBehavior::Fail(FilterError::process_failed(Some(1), "")))
            .await;

        let input = Record::new("a", "t", "b");
        let token = CancelToken::never();
        assert_eq!(
            runner.run(&FilterSpec::new("drop"), &input, &token).await.unwrap(),
            None
        );
        assert!(runner.run(&FilterSpec::new("fail"), &input, &token).await.is_err());
        assert_eq!(runner.total_invocations().await, 2);
    }

    #[tokio::test]
    async fn test_delay_beyond_timeout() {
        let runner = MockFilter::new();
        runner.set_delay("slow", Duration::from_secs(60)).await;
        let spec = FilterSpec::new("slow").with_timeout(Duration::from_millis(20));

        let err = runner
            .run(&spec, &Record::default(), &CancelToken::never())
            .await
            .unwrap_err();
        assert_eq!(err, FilterError::Timeout { timeout_ms: 20 });
    }

    #[tokio::test]
    async fn test_cancelled_before_run_is_not_recorded() {
        let runner = MockFilter::new();
        let handle = CancelHandle::new();
        handle.cancel();

        let err = runner
            .run(&FilterSpec::new("echo"), &Record::default(), &handle.token())
            .await
            .unwrap_err();
        assert_eq!(err, FilterError::Cancelled);
        assert_eq!(runner.total_invocations().await, 0);
    }
}

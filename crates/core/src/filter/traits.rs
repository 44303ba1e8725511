//! Trait definitions for the filter module.

use async_trait::async_trait;

use super::error::FilterError;
use super::types::FilterSpec;
use crate::cancel::CancelToken;
use crate::protocol::Record;

/// Runs a single filter invocation.
///
/// `Ok(None)` means the filter dropped the track, `Ok(Some(_))` carries the
/// (possibly rewritten) record. Implementations must stop work and return
/// [`FilterError::Cancelled`] once `cancel` fires.
#[async_trait]
pub trait FilterRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `spec` on `input`.
    async fn run(
        &self,
        spec: &FilterSpec,
        input: &Record,
        cancel: &CancelToken,
    ) -> Result<Option<Record>, FilterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseRunner;

    #[async_trait]
    impl FilterRunner for UppercaseRunner {
        fn name(&self) -> &str {
            "uppercase"
        }

        async fn run(
            &self,
            _spec: &FilterSpec,
            input: &Record,
            _cancel: &CancelToken,
        ) -> Result<Option<Record>, FilterError> {
            Ok(Some(Record {
                artist: input.artist.to_uppercase(),
                ..input.clone()
            }))
        }
    }

    #[tokio::test]
    async fn test_runner_through_trait_object() {
        let runner: Box<dyn FilterRunner> = Box::new(UppercaseRunner);
        let output = runner
            .run(
                &FilterSpec::new("unused"),
                &Record::new("queen", "Bicycle Race", "Jazz"),
                &CancelToken::never(),
            )
            .await
            .unwrap();
        assert_eq!(runner.name(), "uppercase");
        assert_eq!(output.unwrap().artist, "QUEEN");
    }
}

//! Chain executor implementation.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::types::ChainOutcome;
use crate::cancel::CancelToken;
use crate::filter::{FilterError, FilterRunner, FilterSpec};
use crate::metrics;
use crate::protocol::{encode, Record};

/// Runs one record through an ordered chain of filters.
///
/// Filters run strictly in chain order, each one seeing the previous one's
/// output. The first drop or error ends the chain; later filters are never
/// invoked.
pub struct ChainExecutor<R: FilterRunner + ?Sized> {
    runner: Arc<R>,
}

impl<R: FilterRunner + ?Sized> Clone for ChainExecutor<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
        }
    }
}

impl<R: FilterRunner + ?Sized> ChainExecutor<R> {
    /// Creates an executor that invokes filters through `runner`.
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Runs `input` through `chain`.
    ///
    /// An empty chain keeps the record unchanged. If the input cannot be
    /// encoded for the first filter the chain never starts and the outcome
    /// is a failure at index 0.
    pub async fn run(&self, chain: &[FilterSpec], input: Record, cancel: &CancelToken) -> ChainOutcome {
        if let Some(first) = chain.first() {
            if let Err(e) = encode(&input, first.protocol) {
                let error = FilterError::from(e);
                warn!(track = %input, error = %error, "Track cannot be encoded, chain not started");
                return ChainOutcome::failed(0, error);
            }
        }

        let mut current = input;
        for (index, spec) in chain.iter().enumerate() {
            if cancel.is_cancelled() {
                return ChainOutcome::failed(index, FilterError::Cancelled);
            }

            let start = Instant::now();
            let result = self.runner.run(spec, &current, cancel).await;
            let label = match &result {
                Ok(Some(_)) => "kept",
                Ok(None) => "dropped",
                Err(e) => e.kind(),
            };
            metrics::FILTER_INVOCATIONS.with_label_values(&[label]).inc();
            metrics::FILTER_DURATION
                .with_label_values(&[label])
                .observe(start.elapsed().as_secs_f64());

            match result {
                Ok(Some(next)) => {
                    let changed = current.changed_fields(&next);
                    if !changed.is_empty() {
                        debug!(
                            filter_index = index,
                            filter = %spec.display_name(),
                            ?changed,
                            before = ?current,
                            after = ?next,
                            "Filter rewrote track"
                        );
                    }
                    current = next;
                }
                Ok(None) => {
                    info!(
                        filter_index = index,
                        filter = %spec.display_name(),
                        track = %current,
                        "Track dropped"
                    );
                    return ChainOutcome::Dropped {
                        filter_index: index,
                    };
                }
                Err(error) => {
                    match &error {
                        FilterError::ProcessFailed { stderr, .. } if !stderr.is_empty() => warn!(
                            filter_index = index,
                            filter = %spec.display_name(),
                            error = %error,
                            stderr = %stderr.trim_end(),
                            "Filter failed"
                        ),
                        _ => warn!(
                            filter_index = index,
                            filter = %spec.display_name(),
                            error = %error,
                            "Filter failed"
                        ),
                    }
                    return ChainOutcome::failed(index, error);
                }
            }
        }

        ChainOutcome::kept(current)
    }
}

//! Pipeline controller implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::info;
use uuid::Uuid;

use super::config::PipelineConfig;
use super::types::{BatchSummary, PipelineProgress, PipelineStatus, PoolStatus};
use crate::cancel::{CancelHandle, CancelOnDrop, CancelToken};
use crate::chain::{ChainExecutor, ChainOutcome, OutcomeKind};
use crate::filter::{FilterError, FilterRunner, FilterSpec};
use crate::metrics;
use crate::protocol::Record;

/// Tracks statistics for the track pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_kept: AtomicU64,
    total_dropped: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn record(&self, kind: OutcomeKind) {
        let counter = match kind {
            OutcomeKind::Kept => &self.total_kept,
            OutcomeKind::Dropped => &self.total_dropped,
            OutcomeKind::Failed => &self.total_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::TRACK_OUTCOMES
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    fn to_status(&self) -> PoolStatus {
        PoolStatus {
            active_tracks: self.active.load(Ordering::Relaxed) as usize,
            queued_tracks: self.queued.load(Ordering::Relaxed) as usize,
            total_kept: self.total_kept.load(Ordering::Relaxed),
            total_dropped: self.total_dropped.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Public entry point: runs batches of records through a filter chain.
///
/// Each track runs on its own task; at most `max_concurrency` tracks are
/// inside their chain at once and the rest wait for a slot. Outcomes are
/// returned in input order, one per record, whatever order tracks finish
/// in. A failing track never affects the others, and nothing is retried.
pub struct PipelineController<R: FilterRunner + ?Sized> {
    config: PipelineConfig,
    executor: ChainExecutor<R>,
    stats: Arc<PoolStats>,
}

impl<R: FilterRunner + ?Sized + 'static> PipelineController<R> {
    /// Creates a new controller invoking filters through `runner`.
    pub fn new(config: PipelineConfig, runner: Arc<R>) -> Self {
        Self {
            config,
            executor: ChainExecutor::new(runner),
            stats: Arc::new(PoolStats::default()),
        }
    }

    /// Returns the controller's configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the current pool status.
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            max_concurrency: self.config.max_concurrency,
            pool: self.stats.to_status(),
        }
    }

    /// Processes a batch with the configured concurrency.
    pub async fn process(
        &self,
        records: Vec<Record>,
        chain: impl Into<Arc<[FilterSpec]>>,
    ) -> Vec<ChainOutcome> {
        self.process_batch(records, chain, self.config.max_concurrency)
            .await
    }

    /// Processes a batch with at most `max_concurrency` tracks in flight.
    pub async fn process_batch(
        &self,
        records: Vec<Record>,
        chain: impl Into<Arc<[FilterSpec]>>,
        max_concurrency: usize,
    ) -> Vec<ChainOutcome> {
        self.process_batch_with(records, chain, max_concurrency, CancelToken::never(), None)
            .await
    }

    /// Processes a batch with cancellation and optional progress reporting.
    ///
    /// When `cancel` fires, or when the returned future is dropped, every
    /// running filter is killed and unfinished tracks report
    /// `Failed(_, Cancelled)`. A `max_concurrency` of 0 is treated as 1.
    pub async fn process_batch_with(
        &self,
        records: Vec<Record>,
        chain: impl Into<Arc<[FilterSpec]>>,
        max_concurrency: usize,
        cancel: CancelToken,
        progress_tx: Option<mpsc::Sender<PipelineProgress>>,
    ) -> Vec<ChainOutcome> {
        let chain: Arc<[FilterSpec]> = chain.into();
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let total = records.len();
        let limit = max_concurrency.max(1);

        info!(
            batch_id = %batch_id,
            tracks = total,
            filters = chain.len(),
            max_concurrency = limit,
            "Starting batch"
        );

        let semaphore = Arc::new(Semaphore::new(limit));
        let batch_cancel = CancelHandle::new();
        let _cancel_guard = CancelOnDrop(batch_cancel.clone());
        let token = batch_cancel.token();

        let mut handles = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let executor = self.executor.clone();
            let chain = Arc::clone(&chain);
            let token = token.clone();
            let stats = Arc::clone(&self.stats);
            let progress_tx = progress_tx.clone();
            let batch_id = batch_id.clone();

            stats.queued.fetch_add(1, Ordering::Relaxed);
            handles.push(tokio::spawn(async move {
                let permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit.ok(),
                    _ = token.cancelled() => None,
                };
                stats.queued.fetch_sub(1, Ordering::Relaxed);

                let Some(_permit) = permit else {
                    let outcome = ChainOutcome::failed(0, FilterError::Cancelled);
                    stats.record(outcome.kind());
                    return outcome;
                };

                stats.active.fetch_add(1, Ordering::Relaxed);
                metrics::TRACKS_IN_FLIGHT.inc();
                if let Some(ref tx) = progress_tx {
                    let _ = tx
                        .send(PipelineProgress::TrackStarted {
                            batch_id: batch_id.clone(),
                            index,
                            total,
                        })
                        .await;
                }

                let outcome = executor.run(&chain, record, &token).await;

                stats.active.fetch_sub(1, Ordering::Relaxed);
                metrics::TRACKS_IN_FLIGHT.dec();
                stats.record(outcome.kind());

                if let Some(ref tx) = progress_tx {
                    let _ = tx
                        .send(PipelineProgress::TrackFinished {
                            batch_id,
                            index,
                            outcome: outcome.kind(),
                        })
                        .await;
                }

                outcome
            }));
        }

        let mut outcomes = Vec::with_capacity(total);
        for mut handle in handles {
            let result = tokio::select! {
                result = &mut handle => result,
                _ = cancel.cancelled(), if !batch_cancel.is_cancelled() => {
                    info!(batch_id = %batch_id, "Batch cancelled, terminating running filters");
                    batch_cancel.cancel();
                    handle.await
                }
            };

            outcomes.push(match result {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(_) => ChainOutcome::failed(0, FilterError::Cancelled),
            });
        }

        let summary = BatchSummary::from_outcomes(&outcomes, start.elapsed().as_millis() as u64);
        info!(
            batch_id = %batch_id,
            kept = summary.kept,
            dropped = summary.dropped,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "Batch completed"
        );

        if let Some(tx) = progress_tx {
            let _ = tx
                .send(PipelineProgress::BatchCompleted { batch_id, summary })
                .await;
        }

        outcomes
    }
}

//! Types for the pipeline module.

use serde::{Deserialize, Serialize};

use crate::chain::{ChainOutcome, OutcomeKind};

/// Status of the track pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Tracks currently running through a chain.
    pub active_tracks: usize,
    /// Tracks waiting for a concurrency slot.
    pub queued_tracks: usize,
    /// Tracks kept since startup.
    pub total_kept: u64,
    /// Tracks dropped since startup.
    pub total_dropped: u64,
    /// Tracks failed since startup.
    pub total_failed: u64,
}

/// Overall pipeline status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatus {
    /// Configured default concurrency.
    pub max_concurrency: usize,
    /// Track pool counters.
    pub pool: PoolStatus,
}

/// Outcome counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of input records.
    pub total: usize,
    /// Tracks kept.
    pub kept: usize,
    /// Tracks dropped.
    pub dropped: usize,
    /// Tracks failed.
    pub failed: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl BatchSummary {
    /// Counts the outcomes of a batch.
    pub fn from_outcomes(outcomes: &[ChainOutcome], duration_ms: u64) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            duration_ms,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome.kind() {
                OutcomeKind::Kept => summary.kept += 1,
                OutcomeKind::Dropped => summary.dropped += 1,
                OutcomeKind::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

/// Progress update for batch processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineProgress {
    /// A track acquired a slot and entered its chain.
    TrackStarted {
        batch_id: String,
        index: usize,
        total: usize,
    },
    /// A track reached its outcome.
    TrackFinished {
        batch_id: String,
        index: usize,
        outcome: OutcomeKind,
    },
    /// Every track of the batch has an outcome.
    BatchCompleted {
        batch_id: String,
        summary: BatchSummary,
    },
}

//! Types for the chain module.

use serde::Serialize;

use crate::filter::FilterError;
use crate::protocol::Record;

/// Zero-based position of a filter in its chain.
pub type FilterIndex = usize;

/// Final result of running one track through a chain.
///
/// Terminal: produced once by the executor and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChainOutcome {
    /// Every filter kept the track; carries the final record.
    Kept { record: Record },
    /// A filter dropped the track.
    Dropped { filter_index: FilterIndex },
    /// A filter failed; later filters were not run.
    Failed {
        filter_index: FilterIndex,
        error: FilterError,
    },
}

/// Coarse classification of a [`ChainOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Kept,
    Dropped,
    Failed,
}

impl OutcomeKind {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kept => "kept",
            Self::Dropped => "dropped",
            Self::Failed => "failed",
        }
    }
}

impl ChainOutcome {
    /// Creates a kept outcome.
    pub fn kept(record: Record) -> Self {
        Self::Kept { record }
    }

    /// Creates a failed outcome.
    pub fn failed(filter_index: FilterIndex, error: FilterError) -> Self {
        Self::Failed {
            filter_index,
            error,
        }
    }

    /// Returns the outcome's kind.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Kept { .. } => OutcomeKind::Kept,
            Self::Dropped { .. } => OutcomeKind::Dropped,
            Self::Failed { .. } => OutcomeKind::Failed,
        }
    }

    /// The final record, if the track was kept.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Kept { record } => Some(record),
            _ => None,
        }
    }

    /// The error, if the track failed.
    pub fn error(&self) -> Option<&FilterError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let kept = ChainOutcome::kept(Record::new("a", "t", "b"));
        assert_eq!(kept.kind(), OutcomeKind::Kept);
        assert_eq!(kept.record().unwrap().artist, "a");
        assert!(kept.error().is_none());

        let failed = ChainOutcome::failed(2, FilterError::Timeout { timeout_ms: 10 });
        assert_eq!(failed.kind(), OutcomeKind::Failed);
        assert!(failed.record().is_none());
        assert_eq!(failed.error(), Some(&FilterError::Timeout { timeout_ms: 10 }));
    }

    #[test]
    fn test_outcome_serialization() {
        let dropped = ChainOutcome::Dropped { filter_index: 1 };
        let json = serde_json::to_string(&dropped).unwrap();
        assert_eq!(json, r#"{"outcome":"dropped","filter_index":1}"#);

        let failed = ChainOutcome::failed(0, FilterError::Cancelled);
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"outcome\":\"failed\""));
        assert!(json.contains("\"kind\":\"cancelled\""));
    }
}

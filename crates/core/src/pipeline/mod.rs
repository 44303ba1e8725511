//! Pipeline module: batches of tracks through a shared filter chain.
//!
//! This module provides the `PipelineController`, which runs every track of a
//! batch through the chain on its own task. A semaphore bounds how many
//! tracks are inside their chain at once, so a large batch never fans out
//! into an unbounded number of child processes.
//!
//! # Example
//!
//! ```ignore
//! use trackfilter_core::pipeline::{PipelineConfig, PipelineController};
//! use trackfilter_core::filter::ProcessFilter;
//!
//! let controller = PipelineController::new(PipelineConfig::default(), Arc::new(ProcessFilter::new()));
//! let outcomes = controller.process_batch(records, chain, 8).await;
//!
//! for (record, outcome) in original.iter().zip(&outcomes) {
//!     println!("{}: {:?}", record, outcome.kind());
//! }
//! ```

mod config;
mod controller;
mod types;

pub use config::PipelineConfig;
pub use controller::PipelineController;
pub use types::{BatchSummary, PipelineProgress, PipelineStatus, PoolStatus};

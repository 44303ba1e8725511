//! Chain module: one track through an ordered list of filters.
//!
//! Filter order is part of the user-visible contract. A genre filter placed
//! after an artist filter sees the artist filter's output, and a track
//! dropped by filter N never reaches filter N+1.

mod executor;
mod types;

pub use executor::ChainExecutor;
pub use types::{ChainOutcome, FilterIndex, OutcomeKind};

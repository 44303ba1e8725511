//! Filter module for running a single filter over a single record.
//!
//! This module provides the `FilterRunner` trait and `ProcessFilter`, which
//! executes a filter script as a child process:
//!
//! 1. The record is encoded for the filter's protocol version and written to
//!    the child's stdin, which is then closed.
//! 2. The child's exit is awaited under the filter's timeout.
//! 3. Exit status 0 with empty stdout drops the track; non-empty stdout is
//!    decoded into the next record; any other status is a failure.
//!
//! # Example
//!
//! ```ignore
//! use trackfilter_core::filter::{FilterRunner, FilterSpec, ProcessFilter};
//! use trackfilter_core::{CancelToken, ProtocolVersion, Record};
//!
//! let spec = FilterSpec::new("/usr/local/bin/ignore_genre.py")
//!     .with_protocol(ProtocolVersion::Genre4)
//!     .with_timeout(Duration::from_secs(2));
//!
//! let record = Record::new("Artist", "Title", "Album").with_genres(["country"]);
//! match ProcessFilter::new().run(&spec, &record, &CancelToken::never()).await? {
//!     Some(record) => println!("kept: {}", record),
//!     None => println!("dropped"),
//! }
//! ```

mod error;
mod process;
mod traits;
mod types;

pub use error::FilterError;
pub use process::ProcessFilter;
pub use traits::FilterRunner;
pub use types::{FilterSpec, DEFAULT_FILTER_TIMEOUT};

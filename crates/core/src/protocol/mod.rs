//! Record type and the line protocol spoken with filter scripts.
//!
//! Filters receive a record on standard input and answer on standard output:
//!
//! ```text
//! artist
//! title
//! album
//! genre1,genre2        <- Genre4 only
//! ```
//!
//! Printing nothing drops the track. Printing three lines keeps or rewrites
//! it. A Genre4 filter may print the genre line to replace the genres, or
//! leave it out to keep them unchanged.

mod codec;
mod error;
mod types;

pub use codec::{decode, encode, GENRE_SEPARATOR};
pub use error::CodecError;
pub use types::{ProtocolVersion, Record};

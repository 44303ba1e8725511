//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`FilterRunner`](crate::filter::FilterRunner)
//! and shell ports of the reference filter scripts, so chains can be tested
//! with or without spawning real processes.
//!
//! # Example
//!
//! ```rust,ignore
//! use trackfilter_core::testing::{fixtures, MockBehavior, MockFilter};
//!
//! let runner = MockFilter::new();
//! runner.set_behavior("ignore-artists", MockBehavior::Drop).await;
//!
//! let script = fixtures::install_script(dir.path(), "parse.sh", fixtures::PARSE_ARTIST_FROM_TITLE)?;
//! ```

mod mock_filter;

pub use mock_filter::{MockBehavior, MockFilter, RecordedInvocation};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::protocol::Record;

    /// Echoes the three Legacy3 lines back.
    pub const ECHO: &str = r#"IFS= read -r artist
IFS= read -r title
IFS= read -r album
printf '%s\n%s\n%s\n' "$artist" "$title" "$album"
"#;

    /// Splits "Title - Artist" when the artist is empty.
    pub const PARSE_ARTIST_FROM_TITLE: &str = r#"IFS= read -r artist
IFS= read -r title
IFS= read -r album
if [ -z "$artist" ]; then
    artist="${title#* - }"
    title="${title%% - *}"
fi
printf '%s\n%s\n%s\n' "$artist" "$title" "$album"
"#;

    /// Prints nothing for a fixed set of artists.
    pub const IGNORE_ARTISTS: &str = r#"IFS= read -r artist
IFS= read -r title
IFS= read -r album
case "$artist" in
    "Justin Bieber"|"The Beatles"|"Michael Jackson") exit 0 ;;
esac
printf '%s\n%s\n%s\n' "$artist" "$title" "$album"
"#;

    /// Genre4 filter that prints nothing when a genre is country or idm.
    pub const IGNORE_GENRES: &str = r#"IFS= read -r artist
IFS= read -r title
IFS= read -r album
IFS= read -r genres
genres=$(printf '%s' "$genres" | tr '[:upper:]' '[:lower:]')
IFS=,
for genre in $genres; do
    case "$genre" in
        country|idm) exit 0 ;;
    esac
done
printf '%s\n%s\n%s\n' "$artist" "$title" "$album"
"#;

    /// A track whose artist is embedded in the title.
    pub fn bad_romance() -> Record {
        Record::new("", "Bad Romance - Lady Gaga", "The Fame")
    }

    /// A track by an ignored artist.
    pub fn baby() -> Record {
        Record::new("Justin Bieber", "Baby", "My World 2.0")
    }

    /// A track tagged with an ignored genre.
    pub fn country_track() -> Record {
        Record::new("Dolly Parton", "Jolene", "Jolene").with_genres(["Country", "Folk"])
    }

    /// Writes an executable `/bin/sh` script into `dir`.
    #[cfg(unix)]
    pub fn install_script(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}

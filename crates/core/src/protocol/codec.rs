//! Line-based wire codec shared by the engine and every filter script.
//!
//! A record travels as `artist\ntitle\nalbum\n`, followed by
//! `genre1,genre2,...\n` when the filter speaks [`ProtocolVersion::Genre4`].

use super::error::CodecError;
use super::types::{ProtocolVersion, Record};

/// Separator between entries on the genre line.
pub const GENRE_SEPARATOR: char = ',';

const LINE_BREAKS: [char; 2] = ['\n', '\r'];

/// Encodes a record for a filter speaking `version`.
///
/// Fails if any transmitted field would break the line framing, or if a
/// genre would not survive decoding unchanged. Genres are only checked (and
/// only sent) for [`ProtocolVersion::Genre4`].
pub fn encode(record: &Record, version: ProtocolVersion) -> Result<Vec<u8>, CodecError> {
    let mut buffer = String::with_capacity(
        record.artist.len() + record.title.len() + record.album.len() + 4,
    );

    for (field, value) in [
        ("artist", &record.artist),
        ("title", &record.title),
        ("album", &record.album),
    ] {
        check_single_line(field, value)?;
        buffer.push_str(value);
        buffer.push('\n');
    }

    if version.carries_genres() {
        for genre in &record.genres {
            check_single_line("genres", genre)?;
            if genre.contains(GENRE_SEPARATOR) {
                return Err(CodecError::Encoding {
                    field: "genres",
                    reason: format!("genre {:?} contains the separator '{}'", genre, GENRE_SEPARATOR),
                });
            }
            // Decoding trims entries and discards empty ones.
            if genre.is_empty() || genre.trim() != genre {
                return Err(CodecError::Encoding {
                    field: "genres",
                    reason: format!("genre {:?} is empty or padded with whitespace", genre),
                });
            }
        }
        let separator = GENRE_SEPARATOR.to_string();
        buffer.push_str(&record.genres.join(&separator));
        buffer.push('\n');
    }

    Ok(buffer.into_bytes())
}

/// Decodes a filter's standard output.
///
/// `input` is the record the filter was fed. Its genres are carried forward
/// when the filter is Legacy3, or when a Genre4 filter leaves out the genre
/// line. Lines beyond the expected count are ignored.
pub fn decode(bytes: &[u8], version: ProtocolVersion, input: &Record) -> Result<Record, CodecError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| CodecError::violation(format!("output is not valid UTF-8: {}", e)))?;

    let mut lines = text.lines();
    let (Some(artist), Some(title), Some(album)) = (lines.next(), lines.next(), lines.next())
    else {
        return Err(CodecError::violation(format!(
            "expected at least 3 lines, got {}",
            text.lines().count()
        )));
    };

    let genres = match version {
        ProtocolVersion::Legacy3 => input.genres.clone(),
        ProtocolVersion::Genre4 => match lines.next() {
            Some(line) => parse_genres(line),
            None => input.genres.clone(),
        },
    };

    Ok(Record {
        artist: artist.to_string(),
        title: title.to_string(),
        album: album.to_string(),
        genres,
    })
}

fn parse_genres(line: &str) -> Vec<String> {
    line.split(GENRE_SEPARATOR)
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_single_line(field: &'static str, value: &str) -> Result<(), CodecError> {
    if value.contains(LINE_BREAKS) {
        return Err(CodecError::Encoding {
            field,
            reason: "contains a line break".to_string(),
        });
    }
    Ok(())
}

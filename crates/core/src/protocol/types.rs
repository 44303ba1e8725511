//! Types for the protocol module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One track's metadata at a pipeline stage.
///
/// Records are values: a filter never mutates the record it was given, it
/// produces a new one. Comparing the input and output of a stage shows
/// exactly what that filter changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Track artist.
    pub artist: String,
    /// Track title.
    pub title: String,
    /// Album name.
    pub album: String,
    /// Genres, in source order. May be empty.
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Record {
    /// Creates a record without genres.
    pub fn new(artist: impl Into<String>, title: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
            genres: Vec::new(),
        }
    }

    /// Sets the genres.
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// Names of the fields that differ between `self` and `other`.
    pub fn changed_fields(&self, other: &Record) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.artist != other.artist {
            changed.push("artist");
        }
        if self.title != other.title {
            changed.push("title");
        }
        if self.album != other.album {
            changed.push("album");
        }
        if self.genres != other.genres {
            changed.push("genres");
        }
        changed
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.artist, self.title, self.album)
    }
}

/// Wire format negotiated for a filter.
///
/// Fixed per filter at configuration time; never auto-detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVersion {
    /// Three lines: artist, title, album.
    #[default]
    Legacy3,
    /// Legacy3 plus a fourth, comma-separated genre line.
    Genre4,
}

impl ProtocolVersion {
    /// Whether the genre line is part of the wire format.
    pub fn carries_genres(self) -> bool {
        matches!(self, Self::Genre4)
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy3 => "legacy3",
            Self::Genre4 => "genre4",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

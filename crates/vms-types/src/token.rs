//! Transcript tokens and their positional metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transcriber track of the canonical transcription.
///
/// Mixing in alternate tracks inflates token and type counts non-uniformly,
/// so the loader restricts to this track unless told otherwise.
pub const PRIMARY_TRANSCRIBER: &str = "H";

/// Folio identifier (e.g. `f1r`, `f67r2`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolioId(String);

impl FolioId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FolioId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Currier language tag of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Currier A.
    #[serde(rename = "A")]
    A,
    /// Currier B.
    #[serde(rename = "B")]
    B,
    /// No language assignment (diagram text, labels).
    #[serde(rename = "NA")]
    Na,
}

impl Language {
    /// Stable label used in logs and the transcript format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Na => "NA",
        }
    }

    /// Parse a transcript language field. `NA` and `N/A` mean unassigned; a
    /// blank field is unparseable.
    #[must_use]
    pub fn parse(field: &str) -> Option<Self> {
        match field.trim() {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            "NA" | "N/A" | "na" => Some(Self::Na),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagram placement code (`P` paragraph, `R1` ring, `C1` circle, `S` star,
/// `L` label, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Placement(String);

impl Placement {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One transcript token. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Raw token text in EVA transliteration.
    pub word: String,
    /// Folio the token was read from.
    pub folio: FolioId,
    /// Line number within the folio.
    pub line: u32,
    /// Section code (`H` herbal, `Z` zodiac, `A` astronomical, ...).
    pub section: String,
    /// Currier language tag.
    pub language: Language,
    /// Diagram placement code.
    pub placement: Placement,
    /// Transcriber track.
    pub transcriber: String,
}

impl Token {
    /// True when the token carries an uncertain/illegible glyph marker.
    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.word.contains('*')
    }

    /// Position key used to detect line starts.
    #[must_use]
    pub fn line_key(&self) -> (&FolioId, u32) {
        (&self.folio, self.line)
    }
}

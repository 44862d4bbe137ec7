//! Longest-match PREFIX + MIDDLE + SUFFIX decomposition.
//!
//! # Algorithm
//!
//! 1. Tokens shorter than two glyphs are returned whole as MIDDLE.
//! 2. Strip the longest table prefix that leaves a non-empty remainder.
//! 3. On the remainder, strip the longest table suffix that leaves a
//!    non-empty MIDDLE. If a prefix was stripped and a suffix equals the
//!    whole remainder, that suffix is stripped too and the MIDDLE is the
//!    empty sentinel (`None`); the token is then *atomic*.
//!
//! Candidates are ordered by glyph length, longest first, with a stable
//! sort so equal-length entries keep table declaration order.
//!
//! Decomposition is deterministic, side-effect free, and never fails:
//! concatenating the returned pieces always reproduces the input.

use serde::{Deserialize, Serialize};
use vms_error::Result;

use crate::tables::MorphologyTables;

/// Structured decomposition of one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MorphologicalRecord {
    /// Separately articulated leading glyph, only set by
    /// [`Decomposer::decompose_articulated`].
    pub articulator: Option<char>,
    pub prefix: Option<String>,
    /// Classification key. `None` is the empty sentinel.
    pub middle: Option<String>,
    pub suffix: Option<String>,
}

impl MorphologicalRecord {
    /// Concatenate the slots back into the original token.
    #[must_use]
    pub fn reconstitute(&self) -> String {
        let mut out = String::new();
        if let Some(articulator) = self.articulator {
            out.push(articulator);
        }
        for part in [&self.prefix, &self.middle, &self.suffix]
            .into_iter()
            .flatten()
        {
            out.push_str(part);
        }
        out
    }

    /// True when the token carries no MIDDLE.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        self.middle.is_none()
    }

    #[must_use]
    pub fn middle(&self) -> Option<&str> {
        self.middle.as_deref()
    }
}

/// Decomposer over one validated table set.
#[derive(Debug, Clone)]
pub struct Decomposer {
    tables: MorphologyTables,
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl Decomposer {
    /// Build a decomposer from validated tables.
    #[must_use]
    pub fn new(tables: MorphologyTables) -> Self {
        let prefixes = longest_first(&tables.prefixes);
        let suffixes = longest_first(&tables.suffixes);
        Self {
            tables,
            prefixes,
            suffixes,
        }
    }

    /// Decomposer over the embedded canonical tables.
    pub fn canonical() -> Result<Self> {
        MorphologyTables::canonical().map(Self::new)
    }

    #[must_use]
    pub fn tables(&self) -> &MorphologyTables {
        &self.tables
    }

    /// Split `token` into prefix, MIDDLE and suffix.
    ///
    /// Damage markers are not interpreted; callers filter `*` tokens first.
    #[must_use]
    pub fn decompose(&self, token: &str) -> MorphologicalRecord {
        if token.is_empty() {
            return MorphologicalRecord::default();
        }
        if token.chars().nth(1).is_none() {
            return MorphologicalRecord {
                middle: Some(token.to_owned()),
                ..MorphologicalRecord::default()
            };
        }

        let prefix = self
            .prefixes
            .iter()
            .find(|p| token.len() > p.len() && token.starts_with(p.as_str()));
        let rest = prefix.map_or(token, |p| &token[p.len()..]);

        let suffix = self.suffixes.iter().find(|s| {
            rest.ends_with(s.as_str()) && (rest.len() > s.len() || prefix.is_some())
        });
        let middle = suffix.map_or(rest, |s| &rest[..rest.len() - s.len()]);

        MorphologicalRecord {
            articulator: None,
            prefix: prefix.cloned(),
            middle: (!middle.is_empty()).then(|| middle.to_owned()),
            suffix: suffix.cloned(),
        }
    }

    /// Like [`decompose`](Self::decompose), but first peels a leading
    /// articulator glyph when the rest of the token opens with a known prefix.
    #[must_use]
    pub fn decompose_articulated(&self, token: &str) -> MorphologicalRecord {
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            let rest = chars.as_str();
            if self.tables.articulators.contains(&first)
                && rest.chars().nth(1).is_some()
                && self
                    .prefixes
                    .iter()
                    .any(|p| rest.len() > p.len() && rest.starts_with(p.as_str()))
            {
                return MorphologicalRecord {
                    articulator: Some(first),
                    ..self.decompose(rest)
                };
            }
        }
        self.decompose(token)
    }
}

fn longest_first(entries: &[String]) -> Vec<String> {
    let mut sorted = entries.to_vec();
    // Stable: equal-length entries keep declaration order.
    sorted.sort_by_key(|entry| std::cmp::Reverse(entry.chars().count()));
    sorted
}

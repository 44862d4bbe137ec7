//! Versioned prefix/suffix/articulator tables.
//!
//! The tables are data, not code: the canonical set ships as
//! `tables/morphology_v1.toml` and is embedded at compile time. Alternative
//! tables can be loaded from disk for experiments, but every consumer in a
//! process should share one table so decompositions stay comparable.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vms_error::{Result, VmsError};

const LOG_COMPONENT: &str = "vms.morph.tables";

/// Fixture name used in error messages.
pub const TABLES_FIXTURE: &str = "morphology_tables";

/// Embedded canonical table file.
pub const CANONICAL_TABLES_TOML: &str = include_str!("../tables/morphology_v1.toml");

/// Inclusive prefix length bounds, in glyphs.
pub const PREFIX_MIN_LEN: usize = 2;
pub const PREFIX_MAX_LEN: usize = 4;

/// Prefix, suffix and articulator tables in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MorphologyTables {
    /// Table revision. Decompositions are only comparable within a version.
    pub version: u32,
    /// Human-readable table name.
    pub name: String,
    /// Known prefixes, declaration order is the equal-length tie-break.
    pub prefixes: Vec<String>,
    /// Known suffixes, declaration order is the equal-length tie-break.
    pub suffixes: Vec<String>,
    /// Single-glyph articulators.
    #[serde(default)]
    pub articulators: Vec<char>,
}

impl MorphologyTables {
    /// The embedded canonical tables.
    ///
    /// # Errors
    ///
    /// Returns [`VmsError::InvalidFixture`] if the embedded file fails validation.
    pub fn canonical() -> Result<Self> {
        Self::from_toml_str(CANONICAL_TABLES_TOML)
    }

    /// Parse and validate a TOML table document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let tables: Self = toml::from_str(text)
            .map_err(|err| VmsError::invalid_fixture(TABLES_FIXTURE, err.to_string()))?;
        tables.validate()?;
        debug!(
            component = LOG_COMPONENT,
            name = %tables.name,
            version = tables.version,
            prefix_count = tables.prefixes.len(),
            suffix_count = tables.suffixes.len(),
            articulator_count = tables.articulators.len(),
            "morphology tables loaded"
        );
        Ok(tables)
    }

    /// Read a table file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`VmsError::MissingFixture`] when the file does not exist.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                VmsError::MissingFixture {
                    fixture: TABLES_FIXTURE.to_owned(),
                    path: path.to_path_buf(),
                }
            } else {
                VmsError::io(path, err)
            }
        })?;
        Self::from_toml_str(&text)
    }

    /// Check lengths, emptiness and duplicates.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 {
            return Err(VmsError::invalid_fixture(
                TABLES_FIXTURE,
                "version must be at least 1",
            ));
        }
        let mut seen = BTreeSet::new();
        for prefix in &self.prefixes {
            let len = prefix.chars().count();
            if !(PREFIX_MIN_LEN..=PREFIX_MAX_LEN).contains(&len) {
                return Err(VmsError::invalid_fixture(
                    TABLES_FIXTURE,
                    format!(
                        "prefix `{prefix}` has {len} glyphs, expected {PREFIX_MIN_LEN}-{PREFIX_MAX_LEN}"
                    ),
                ));
            }
            if !seen.insert(prefix.as_str()) {
                return Err(VmsError::invalid_fixture(
                    TABLES_FIXTURE,
                    format!("duplicate prefix `{prefix}`"),
                ));
            }
        }
        seen.clear();
        for suffix in &self.suffixes {
            if suffix.is_empty() {
                return Err(VmsError::invalid_fixture(
                    TABLES_FIXTURE,
                    "suffix entries must not be empty",
                ));
            }
            if !seen.insert(suffix.as_str()) {
                return Err(VmsError::invalid_fixture(
                    TABLES_FIXTURE,
                    format!("duplicate suffix `{suffix}`"),
                ));
            }
        }
        let mut articulators = BTreeSet::new();
        for glyph in &self.articulators {
            if !articulators.insert(*glyph) {
                return Err(VmsError::invalid_fixture(
                    TABLES_FIXTURE,
                    format!("duplicate articulator `{glyph}`"),
                ));
            }
        }
        Ok(())
    }
}

//! Analysis tunables.
//!
//! Every threshold the legality engine depends on is named here with a
//! documented default. Values are validated when the config is built, so an
//! invalid threshold fails before any corpus processing begins.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vms_error::{Result, VmsError};

/// Default upper bound on AZC folio spread for a MIDDLE to count as restricted.
pub const DEFAULT_RESTRICTED_SPREAD_MAX: u32 = 3;

/// Characters that open a paragraph-initial record when they start a line.
pub const DEFAULT_GALLOWS: [char; 4] = ['k', 't', 'p', 'f'];

/// How the token stream is cut into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordGranularity {
    /// A record opens at a gallows-initial line start or a folio change.
    #[default]
    Paragraph,
    /// Every line is its own record.
    Line,
}

/// Validated analysis tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    restricted_spread_max: u32,
    record_granularity: RecordGranularity,
    gallows: Vec<char>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            restricted_spread_max: DEFAULT_RESTRICTED_SPREAD_MAX,
            record_granularity: RecordGranularity::Paragraph,
            gallows: DEFAULT_GALLOWS.to_vec(),
        }
    }
}

/// Unvalidated on-disk form. Signed so that negative thresholds are
/// reported as configuration errors rather than parse failures.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnalysisConfig {
    restricted_spread_max: Option<i64>,
    record_granularity: Option<RecordGranularity>,
    gallows: Option<Vec<char>>,
}

impl AnalysisConfig {
    /// Maximum AZC folio spread of a restricted MIDDLE (inclusive, ≥ 1).
    #[must_use]
    pub const fn restricted_spread_max(&self) -> u32 {
        self.restricted_spread_max
    }

    #[must_use]
    pub const fn record_granularity(&self) -> RecordGranularity {
        self.record_granularity
    }

    #[must_use]
    pub fn gallows(&self) -> &[char] {
        &self.gallows
    }

    /// True when `c` opens a paragraph record.
    #[must_use]
    pub fn is_gallows(&self, c: char) -> bool {
        self.gallows.contains(&c)
    }

    /// Replace the restricted-spread threshold.
    ///
    /// # Errors
    ///
    /// Returns [`VmsError::InvalidConfig`] when `value < 1` or does not fit in `u32`.
    pub fn with_restricted_spread_max(mut self, value: i64) -> Result<Self> {
        self.restricted_spread_max = validate_spread(value)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_record_granularity(mut self, granularity: RecordGranularity) -> Self {
        self.record_granularity = granularity;
        self
    }

    /// Replace the gallows set.
    ///
    /// # Errors
    ///
    /// Returns [`VmsError::InvalidConfig`] for an empty set or non-letter glyphs.
    pub fn with_gallows(mut self, gallows: impl IntoIterator<Item = char>) -> Result<Self> {
        let gallows: Vec<char> = gallows.into_iter().collect();
        validate_gallows(&gallows)?;
        self.gallows = gallows;
        Ok(self)
    }

    /// Re-check every invariant. Cheap; called by consumers that accept a
    /// config from outside.
    pub fn validate(&self) -> Result<()> {
        if self.restricted_spread_max == 0 {
            return Err(VmsError::invalid_config(
                "restricted_spread_max",
                "must be at least 1, got 0",
            ));
        }
        validate_gallows(&self.gallows)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`VmsError::InvalidConfig`] for malformed TOML, unknown keys,
    /// or out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawAnalysisConfig = toml::from_str(text)
            .map_err(|err| VmsError::invalid_config("analysis config", err.to_string()))?;
        let mut config = Self::default();
        if let Some(value) = raw.restricted_spread_max {
            config = config.with_restricted_spread_max(value)?;
        }
        if let Some(granularity) = raw.record_granularity {
            config = config.with_record_granularity(granularity);
        }
        if let Some(gallows) = raw.gallows {
            config = config.with_gallows(gallows)?;
        }
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| VmsError::io(path, err))?;
        Self::from_toml_str(&text)
    }
}

fn validate_spread(value: i64) -> Result<u32> {
    if value < 1 {
        return Err(VmsError::invalid_config(
            "restricted_spread_max",
            format!("must be at least 1, got {value}"),
        ));
    }
    u32::try_from(value).map_err(|_| {
        VmsError::invalid_config(
            "restricted_spread_max",
            format!("{value} exceeds the supported maximum {}", u32::MAX),
        )
    })
}

fn validate_gallows(gallows: &[char]) -> Result<()> {
    if gallows.is_empty() {
        return Err(VmsError::invalid_config("gallows", "set must not be empty"));
    }
    if let Some(bad) = gallows.iter().find(|c| !c.is_ascii_lowercase()) {
        return Err(VmsError::invalid_config(
            "gallows",
            format!("`{bad}` is not a lowercase EVA glyph"),
        ));
    }
    Ok(())
}

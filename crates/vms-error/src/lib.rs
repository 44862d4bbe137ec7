//! Error type shared by every crate in the workbench.
//!
//! Parsing-level problems (a malformed transcript row) are recovered locally
//! by the loader and only surface as [`VmsError::MalformedRow`] inside load
//! diagnostics. Structural problems (bad tunables, missing fixtures) are
//! returned to the caller immediately.

use std::path::PathBuf;

use thiserror::Error;

/// Workbench result alias.
pub type Result<T, E = VmsError> = std::result::Result<T, E>;

/// Every failure the analysis engine can report.
#[derive(Debug, Error)]
pub enum VmsError {
    /// Reading a corpus or fixture file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transcript row could not be parsed. Recorded, never fatal.
    #[error("malformed row at line {line}: {detail}")]
    MalformedRow { line: usize, detail: String },

    /// A tunable or option is out of range. Raised before corpus processing.
    #[error("invalid configuration for `{parameter}`: {detail}")]
    InvalidConfig { parameter: String, detail: String },

    /// A required precomputed index file is absent.
    #[error("missing fixture `{fixture}` at {}", path.display())]
    MissingFixture { fixture: String, path: PathBuf },

    /// A fixture or table file exists but its contents are unusable.
    #[error("invalid fixture `{fixture}`: {detail}")]
    InvalidFixture { fixture: String, detail: String },

    /// A folio id was requested that the loaded corpus does not contain.
    #[error("unknown folio `{folio}`")]
    UnknownFolio { folio: String },

    /// A bundle id was requested that the registry does not contain.
    #[error("unknown bundle `{bundle}`")]
    UnknownBundle { bundle: String },

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VmsError {
    /// Build an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Build a configuration error for `parameter`.
    pub fn invalid_config(parameter: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter: parameter.into(),
            detail: detail.into(),
        }
    }

    /// Build a fixture-content error.
    pub fn invalid_fixture(fixture: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidFixture {
            fixture: fixture.into(),
            detail: detail.into(),
        }
    }

    /// Wrap an I/O error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors the caller cannot recover from by skipping input:
    /// configuration problems and absent or corrupt fixtures.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::MissingFixture { .. } | Self::InvalidFixture { .. }
        )
    }
}

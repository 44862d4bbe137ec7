//! Folio → REGIME fixture.
//!
//! The REGIME label is supplied externally (a flat JSON object mapping folio
//! id to `REGIME_1`..`REGIME_4`) and used only as a grouping key.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use vms_error::Result;
use vms_types::{FolioId, Regime};

use crate::fixture::{load_json_fixture, parse_json_fixture};

const LOG_COMPONENT: &str = "vms.corpus.regime";

/// Fixture name used in error messages.
pub const REGIME_FIXTURE: &str = "regimes";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegimeMap {
    by_folio: BTreeMap<FolioId, Regime>,
}

impl RegimeMap {
    /// Load the REGIME fixture. Absence is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let map: Self = load_json_fixture(path, REGIME_FIXTURE)?;
        info!(
            component = LOG_COMPONENT,
            path = %path.display(),
            folios = map.len(),
            "regime fixture loaded"
        );
        Ok(map)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        parse_json_fixture(text, REGIME_FIXTURE)
    }

    #[must_use]
    pub fn regime_of(&self, folio: &FolioId) -> Option<Regime> {
        self.by_folio.get(folio).copied()
    }

    /// Folios carrying `regime`, ordered by id.
    #[must_use]
    pub fn folios_in(&self, regime: Regime) -> BTreeSet<&FolioId> {
        self.by_folio
            .iter()
            .filter(|(_, r)| **r == regime)
            .map(|(folio, _)| folio)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FolioId, Regime)> {
        self.by_folio.iter().map(|(folio, regime)| (folio, *regime))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_folio.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_folio.is_empty()
    }
}

impl FromIterator<(FolioId, Regime)> for RegimeMap {
    fn from_iter<I: IntoIterator<Item = (FolioId, Regime)>>(iter: I) -> Self {
        Self {
            by_folio: iter.into_iter().collect(),
        }
    }
}

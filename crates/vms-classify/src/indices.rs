//! Derived lookup indices and their JSON files.
//!
//! Three mappings are produced from one snapshot: MIDDLE → class set,
//! B-folio → class footprint, and folio → REGIME. All maps are ordered, so the
//! JSON rendering is deterministic and two builds over the same inputs are
//! byte-identical; [`DerivedIndices::digest`] exposes that as a SHA-256 hex
//! string.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use vms_corpus::{DataStore, RegimeMap, load_json_fixture};
use vms_error::{Result, VmsError};
use vms_types::{ClassId, FolioId, Regime};

use crate::classes::InstructionClassTable;

const LOG_COMPONENT: &str = "vms.classify.indices";

/// File names written by [`DerivedIndices::write_dir`].
pub const MIDDLE_CLASSES_FILE: &str = "middle_classes.json";
pub const FOLIO_FOOTPRINTS_FILE: &str = "folio_footprints.json";
pub const FOLIO_REGIMES_FILE: &str = "folio_regimes.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedIndices {
    pub middle_classes: BTreeMap<String, BTreeSet<ClassId>>,
    /// Classes with a member token attested on each B-folio.
    pub folio_footprints: BTreeMap<FolioId, BTreeSet<ClassId>>,
    pub folio_regimes: BTreeMap<FolioId, Regime>,
}

impl DerivedIndices {
    #[must_use]
    pub fn build(store: &DataStore, classes: &InstructionClassTable, regimes: &RegimeMap) -> Self {
        let vocabulary = store.vocabulary();
        let folio_footprints: BTreeMap<FolioId, BTreeSet<ClassId>> = vocabulary
            .b_folios()
            .keys()
            .map(|folio| {
                let footprint = vocabulary
                    .b_folio_words(folio)
                    .into_iter()
                    .flatten()
                    .filter_map(|word| classes.classify_token(word))
                    .collect();
                (folio.clone(), footprint)
            })
            .collect();

        let folio_regimes: BTreeMap<FolioId, Regime> = regimes
            .iter()
            .map(|(folio, regime)| (folio.clone(), regime))
            .collect();
        let unlabelled = folio_footprints
            .keys()
            .filter(|folio| !folio_regimes.contains_key(*folio))
            .count();
        if unlabelled > 0 {
            debug!(
                component = LOG_COMPONENT,
                unlabelled, "B-folios without a REGIME label"
            );
        }

        let indices = Self {
            middle_classes: classes.middle_index().clone(),
            folio_footprints,
            folio_regimes,
        };
        info!(
            component = LOG_COMPONENT,
            middles = indices.middle_classes.len(),
            folios = indices.folio_footprints.len(),
            regimes = indices.folio_regimes.len(),
            "derived indices built"
        );
        indices
    }

    /// Deterministic pretty JSON of all three indices.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| VmsError::internal(format!("serialising derived indices: {err}")))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        vms_corpus::parse_json_fixture(text, "derived_indices")
    }

    /// SHA-256 of [`to_json`](Self::to_json), lowercase hex.
    pub fn digest(&self) -> Result<String> {
        let digest = Sha256::digest(self.to_json()?.as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        Ok(hex)
    }

    /// Write one JSON file per index into `dir`, returning the paths written.
    pub fn write_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|err| VmsError::io(dir, err))?;
        let files = [
            (MIDDLE_CLASSES_FILE, to_pretty(&self.middle_classes)?),
            (FOLIO_FOOTPRINTS_FILE, to_pretty(&self.folio_footprints)?),
            (FOLIO_REGIMES_FILE, to_pretty(&self.folio_regimes)?),
        ];
        let mut written = Vec::with_capacity(files.len());
        for (name, body) in files {
            let path = dir.join(name);
            std::fs::write(&path, body).map_err(|err| VmsError::io(&path, err))?;
            written.push(path);
        }
        info!(
            component = LOG_COMPONENT,
            dir = %dir.display(),
            files = written.len(),
            "derived index files written"
        );
        Ok(written)
    }

    /// Read back the files produced by [`write_dir`](Self::write_dir).
    /// Each file is a required fixture.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Ok(Self {
            middle_classes: load_json_fixture(&dir.join(MIDDLE_CLASSES_FILE), "middle_classes")?,
            folio_footprints: load_json_fixture(
                &dir.join(FOLIO_FOOTPRINTS_FILE),
                "folio_footprints",
            )?,
            folio_regimes: load_json_fixture(&dir.join(FOLIO_REGIMES_FILE), "folio_regimes")?,
        })
    }

    #[must_use]
    pub fn classes_for_middle(&self, middle: &str) -> Option<&BTreeSet<ClassId>> {
        self.middle_classes.get(middle)
    }

    #[must_use]
    pub fn footprint(&self, folio: &FolioId) -> Option<&BTreeSet<ClassId>> {
        self.folio_footprints.get(folio)
    }

    #[must_use]
    pub fn regime_of(&self, folio: &FolioId) -> Option<Regime> {
        self.folio_regimes.get(folio).copied()
    }
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| VmsError::internal(format!("serialising index file: {err}")))
}

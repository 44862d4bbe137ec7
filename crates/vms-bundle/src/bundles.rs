//! Bundle collapsing and AZC compatibility.
//!
//! Records with the same PP MIDDLE-set collapse into one [`Bundle`]. The
//! bundle id is a BLAKE3 digest over the sorted, length-prefixed set, so it
//! is stable across runs and independent of record order.
//!
//! Compatibility is a pure function of the bundle's PP set and the AZC folio
//! vocabulary index:
//!
//! ```text
//! restricted(b)  = { m in PP(b) : 1 <= azc_spread(m) <= restricted_spread_max }
//! compatible(b)  = { F in AZC : restricted(b) ⊆ vocab(F) }
//! bundle_type(b) = NEUTRAL     if restricted(b) = {}
//!                  ACTIVATING  if compatible(b) != {}
//!                  BLOCKED     otherwise
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};
use vms_classify::MiddleClassifier;
use vms_corpus::CorpusVocabulary;
use vms_types::{AnalysisConfig, BundleType, FolioId};

use crate::records::Record;

const LOG_COMPONENT: &str = "vms.bundle.bundles";

/// Domain tag mixed into every bundle id.
const BUNDLE_ID_DOMAIN: &[u8] = b"vms:bundle:v1";

// ---------------------------------------------------------------------------
// Bundle id
// ---------------------------------------------------------------------------

/// Stable key of a PP MIDDLE-set (64 lowercase hex chars).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BundleId(String);

impl BundleId {
    #[must_use]
    pub fn of(pp_middles: &BTreeSet<String>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(BUNDLE_ID_DOMAIN);
        hasher.update(&(pp_middles.len() as u64).to_le_bytes());
        for middle in pp_middles {
            hasher.update(&(middle.len() as u64).to_le_bytes());
            hasher.update(middle.as_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log lines and tables.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// AZC compatibility
// ---------------------------------------------------------------------------

/// True if `middle` occurs on at least one and at most `spread_max` AZC folios.
#[must_use]
pub fn is_restricted(middle: &str, vocabulary: &CorpusVocabulary, spread_max: u32) -> bool {
    (1..=spread_max).contains(&vocabulary.azc_spread(middle))
}

#[must_use]
pub fn restricted_middles(
    pp_middles: &BTreeSet<String>,
    vocabulary: &CorpusVocabulary,
    spread_max: u32,
) -> BTreeSet<String> {
    pp_middles
        .iter()
        .filter(|m| is_restricted(m, vocabulary, spread_max))
        .cloned()
        .collect()
}

/// AZC folios whose vocabulary covers every restricted MIDDLE.
#[must_use]
pub fn compatible_folios(
    restricted: &BTreeSet<String>,
    vocabulary: &CorpusVocabulary,
) -> BTreeSet<FolioId> {
    vocabulary
        .azc_folios()
        .iter()
        .filter(|(_, folio_vocab)| restricted.is_subset(folio_vocab))
        .map(|(folio, _)| folio.clone())
        .collect()
}

#[must_use]
pub fn bundle_type(restricted: &BTreeSet<String>, compatible: &BTreeSet<FolioId>) -> BundleType {
    if restricted.is_empty() {
        BundleType::Neutral
    } else if compatible.is_empty() {
        BundleType::Blocked
    } else {
        BundleType::Activating
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bundle {
    pub id: BundleId,
    pub pp_middles: BTreeSet<String>,
    pub restricted_middles: BTreeSet<String>,
    pub bundle_type: BundleType,
    pub compatible_folios: BTreeSet<FolioId>,
    /// Indices of the records collapsed into this bundle, ascending.
    pub records: Vec<usize>,
}

impl Bundle {
    /// Bundle for an arbitrary PP MIDDLE-set, with no records attached.
    #[must_use]
    pub fn from_pp_set(
        pp_middles: BTreeSet<String>,
        vocabulary: &CorpusVocabulary,
        config: &AnalysisConfig,
    ) -> Self {
        let restricted = restricted_middles(&pp_middles, vocabulary, config.restricted_spread_max());
        let compatible = compatible_folios(&restricted, vocabulary);
        Self {
            id: BundleId::of(&pp_middles),
            bundle_type: bundle_type(&restricted, &compatible),
            pp_middles,
            restricted_middles: restricted,
            compatible_folios: compatible,
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pp_middles.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// All bundles of one analysis run plus the record → bundle map.
#[derive(Debug, Clone, Default)]
pub struct BundleRegistry {
    records: Vec<Record>,
    record_bundle: Vec<BundleId>,
    bundles: BTreeMap<BundleId, Bundle>,
}

impl BundleRegistry {
    /// Collapse `records` by PP MIDDLE-set.
    #[must_use]
    pub fn build(
        records: Vec<Record>,
        classifier: &MiddleClassifier,
        vocabulary: &CorpusVocabulary,
        config: &AnalysisConfig,
    ) -> Self {
        let mut bundles: BTreeMap<BundleId, Bundle> = BTreeMap::new();
        let mut record_bundle = Vec::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let pp = record.pp_middles(|m| classifier.is_pp(m));
            let id = BundleId::of(&pp);
            bundles
                .entry(id.clone())
                .or_insert_with(|| Bundle::from_pp_set(pp, vocabulary, config))
                .records
                .push(position);
            record_bundle.push(id);
        }

        let registry = Self {
            records,
            record_bundle,
            bundles,
        };
        let counts = registry.type_counts();
        info!(
            component = LOG_COMPONENT,
            records = registry.records.len(),
            bundles = registry.bundles.len(),
            activating = counts.get(&BundleType::Activating).copied().unwrap_or(0),
            blocked = counts.get(&BundleType::Blocked).copied().unwrap_or(0),
            neutral = counts.get(&BundleType::Neutral).copied().unwrap_or(0),
            "bundle registry built"
        );
        registry
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &BundleId) -> Option<&Bundle> {
        self.bundles.get(id)
    }

    /// Bundles ordered by id.
    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.values()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn bundle_id_of_record(&self, position: usize) -> Option<&BundleId> {
        self.record_bundle.get(position)
    }

    #[must_use]
    pub fn bundle_of_record(&self, position: usize) -> Option<&Bundle> {
        self.bundle_id_of_record(position)
            .and_then(|id| self.bundles.get(id))
    }

    #[must_use]
    pub fn type_counts(&self) -> BTreeMap<BundleType, usize> {
        let mut counts = BTreeMap::new();
        for bundle in self.bundles.values() {
            *counts.entry(bundle.bundle_type).or_default() += 1;
        }
        debug!(component = LOG_COMPONENT, kinds = counts.len(), "bundle types tallied");
        counts
    }
}

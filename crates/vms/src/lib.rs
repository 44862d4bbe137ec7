//! Voynich morphology analysis workbench.
//!
//! The pipeline, leaves first:
//!
//! ```text
//! transcript.tsv ──load──▶ DataStore (tokens, decompositions, vocabulary)
//!                              │
//!        ┌─────────────────────┼───────────────────────┐
//!        ▼                     ▼                       ▼
//! MiddleClassifier   InstructionClassTable     build_records (Currier A)
//!   RI / PP_AZC /      token → class, role            │
//!   PP_BNATIVE               │                        ▼
//!        │                   │                 BundleRegistry
//!        └───────────────────┴──────────┬─────────────┘
//!                                       ▼
//!                               LegalityEngine
//!                  per B-folio status + surviving classes
//! ```
//!
//! [`Workbench`] owns one snapshot and everything derived from it. The free
//! functions below are thin conveniences over the same building blocks for
//! callers that manage the pieces themselves.

pub mod shared;
pub mod workbench;

use std::path::Path;
use std::sync::LazyLock;

pub use shared::SharedWorkbench;
pub use vms_bundle::{Bundle, BundleId, BundleRegistry, Record, build_records};
pub use vms_classify::{DerivedIndices, InstructionClass, InstructionClassTable, MiddleClassifier};
pub use vms_corpus::{
    CorpusVocabulary, DataStore, LoadDiagnostics, LoadOptions, RegimeMap, TranscriberFilter,
};
pub use vms_error::{Result, VmsError};
pub use vms_legality::{FolioLegality, LegalityEngine, LegalityResult};
pub use vms_morph::{Decomposer, MorphologicalRecord, MorphologyTables};
pub use vms_types::{
    AnalysisConfig, BundleType, ClassId, CorpusSystem, FolioId, FunctionalRole, Language,
    LegalityStatus, MiddleClass, RecordGranularity, Regime, Token,
};
pub use workbench::{Workbench, WorkbenchSources, WorkbenchSummary};

static CANONICAL: LazyLock<Option<Decomposer>> = LazyLock::new(|| Decomposer::canonical().ok());

/// Decompose `token` with the embedded canonical tables.
///
/// Never fails: should the embedded tables be unusable the token is returned
/// whole as its MIDDLE.
#[must_use]
pub fn decompose(token: &str) -> MorphologicalRecord {
    CANONICAL.as_ref().map_or_else(
        || MorphologicalRecord {
            middle: (!token.is_empty()).then(|| token.to_owned()),
            ..MorphologicalRecord::default()
        },
        |decomposer| decomposer.decompose(token),
    )
}

/// Load a transcript keeping only the given transcriber track(s).
pub fn load_corpus(path: &Path, transcriber: TranscriberFilter) -> Result<DataStore> {
    vms_corpus::load_corpus(path, LoadOptions::default().with_transcriber(transcriber))
}

#[must_use]
pub fn classify_middle(middle: &str, store: &DataStore) -> MiddleClass {
    vms_classify::classify_middle(middle, store.vocabulary())
}

/// Collapse records into bundles against one snapshot.
#[must_use]
pub fn build_bundles(records: Vec<Record>, store: &DataStore, config: &AnalysisConfig) -> BundleRegistry {
    let classifier = MiddleClassifier::new(store.vocabulary());
    BundleRegistry::build(records, &classifier, store.vocabulary(), config)
}

#[must_use]
pub fn compute_bundle_legality(
    bundle: &Bundle,
    store: &DataStore,
    classes: &InstructionClassTable,
    config: &AnalysisConfig,
) -> LegalityResult {
    vms_legality::compute_bundle_legality(bundle, store.vocabulary(), classes, config)
}

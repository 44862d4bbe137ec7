//! Owned analysis session.
//!
//! A [`Workbench`] holds one corpus snapshot together with everything derived
//! from it. It is immutable: [`Workbench::reload`] and
//! [`Workbench::reconfigure`] return a new value rather than patching the
//! old one, so a changed tunable can never leave stale derived tables behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use vms_bundle::{Bundle, BundleId, BundleRegistry, build_records};
use vms_classify::{DerivedIndices, InstructionClassTable, MiddleClassifier};
use vms_corpus::{DataStore, LoadOptions, RegimeMap};
use vms_error::{Result, VmsError};
use vms_legality::{LegalityEngine, LegalityResult};
use vms_morph::MorphologicalRecord;
use vms_types::{AnalysisConfig, ClassId, CorpusSystem, FunctionalRole, MiddleClass};

const LOG_COMPONENT: &str = "vms.workbench";

/// Files a workbench is opened from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbenchSources {
    pub transcript: PathBuf,
    pub classes: PathBuf,
    pub regimes: PathBuf,
}

impl WorkbenchSources {
    #[must_use]
    pub fn new(
        transcript: impl Into<PathBuf>,
        classes: impl Into<PathBuf>,
        regimes: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            classes: classes.into(),
            regimes: regimes.into(),
        }
    }

    /// Conventional layout: `transcript.tsv`, `instruction_classes.json` and
    /// `regimes.json` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join("transcript.tsv"),
            dir.join("instruction_classes.json"),
            dir.join("regimes.json"),
        )
    }
}

/// Row counts of a built workbench, for logs and CLI summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkbenchSummary {
    pub tokens: usize,
    pub rows_skipped: usize,
    pub a_middles: usize,
    pub b_middles: usize,
    pub azc_middles: usize,
    pub b_folios: usize,
    pub classes: usize,
    pub records: usize,
    pub bundles: usize,
}

#[derive(Debug, Clone)]
pub struct Workbench {
    sources: Option<WorkbenchSources>,
    config: AnalysisConfig,
    store: DataStore,
    classifier: MiddleClassifier,
    classes: InstructionClassTable,
    regimes: RegimeMap,
    indices: DerivedIndices,
    registry: BundleRegistry,
}

impl Workbench {
    /// Load the transcript and both required fixtures, then derive every
    /// table. Tunables are validated before any file is read.
    pub fn open(sources: WorkbenchSources, options: LoadOptions, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        options.validate()?;
        let store = DataStore::load(&sources.transcript, options)?;
        let classes = InstructionClassTable::load(&sources.classes, store.decomposer())?;
        let regimes = RegimeMap::load(&sources.regimes)?;
        let mut workbench = Self::from_parts(store, classes, regimes, config)?;
        workbench.sources = Some(sources);
        Ok(workbench)
    }

    /// Build from already-loaded parts. The result cannot be reloaded.
    pub fn from_parts(
        store: DataStore,
        classes: InstructionClassTable,
        regimes: RegimeMap,
        config: AnalysisConfig,
    ) -> Result<Self> {
        config.validate()?;
        let classifier = MiddleClassifier::new(store.vocabulary());
        let indices = DerivedIndices::build(&store, &classes, &regimes);
        let registry = derive_registry(&store, &classifier, &config);
        let workbench = Self {
            sources: None,
            config,
            store,
            classifier,
            classes,
            regimes,
            indices,
            registry,
        };
        let summary = workbench.summary();
        info!(
            component = LOG_COMPONENT,
            tokens = summary.tokens,
            b_folios = summary.b_folios,
            records = summary.records,
            bundles = summary.bundles,
            "workbench built"
        );
        Ok(workbench)
    }

    /// Re-read the transcript and fixtures and rebuild everything.
    ///
    /// # Errors
    ///
    /// [`VmsError::Internal`] for a workbench built with
    /// [`from_parts`](Self::from_parts); otherwise any load error.
    pub fn reload(&self) -> Result<Self> {
        let Some(sources) = &self.sources else {
            return Err(VmsError::internal(
                "workbench was built from in-memory parts and has no sources to reload",
            ));
        };
        Self::open(
            sources.clone(),
            self.store.options().clone(),
            self.config.clone(),
        )
    }

    /// Same snapshot and fixtures, new tunables. Everything that depends on
    /// a tunable is rebuilt.
    pub fn reconfigure(&self, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let registry = derive_registry(&self.store, &self.classifier, &config);
        info!(
            component = LOG_COMPONENT,
            restricted_spread_max = config.restricted_spread_max(),
            bundles = registry.len(),
            "workbench reconfigured"
        );
        Ok(Self {
            config,
            registry,
            ..self.clone()
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn sources(&self) -> Option<&WorkbenchSources> {
        self.sources.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    #[must_use]
    pub fn classifier(&self) -> &MiddleClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn classes(&self) -> &InstructionClassTable {
        &self.classes
    }

    #[must_use]
    pub fn regimes(&self) -> &RegimeMap {
        &self.regimes
    }

    #[must_use]
    pub fn indices(&self) -> &DerivedIndices {
        &self.indices
    }

    #[must_use]
    pub fn registry(&self) -> &BundleRegistry {
        &self.registry
    }

    #[must_use]
    pub fn summary(&self) -> WorkbenchSummary {
        let vocabulary = self.store.vocabulary();
        WorkbenchSummary {
            tokens: self.store.tokens().len(),
            rows_skipped: self.store.diagnostics().rows_skipped,
            a_middles: vocabulary.a_middles().len(),
            b_middles: vocabulary.b_middles().len(),
            azc_middles: vocabulary.azc_middles().len(),
            b_folios: vocabulary.b_folios().len(),
            classes: self.classes.len(),
            records: self.registry.records().len(),
            bundles: self.registry.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn decompose(&self, token: &str) -> MorphologicalRecord {
        self.store.decomposer().decompose(token)
    }

    #[must_use]
    pub fn classify_middle(&self, middle: &str) -> MiddleClass {
        self.classifier.classify(middle)
    }

    #[must_use]
    pub fn classify_token(&self, token: &str) -> Option<ClassId> {
        self.classes.classify_token(token)
    }

    #[must_use]
    pub fn role_of_token(&self, token: &str) -> Option<FunctionalRole> {
        self.classes.role_of_token(token)
    }

    #[must_use]
    pub fn engine(&self) -> LegalityEngine<'_> {
        LegalityEngine::new(self.store.vocabulary(), &self.classes, &self.config)
    }

    /// Bundle for an arbitrary PP MIDDLE-set under the current tunables.
    #[must_use]
    pub fn bundle_for<I, S>(&self, pp_middles: I) -> Bundle
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Bundle::from_pp_set(
            pp_middles.into_iter().map(Into::into).collect(),
            self.store.vocabulary(),
            &self.config,
        )
    }

    /// Legality of one registered bundle.
    ///
    /// # Errors
    ///
    /// [`VmsError::UnknownBundle`] if `id` is not in the registry.
    pub fn legality(&self, id: &BundleId) -> Result<LegalityResult> {
        let bundle = self
            .registry
            .get(id)
            .ok_or_else(|| VmsError::UnknownBundle {
                bundle: id.to_string(),
            })?;
        Ok(self.engine().compute_bundle_legality(bundle))
    }

    #[must_use]
    pub fn legality_all(&self) -> BTreeMap<BundleId, LegalityResult> {
        self.engine().compute_all(&self.registry)
    }
}

fn derive_registry(
    store: &DataStore,
    classifier: &MiddleClassifier,
    config: &AnalysisConfig,
) -> BundleRegistry {
    let records = build_records(store.tokens_in(CorpusSystem::CurrierA), config);
    BundleRegistry::build(records, classifier, store.vocabulary(), config)
}

//! Reachability and class survival.
//!
//! For a bundle `b` with restricted set `R` and a B-folio `F` with MIDDLE
//! vocabulary `V`:
//!
//! ```text
//! status(b, F) = UNREACHABLE  if V = {}
//!                REACHABLE    if R = {} or R ⊆ V
//!                CONDITIONAL  if R ∩ V != {}
//!                UNREACHABLE  otherwise
//! ```
//!
//! The legal vocabulary `L(b, F)` admits a MIDDLE `m` when
//!
//! * `m` is unrestricted, or
//! * `m` is restricted, occurs on some AZC folio compatible with `b`, and is
//!   not one of `b`'s own restricted MIDDLEs missing from `V`.
//!
//! Growing `b`'s PP set grows `R`, shrinks the compatible folios and grows
//! the exclusions, so `L` can only shrink. A class survives on `F` when a
//! member MIDDLE is in `L` or a member is atomic; on an empty-vocabulary
//! folio only classes with an atomic member survive.
//!
//! Every (bundle, folio) pair is evaluated independently from read-only
//! inputs.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};
use vms_bundle::{Bundle, BundleId, BundleRegistry, is_restricted};
use vms_classify::InstructionClassTable;
use vms_corpus::CorpusVocabulary;
use vms_error::{Result, VmsError};
use vms_types::{AnalysisConfig, ClassId, FolioId, LegalityStatus};

use crate::result::{FolioLegality, LegalityResult};

const LOG_COMPONENT: &str = "vms.legality.engine";

/// Status of one (restricted set, folio vocabulary) pair.
#[must_use]
pub fn folio_status(restricted: &BTreeSet<String>, folio_vocab: &BTreeSet<String>) -> LegalityStatus {
    if folio_vocab.is_empty() {
        return LegalityStatus::Unreachable;
    }
    if restricted.is_subset(folio_vocab) {
        return LegalityStatus::Reachable;
    }
    if restricted.iter().any(|m| folio_vocab.contains(m)) {
        LegalityStatus::Conditional
    } else {
        LegalityStatus::Unreachable
    }
}

/// Bundle-level state shared by every folio evaluation.
struct BundleView<'b> {
    bundle: &'b Bundle,
    /// Restricted MIDDLEs attested on at least one compatible AZC folio.
    admitted: BTreeSet<&'b str>,
}

/// Legality engine over one snapshot and one class table.
pub struct LegalityEngine<'a> {
    vocabulary: &'a CorpusVocabulary,
    classes: &'a InstructionClassTable,
    config: &'a AnalysisConfig,
}

impl<'a> LegalityEngine<'a> {
    #[must_use]
    pub fn new(
        vocabulary: &'a CorpusVocabulary,
        classes: &'a InstructionClassTable,
        config: &'a AnalysisConfig,
    ) -> Self {
        for (folio, vocab) in vocabulary.b_folios() {
            if vocab.is_empty() {
                warn!(
                    component = LOG_COMPONENT,
                    folio = %folio,
                    "B-folio has no MIDDLE vocabulary; it is unreachable for every bundle"
                );
            }
        }
        debug!(
            component = LOG_COMPONENT,
            b_folios = vocabulary.b_folios().len(),
            classes = classes.len(),
            restricted_spread_max = config.restricted_spread_max(),
            "legality engine ready"
        );
        Self {
            vocabulary,
            classes,
            config,
        }
    }

    fn is_restricted(&self, middle: &str) -> bool {
        is_restricted(middle, self.vocabulary, self.config.restricted_spread_max())
    }

    fn view<'b>(&'b self, bundle: &'b Bundle) -> BundleView<'b>
    where
        'a: 'b,
    {
        let admitted = bundle
            .compatible_folios
            .iter()
            .filter_map(|folio| self.vocabulary.azc_folios().get(folio))
            .flatten()
            .map(String::as_str)
            .filter(|m| self.is_restricted(m))
            .collect();
        BundleView { bundle, admitted }
    }

    fn is_legal(&self, view: &BundleView<'_>, folio_vocab: &BTreeSet<String>, middle: &str) -> bool {
        if !self.is_restricted(middle) {
            return true;
        }
        if view.bundle.restricted_middles.contains(middle) && !folio_vocab.contains(middle) {
            return false;
        }
        view.admitted.contains(middle)
    }

    fn evaluate(&self, view: &BundleView<'_>, folio_vocab: &BTreeSet<String>) -> FolioLegality {
        let status = folio_status(&view.bundle.restricted_middles, folio_vocab);
        let surviving_classes: BTreeSet<ClassId> = if folio_vocab.is_empty() {
            self.classes
                .classes()
                .filter(|class| class.has_atomic_member)
                .map(|class| class.id)
                .collect()
        } else {
            self.classes
                .classes()
                .filter(|class| class.survives(|m| self.is_legal(view, folio_vocab, m)))
                .map(|class| class.id)
                .collect()
        };
        FolioLegality {
            status,
            surviving_classes,
        }
    }

    /// Evaluate `bundle` against every B-folio in the snapshot.
    #[must_use]
    pub fn compute_bundle_legality(&self, bundle: &Bundle) -> LegalityResult {
        let view = self.view(bundle);
        let folios: BTreeMap<FolioId, FolioLegality> = self
            .vocabulary
            .b_folios()
            .iter()
            .map(|(folio, vocab)| (folio.clone(), self.evaluate(&view, vocab)))
            .collect();
        let result = LegalityResult {
            bundle_id: bundle.id.clone(),
            folios,
        };
        let counts = result.status_counts();
        debug!(
            component = LOG_COMPONENT,
            bundle = bundle.id.short(),
            restricted = bundle.restricted_middles.len(),
            reachable = counts.get(&LegalityStatus::Reachable).copied().unwrap_or(0),
            conditional = counts.get(&LegalityStatus::Conditional).copied().unwrap_or(0),
            unreachable = counts.get(&LegalityStatus::Unreachable).copied().unwrap_or(0),
            "bundle legality computed"
        );
        result
    }

    /// Evaluate one (bundle, folio) pair.
    ///
    /// # Errors
    ///
    /// [`VmsError::UnknownFolio`] if `folio` is not a B-folio of the snapshot.
    pub fn folio_legality(&self, bundle: &Bundle, folio: &FolioId) -> Result<FolioLegality> {
        let vocab = self
            .vocabulary
            .b_folio_vocabulary(folio)
            .ok_or_else(|| VmsError::UnknownFolio {
                folio: folio.to_string(),
            })?;
        Ok(self.evaluate(&self.view(bundle), vocab))
    }

    /// Legal MIDDLEs for (bundle, folio), restricted to the MIDDLEs the
    /// snapshot and the class table know about.
    pub fn legal_vocabulary(&self, bundle: &Bundle, folio: &FolioId) -> Result<BTreeSet<String>> {
        let vocab = self
            .vocabulary
            .b_folio_vocabulary(folio)
            .ok_or_else(|| VmsError::UnknownFolio {
                folio: folio.to_string(),
            })?;
        let view = self.view(bundle);
        let universe = self
            .vocabulary
            .a_middles()
            .iter()
            .chain(self.vocabulary.b_middles())
            .chain(self.vocabulary.azc_middles())
            .chain(self.classes.middle_index().keys());
        Ok(universe
            .filter(|m| self.is_legal(&view, vocab, m))
            .cloned()
            .collect())
    }

    /// Evaluate every bundle of a registry.
    #[must_use]
    pub fn compute_all(&self, registry: &BundleRegistry) -> BTreeMap<BundleId, LegalityResult> {
        let results: BTreeMap<BundleId, LegalityResult> = registry
            .bundles()
            .map(|bundle| (bundle.id.clone(), self.compute_bundle_legality(bundle)))
            .collect();
        info!(
            component = LOG_COMPONENT,
            bundles = results.len(),
            b_folios = self.vocabulary.b_folios().len(),
            "legality computed for registry"
        );
        results
    }
}

/// One-shot form of [`LegalityEngine::compute_bundle_legality`].
#[must_use]
pub fn compute_bundle_legality(
    bundle: &Bundle,
    vocabulary: &CorpusVocabulary,
    classes: &InstructionClassTable,
    config: &AnalysisConfig,
) -> LegalityResult {
    LegalityEngine::new(vocabulary, classes, config).compute_bundle_legality(bundle)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use vms_corpus::{DataStore, LoadOptions};

    use super::*;

    const TSV: &str = "word\tfolio\tline_number\tsection\tlanguage\tplacement\ttranscriber\n\
        qokal\tf57v\t1\tZ\tNA\tR1\tH\n\
        qotal\tf57v\t1\tZ\tNA\tR1\tH\n\
        qokal\tf67r1\t1\tC\tNA\tR1\tH\n\
        qochal\tf67r1\t1\tC\tNA\tR1\tH\n\
        qochal\tf68r1\t1\tA\tNA\tR1\tH\n\
        qoshal\tf68r1\t1\tA\tNA\tR1\tH\n\
        qochal\tf70v2\t1\tZ\tNA\tR1\tH\n\
        qochal\tf71r\t1\tZ\tNA\tR1\tH\n\
        qokaiin\tf1r\t1\tH\tA\tP\tH\n\
        qotaiin\tf1r\t1\tH\tA\tP\tH\n\
        qochaiin\tf1r\t1\tH\tA\tP\tH\n\
        qoshaiin\tf1r\t1\tH\tA\tP\tH\n\
        qokedy\tf103r\t1\tS\tB\tP\tH\n\
        qotedy\tf103r\t1\tS\tB\tP\tH\n\
        qochedy\tf103r\t1\tS\tB\tP\tH\n\
        qochedy\tf104r\t1\tS\tB\tP\tH\n\
        qoshedy\tf104r\t1\tS\tB\tP\tH\n\
        daiin\tf105r\t1\tS\tB\tP\tH\n";

    const CLASSES: &str = r#"{"version": 1, "classes": [
        {"id": 1, "role": "CORE_CONTROL", "members": ["daiin"]},
        {"id": 2, "role": "ENERGY_OPERATOR", "members": ["qokedy"]},
        {"id": 3, "role": "FLOW_OPERATOR", "members": ["qotedy"]},
        {"id": 4, "role": "FREQUENT_OPERATOR", "members": ["qochedy"]},
        {"id": 5, "role": "AUXILIARY", "members": ["qoshedy"]}
    ]}"#;

    struct Fixture {
        store: DataStore,
        classes: InstructionClassTable,
        config: AnalysisConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let store = DataStore::from_tsv_str(TSV, LoadOptions::default()).expect("store");
            let classes =
                InstructionClassTable::from_json_str(CLASSES, store.decomposer()).expect("classes");
            Self {
                store,
                classes,
                config: AnalysisConfig::default(),
            }
        }

        fn engine(&self) -> LegalityEngine<'_> {
            LegalityEngine::new(self.store.vocabulary(), &self.classes, &self.config)
        }

        fn bundle(&self, middles: &[&str]) -> Bundle {
            Bundle::from_pp_set(
                middles.iter().map(|m| (*m).to_owned()).collect(),
                self.store.vocabulary(),
                &self.config,
            )
        }
    }

    fn ids(ids: &[u16]) -> BTreeSet<ClassId> {
        ids.iter().copied().map(ClassId).collect()
    }

    fn folio(id: &str) -> FolioId {
        FolioId::from(id)
    }

    #[test]
    fn empty_bundle_reaches_every_populated_folio() {
        let fx = Fixture::new();
        let result = fx.engine().compute_bundle_legality(&fx.bundle(&[]));
        for id in ["f103r", "f104r"] {
            let legality = result.get(&folio(id)).expect("folio");
            assert_eq!(legality.status, LegalityStatus::Reachable);
            assert_eq!(legality.surviving_classes, fx.classes.ids());
        }
    }

    #[test]
    fn empty_vocabulary_folio_is_unreachable() {
        let fx = Fixture::new();
        let engine = fx.engine();
        for middles in [&[][..], &["k"][..], &["k", "sh"][..]] {
            let legality = engine
                .folio_legality(&fx.bundle(middles), &folio("f105r"))
                .expect("known folio");
            assert_eq!(legality.status, LegalityStatus::Unreachable);
            assert_eq!(legality.surviving_classes, ids(&[1]));
        }
    }

    #[test]
    fn restricted_overlap_decides_status() {
        let fx = Fixture::new();
        let engine = fx.engine();

        let k = engine.compute_bundle_legality(&fx.bundle(&["k", "ch"]));
        assert_eq!(k.status_of(&folio("f103r")), Some(LegalityStatus::Reachable));
        assert_eq!(k.status_of(&folio("f104r")), Some(LegalityStatus::Unreachable));
        assert_eq!(k.get(&folio("f103r")).expect("f103r").surviving_classes, ids(&[1, 2, 3, 4]));
        assert_eq!(k.get(&folio("f104r")).expect("f104r").surviving_classes, ids(&[1, 3, 4]));

        let blocked = fx.bundle(&["k", "sh"]);
        let result = engine.compute_bundle_legality(&blocked);
        assert_eq!(result.status_of(&folio("f103r")), Some(LegalityStatus::Conditional));
        assert_eq!(result.status_of(&folio("f104r")), Some(LegalityStatus::Conditional));
        assert_eq!(result.get(&folio("f104r")).expect("f104r").surviving_classes, ids(&[1, 4]));
    }

    #[test]
    fn legal_vocabulary_excludes_missing_own_restricted() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let bundle = fx.bundle(&["k"]);
        let legal = engine.legal_vocabulary(&bundle, &folio("f104r")).expect("f104r");
        assert!(legal.contains("ch"));
        assert!(legal.contains("t"));
        assert!(!legal.contains("k"));
        assert!(!legal.contains("sh"));
        let err = engine
            .legal_vocabulary(&bundle, &folio("f999r"))
            .expect_err("unknown");
        assert!(matches!(err, VmsError::UnknownFolio { .. }));
    }

    #[test]
    fn free_function_matches_engine() {
        let fx = Fixture::new();
        let bundle = fx.bundle(&["t"]);
        assert_eq!(
            compute_bundle_legality(&bundle, fx.store.vocabulary(), &fx.classes, &fx.config),
            fx.engine().compute_bundle_legality(&bundle)
        );
    }

    #[test]
    fn folio_status_table() {
        let set = |items: &[&str]| items.iter().map(|s| (*s).to_owned()).collect::<BTreeSet<_>>();
        assert_eq!(folio_status(&set(&[]), &set(&["k"])), LegalityStatus::Reachable);
        assert_eq!(folio_status(&set(&["k"]), &set(&["k", "t"])), LegalityStatus::Reachable);
        assert_eq!(folio_status(&set(&["k", "t"]), &set(&["k"])), LegalityStatus::Conditional);
        assert_eq!(folio_status(&set(&["k"]), &set(&["t"])), LegalityStatus::Unreachable);
        assert_eq!(folio_status(&set(&[]), &set(&[])), LegalityStatus::Unreachable);
    }

    proptest! {
        #[test]
        fn survivors_shrink_as_pp_set_grows(
            picks in proptest::collection::vec((any::<bool>(), any::<bool>()), 6)
        ) {
            let universe = ["k", "t", "ch", "sh", "zz", "qq"];
            let mut larger = Vec::new();
            let mut smaller = Vec::new();
            for (middle, (in_larger, in_smaller)) in universe.iter().zip(&picks) {
                if *in_larger {
                    larger.push(*middle);
                    if *in_smaller {
                        smaller.push(*middle);
                    }
                }
            }
            let fx = Fixture::new();
            let engine = fx.engine();
            let small = engine.compute_bundle_legality(&fx.bundle(&smaller));
            let large = engine.compute_bundle_legality(&fx.bundle(&larger));
            for (id, legality) in &large.folios {
                let small_survivors = &small.get(id).expect("same folios").surviving_classes;
                prop_assert!(legality.surviving_classes.is_subset(small_survivors));
            }
        }
    }
}

//! RI / PP stratification of MIDDLEs.
//!
//! The three corpus-wide sets (`a_middles`, `b_middles`, `azc_middles`) come
//! from [`CorpusVocabulary`]. The classifier materialises the partition of
//! the A-vocabulary once; queries are a single map lookup afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;
use vms_corpus::CorpusVocabulary;
use vms_types::MiddleClass;

const LOG_COMPONENT: &str = "vms.classify.middle";

/// Classify `middle` directly against the vocabulary sets.
///
/// RI = A \ B; PP = A ∩ B, split into PP_AZC (also in AZC) and PP_BNATIVE.
/// Anything outside the A-vocabulary is [`MiddleClass::NotApplicable`].
#[must_use]
pub fn classify_middle(middle: &str, vocabulary: &CorpusVocabulary) -> MiddleClass {
    if !vocabulary.a_middles().contains(middle) {
        return MiddleClass::NotApplicable;
    }
    if !vocabulary.b_middles().contains(middle) {
        return MiddleClass::Ri;
    }
    if vocabulary.azc_middles().contains(middle) {
        MiddleClass::PpAzc
    } else {
        MiddleClass::PpBNative
    }
}

/// Per-stratum sizes of the A-vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StratumCounts {
    pub ri: usize,
    pub pp_azc: usize,
    pub pp_bnative: usize,
}

impl StratumCounts {
    #[must_use]
    pub const fn pp(&self) -> usize {
        self.pp_azc + self.pp_bnative
    }
}

/// Frozen classification of every A-side MIDDLE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiddleClassifier {
    classes: BTreeMap<String, MiddleClass>,
}

impl MiddleClassifier {
    #[must_use]
    pub fn new(vocabulary: &CorpusVocabulary) -> Self {
        let classes: BTreeMap<String, MiddleClass> = vocabulary
            .a_middles()
            .iter()
            .map(|middle| (middle.clone(), classify_middle(middle, vocabulary)))
            .collect();
        let classifier = Self { classes };
        let counts = classifier.counts();
        debug!(
            component = LOG_COMPONENT,
            ri = counts.ri,
            pp_azc = counts.pp_azc,
            pp_bnative = counts.pp_bnative,
            "middle classifier built"
        );
        classifier
    }

    #[must_use]
    pub fn classify(&self, middle: &str) -> MiddleClass {
        self.classes
            .get(middle)
            .copied()
            .unwrap_or(MiddleClass::NotApplicable)
    }

    /// Classify an optional MIDDLE; the empty sentinel is never classified.
    #[must_use]
    pub fn classify_opt(&self, middle: Option<&str>) -> MiddleClass {
        middle.map_or(MiddleClass::NotApplicable, |m| self.classify(m))
    }

    #[must_use]
    pub fn is_pp(&self, middle: &str) -> bool {
        self.classify(middle).is_pp()
    }

    /// Every MIDDLE in one stratum, ordered.
    #[must_use]
    pub fn middles_in(&self, class: MiddleClass) -> BTreeSet<&str> {
        self.classes
            .iter()
            .filter(|(_, c)| **c == class)
            .map(|(m, _)| m.as_str())
            .collect()
    }

    /// PP MIDDLEs of both strata.
    #[must_use]
    pub fn pp_middles(&self) -> BTreeSet<&str> {
        self.classes
            .iter()
            .filter(|(_, c)| c.is_pp())
            .map(|(m, _)| m.as_str())
            .collect()
    }

    #[must_use]
    pub fn counts(&self) -> StratumCounts {
        let mut counts = StratumCounts::default();
        for class in self.classes.values() {
            match class {
                MiddleClass::Ri => counts.ri += 1,
                MiddleClass::PpAzc => counts.pp_azc += 1,
                MiddleClass::PpBNative => counts.pp_bnative += 1,
                MiddleClass::NotApplicable => {}
            }
        }
        counts
    }

    /// `(MIDDLE, class)` pairs in MIDDLE order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, MiddleClass)> {
        self.classes.iter().map(|(m, c)| (m.as_str(), *c))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use vms_corpus::{DataStore, LoadOptions};

    use super::*;

    const HEADER: &str = "word\tfolio\tline_number\tsection\tlanguage\tplacement\ttranscriber";

    fn store(rows: &[&str]) -> DataStore {
        let mut text = HEADER.to_owned();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        DataStore::from_tsv_str(&text, LoadOptions::default()).expect("store")
    }

    #[test]
    fn shared_middle_without_azc_is_b_native() {
        // qo + abc + dy on both sides, never in diagram text.
        let store = store(&[
            "qoabcdy\tf1r\t1\tH\tA\tP\tH",
            "qoabcdy\tf103r\t1\tS\tB\tP\tH",
            "qokaiin\tf57v\t1\tZ\tNA\tR1\tH",
        ]);
        assert_eq!(classify_middle("abc", store.vocabulary()), MiddleClass::PpBNative);
        let classifier = MiddleClassifier::new(store.vocabulary());
        assert_eq!(classifier.classify("abc"), MiddleClass::PpBNative);
    }

    #[test]
    fn strata_follow_set_membership() {
        let store = store(&[
            "qokaiin\tf1r\t1\tH\tA\tP\tH",
            "qotaiin\tf1r\t1\tH\tA\tP\tH",
            "qokedy\tf103r\t1\tS\tB\tP\tH",
            "okedy\tf103r\t1\tS\tB\tP\tH",
            "qokal\tf57v\t1\tZ\tNA\tR1\tH",
        ]);
        let vocab = store.vocabulary();
        assert_eq!(classify_middle("k", vocab), MiddleClass::PpAzc);
        assert_eq!(classify_middle("t", vocab), MiddleClass::Ri);
        assert_eq!(classify_middle("zzz", vocab), MiddleClass::NotApplicable);

        let classifier = MiddleClassifier::new(vocab);
        assert_eq!(classifier.counts(), StratumCounts { ri: 1, pp_azc: 1, pp_bnative: 0 });
        assert_eq!(classifier.classify_opt(None), MiddleClass::NotApplicable);
        assert_eq!(classifier.pp_middles().into_iter().collect::<Vec<_>>(), vec!["k"]);
    }

    #[test]
    fn repeated_queries_agree() {
        let store = store(&["qokaiin\tf1r\t1\tH\tA\tP\tH", "qokedy\tf103r\t1\tS\tB\tP\tH"]);
        let classifier = MiddleClassifier::new(store.vocabulary());
        let first: Vec<_> = classifier.iter().collect();
        let rebuilt = MiddleClassifier::new(store.vocabulary());
        let second: Vec<_> = rebuilt.iter().collect();
        assert_eq!(first, second);
        assert_eq!(classifier.classify("k"), classifier.classify("k"));
    }

    proptest! {
        #[test]
        fn strata_partition_a_vocabulary(
            a in proptest::collection::btree_set("[a-e]{1,2}", 0..12),
            b in proptest::collection::btree_set("[a-e]{1,2}", 0..12),
            azc in proptest::collection::btree_set("[a-e]{1,2}", 0..12),
        ) {
            let mut rows = Vec::new();
            for m in &a { rows.push(format!("qo{m}dy\tf1r\t1\tH\tA\tP\tH")); }
            for m in &b { rows.push(format!("qo{m}dy\tf103r\t1\tS\tB\tP\tH")); }
            for m in &azc { rows.push(format!("qo{m}dy\tf57v\t1\tZ\tNA\tR1\tH")); }
            let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
            let store = store(&refs);
            let classifier = MiddleClassifier::new(store.vocabulary());

            let ri = classifier.middles_in(MiddleClass::Ri);
            let pp = classifier.pp_middles();
            let pp_azc = classifier.middles_in(MiddleClass::PpAzc);
            let pp_bnative = classifier.middles_in(MiddleClass::PpBNative);

            prop_assert!(ri.is_disjoint(&pp));
            prop_assert!(pp_azc.is_disjoint(&pp_bnative));
            let union: BTreeSet<&str> = ri.union(&pp).copied().collect();
            let a_vocab: BTreeSet<&str> =
                store.vocabulary().a_middles().iter().map(String::as_str).collect();
            prop_assert_eq!(union, a_vocab);
            let pp_union: BTreeSet<&str> = pp_azc.union(&pp_bnative).copied().collect();
            prop_assert_eq!(pp_union, pp);
        }
    }
}

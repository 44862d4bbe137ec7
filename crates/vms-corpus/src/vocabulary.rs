//! Corpus-wide MIDDLE vocabulary index.
//!
//! Built once per snapshot in a single pass over the token stream:
//!
//! ```text
//! CorpusVocabulary
//!   ├── system_middles   CorpusSystem -> {MIDDLE}       (A, B, AZC sets)
//!   ├── azc_folios       AZC folio    -> {MIDDLE}
//!   ├── azc_spread       MIDDLE       -> #AZC folios carrying it
//!   ├── b_folios         B folio      -> {MIDDLE}
//!   └── b_folio_words    B folio      -> {word}
//! ```
//!
//! Every folio that contributed a token has an entry, even when all its
//! tokens were atomic and its MIDDLE set is empty.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;
use vms_morph::MorphologicalRecord;
use vms_types::{CorpusSystem, FolioId, Language, Token};

const LOG_COMPONENT: &str = "vms.corpus.vocabulary";

/// Assign a token to its sub-corpus.
#[must_use]
pub fn corpus_system(token: &Token, azc_sections: &BTreeSet<String>) -> CorpusSystem {
    match token.language {
        Language::A => CorpusSystem::CurrierA,
        Language::B => CorpusSystem::CurrierB,
        Language::Na if azc_sections.contains(&token.section) => CorpusSystem::Azc,
        Language::Na => CorpusSystem::Unassigned,
    }
}

/// Immutable vocabulary index over one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusVocabulary {
    system_middles: BTreeMap<CorpusSystem, BTreeSet<String>>,
    azc_folios: BTreeMap<FolioId, BTreeSet<String>>,
    azc_spread: BTreeMap<String, u32>,
    b_folios: BTreeMap<FolioId, BTreeSet<String>>,
    b_folio_words: BTreeMap<FolioId, BTreeSet<String>>,
}

impl CorpusVocabulary {
    /// Build the index. `morphology[i]` must be the decomposition of `tokens[i]`.
    #[must_use]
    pub fn build(
        tokens: &[Token],
        morphology: &[MorphologicalRecord],
        azc_sections: &BTreeSet<String>,
    ) -> Self {
        debug_assert_eq!(tokens.len(), morphology.len());
        let mut vocab = Self::default();

        for (token, record) in tokens.iter().zip(morphology) {
            let system = corpus_system(token, azc_sections);
            let middle = record.middle.as_ref();
            if let Some(middle) = middle {
                vocab
                    .system_middles
                    .entry(system)
                    .or_default()
                    .insert(middle.clone());
            }
            match system {
                CorpusSystem::Azc => {
                    let folio = vocab.azc_folios.entry(token.folio.clone()).or_default();
                    if let Some(middle) = middle {
                        folio.insert(middle.clone());
                    }
                }
                CorpusSystem::CurrierB => {
                    let folio = vocab.b_folios.entry(token.folio.clone()).or_default();
                    if let Some(middle) = middle {
                        folio.insert(middle.clone());
                    }
                    vocab
                        .b_folio_words
                        .entry(token.folio.clone())
                        .or_default()
                        .insert(token.word.clone());
                }
                CorpusSystem::CurrierA | CorpusSystem::Unassigned => {}
            }
        }

        for middles in vocab.azc_folios.values() {
            for middle in middles {
                *vocab.azc_spread.entry(middle.clone()).or_default() += 1;
            }
        }

        debug!(
            component = LOG_COMPONENT,
            a_middles = vocab.a_middles().len(),
            b_middles = vocab.b_middles().len(),
            azc_middles = vocab.azc_middles().len(),
            azc_folios = vocab.azc_folios.len(),
            b_folios = vocab.b_folios.len(),
            "corpus vocabulary built"
        );
        vocab
    }

    /// MIDDLEs attested in one sub-corpus.
    #[must_use]
    pub fn middles_of(&self, system: CorpusSystem) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.system_middles.get(&system).unwrap_or(&EMPTY)
    }

    #[must_use]
    pub fn a_middles(&self) -> &BTreeSet<String> {
        self.middles_of(CorpusSystem::CurrierA)
    }

    #[must_use]
    pub fn b_middles(&self) -> &BTreeSet<String> {
        self.middles_of(CorpusSystem::CurrierB)
    }

    #[must_use]
    pub fn azc_middles(&self) -> &BTreeSet<String> {
        self.middles_of(CorpusSystem::Azc)
    }

    /// Number of distinct AZC folios carrying `middle` (0 if none).
    #[must_use]
    pub fn azc_spread(&self, middle: &str) -> u32 {
        self.azc_spread.get(middle).copied().unwrap_or(0)
    }

    /// AZC folio vocabularies, ordered by folio id.
    #[must_use]
    pub fn azc_folios(&self) -> &BTreeMap<FolioId, BTreeSet<String>> {
        &self.azc_folios
    }

    /// B-folio vocabularies, ordered by folio id.
    #[must_use]
    pub fn b_folios(&self) -> &BTreeMap<FolioId, BTreeSet<String>> {
        &self.b_folios
    }

    #[must_use]
    pub fn b_folio_vocabulary(&self, folio: &FolioId) -> Option<&BTreeSet<String>> {
        self.b_folios.get(folio)
    }

    /// Distinct word types on a B-folio.
    #[must_use]
    pub fn b_folio_words(&self, folio: &FolioId) -> Option<&BTreeSet<String>> {
        self.b_folio_words.get(folio)
    }
}

#[cfg(test)]
mod tests {
    use vms_morph::Decomposer;
    use vms_types::Placement;

    use super::*;

    fn token(word: &str, folio: &str, section: &str, language: Language) -> Token {
        Token {
            word: word.to_owned(),
            folio: FolioId::from(folio),
            line: 1,
            section: section.to_owned(),
            language,
            placement: Placement::new("P"),
            transcriber: "H".to_owned(),
        }
    }

    fn sections() -> BTreeSet<String> {
        ["Z", "A", "C"].iter().map(|s| (*s).to_owned()).collect()
    }

    fn build(tokens: &[Token]) -> CorpusVocabulary {
        let decomposer = Decomposer::canonical().expect("tables");
        let morphology: Vec<_> = tokens.iter().map(|t| decomposer.decompose(&t.word)).collect();
        CorpusVocabulary::build(tokens, &morphology, &sections())
    }

    #[test]
    fn systems_follow_language_and_section() {
        let azc_sections = sections();
        assert_eq!(
            corpus_system(&token("okal", "f57v", "Z", Language::Na), &azc_sections),
            CorpusSystem::Azc
        );
        assert_eq!(
            corpus_system(&token("okal", "f116v", "T", Language::Na), &azc_sections),
            CorpusSystem::Unassigned
        );
        assert_eq!(
            corpus_system(&token("okal", "f1r", "H", Language::A), &azc_sections),
            CorpusSystem::CurrierA
        );
    }

    #[test]
    fn spread_counts_distinct_azc_folios() {
        let vocab = build(&[
            token("qokaiin", "f67r1", "C", Language::Na),
            token("okaiin", "f67r1", "C", Language::Na),
            token("qokaiin", "f70v2", "Z", Language::Na),
            token("qokaiin", "f1r", "H", Language::A),
        ]);
        // qokaiin -> k, okaiin -> ok + None + aiin (atomic)
        assert_eq!(vocab.azc_spread("k"), 2);
        assert_eq!(vocab.azc_spread("zzz"), 0);
        assert!(vocab.a_middles().contains("k"));
        assert_eq!(vocab.azc_folios().len(), 2);
    }

    #[test]
    fn atomic_only_b_folio_has_empty_vocabulary() {
        let vocab = build(&[
            token("qoaiin", "f103r", "S", Language::B),
            token("qokeedy", "f104r", "S", Language::B),
        ]);
        let empty = vocab
            .b_folio_vocabulary(&FolioId::from("f103r"))
            .expect("folio present");
        assert!(empty.is_empty());
        assert_eq!(
            vocab.b_folio_words(&FolioId::from("f103r")).map(BTreeSet::len),
            Some(1)
        );
        assert!(vocab.b_middles().contains("k"));
    }
}

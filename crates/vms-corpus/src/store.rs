//! Immutable corpus snapshot.
//!
//! A [`DataStore`] is built once from a transcript and never mutated. There is
//! no process-wide cache: callers pass the store by reference to everything
//! that needs it and call [`DataStore::reload`] to obtain a fresh snapshot
//! when the source file changes.

use std::path::{Path, PathBuf};

use tracing::info;
use vms_error::{Result, VmsError};
use vms_morph::{Decomposer, MorphologicalRecord};
use vms_types::{CorpusSystem, FolioId, Token};

use crate::loader::{LoadDiagnostics, LoadOptions, parse_transcript, parse_transcript_bytes};
use crate::vocabulary::{CorpusVocabulary, corpus_system};

const LOG_COMPONENT: &str = "vms.corpus.store";

/// Loaded, filtered, decomposed corpus with its vocabulary index.
#[derive(Debug, Clone)]
pub struct DataStore {
    source: Option<PathBuf>,
    options: LoadOptions,
    decomposer: Decomposer,
    tokens: Vec<Token>,
    morphology: Vec<MorphologicalRecord>,
    vocabulary: CorpusVocabulary,
    diagnostics: LoadDiagnostics,
}

impl DataStore {
    /// Load a transcript file. The file is only read.
    ///
    /// # Errors
    ///
    /// Invalid options fail before the file is opened. I/O failures and a
    /// structurally unusable header are returned; malformed rows are skipped.
    pub fn load(path: &Path, options: LoadOptions) -> Result<Self> {
        options.validate()?;
        let bytes = std::fs::read(path).map_err(|err| VmsError::io(path, err))?;
        let (tokens, diagnostics) = parse_transcript_bytes(&bytes, &options)?;
        let mut store = Self::assemble(tokens, diagnostics, options)?;
        store.source = Some(path.to_path_buf());
        info!(
            component = LOG_COMPONENT,
            path = %path.display(),
            tokens = store.tokens.len(),
            rows_skipped = store.diagnostics.rows_skipped,
            "data store loaded"
        );
        Ok(store)
    }

    /// Build a store from transcript text held in memory.
    pub fn from_tsv_str(text: &str, options: LoadOptions) -> Result<Self> {
        options.validate()?;
        let (tokens, diagnostics) = parse_transcript(text, &options)?;
        Self::assemble(tokens, diagnostics, options)
    }

    fn assemble(
        tokens: Vec<Token>,
        diagnostics: LoadDiagnostics,
        options: LoadOptions,
    ) -> Result<Self> {
        let decomposer = match &options.tables {
            Some(tables) => Decomposer::new(tables.clone()),
            None => Decomposer::canonical()?,
        };
        let morphology: Vec<MorphologicalRecord> = tokens
            .iter()
            .map(|token| decomposer.decompose(&token.word))
            .collect();
        let vocabulary = CorpusVocabulary::build(&tokens, &morphology, &options.azc_sections);
        Ok(Self {
            source: None,
            options,
            decomposer,
            tokens,
            morphology,
            vocabulary,
            diagnostics,
        })
    }

    /// Re-read the source file with the same options.
    ///
    /// # Errors
    ///
    /// Returns [`VmsError::Internal`] for stores built from memory.
    pub fn reload(&self) -> Result<Self> {
        let Some(source) = &self.source else {
            return Err(VmsError::internal(
                "data store was built from memory and has no source file to reload",
            ));
        };
        Self::load(source, self.options.clone())
    }

    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    #[must_use]
    pub fn decomposer(&self) -> &Decomposer {
        &self.decomposer
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Decompositions, parallel to [`tokens`](Self::tokens).
    #[must_use]
    pub fn morphology(&self) -> &[MorphologicalRecord] {
        &self.morphology
    }

    #[must_use]
    pub fn vocabulary(&self) -> &CorpusVocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn diagnostics(&self) -> &LoadDiagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn system_of(&self, token: &Token) -> CorpusSystem {
        corpus_system(token, &self.options.azc_sections)
    }

    /// Tokens of one sub-corpus, in transcript order, paired with their
    /// decompositions.
    pub fn tokens_in(
        &self,
        system: CorpusSystem,
    ) -> impl Iterator<Item = (&Token, &MorphologicalRecord)> {
        self.tokens
            .iter()
            .zip(&self.morphology)
            .filter(move |(token, _)| self.system_of(token) == system)
    }

    /// B-folios in the snapshot, ordered by id.
    pub fn b_folios(&self) -> impl Iterator<Item = &FolioId> {
        self.vocabulary.b_folios().keys()
    }
}

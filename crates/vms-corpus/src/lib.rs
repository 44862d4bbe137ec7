//! Corpus loading for the workbench.
//!
//! The transcript is parsed once into an immutable [`DataStore`] snapshot that
//! carries the filtered token stream, the per-token decompositions and the
//! [`CorpusVocabulary`] index every later stage reads from. Precomputed
//! fixtures (REGIME labels) are loaded through the same error discipline:
//! absent means fatal.

pub mod fixture;
pub mod loader;
pub mod regime;
pub mod store;
pub mod vocabulary;

use std::path::Path;

pub use fixture::{load_json_fixture, parse_json_fixture, read_fixture};
pub use loader::{
    DEFAULT_AZC_SECTIONS, LoadDiagnostics, LoadOptions, MAX_RECORDED_SKIPS, SkippedRow,
    TRANSCRIPT_FIXTURE, TranscriberFilter, parse_transcript, parse_transcript_bytes,
};
pub use regime::{REGIME_FIXTURE, RegimeMap};
pub use store::DataStore;
pub use vocabulary::{CorpusVocabulary, corpus_system};
use vms_error::Result;

/// Load a transcript with the given options.
pub fn load_corpus(path: &Path, options: LoadOptions) -> Result<DataStore> {
    DataStore::load(path, options)
}

//! Record segmentation of the Currier-A token stream.
//!
//! A single pass carries an open accumulator. It is sealed and a new one
//! opened when the folio changes, or when a token starts a new line and the
//! segmentation rule fires for that line:
//!
//! * [`RecordGranularity::Paragraph`]: the line-initial token begins with a
//!   gallows glyph.
//! * [`RecordGranularity::Line`]: always.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;
use vms_morph::MorphologicalRecord;
use vms_types::{AnalysisConfig, FolioId, RecordGranularity, Token};

const LOG_COMPONENT: &str = "vms.bundle.records";

/// One token inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordToken {
    pub word: String,
    pub line: u32,
    pub middle: Option<String>,
}

/// A contiguous span of A-side tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Position in segmentation order, starting at 0.
    pub index: usize,
    pub folio: FolioId,
    pub start_line: u32,
    pub end_line: u32,
    pub tokens: Vec<RecordToken>,
    /// Union of the member MIDDLEs, every stratum included.
    pub middles: BTreeSet<String>,
}

impl Record {
    fn open(index: usize, token: &Token) -> Self {
        Self {
            index,
            folio: token.folio.clone(),
            start_line: token.line,
            end_line: token.line,
            tokens: Vec::new(),
            middles: BTreeSet::new(),
        }
    }

    fn push(&mut self, token: &Token, morphology: &MorphologicalRecord) {
        self.end_line = token.line;
        if let Some(middle) = &morphology.middle {
            self.middles.insert(middle.clone());
        }
        self.tokens.push(RecordToken {
            word: token.word.clone(),
            line: token.line,
            middle: morphology.middle.clone(),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Member MIDDLEs that pass `is_pp`.
    #[must_use]
    pub fn pp_middles(&self, is_pp: impl Fn(&str) -> bool) -> BTreeSet<String> {
        self.middles.iter().filter(|m| is_pp(m)).cloned().collect()
    }
}

/// Cut an ordered token stream into records.
///
/// The stream is normally the Currier-A tokens of one snapshot, paired with
/// their decompositions.
#[must_use]
pub fn build_records<'a>(
    tokens: impl IntoIterator<Item = (&'a Token, &'a MorphologicalRecord)>,
    config: &AnalysisConfig,
) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    let mut previous_line: Option<(&FolioId, u32)> = None;

    for (token, morphology) in tokens {
        let line_key = token.line_key();
        let new_line = previous_line != Some(line_key);
        let folio_changed = previous_line.is_none_or(|(folio, _)| folio != &token.folio);
        previous_line = Some(line_key);

        let starts_record = folio_changed
            || (new_line
                && match config.record_granularity() {
                    RecordGranularity::Line => true,
                    RecordGranularity::Paragraph => token
                        .word
                        .chars()
                        .next()
                        .is_some_and(|c| config.is_gallows(c)),
                });

        if starts_record || current.is_none() {
            if let Some(sealed) = current.take() {
                records.push(sealed);
            }
            current = Some(Record::open(records.len(), token));
        }
        if let Some(record) = current.as_mut() {
            record.push(token, morphology);
        }
    }
    if let Some(sealed) = current {
        records.push(sealed);
    }

    debug!(
        component = LOG_COMPONENT,
        records = records.len(),
        granularity = ?config.record_granularity(),
        "records segmented"
    );
    records
}

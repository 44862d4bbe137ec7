//! Tab-separated transcript parsing.
//!
//! The first non-blank line is a header naming the columns; columns are
//! located by name so extra or re-ordered columns are tolerated. Fields may be
//! wrapped in double quotes. A row that cannot be parsed is skipped and
//! counted, never fatal: the corpus is known to carry occasional broken lines.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vms_error::{Result, VmsError};
use vms_morph::MorphologyTables;
use vms_types::{FolioId, Language, PRIMARY_TRANSCRIBER, Placement, Token};

const LOG_COMPONENT: &str = "vms.corpus.loader";

/// Fixture name used when the transcript itself is structurally unusable.
pub const TRANSCRIPT_FIXTURE: &str = "transcript";

/// Number of skip reasons retained in [`LoadDiagnostics`].
pub const MAX_RECORDED_SKIPS: usize = 32;

/// Sections whose unassigned-language text forms the AZC diagram corpus.
pub const DEFAULT_AZC_SECTIONS: [&str; 3] = ["Z", "A", "C"];

const COL_WORD: &str = "word";
const COL_FOLIO: &str = "folio";
const COL_LINE: &str = "line_number";
const COL_SECTION: &str = "section";
const COL_LANGUAGE: &str = "language";
const COL_PLACEMENT: &str = "placement";
const COL_TRANSCRIBER: &str = "transcriber";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which transcriber tracks to keep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriberFilter {
    /// Only the canonical track ([`PRIMARY_TRANSCRIBER`]).
    #[default]
    Primary,
    /// One named track.
    Track(String),
    /// Every track. Inflates counts; only for track audits.
    Any,
}

impl TranscriberFilter {
    #[must_use]
    pub fn accepts(&self, transcriber: &str) -> bool {
        match self {
            Self::Primary => transcriber == PRIMARY_TRANSCRIBER,
            Self::Track(track) => transcriber == track,
            Self::Any => true,
        }
    }
}

/// Loader options. Two loads with equal options over the same file produce
/// identical snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub transcriber: TranscriberFilter,
    /// Keep only these languages; `None` keeps all.
    pub languages: Option<BTreeSet<Language>>,
    /// Drop tokens containing the `*` damage marker.
    pub exclude_damaged: bool,
    /// Section codes whose `NA` text is AZC diagram text.
    pub azc_sections: BTreeSet<String>,
    /// Morphology tables; `None` uses the embedded canonical tables.
    pub tables: Option<MorphologyTables>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            transcriber: TranscriberFilter::Primary,
            languages: None,
            exclude_damaged: true,
            azc_sections: DEFAULT_AZC_SECTIONS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            tables: None,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_transcriber(mut self, filter: TranscriberFilter) -> Self {
        self.transcriber = filter;
        self
    }

    #[must_use]
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = Language>) -> Self {
        self.languages = Some(languages.into_iter().collect());
        self
    }

    /// Reject options that would make every downstream count meaningless.
    pub fn validate(&self) -> Result<()> {
        if let TranscriberFilter::Track(track) = &self.transcriber {
            if track.trim().is_empty() {
                return Err(VmsError::invalid_config(
                    "transcriber",
                    "track name must not be empty",
                ));
            }
        }
        if self.languages.as_ref().is_some_and(BTreeSet::is_empty) {
            return Err(VmsError::invalid_config(
                "languages",
                "an empty language filter would drop every token",
            ));
        }
        if self.azc_sections.is_empty() {
            return Err(VmsError::invalid_config(
                "azc_sections",
                "at least one AZC section code is required",
            ));
        }
        if let Some(tables) = &self.tables {
            tables.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// One skipped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub reason: String,
}

/// Row accounting for one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDiagnostics {
    /// Data rows seen (header and blank lines excluded).
    pub rows_read: usize,
    /// Tokens kept in the snapshot.
    pub rows_kept: usize,
    /// Malformed rows skipped.
    pub rows_skipped: usize,
    /// Well-formed rows dropped for carrying a damage marker.
    pub damaged_dropped: usize,
    /// Well-formed rows on another transcriber track.
    pub filtered_transcriber: usize,
    /// Well-formed rows outside the language filter.
    pub filtered_language: usize,
    /// First [`MAX_RECORDED_SKIPS`] skip reasons.
    pub skipped: Vec<SkippedRow>,
}

impl LoadDiagnostics {
    fn record_skip(&mut self, err: &VmsError) {
        self.rows_skipped += 1;
        if let VmsError::MalformedRow { line, detail } = err {
            debug!(
                component = LOG_COMPONENT,
                line = *line,
                reason = %detail,
                "skipping malformed transcript row"
            );
            if self.skipped.len() < MAX_RECORDED_SKIPS {
                self.skipped.push(SkippedRow {
                    line: *line,
                    reason: detail.clone(),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    word: usize,
    folio: usize,
    line: usize,
    section: usize,
    language: usize,
    placement: usize,
    transcriber: usize,
}

impl ColumnMap {
    fn from_header(header: &str) -> Result<Self> {
        let names: Vec<String> = header
            .split('\t')
            .map(|name| unquote(name).to_ascii_lowercase())
            .collect();
        let find = |column: &str| {
            names.iter().position(|name| name == column).ok_or_else(|| {
                VmsError::invalid_fixture(
                    TRANSCRIPT_FIXTURE,
                    format!("header is missing required column `{column}`"),
                )
            })
        };
        Ok(Self {
            word: find(COL_WORD)?,
            folio: find(COL_FOLIO)?,
            line: find(COL_LINE)?,
            section: find(COL_SECTION)?,
            language: find(COL_LANGUAGE)?,
            placement: find(COL_PLACEMENT)?,
            transcriber: find(COL_TRANSCRIBER)?,
        })
    }

    fn width(&self) -> usize {
        [
            self.word,
            self.folio,
            self.line,
            self.section,
            self.language,
            self.placement,
            self.transcriber,
        ]
        .into_iter()
        .max()
        .map_or(0, |max| max + 1)
    }
}

fn unquote(field: &str) -> &str {
    let trimmed = field.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(trimmed)
}

fn malformed(line: usize, detail: impl Into<String>) -> VmsError {
    VmsError::MalformedRow {
        line,
        detail: detail.into(),
    }
}

fn parse_row(row: &str, columns: &ColumnMap, line: usize) -> Result<Token> {
    let fields: Vec<&str> = row.split('\t').collect();
    let width = columns.width();
    if fields.len() < width {
        return Err(malformed(
            line,
            format!("expected at least {width} columns, found {}", fields.len()),
        ));
    }
    let field = |idx: usize| unquote(fields[idx]);

    let word = field(columns.word);
    if word.is_empty() {
        return Err(malformed(line, "empty word"));
    }
    let folio = field(columns.folio);
    if folio.is_empty() {
        return Err(malformed(line, "empty folio"));
    }
    let line_number: u32 = field(columns.line).parse().map_err(|_| {
        malformed(
            line,
            format!("unparseable line number `{}`", field(columns.line)),
        )
    })?;
    let language = Language::parse(field(columns.language)).ok_or_else(|| {
        malformed(
            line,
            format!("unknown language tag `{}`", field(columns.language)),
        )
    })?;

    Ok(Token {
        word: word.to_owned(),
        folio: FolioId::new(folio),
        line: line_number,
        section: field(columns.section).to_owned(),
        language,
        placement: Placement::new(field(columns.placement)),
        transcriber: field(columns.transcriber).to_owned(),
    })
}

/// Parse transcript text into the filtered token stream.
///
/// # Errors
///
/// Only structural problems are returned: an empty document or a header
/// missing a required column. Malformed rows are counted in the diagnostics.
pub fn parse_transcript(text: &str, options: &LoadOptions) -> Result<(Vec<Token>, LoadDiagnostics)> {
    parse_rows(text.lines().map(Ok), options)
}

/// Parse raw transcript bytes. Each line is decoded on its own, so a row that
/// is not valid UTF-8 is skipped as malformed instead of failing the load.
pub fn parse_transcript_bytes(
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<(Vec<Token>, LoadDiagnostics)> {
    parse_rows(
        bytes
            .split(|b| *b == b'\n')
            .map(|row| std::str::from_utf8(row).map_err(|err| err.to_string())),
        options,
    )
}

fn parse_rows<'a>(
    rows: impl Iterator<Item = std::result::Result<&'a str, String>>,
    options: &LoadOptions,
) -> Result<(Vec<Token>, LoadDiagnostics)> {
    let mut lines = rows
        .enumerate()
        .map(|(idx, row)| (idx + 1, row.map(|row| row.trim_end_matches('\r'))))
        .filter(|(_, row)| !matches!(row, Ok(row) if row.trim().is_empty()));

    let header = match lines.next() {
        Some((_, Ok(header))) => header,
        Some((_, Err(detail))) => {
            return Err(VmsError::invalid_fixture(
                TRANSCRIPT_FIXTURE,
                format!("header row is not valid UTF-8: {detail}"),
            ));
        }
        None => {
            return Err(VmsError::invalid_fixture(
                TRANSCRIPT_FIXTURE,
                "transcript contains no header row",
            ));
        }
    };
    let columns = ColumnMap::from_header(header)?;

    let mut tokens = Vec::new();
    let mut diagnostics = LoadDiagnostics::default();
    for (line, row) in lines {
        diagnostics.rows_read += 1;
        let parsed = row
            .map_err(|detail| malformed(line, format!("row is not valid UTF-8: {detail}")))
            .and_then(|row| parse_row(row, &columns, line));
        let token = match parsed {
            Ok(token) => token,
            Err(err) => {
                diagnostics.record_skip(&err);
                continue;
            }
        };
        if !options.transcriber.accepts(&token.transcriber) {
            diagnostics.filtered_transcriber += 1;
            continue;
        }
        if options
            .languages
            .as_ref()
            .is_some_and(|keep| !keep.contains(&token.language))
        {
            diagnostics.filtered_language += 1;
            continue;
        }
        if options.exclude_damaged && token.is_damaged() {
            diagnostics.damaged_dropped += 1;
            continue;
        }
        tokens.push(token);
    }
    diagnostics.rows_kept = tokens.len();

    info!(
        component = LOG_COMPONENT,
        rows_read = diagnostics.rows_read,
        rows_kept = diagnostics.rows_kept,
        rows_skipped = diagnostics.rows_skipped,
        damaged_dropped = diagnostics.damaged_dropped,
        filtered_transcriber = diagnostics.filtered_transcriber,
        filtered_language = diagnostics.filtered_language,
        "transcript parsed"
    );
    Ok((tokens, diagnostics))
}

//! `vms` command-line front end.
//!
//! Every subcommand prints JSON to stdout; logs go to stderr and are filtered
//! with `RUST_LOG` (default `warn`). Configuration and fixture errors exit
//! with status 2, any other failure with status 1.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;
use vms::{
    AnalysisConfig, Bundle, BundleRegistry, BundleType, Decomposer, LegalityStatus, LoadOptions, MiddleClass,
    MorphologicalRecord, MorphologyTables, RecordGranularity, Regime, Result, TranscriberFilter,
    VmsError, Workbench, WorkbenchSources,
};

const LOG_COMPONENT: &str = "vms.cli";

#[derive(Parser)]
#[command(name = "vms")]
#[command(version)]
#[command(about = "Voynich morphology analysis workbench", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split tokens into articulator, prefix, MIDDLE and suffix
    Decompose {
        /// Tokens to decompose
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Peel a leading articulator glyph first
        #[arg(long)]
        articulated: bool,

        /// Alternative morphology table file (TOML)
        #[arg(long)]
        tables: Option<PathBuf>,
    },

    /// Classify MIDDLEs as RI / PP_AZC / PP_BNATIVE against the corpus
    Classify {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// MIDDLEs to classify; omit to print stratum sizes only
        middles: Vec<String>,
    },

    /// Write the derived JSON index files
    Index {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },

    /// List bundles with their type and AZC compatibility
    Bundles {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Only bundles of this type
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Per-folio legality of every bundle, or of one bundle
    Legality {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Bundle id or unique id prefix
        #[arg(long)]
        bundle: Option<String>,
    },
}

#[derive(Args)]
struct CorpusArgs {
    /// Directory holding transcript.tsv, instruction_classes.json, regimes.json
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Transcript path (overrides --data-dir)
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Instruction-class fixture path (overrides --data-dir)
    #[arg(long)]
    classes: Option<PathBuf>,

    /// REGIME fixture path (overrides --data-dir)
    #[arg(long)]
    regimes: Option<PathBuf>,

    /// Analysis tunables (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transcriber track to keep; `any` keeps all tracks
    #[arg(long, default_value = "H")]
    transcriber: String,

    /// Override restricted_spread_max
    #[arg(long)]
    spread_max: Option<i64>,

    /// Override record granularity
    #[arg(long, value_enum)]
    granularity: Option<GranularityArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GranularityArg {
    Paragraph,
    Line,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Activating,
    Blocked,
    Neutral,
}

impl From<KindArg> for BundleType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Activating => Self::Activating,
            KindArg::Blocked => Self::Blocked,
            KindArg::Neutral => Self::Neutral,
        }
    }
}

impl CorpusArgs {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_toml_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(value) = self.spread_max {
            config = config.with_restricted_spread_max(value)?;
        }
        if let Some(granularity) = self.granularity {
            config = config.with_record_granularity(match granularity {
                GranularityArg::Paragraph => RecordGranularity::Paragraph,
                GranularityArg::Line => RecordGranularity::Line,
            });
        }
        Ok(config)
    }

    fn load_options(&self) -> LoadOptions {
        let filter = match self.transcriber.as_str() {
            "any" | "ANY" => TranscriberFilter::Any,
            "H" => TranscriberFilter::Primary,
            track => TranscriberFilter::Track(track.to_owned()),
        };
        LoadOptions::default().with_transcriber(filter)
    }

    fn open(&self) -> Result<Workbench> {
        let config = self.analysis_config()?;
        let defaults = WorkbenchSources::in_dir(&self.data_dir);
        let sources = WorkbenchSources::new(
            self.transcript.clone().unwrap_or(defaults.transcript),
            self.classes.clone().unwrap_or(defaults.classes),
            self.regimes.clone().unwrap_or(defaults.regimes),
        );
        Workbench::open(sources, self.load_options(), config)
    }
}

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DecomposeRow<'a> {
    token: &'a str,
    #[serde(flatten)]
    record: MorphologicalRecord,
    atomic: bool,
}

#[derive(Serialize)]
struct BundleRow<'a> {
    id: &'a str,
    bundle_type: BundleType,
    records: usize,
    pp_middles: &'a std::collections::BTreeSet<String>,
    restricted_middles: &'a std::collections::BTreeSet<String>,
    compatible_folios: usize,
}

#[derive(Serialize)]
struct LegalityRow<'a> {
    bundle_id: &'a str,
    bundle_type: BundleType,
    status_counts: BTreeMap<LegalityStatus, usize>,
    status_by_regime: BTreeMap<Regime, BTreeMap<LegalityStatus, usize>>,
    surviving_classes: usize,
}

/// Bundles whose id starts with `prefix`; without a prefix, every bundle.
/// A prefix must pick out exactly one bundle.
fn select_bundles<'a>(
    registry: &'a BundleRegistry,
    prefix: Option<&str>,
) -> Result<Vec<&'a Bundle>> {
    let selected: Vec<&Bundle> = registry
        .bundles()
        .filter(|b| prefix.is_none_or(|p| b.id.as_str().starts_with(p)))
        .collect();
    if let Some(prefix) = prefix {
        if selected.len() != 1 {
            return Err(VmsError::invalid_config(
                "bundle",
                format!("`{prefix}` matches {} bundles", selected.len()),
            ));
        }
    }
    Ok(selected)
}

fn exit_status(err: &VmsError) -> u8 {
    if err.is_fatal() { 2 } else { 1 }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| VmsError::internal(format!("rendering output: {err}")))?;
    println!("{text}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Decompose {
            tokens,
            articulated,
            tables,
        } => {
            let decomposer = match tables {
                Some(path) => Decomposer::new(MorphologyTables::from_toml_file(&path)?),
                None => Decomposer::canonical()?,
            };
            let rows: Vec<DecomposeRow<'_>> = tokens
                .iter()
                .map(|token| {
                    let record = if articulated {
                        decomposer.decompose_articulated(token)
                    } else {
                        decomposer.decompose(token)
                    };
                    DecomposeRow {
                        token,
                        atomic: record.is_atomic(),
                        record,
                    }
                })
                .collect();
            print_json(&rows)
        }
        Command::Classify { corpus, middles } => {
            let workbench = corpus.open()?;
            let classes: BTreeMap<&str, MiddleClass> = middles
                .iter()
                .map(|m| (m.as_str(), workbench.classify_middle(m)))
                .collect();
            print_json(&serde_json::json!({
                "strata": workbench.classifier().counts(),
                "middles": classes,
            }))
        }
        Command::Index { corpus, out } => {
            let workbench = corpus.open()?;
            let written = workbench.indices().write_dir(&out)?;
            print_json(&serde_json::json!({
                "files": written,
                "sha256": workbench.indices().digest()?,
                "summary": workbench.summary(),
            }))
        }
        Command::Bundles { corpus, kind } => {
            let workbench = corpus.open()?;
            let wanted = kind.map(BundleType::from);
            let rows: Vec<BundleRow<'_>> = workbench
                .registry()
                .bundles()
                .filter(|b| wanted.is_none_or(|t| b.bundle_type == t))
                .map(|b| BundleRow {
                    id: b.id.as_str(),
                    bundle_type: b.bundle_type,
                    records: b.records.len(),
                    pp_middles: &b.pp_middles,
                    restricted_middles: &b.restricted_middles,
                    compatible_folios: b.compatible_folios.len(),
                })
                .collect();
            print_json(&rows)
        }
        Command::Legality { corpus, bundle } => {
            let workbench = corpus.open()?;
            let engine = workbench.engine();
            let selected = select_bundles(workbench.registry(), bundle.as_deref())?;
            let results: Vec<_> = selected
                .into_iter()
                .map(|b| (b, engine.compute_bundle_legality(b)))
                .collect();
            let rows: Vec<LegalityRow<'_>> = results
                .iter()
                .map(|(b, result)| LegalityRow {
                    bundle_id: b.id.as_str(),
                    bundle_type: b.bundle_type,
                    status_counts: result.status_counts(),
                    status_by_regime: result.status_by_regime(workbench.regimes()),
                    surviving_classes: result.surviving_union().len(),
                })
                .collect();
            print_json(&rows)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(component = LOG_COMPONENT, error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::from(exit_status(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use vms::{DataStore, InstructionClassTable, RegimeMap};

    use super::*;

    const TSV: &str = "word\tfolio\tline_number\tsection\tlanguage\tplacement\ttranscriber\n\
        qokal\tf57v\t1\tZ\tNA\tR1\tH\n\
        qokaiin\tf1r\t1\tH\tA\tP\tH\n\
        qochaiin\tf2r\t1\tH\tA\tP\tH\n\
        qokedy\tf103r\t1\tS\tB\tP\tH\n\
        qochedy\tf103r\t1\tS\tB\tP\tH\n";

    const CLASSES: &str = r#"{"version": 1, "classes": [
        {"id": 1, "role": "ENERGY_OPERATOR", "members": ["qokedy", "qochedy"]}
    ]}"#;

    fn corpus_args(extra: &[&str]) -> CorpusArgs {
        let mut argv = vec!["vms", "bundles"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("arguments parse").command {
            Command::Bundles { corpus, .. } => corpus,
            _ => unreachable!("parsed the bundles subcommand"),
        }
    }

    fn workbench() -> Workbench {
        let store = DataStore::from_tsv_str(TSV, LoadOptions::default()).expect("store");
        let classes =
            InstructionClassTable::from_json_str(CLASSES, store.decomposer()).expect("classes");
        Workbench::from_parts(store, classes, RegimeMap::default(), AnalysisConfig::default())
            .expect("workbench")
    }

    #[test]
    fn transcriber_flag_maps_to_track_filter() {
        assert_eq!(corpus_args(&[]).load_options().transcriber, TranscriberFilter::Primary);
        assert_eq!(
            corpus_args(&["--transcriber", "any"]).load_options().transcriber,
            TranscriberFilter::Any
        );
        assert_eq!(
            corpus_args(&["--transcriber", "ANY"]).load_options().transcriber,
            TranscriberFilter::Any
        );
        assert_eq!(
            corpus_args(&["--transcriber", "C"]).load_options().transcriber,
            TranscriberFilter::Track("C".to_owned())
        );
    }

    #[test]
    fn flags_override_analysis_defaults() {
        let config = corpus_args(&["--spread-max", "1", "--granularity", "line"])
            .analysis_config()
            .expect("valid overrides");
        assert_eq!(config.restricted_spread_max(), 1);
        assert_eq!(config.record_granularity(), RecordGranularity::Line);

        let defaults = corpus_args(&[]).analysis_config().expect("defaults");
        assert_eq!(defaults, AnalysisConfig::default());
    }

    #[test]
    fn bad_spread_flag_is_fatal() {
        let err = corpus_args(&["--spread-max", "0"])
            .analysis_config()
            .expect_err("zero threshold");
        assert!(matches!(err, VmsError::InvalidConfig { .. }));
        assert_eq!(exit_status(&err), 2);
    }

    #[test]
    fn missing_config_file_exits_with_failure() {
        let err = corpus_args(&["--config", "/definitely/not/here.toml"])
            .analysis_config()
            .expect_err("absent config");
        assert!(matches!(err, VmsError::Io { .. }));
        assert_eq!(exit_status(&err), 1);
        assert_eq!(exit_status(&VmsError::internal("boom")), 1);
    }

    #[test]
    fn bundle_prefix_must_be_unique() {
        let workbench = workbench();
        let registry = workbench.registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(select_bundles(registry, None).expect("all").len(), 2);

        let first = registry.bundles().next().expect("a bundle");
        let chosen = select_bundles(registry, Some(first.id.as_str())).expect("full id");
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].id, first.id);

        let ambiguous = select_bundles(registry, Some("")).expect_err("matches both");
        assert!(matches!(ambiguous, VmsError::InvalidConfig { .. }));
        assert_eq!(exit_status(&ambiguous), 2);

        let none = select_bundles(registry, Some("not-hex")).expect_err("matches none");
        assert!(none.to_string().contains("matches 0 bundles"));
    }
}

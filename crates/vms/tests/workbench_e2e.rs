//! End-to-end runs over a synthetic corpus written to a temporary directory.

use std::collections::BTreeSet;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;
use vms::{
    AnalysisConfig, BundleType, FolioId, LegalityStatus, LoadOptions, MiddleClass, Regime,
    SharedWorkbench, TranscriberFilter, VmsError, Workbench, WorkbenchSources,
};

const TRANSCRIPT: &str = "\
word\tfolio\tline_number\tsection\tlanguage\tplacement\ttranscriber
qokal\tf57v\t1\tZ\tNA\tR1\tH
qotal\tf57v\t1\tZ\tNA\tR1\tH
qokal\tf67r1\t1\tC\tNA\tR1\tH
qochal\tf67r1\t1\tC\tNA\tR1\tH
qochal\tf68r1\t1\tA\tNA\tR1\tH
qoshal\tf68r1\t1\tA\tNA\tR1\tH
qochal\tf70v2\t1\tZ\tNA\tR1\tH
qochal\tf71r\t1\tZ\tNA\tR1\tH
tshol\tf1r\t1\tH\tA\tP\tH
qokaiin\tf1r\t1\tH\tA\tP\tH
daiin\tf1r\t2\tH\tA\tP\tH
qotaiin\tf1r\t2\tH\tA\tP\tH
pchor\tf1r\t3\tH\tA\tP\tH
qochaiin\tf1r\t3\tH\tA\tP\tH
qokaiin\tf1r\t4\tH\tA\tP\tH
kshol\tf2r\t1\tH\tA\tP\tH
qoshaiin\tf2r\t1\tH\tA\tP\tH
qoabcdy\tf2r\t2\tH\tA\tP\tH
tchey\tf3r\t1\tH\tA\tP\tH
qokaiin\tf3r\t1\tH\tA\tP\tH
qotaiin\tf3r\t1\tH\tA\tP\tH
qokedy\tf103r\t1\tS\tB\tP\tH
qotedy\tf103r\t1\tS\tB\tP\tH
qochedy\tf103r\t1\tS\tB\tP\tH
qoabcdy\tf103r\t2\tS\tB\tP\tH
qochedy\tf104r\t1\tS\tB\tP\tH
qoshedy\tf104r\t1\tS\tB\tP\tH
qoshedy\tf104r\t1\tS\tB\tP\tC
broken\tf104r\t2\tS
";

const CLASSES: &str = r#"{"version": 1, "classes": [
    {"id": 1, "role": "CORE_CONTROL", "members": ["daiin"]},
    {"id": 2, "role": "ENERGY_OPERATOR", "members": ["qokedy"]},
    {"id": 3, "role": "FLOW_OPERATOR", "members": ["qotedy"]},
    {"id": 4, "role": "FREQUENT_OPERATOR", "members": ["qochedy", "qoabcdy"]},
    {"id": 5, "role": "AUXILIARY", "members": ["qoshedy"]}
]}"#;

const REGIMES: &str = r#"{"f103r": "REGIME_1", "f104r": "REGIME_3"}"#;

fn write_fixtures(dir: &Path) -> WorkbenchSources {
    let sources = WorkbenchSources::in_dir(dir);
    std::fs::write(&sources.transcript, TRANSCRIPT).expect("transcript");
    std::fs::write(&sources.classes, CLASSES).expect("classes");
    std::fs::write(&sources.regimes, REGIMES).expect("regimes");
    sources
}

fn open(dir: &TempDir) -> Workbench {
    Workbench::open(
        write_fixtures(dir.path()),
        LoadOptions::default(),
        AnalysisConfig::default(),
    )
    .expect("workbench")
}

#[test]
fn qokaiin_splits_into_qo_k_aiin() {
    let record = vms::decompose("qokaiin");
    assert_eq!(record.prefix.as_deref(), Some("qo"));
    assert_eq!(record.middle(), Some("k"));
    assert_eq!(record.suffix.as_deref(), Some("aiin"));
}

#[test]
fn shared_middle_absent_from_diagrams_is_b_native() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    assert_eq!(workbench.classify_middle("abc"), MiddleClass::PpBNative);
    assert_eq!(vms::classify_middle("abc", workbench.store()), MiddleClass::PpBNative);
    assert_eq!(workbench.classify_middle("k"), MiddleClass::PpAzc);
    assert_eq!(workbench.classify_middle("tsh"), MiddleClass::Ri);
    assert_eq!(workbench.classify_middle("nowhere"), MiddleClass::NotApplicable);
}

#[test]
fn empty_bundle_reaches_every_folio_with_every_class() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    let empty = workbench.bundle_for(Vec::<String>::new());
    assert_eq!(empty.bundle_type, BundleType::Neutral);

    let result = workbench.engine().compute_bundle_legality(&empty);
    assert_eq!(result.folios.len(), 2);
    for legality in result.folios.values() {
        assert_eq!(legality.status, LegalityStatus::Reachable);
        assert_eq!(legality.surviving_classes, workbench.classes().ids());
    }

    let by_regime = result.status_by_regime(workbench.regimes());
    assert_eq!(by_regime[&Regime::Regime1][&LegalityStatus::Reachable], 1);
    assert_eq!(by_regime[&Regime::Regime3][&LegalityStatus::Reachable], 1);
}

#[test]
fn four_row_transcript_loads_three_tokens_twice() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("four.tsv");
    std::fs::write(
        &path,
        "word\tfolio\tline_number\tsection\tlanguage\tplacement\ttranscriber\n\
         qokaiin\tf1r\t1\tH\tA\tP\tH\n\
         chedy\tf1r\t1\tH\tA\tP\n\
         daiin\tf1r\t2\tH\tA\tP\tH\n\
         shol\tf1r\t2\tH\tA\tP\tH\n",
    )
    .expect("write");

    for _ in 0..2 {
        let store = vms::load_corpus(&path, TranscriberFilter::Primary).expect("load");
        assert_eq!(store.tokens().len(), 3);
        assert_eq!(store.diagnostics().rows_skipped, 1);
    }
}

#[test]
fn loads_are_reproducible_byte_for_byte() {
    let dir = TempDir::new().expect("tempdir");
    let first = open(&dir);
    let second = open(&dir);
    assert_eq!(
        first.indices().to_json().expect("json"),
        second.indices().to_json().expect("json")
    );
    assert_eq!(
        first.indices().digest().expect("digest"),
        second.indices().digest().expect("digest")
    );
    assert_eq!(first.summary(), second.summary());
}

#[test]
fn track_and_malformed_rows_are_excluded() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    let diagnostics = workbench.store().diagnostics();
    assert_eq!(diagnostics.rows_skipped, 1);
    assert_eq!(diagnostics.filtered_transcriber, 1);
    assert!(workbench.store().tokens().iter().all(|t| t.transcriber == "H"));
}

#[test]
fn records_with_equal_pp_sets_collapse() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    let registry = workbench.registry();
    // f1r paragraph 1, f1r paragraph 2, f2r, f3r
    assert_eq!(registry.records().len(), 4);
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.bundle_id_of_record(0), registry.bundle_id_of_record(3));
    assert_ne!(registry.bundle_id_of_record(0), registry.bundle_id_of_record(1));

    let kt = registry.bundle_of_record(0).expect("bundle");
    assert_eq!(kt.records, vec![0, 3]);
    assert_eq!(kt.bundle_type, BundleType::Activating);
    assert_eq!(kt.compatible_folios, BTreeSet::from([FolioId::from("f57v")]));
}

#[test]
fn reconfigure_rebuilds_bundle_types() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    let before = workbench.registry().bundle_of_record(1).expect("bundle").bundle_type;
    assert_eq!(before, BundleType::Activating);

    let strict = AnalysisConfig::default()
        .with_restricted_spread_max(1)
        .expect("valid threshold");
    let rebuilt = workbench.reconfigure(strict).expect("reconfigure");
    // `k` sits on two diagram folios, so it is no longer restricted.
    let after = rebuilt.registry().bundle_of_record(1).expect("bundle").bundle_type;
    assert_eq!(after, BundleType::Neutral);
    assert_eq!(
        workbench.registry().bundle_of_record(1).expect("bundle").bundle_type,
        BundleType::Activating
    );
}

#[test]
fn shared_handle_swaps_on_reload() {
    let dir = TempDir::new().expect("tempdir");
    let shared = SharedWorkbench::new(open(&dir));
    let old = shared.snapshot();
    assert_eq!(old.summary().b_folios, 2);

    let mut text = TRANSCRIPT.to_owned();
    text.push_str("qokedy\tf105r\t1\tS\tB\tP\tH\n");
    std::fs::write(dir.path().join("transcript.tsv"), text).expect("rewrite");

    let fresh = shared.reload().expect("reload");
    assert_eq!(fresh.summary().b_folios, 3);
    assert_eq!(old.summary().b_folios, 2);
    assert!(std::sync::Arc::ptr_eq(&fresh, &shared.snapshot()));
}

#[test]
fn reload_returns_the_snapshot_it_installed() {
    let dir = TempDir::new().expect("tempdir");
    let shared = SharedWorkbench::new(open(&dir));
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let other = open(&dir);
            std::thread::spawn(move || {
                for _ in 0..8 {
                    shared.replace(other.clone());
                }
            })
        })
        .collect();

    for _ in 0..8 {
        let strict = AnalysisConfig::default()
            .with_restricted_spread_max(1)
            .expect("valid threshold");
        let rebuilt = shared.reconfigure(strict).expect("reconfigure");
        assert_eq!(rebuilt.config().restricted_spread_max(), 1);
    }
    for writer in writers {
        writer.join().expect("writer thread");
    }
}

#[test]
fn unknown_bundle_is_a_lookup_miss() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    let missing = vms::BundleId::of(&BTreeSet::from(["nowhere".to_owned()]));
    assert!(workbench.registry().get(&missing).is_none());
    let err = workbench.legality(&missing).expect_err("unregistered bundle");
    assert!(matches!(err, VmsError::UnknownBundle { .. }));
    assert!(!err.is_fatal());
}

#[test]
fn missing_regime_fixture_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let sources = write_fixtures(dir.path());
    std::fs::remove_file(&sources.regimes).expect("remove");
    let err = Workbench::open(sources, LoadOptions::default(), AnalysisConfig::default())
        .expect_err("missing fixture");
    assert!(matches!(err, VmsError::MissingFixture { .. }));
    assert!(err.is_fatal());
}

#[test]
fn invalid_threshold_fails_before_loading() {
    assert!(matches!(
        AnalysisConfig::default().with_restricted_spread_max(-2),
        Err(VmsError::InvalidConfig { .. })
    ));
    assert!(AnalysisConfig::from_toml_str("restricted_spread_max = 0").is_err());

    let in_memory = Workbench::from_parts(
        vms::DataStore::from_tsv_str(TRANSCRIPT, LoadOptions::default()).expect("store"),
        vms::InstructionClassTable::from_json_str(CLASSES, &vms::Decomposer::canonical().expect("tables"))
            .expect("classes"),
        vms::RegimeMap::default(),
        AnalysisConfig::default(),
    )
    .expect("in-memory workbench");
    assert!(matches!(in_memory.reload(), Err(VmsError::Internal(_))));
}

#[test]
fn registry_legality_matches_single_bundle_queries() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    let all = workbench.legality_all();
    assert_eq!(all.len(), workbench.registry().len());
    for bundle in workbench.registry().bundles() {
        assert_eq!(workbench.legality(&bundle.id).expect("known bundle"), all[&bundle.id]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn larger_pp_sets_never_gain_classes(
        picks in proptest::collection::vec((any::<bool>(), any::<bool>()), 5)
    ) {
        let dir = TempDir::new().expect("tempdir");
        let workbench = open(&dir);
        let pp = ["k", "t", "ch", "sh", "abc"];
        let larger: Vec<&str> = pp.iter().zip(&picks).filter(|(_, p)| p.0).map(|(m, _)| *m).collect();
        let smaller: Vec<&str> = pp
            .iter()
            .zip(&picks)
            .filter(|(_, p)| p.0 && p.1)
            .map(|(m, _)| *m)
            .collect();
        let engine = workbench.engine();
        let large = engine.compute_bundle_legality(&workbench.bundle_for(larger));
        let small = engine.compute_bundle_legality(&workbench.bundle_for(smaller));
        for (folio, legality) in &large.folios {
            prop_assert!(legality
                .surviving_classes
                .is_subset(&small.folios[folio].surviving_classes));
        }
    }
}

#[test]
fn legality_serialises_with_screaming_labels() {
    let dir = TempDir::new().expect("tempdir");
    let workbench = open(&dir);
    let kt = workbench.registry().bundle_of_record(0).expect("bundle");
    let result = workbench.legality(&kt.id).expect("legality");
    let json = serde_json::to_value(&result).expect("json");
    assert_eq!(json["bundle_id"], serde_json::Value::String(kt.id.to_string()));
    assert_eq!(json["folios"]["f103r"]["status"], "REACHABLE");
    assert_eq!(json["folios"]["f104r"]["status"], "UNREACHABLE");
    assert_eq!(json["folios"]["f103r"]["surviving_classes"], serde_json::json!([1, 2, 3, 4]));
}

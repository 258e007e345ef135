use super::*;
use crate::derive::Derivation;
use crate::experiment::ExperimentLog;
use clap::Parser;
use std::path::PathBuf;
use tempfile::TempDir;

const TREE: &str = r#"{
  "n_features": 2,
  "children_left":  [1, -1, -1],
  "children_right": [2, -1, -1],
  "feature":        [1, -2, -2],
  "threshold":      [1.265, -2.0, -2.0],
  "value":          [[3, 3], [3, 0], [0, 3]]
}"#;

const DATA: &str = r#"{
  "feature_names": ["sepal_width", "petal_length"],
  "features": [[3.5, 1.0], [3.0, 1.1], [3.2, 1.2], [2.9, 4.5], [3.1, 5.0], [2.5, 6.9]],
  "labels": [0, 0, 0, 1, 1, 1]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tree.json"), TREE).unwrap();
        std::fs::write(dir.path().join("data.json"), DATA).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).display().to_string()
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        let cli = Cli::try_parse_from(std::iter::once("treecov").chain(args.iter().copied())).unwrap();
        run_command(cli)
    }
}

#[test]
fn derive_writes_json() {
    let ws = Workspace::new();
    let (tree, data, out) = (ws.arg("tree.json"), ws.arg("data.json"), ws.arg("tests.json"));
    ws.run(&["-q", "derive", "-t", &tree, "-d", &data, "--criteria", "DTC,BVA", "-o", &out]).unwrap();

    let derivation = Derivation::from_json(&std::fs::read_to_string(ws.path("tests.json")).unwrap()).unwrap();
    assert_eq!(derivation.n_paths, 2);
    assert_eq!(derivation.tests.len(), 6);
}

#[test]
fn derive_emits_proptest_source() {
    let ws = Workspace::new();
    let (tree, data, out) = (ws.arg("tree.json"), ws.arg("data.json"), ws.arg("tests.rs"));
    ws.run(&["-q", "derive", "-t", &tree, "-d", &data, "--emit", "--samples", "32", "-o", &out]).unwrap();

    let source = std::fs::read_to_string(ws.path("tests.rs")).unwrap();
    assert!(source.contains("ProptestConfig::with_cases(32)"));
    assert!(source.contains("// petal_length"));
    assert!(source.contains("fn dtc_leaf_1("));
}

#[test]
fn derive_reads_yaml_config() {
    let ws = Workspace::new();
    std::fs::write(ws.path("derive.yaml"), "criteria: [BVA]\nboundary_value_rate: 25\n").unwrap();
    let (tree, data, config, out) =
        (ws.arg("tree.json"), ws.arg("data.json"), ws.arg("derive.yaml"), ws.arg("tests.json"));
    ws.run(&["-q", "derive", "-t", &tree, "-d", &data, "-c", &config, "-o", &out]).unwrap();

    let derivation = Derivation::from_json(&std::fs::read_to_string(ws.path("tests.json")).unwrap()).unwrap();
    assert_eq!(derivation.count(crate::config::Criterion::Dtc), 0);
    assert_eq!(derivation.tests.len(), 4);
}

#[test]
fn replay_writes_passing_log() {
    let ws = Workspace::new();
    let (tree, data, out) = (ws.arg("tree.json"), ws.arg("data.json"), ws.arg("log.json"));
    ws.run(&["-q", "replay", "-t", &tree, "-d", &data, "--samples", "5", "-o", &out]).unwrap();

    let log = ExperimentLog::from_json(&std::fs::read_to_string(ws.path("log.json")).unwrap()).unwrap();
    assert_eq!(log.n_samples_per_test, 5);
    assert!(log.passed());
}

#[test]
fn invalid_override_is_a_user_error() {
    let ws = Workspace::new();
    let (tree, data) = (ws.arg("tree.json"), ws.arg("data.json"));
    let err = ws.run(&["-q", "derive", "-t", &tree, "-d", &data, "--rate", "150"]).unwrap_err();
    assert!(err.is_user_error());
    assert_eq!(err.code(), "E003");

    let err = ws.run(&["-q", "derive", "-t", &tree, "-d", &data, "--criteria", "MCDC"]).unwrap_err();
    assert_eq!(err.code(), "E003");
}

#[test]
fn unknown_enum_override_is_rejected_by_parser() {
    for flag in ["--width-basis", "--draw-mode"] {
        let err = Cli::try_parse_from(["treecov", "derive", "-t", "t.json", "-d", "d.json", flag, "wide"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("wide"));
    }
}

#[test]
fn malformed_tree_aborts() {
    let ws = Workspace::new();
    std::fs::write(
        ws.path("bad.json"),
        r#"{"n_features": 2, "children_left": [1, -1], "children_right": [5, -1],
            "feature": [0, -2], "threshold": [0.5, -2.0], "value": [[1, 1], [1, 0]]}"#,
    )
    .unwrap();
    let (tree, data) = (ws.arg("bad.json"), ws.arg("data.json"));
    let err = ws.run(&["-q", "derive", "-t", &tree, "-d", &data]).unwrap_err();
    assert_eq!(err.code(), "E010");
}

#[test]
fn validate_accepts_good_and_rejects_bad_config() {
    let ws = Workspace::new();
    std::fs::write(ws.path("good.yaml"), "criteria: [DTC, BVA]\n").unwrap();
    std::fs::write(ws.path("bad.yaml"), "pool_size: 0\n").unwrap();
    assert!(ws.run(&["-q", "validate", &ws.arg("good.yaml")]).is_ok());
    assert_eq!(ws.run(&["-q", "validate", &ws.arg("bad.yaml")]).unwrap_err().code(), "E003");
    assert_eq!(ws.run(&["-q", "validate", &ws.arg("missing.yaml")]).unwrap_err().code(), "E001");
}

#[test]
fn paths_runs_in_both_formats() {
    let ws = Workspace::new();
    let (tree, data) = (ws.arg("tree.json"), ws.arg("data.json"));
    assert!(ws.run(&["paths", "-t", &tree, "-d", &data]).is_ok());
    assert!(ws.run(&["--format", "json", "paths", "-t", &tree, "-d", &data]).is_ok());
}

type Reports = Vec<(crate::derive::Path, Vec<crate::derive::FeatureConstraint>)>;

fn path_reports(ws: &Workspace) -> (Tree, Reports) {
    let tree = load_tree(&ws.path("tree.json")).unwrap();
    let data = Dataset::from_file(ws.path("data.json")).unwrap();
    let config = DeriveConfig::default();
    let deriver = crate::derive::Deriver::new(&tree, &data, &config).unwrap();
    let reports = deriver
        .paths()
        .into_iter()
        .map(|p| {
            let c = deriver.constraints(&p).into_values().collect();
            (p, c)
        })
        .collect();
    (tree, reports)
}

#[test]
fn paths_json_echoes_validated_tree() {
    let ws = Workspace::new();
    let (tree, reports) = path_reports(&ws);
    let json = paths::paths_json(&tree, reports).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["paths"].as_array().unwrap().len(), 2);
    assert_eq!(value["paths"][0]["leaf_id"], 1);
    let echoed: TreeExport = serde_json::from_value(value["tree"].clone()).unwrap();
    assert_eq!(echoed.children_left, vec![1, -1, -1]);
    assert_eq!(echoed.into_tree().unwrap(), tree);
}

#[test]
fn format_paths_lists_constraints() {
    let ws = Workspace::new();
    let (_, reports) = path_reports(&ws);
    let text = paths::format_paths(&reports);
    assert!(text.contains("leaf 1 (class 0): f1 <= 1.265"));
    assert!(text.contains("  f1 in [1, 1.265]"));
    assert!(text.contains("  f1 in (1.265, 6.9]"));
}

#[test]
fn overrides_apply_on_top_of_defaults() {
    let cli = Cli::try_parse_from([
        "treecov", "derive", "-t", "t.json", "-d", "d.json", "--rate", "20", "--seed", "7",
        "--width-basis", "domain", "--draw-mode", "tuple", "--float-as-decimal",
    ])
    .unwrap();
    let Command::Derive(args) = cli.command else { panic!("expected derive") };
    let mut config = DeriveConfig::default();
    args.overrides.apply(&mut config).unwrap();
    assert_eq!(config.boundary_value_rate, 20.0);
    assert_eq!(config.seed, 7);
    assert_eq!(config.width_basis, crate::config::WidthBasis::Domain);
    assert_eq!(config.draw_mode, crate::config::DrawMode::Tuple);
    assert!(config.float_as_decimal);
}

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use modelpack_spec_core::SPEC_VERSION;
use modelpack_spec_gen::check::check;
use modelpack_spec_gen::derive::discriminator_literal;
use modelpack_spec_gen::pipeline::run;
use modelpack_spec_gen::{COPY_BANNER, GenerateError, GeneratorConfig};
use pretty_assertions::assert_eq;
use serde_json::Value;
use walkdir::WalkDir;

const DEFINITIONS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../core/src/definitions");

/// Scratch workspace with a runtime artifact skeleton and a config
/// propagating the real definition tree.
struct Workspace {
    dir: tempfile::TempDir,
    config: GeneratorConfig,
}

impl Workspace {
    fn new(formatter: &str) -> Self {
        Self::with_formatter(&format!("[\"{formatter}\"]"))
    }

    /// `formatter` is a YAML flow sequence of the program and its arguments.
    fn with_formatter(formatter: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join("runtime/src")).expect("failed to create runtime");
        let yaml = format!(
            r#"version: "1.0"
outputs:
  schema_dir: schemas
  module: runtime/src/spec.rs
formatter: {formatter}
propagation:
  source: "{DEFINITIONS}"
  destination: runtime/src/definitions
"#
        );
        let config = GeneratorConfig::from_yaml_str(&yaml, dir.path()).expect("invalid config");
        Self { dir, config }
    }

    fn schema_dir(&self) -> PathBuf {
        self.dir.path().join("schemas")
    }

    fn combined(&self) -> Value {
        read_json(&self.schema_dir().join("combined.json"))
    }

    /// Every generated output keyed by path relative to the workspace.
    fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(self.dir.path())
            .sort_by_file_name()
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let relative = e.path().strip_prefix(self.dir.path()).unwrap().to_path_buf();
                (relative, fs::read(e.path()).unwrap())
            })
            .collect()
    }
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    serde_json::from_str(&raw).unwrap()
}

fn keys(doc: &Value, category: &str) -> Vec<String> {
    doc[category].as_object().unwrap().keys().cloned().collect()
}

#[test]
fn generation_registers_exactly_the_listed_kinds() {
    let ws = Workspace::new("true");
    let report = run(&ws.config).unwrap();
    let combined = ws.combined();

    assert_eq!(report.version, SPEC_VERSION);
    assert_eq!(report.registrations, 4);
    assert_eq!(combined["version"], SPEC_VERSION);
    assert_eq!(keys(&combined, "envs"), vec!["python3::conda_pip"]);
    assert_eq!(keys(&combined, "ops"), vec!["ONNX_v1"]);
    assert_eq!(keys(&combined, "variants"), vec!["pipeline", "pyfunc"]);
    for field in ["manifest", "ops_entries", "meta_entry"] {
        assert!(combined[field].is_object(), "missing {field}");
    }
}

#[test]
fn generation_is_deterministic() {
    let ws = Workspace::new("true");
    run(&ws.config).unwrap();
    let first = ws.snapshot();
    run(&ws.config).unwrap();
    assert_eq!(ws.snapshot(), first);
}

#[test]
fn individual_files_match_combined_entries() {
    let ws = Workspace::new("true");
    run(&ws.config).unwrap();
    let combined = ws.combined();
    let dir = ws.schema_dir();

    assert_eq!(read_json(&dir.join("manifest.json")), combined["manifest"]);
    assert_eq!(read_json(&dir.join("ops.json")), combined["ops_entries"]);
    assert_eq!(read_json(&dir.join("meta_entry.json")), combined["meta_entry"]);
    assert_eq!(
        read_json(&dir.join("env_python3_conda_pip.json")),
        combined["envs"]["python3::conda_pip"]
    );
    assert_eq!(read_json(&dir.join("op_onnx_v1.json")), combined["ops"]["ONNX_v1"]);
    assert_eq!(
        read_json(&dir.join("variant_pipeline.json")),
        combined["variants"]["pipeline"]
    );
    assert_eq!(
        read_json(&dir.join("variant_pyfunc.json")),
        combined["variants"]["pyfunc"]
    );
}

#[test]
fn schema_dir_holds_no_orphan_files() {
    let ws = Workspace::new("true");
    fs::create_dir_all(ws.schema_dir()).unwrap();
    fs::write(ws.schema_dir().join("variant_retired.json"), "{}").unwrap();

    run(&ws.config).unwrap();

    let mut names: Vec<String> = fs::read_dir(ws.schema_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "combined.json",
            "env_python3_conda_pip.json",
            "manifest.json",
            "meta_entry.json",
            "op_onnx_v1.json",
            "ops.json",
            "variant_pipeline.json",
            "variant_pyfunc.json",
        ]
    );
}

#[test]
fn ops_envelope_selects_each_registered_op() {
    let ws = Workspace::new("true");
    run(&ws.config).unwrap();
    let combined = ws.combined();

    let envelope = &combined["ops_entries"];
    assert_eq!(envelope["discriminator"]["propertyName"], "op");
    let mapping = envelope["discriminator"]["mapping"].as_object().unwrap();
    let literals: Vec<String> = mapping.keys().cloned().collect();
    assert_eq!(literals, keys(&combined, "ops"));
    assert_eq!(
        discriminator_literal(&combined["ops"]["ONNX_v1"], "op"),
        Some("ONNX_v1")
    );
}

#[test]
fn module_embeds_combined_document() {
    let ws = Workspace::new("true");
    run(&ws.config).unwrap();

    let module = fs::read_to_string(ws.dir.path().join("runtime/src/spec.rs")).unwrap();
    assert!(module.starts_with("// This file is auto generated and must not be modified manually!"));
    assert!(module.contains(&format!("pub const SPEC_VERSION: &str = \"{SPEC_VERSION}\";")));
    assert!(module.contains("pub const SCHEMA: &str = r"));

    let combined = fs::read_to_string(ws.schema_dir().join("combined.json")).unwrap();
    assert!(module.contains(combined.trim_end()));
}

#[test]
fn propagated_tree_mirrors_definitions() {
    let ws = Workspace::new("true");
    run(&ws.config).unwrap();
    let destination = ws.dir.path().join("runtime/src/definitions");

    let mut count = 0;
    for entry in WalkDir::new(DEFINITIONS) {
        let entry = entry.unwrap();
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(DEFINITIONS).unwrap();
        let copied = fs::read(destination.join(relative)).unwrap();
        let original = fs::read(entry.path()).unwrap();
        if relative.extension().is_some_and(|e| e == "rs") {
            assert_eq!(copied, [COPY_BANNER.as_bytes(), original.as_slice()].concat());
        } else {
            assert_eq!(copied, original);
        }
        count += 1;
    }
    assert!(count >= 10, "only {count} definition files found");
}

#[test]
fn drift_check_detects_tampering() {
    let ws = Workspace::new("true");
    run(&ws.config).unwrap();
    assert!(check(&ws.config).unwrap().is_clean());

    let tampered = ws.schema_dir().join("op_onnx_v1.json");
    fs::write(&tampered, "{}\n").unwrap();
    let removed = ws.dir.path().join("runtime/src/definitions/meta.rs");
    fs::remove_file(&removed).unwrap();

    let report = check(&ws.config).unwrap();
    assert_eq!(report.drifts.len(), 2);
    let changed = report.drifts.iter().find(|d| d.path == tampered).unwrap();
    assert!(!changed.is_missing());
    let missing = report.drifts.iter().find(|d| d.path == removed).unwrap();
    assert!(missing.is_missing());
}

#[test]
fn formatter_failure_aborts_the_run() {
    let ws = Workspace::new("false");
    let err = run(&ws.config).unwrap_err();

    assert!(matches!(err, GenerateError::FormatterFailed { .. }));
    assert!(!ws.dir.path().join("runtime/src/definitions").exists());
}

#[test]
fn missing_runtime_artifact_is_an_io_error() {
    let ws = Workspace::new("true");
    fs::remove_dir_all(ws.dir.path().join("runtime")).unwrap();

    let err = run(&ws.config).unwrap_err();
    assert!(matches!(err, GenerateError::Io { .. }));
}

fn rustfmt_available() -> bool {
    Command::new("rustfmt")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

#[test]
fn generation_with_rustfmt_is_deterministic() {
    if !rustfmt_available() {
        eprintln!("rustfmt not available, skipping");
        return;
    }
    let ws = Workspace::with_formatter(r#"[rustfmt, --edition, "2024"]"#);
    run(&ws.config).unwrap();
    let first = ws.snapshot();
    run(&ws.config).unwrap();

    assert_eq!(ws.snapshot(), first);
    assert!(check(&ws.config).unwrap().is_clean());
}

#[cfg(unix)]
#[test]
fn drift_check_formats_with_runtime_config() {
    // Appends a marker only when a rustfmt.toml sits next to the module.
    let formatter = r#"[sh, -c, 'if [ -f "$(dirname "$1")/rustfmt.toml" ]; then echo "// configured" >> "$1"; fi', sh]"#;
    let ws = Workspace::with_formatter(formatter);
    fs::write(ws.dir.path().join("runtime/src/rustfmt.toml"), "max_width = 80\n").unwrap();

    run(&ws.config).unwrap();
    let module = fs::read_to_string(ws.dir.path().join("runtime/src/spec.rs")).unwrap();
    assert!(module.ends_with("// configured\n"));

    assert!(check(&ws.config).unwrap().is_clean());
    let leftovers: Vec<_> = fs::read_dir(ws.dir.path().join("runtime/src"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".spec-gen-"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use modelpack_spec_core::SPEC_VERSION;

const DEFINITIONS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../core/src/definitions");

fn spec_gen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_spec-gen"))
        .args(args)
        .output()
        .expect("failed to run spec-gen")
}

/// Writes a config next to an empty runtime artifact and returns its path.
fn write_config(dir: &Path, formatter: &str) -> PathBuf {
    fs::create_dir_all(dir.join("runtime/src")).expect("failed to create runtime");
    let yaml = format!(
        r#"version: "1.0"
outputs:
  schema_dir: schemas
  module: runtime/src/spec.rs
formatter: ["{formatter}"]
propagation:
  source: "{DEFINITIONS}"
  destination: runtime/src/definitions
"#
    );
    let path = dir.join("spec-gen.yml");
    fs::write(&path, yaml).expect("failed to write config");
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Print tests
// ---------------------------------------------------------------------------

#[test]
fn print_outputs_combined_document() {
    let output = spec_gen(&["print"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["version"], SPEC_VERSION);
    assert!(doc["envs"].get("python3::conda_pip").is_some());
    assert!(doc["ops"].get("ONNX_v1").is_some());
    assert!(doc["variants"].get("pipeline").is_some());
    assert!(doc["variants"].get("pyfunc").is_some());
}

#[test]
fn print_single_registration() {
    let output = spec_gen(&["print", "--category", "ops", "--key", "ONNX_v1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["title"], "ONNX_v1");
}

#[test]
fn print_unknown_key_fails() {
    let output = spec_gen(&["print", "--category", "envs", "--key", "python2::virtualenv"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: no envs registration named 'python2::virtualenv'"));
}

#[test]
fn print_category_requires_key() {
    let output = spec_gen(&["print", "--category", "variants"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// Generate and check tests
// ---------------------------------------------------------------------------

#[test]
fn generate_then_check_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true");
    let config = config.to_str().unwrap();

    let output = spec_gen(&["generate", "--config", config]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains(&format!("Generated spec {SPEC_VERSION}")));
    assert!(dir.path().join("schemas/combined.json").exists());
    assert!(dir.path().join("runtime/src/spec.rs").exists());
    assert!(dir.path().join("runtime/src/definitions/mod.rs").exists());

    let output = spec_gen(&["check", "--config", config]);
    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("up to date"));
}

#[test]
fn check_reports_drift() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true");
    let config = config.to_str().unwrap();
    assert!(spec_gen(&["generate", "--config", config]).status.success());

    fs::write(dir.path().join("schemas/variant_pyfunc.json"), "{}\n").unwrap();
    fs::remove_file(dir.path().join("runtime/src/spec.rs")).unwrap();

    let output = spec_gen(&["check", "--config", config]);
    assert!(!output.status.success());
    let listing = stdout(&output);
    assert!(listing.contains("changed"), "{listing}");
    assert!(listing.contains("variant_pyfunc.json"), "{listing}");
    assert!(listing.contains("missing"), "{listing}");
    assert!(stderr(&output).contains("2 of"));
}

#[test]
fn check_before_generate_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true");

    let output = spec_gen(&["check", "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("missing"));
}

#[test]
fn generate_with_failing_formatter_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "false");

    let output = spec_gen(&["generate", "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("formatter 'false' failed"));
}

#[test]
fn generate_with_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yml");

    let output = spec_gen(&["generate", "--config", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to load config"));
}

#[test]
fn verbose_logs_written_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "true");

    let output = spec_gen(&["--verbose", "generate", "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("Wrote schema file"));
}

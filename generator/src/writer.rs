//! Artifact rendering and writing.
//!
//! Rendering is pure: [`render_schema_files`] and [`render_module`] turn a
//! [`CombinedDocument`] into bytes without touching the file system. The
//! `write_*` functions truncate and rewrite every output on each run, so a
//! file never keeps content from an earlier run.
//!
//! Outputs of one run:
//!
//! - `manifest.json`, `ops.json`, `meta_entry.json`: top-level schemas.
//! - `env_<key>.json`, `op_<key>.json`, `variant_<key>.json`: one per
//!   registration, the key lowercased with every run of non-alphanumerics
//!   collapsed to `_`.
//! - `combined.json`: the combined document.
//! - the generated module in the runtime artifact, embedding the combined
//!   document as a string constant named [`SCHEMA_CONST`].

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{Category, CombinedDocument};
use crate::error::{GenerateError, Result};
use crate::format::Formatter;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const OPS_FILE: &str = "ops.json";
pub const META_ENTRY_FILE: &str = "meta_entry.json";
pub const COMBINED_FILE: &str = "combined.json";

/// Name of the constant holding the embedded combined document.
pub const SCHEMA_CONST: &str = "SCHEMA";

/// First line of the generated module.
pub const MODULE_BANNER: &str = "// This file is auto generated and must not be modified manually!";

/// A rendered output file: name relative to its directory plus contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Files touched by [`write_schema_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub pruned: Vec<PathBuf>,
}

/// Serializes `value` as JSON indented by four spaces, without a trailing
/// newline.
pub fn pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Maps a registration key to a file name stem.
///
/// # Examples
///
/// ```
/// use modelpack_spec_gen::writer::file_stem;
///
/// assert_eq!(file_stem("python3::conda_pip"), "python3_conda_pip");
/// assert_eq!(file_stem("ONNX_v1"), "onnx_v1");
/// ```
pub fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    let mut pending_separator = false;
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !stem.is_empty() {
                stem.push('_');
            }
            pending_separator = false;
            stem.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    stem
}

/// File name of the per-kind schema for `key` in `category`.
pub fn schema_file_name(category: Category, key: &str) -> String {
    format!("{}_{}.json", category.file_prefix(), file_stem(key))
}

/// Returns `true` for names matching the per-kind schema file pattern.
pub fn is_per_kind_file(file_name: &str) -> bool {
    file_name.ends_with(".json")
        && Category::ALL
            .iter()
            .any(|c| file_name.starts_with(&format!("{}_", c.file_prefix())))
}

/// Renders every JSON schema file of `doc`.
///
/// # Errors
///
/// Returns [`DuplicateOutputFile`](GenerateError::DuplicateOutputFile) when
/// two keys of one category map to the same file name.
pub fn render_schema_files(doc: &CombinedDocument) -> Result<Vec<Artifact>> {
    let mut artifacts = vec![
        json_artifact(MANIFEST_FILE, doc.manifest())?,
        json_artifact(OPS_FILE, doc.ops_entries())?,
        json_artifact(META_ENTRY_FILE, doc.meta_entry())?,
    ];

    let mut owners: Vec<(String, String)> = Vec::new();
    for (category, key, schema) in doc.registrations() {
        let file_name = schema_file_name(category, key);
        if let Some((_, first)) = owners.iter().find(|(name, _)| *name == file_name) {
            return Err(GenerateError::DuplicateOutputFile {
                file: file_name,
                first: first.clone(),
                second: key.to_string(),
            });
        }
        artifacts.push(json_artifact(&file_name, schema)?);
        owners.push((file_name, key.to_string()));
    }

    artifacts.push(json_artifact(COMBINED_FILE, doc)?);
    Ok(artifacts)
}

/// Renders the generated module embedding `doc`, before formatting.
pub fn render_module(doc: &CombinedDocument) -> Result<String> {
    let json = pretty_json(doc)?;
    Ok(format!(
        "{MODULE_BANNER}\n\
         // Regenerate with `spec-gen generate`.\n\
         \n\
         /// Spec version of the embedded schema document.\n\
         pub const SPEC_VERSION: &str = {version:?};\n\
         \n\
         /// Combined schema document as JSON.\n\
         pub const {SCHEMA_CONST}: &str = {literal};\n\
         \n\
         /// Returns the combined schema document as JSON text.\n\
         pub fn schema_json() -> &'static str {{\n    {SCHEMA_CONST}\n}}\n",
        version = doc.version(),
        literal = raw_string_literal(&json),
    ))
}

/// Writes every schema file of `doc` into `dir`, creating it if needed.
///
/// With `prune_stale`, per-kind files in `dir` that this run did not write
/// are deleted.
pub fn write_schema_files(
    doc: &CombinedDocument,
    dir: &Path,
    prune_stale: bool,
) -> Result<WriteSummary> {
    let artifacts = render_schema_files(doc)?;
    fs::create_dir_all(dir).map_err(GenerateError::io(dir))?;

    let mut summary = WriteSummary::default();
    for artifact in &artifacts {
        let path = dir.join(&artifact.file_name);
        write_file(&path, &artifact.contents)?;
        debug!(path = %path.display(), "Wrote schema file");
        summary.written.push(path);
    }

    if prune_stale {
        let keep: BTreeSet<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        summary.pruned = prune_stale_files(dir, &keep)?;
    }

    info!(
        dir = %dir.display(),
        written = summary.written.len(),
        pruned = summary.pruned.len(),
        "Schema files written"
    );
    Ok(summary)
}

/// Writes the generated module to `path` and formats it in place.
///
/// The parent directory belongs to the runtime artifact and must exist.
pub fn write_module(doc: &CombinedDocument, path: &Path, formatter: &Formatter) -> Result<()> {
    let module = render_module(doc)?;
    write_file(path, module.as_bytes())?;
    formatter.format_file(path)?;
    info!(path = %path.display(), "Generated module written");
    Ok(())
}

pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(GenerateError::io(path))?;
    file.write_all(contents).map_err(GenerateError::io(path))?;
    file.flush().map_err(GenerateError::io(path))
}

fn json_artifact<T: Serialize>(file_name: &str, value: &T) -> Result<Artifact> {
    let mut contents = pretty_json(value)?.into_bytes();
    contents.push(b'\n');
    Ok(Artifact {
        file_name: file_name.to_string(),
        contents,
    })
}

fn prune_stale_files(dir: &Path, keep: &BTreeSet<&str>) -> Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    for entry in fs::read_dir(dir).map_err(GenerateError::io(dir))? {
        let entry = entry.map_err(GenerateError::io(dir))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_per_kind_file(name) && !keep.contains(name) {
            stale.push(path);
        }
    }
    stale.sort();

    for path in &stale {
        fs::remove_file(path).map_err(GenerateError::io(path))?;
        info!(path = %path.display(), "Pruned stale schema file");
    }
    Ok(stale)
}

/// Wraps `text` in a raw string literal whose delimiter cannot occur in it.
fn raw_string_literal(text: &str) -> String {
    let mut longest = 0;
    let mut run: Option<usize> = None;
    for ch in text.chars() {
        run = match (ch, run) {
            ('"', _) => Some(0),
            ('#', Some(n)) => {
                longest = longest.max(n + 1);
                Some(n + 1)
            }
            _ => None,
        };
    }
    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}

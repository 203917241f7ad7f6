//! Drift detection between committed artifacts and the definitions.
//!
//! Every artifact a generation run would write is rendered in memory and
//! compared byte for byte against the file on disk. The generated module is
//! formatted in a scratch file beside it first, so the comparison sees
//! exactly what [`crate::pipeline::run`] would leave behind. The scratch
//! file is removed once read; nothing else is written.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::aggregate::CombinedDocument;
use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};
use crate::format::Formatter;
use crate::propagate::expected_files;
use crate::registry::spec_document;
use crate::writer::{render_module, render_schema_files, write_file};

/// One file whose on-disk content differs from what generation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub path: PathBuf,
    /// SHA-256 hex digest of the content generation would write.
    pub expected_sha256: String,
    /// SHA-256 hex digest of the file on disk, `None` when it is missing.
    pub actual_sha256: Option<String>,
}

impl Drift {
    pub fn is_missing(&self) -> bool {
        self.actual_sha256.is_none()
    }
}

/// Outcome of [`check`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    /// Number of files compared.
    pub checked: usize,
    pub drifts: Vec<Drift>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.drifts.is_empty()
    }

    fn compare(&mut self, path: PathBuf, expected: &[u8]) -> Result<()> {
        self.checked += 1;
        let actual = match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(GenerateError::io(&path)(err)),
        };
        if actual.as_deref() == Some(expected) {
            debug!(path = %path.display(), "Up to date");
            return Ok(());
        }
        self.drifts.push(Drift {
            path,
            expected_sha256: sha256_hex(expected),
            actual_sha256: actual.as_deref().map(sha256_hex),
        });
        Ok(())
    }
}

/// Computes the SHA-256 hex digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Compares every artifact described by `config` against the disk.
pub fn check(config: &GeneratorConfig) -> Result<DriftReport> {
    let doc = spec_document()?;
    check_document(&doc, config)
}

/// Like [`check`], for an already built document.
pub fn check_document(doc: &CombinedDocument, config: &GeneratorConfig) -> Result<DriftReport> {
    let mut report = DriftReport::default();

    for artifact in render_schema_files(doc)? {
        let path = config.outputs.schema_dir.join(&artifact.file_name);
        report.compare(path, &artifact.contents)?;
    }

    let module = formatted_module(doc, &config.outputs.module, &config.formatter())?;
    report.compare(config.outputs.module.clone(), &module)?;

    let rules = config.propagation_rules();
    for (relative, contents) in expected_files(&config.propagation.source, &rules)? {
        report.compare(config.propagation.destination.join(relative), &contents)?;
    }

    info!(
        checked = report.checked,
        drifted = report.drifts.len(),
        "Drift check finished"
    );
    Ok(report)
}

/// Renders and formats the module in a scratch file, returning its bytes.
///
/// The scratch file sits next to `module` when its directory exists, so the
/// formatter picks up the same configuration files as an in-place run.
fn formatted_module(doc: &CombinedDocument, module: &Path, formatter: &Formatter) -> Result<Vec<u8>> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".spec-gen-").suffix(".rs");
    let scratch = match module.parent().filter(|dir| dir.is_dir()) {
        Some(dir) => builder.tempfile_in(dir).map_err(GenerateError::io(dir))?,
        None => builder
            .tempfile()
            .map_err(GenerateError::io(std::env::temp_dir()))?,
    };
    let path = scratch.path();

    write_file(path, render_module(doc)?.as_bytes())?;
    formatter.format_file(path)?;
    fs::read(path).map_err(GenerateError::io(path))
}

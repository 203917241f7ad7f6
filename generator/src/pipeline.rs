//! One full generation run.
//!
//! Stages run in order on a single thread: derive and aggregate the
//! combined document, write the schema files, write and format the
//! generated module, then mirror the definition tree. The first error
//! aborts the run; outputs already written by earlier stages are left as
//! they are and a rerun regenerates everything.

use std::path::PathBuf;

use tracing::info;

use crate::aggregate::{Category, CombinedDocument};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::propagate::{PropagationSummary, propagate};
use crate::registry::spec_document;
use crate::writer::{WriteSummary, write_module, write_schema_files};

/// What a generation run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub version: String,
    pub registrations: usize,
    pub schema_files: WriteSummary,
    pub module: PathBuf,
    pub propagation: PropagationSummary,
}

/// Generates every artifact described by `config` from the registered
/// definitions.
pub fn run(config: &GeneratorConfig) -> Result<GenerationReport> {
    let doc = spec_document()?;
    info!(
        version = doc.version(),
        envs = doc.category(Category::Envs).len(),
        ops = doc.category(Category::Ops).len(),
        variants = doc.category(Category::Variants).len(),
        "Combined document built"
    );
    run_document(&doc, config)
}

/// Writes the artifacts of an already built document.
pub fn run_document(doc: &CombinedDocument, config: &GeneratorConfig) -> Result<GenerationReport> {
    let schema_files =
        write_schema_files(doc, &config.outputs.schema_dir, config.outputs.prune_stale)?;
    write_module(doc, &config.outputs.module, &config.formatter())?;
    let propagation = propagate(
        &config.propagation.source,
        &config.propagation.destination,
        &config.propagation_rules(),
    )?;

    Ok(GenerationReport {
        version: doc.version().to_string(),
        registrations: doc.registrations().count(),
        schema_files,
        module: config.outputs.module.clone(),
        propagation,
    })
}

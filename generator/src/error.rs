//! Error types for schema generation.
//!
//! Every failure is fatal for the run: authoring mistakes in the definition
//! set, I/O failures, and a formatter that cannot run or rejects the
//! generated module. The remedy is always to fix the cause and rerun.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::aggregate::Category;

/// Errors that can occur while generating or checking spec artifacts.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// File I/O failure at a specific path.
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Directory traversal failure while walking the definition tree.
    #[error("walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    /// Configuration is structurally valid YAML but unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Combined document version string is empty.
    #[error("spec version cannot be empty")]
    EmptyVersion,

    /// A top-level schema (manifest, ops_entries, meta_entry) was not supplied.
    #[error("missing top-level schema: {0}")]
    MissingTopLevel(&'static str),

    /// Registration key is empty or whitespace-only.
    #[error("empty registration key in {0}")]
    EmptyKey(Category),

    /// Two registrations share a key within one category.
    #[error("duplicate registration key in {category}: {key}")]
    DuplicateKey { category: Category, key: String },

    /// Two registrations would be written to the same schema file.
    #[error("registrations '{first}' and '{second}' both map to {file}")]
    DuplicateOutputFile {
        file: String,
        first: String,
        second: String,
    },

    /// Schema does not constrain the discriminator to a single string literal.
    #[error("definition '{definition}' has no literal '{field}' discriminator")]
    MissingDiscriminator { definition: String, field: String },

    /// Two union branches share a discriminator literal.
    #[error("discriminator '{field}' value '{value}' is used by more than one branch")]
    DuplicateDiscriminator { field: String, value: String },

    /// An `ops` registration key differs from the definition's literal tag.
    #[error("ops key '{key}' does not match the definition's op literal '{literal}'")]
    DiscriminatorMismatch { key: String, literal: String },

    /// The ops envelope and the `ops` registrations disagree on a tag.
    #[error("op tag '{0}' is not registered in both the ops envelope and the ops map")]
    UnregisteredOpTag(String),

    /// Schema passed to union derivation has no `anyOf`/`oneOf` branches.
    #[error("definition '{0}' is not a union")]
    NotAUnion(String),

    /// Formatter executable could not be started.
    #[error("failed to run formatter '{program}': {source}")]
    FormatterSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Formatter ran but reported failure.
    #[error("formatter '{program}' failed ({status}): {stderr}")]
    FormatterFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl GenerateError {
    /// Returns a closure wrapping an [`std::io::Error`] with `path`.
    ///
    /// Intended for `map_err` at each file system call site.
    pub fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { path, source }
    }
}

/// Convenience alias for results with [`GenerateError`].
pub type Result<T> = std::result::Result<T, GenerateError>;

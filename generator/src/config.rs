//! Generator configuration.
//!
//! Loaded from a YAML file (typically `spec-gen.yml` at the workspace root)
//! that says where schema documents go, where the runtime artifact lives and
//! how the definition tree is mirrored into it.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! outputs:
//!   schema_dir: spec/schemas
//!   module: ../modelpack-runtime/src/spec.rs
//!   prune_stale: true
//! formatter: [rustfmt, --edition, "2024"]
//! propagation:
//!   source: core/src/definitions
//!   destination: ../modelpack-runtime/src/definitions
//!   definition_extensions: [rs]
//!   artifact_extensions: [rlib, rmeta, o, d, pyc]
//!   artifact_dirs: [target, __pycache__]
//! ```
//!
//! Relative paths are resolved against the directory containing the config
//! file, so the generator behaves the same from any working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};
use crate::format::Formatter;
use crate::propagate::{COPY_BANNER, PropagationRules};

/// Where generated artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the individual schema files and `combined.json`.
    pub schema_dir: PathBuf,
    /// Generated module inside the runtime artifact's source tree.
    pub module: PathBuf,
    /// Delete per-kind schema files left behind by earlier registrations.
    #[serde(default = "default_true")]
    pub prune_stale: bool,
}

/// How the definition tree is mirrored into the runtime artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Root of the definition tree.
    pub source: PathBuf,
    /// Root of the mirrored copy.
    pub destination: PathBuf,
    /// Extensions of definition files that receive the banner.
    #[serde(default = "default_definition_extensions")]
    pub definition_extensions: Vec<String>,
    /// Extensions of compiled or cache artifacts that are never copied.
    #[serde(default = "default_artifact_extensions")]
    pub artifact_extensions: Vec<String>,
    /// Directory names skipped entirely.
    #[serde(default = "default_artifact_dirs")]
    pub artifact_dirs: Vec<String>,
}

/// Top-level generator configuration.
///
/// # Examples
///
/// ```
/// use modelpack_spec_gen::GeneratorConfig;
///
/// let yaml = r#"
/// version: "1.0"
/// outputs:
///   schema_dir: schemas
///   module: runtime/src/spec.rs
/// propagation:
///   source: core/src/definitions
///   destination: runtime/src/definitions
/// "#;
/// let config = GeneratorConfig::from_yaml_str(yaml, "/work").unwrap();
/// assert_eq!(config.outputs.schema_dir, std::path::Path::new("/work/schemas"));
/// assert_eq!(config.formatter[0], "rustfmt");
/// assert!(config.outputs.prune_stale);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    pub outputs: OutputConfig,
    /// Formatter program followed by its arguments; the module path is
    /// appended on invocation.
    #[serde(default = "default_formatter")]
    pub formatter: Vec<String>,
    pub propagation: PropagationConfig,
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file and resolves relative paths
    /// against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](GenerateError::Io) if the file cannot be read,
    /// [`YamlError`](GenerateError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](GenerateError::InvalidConfig) if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(GenerateError::io(path))?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::from_yaml_str(&raw, base)
    }

    /// Parses configuration from YAML text, resolving relative paths
    /// against `base`.
    pub fn from_yaml_str(raw: &str, base: impl AsRef<Path>) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config.resolved_against(base.as_ref()))
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = serde_yaml::to_string(self)?;
        std::fs::write(path, raw).map_err(GenerateError::io(path))
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.formatter.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(GenerateError::InvalidConfig(
                "formatter must name a program".to_string(),
            ));
        }
        if self.propagation.source.as_os_str().is_empty() {
            return Err(GenerateError::InvalidConfig(
                "propagation.source cannot be empty".to_string(),
            ));
        }
        if self.propagation.destination.as_os_str().is_empty() {
            return Err(GenerateError::InvalidConfig(
                "propagation.destination cannot be empty".to_string(),
            ));
        }
        if self.outputs.module.file_name().is_none() {
            return Err(GenerateError::InvalidConfig(
                "outputs.module must name a file".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the formatter described by this configuration.
    pub fn formatter(&self) -> Formatter {
        let mut parts = self.formatter.iter().cloned();
        let program = parts.next().unwrap_or_default();
        Formatter::new(program, parts.collect())
    }

    /// Returns the propagation rules described by this configuration.
    pub fn propagation_rules(&self) -> PropagationRules {
        PropagationRules {
            definition_extensions: self.propagation.definition_extensions.clone(),
            artifact_extensions: self.propagation.artifact_extensions.clone(),
            artifact_dirs: self.propagation.artifact_dirs.clone(),
            banner: COPY_BANNER.to_string(),
        }
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.outputs.schema_dir);
        resolve(&mut self.outputs.module);
        resolve(&mut self.propagation.source);
        resolve(&mut self.propagation.destination);
        self
    }
}

fn default_true() -> bool {
    true
}

fn default_formatter() -> Vec<String> {
    let rustfmt = Formatter::default();
    std::iter::once(rustfmt.program().to_string())
        .chain(rustfmt.args().iter().cloned())
        .collect()
}

fn default_definition_extensions() -> Vec<String> {
    vec!["rs".into()]
}

fn default_artifact_extensions() -> Vec<String> {
    ["rlib", "rmeta", "o", "d", "pyc"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_artifact_dirs() -> Vec<String> {
    vec!["target".into(), "__pycache__".into()]
}

//! Schema generation and distribution for the model package spec.
//!
//! The definitions in `modelpack-spec-core` are the single source of truth.
//! This crate turns them into artifacts:
//!
//! 1. [`derive`] produces a JSON schema document per definition.
//! 2. [`aggregate`] assembles the versioned [`CombinedDocument`] from an
//!    explicit registration list ([`registry`]).
//! 3. [`writer`] writes the individual schema files, `combined.json` and a
//!    generated module embedding the combined document, then runs the
//!    configured [`Formatter`] over that module.
//! 4. [`propagate`] mirrors the definition source tree into the runtime
//!    artifact with a do-not-edit banner on every definition file.
//!
//! [`pipeline::run`] sequences all of it from a [`GeneratorConfig`];
//! [`check::check`] reports where committed artifacts have drifted.
//!
//! # Quick start
//!
//! ```no_run
//! use modelpack_spec_gen::{GeneratorConfig, pipeline};
//!
//! let config = GeneratorConfig::load("spec-gen.yml").unwrap();
//! let report = pipeline::run(&config).unwrap();
//! println!("spec {} with {} registrations", report.version, report.registrations);
//! ```

pub mod aggregate;
pub mod check;
mod config;
pub mod derive;
mod error;
pub mod format;
pub mod pipeline;
pub mod propagate;
pub mod registry;
pub mod writer;

pub use aggregate::{Category, CombinedBuilder, CombinedDocument, Registration};
pub use check::{Drift, DriftReport};
pub use config::{GeneratorConfig, OutputConfig, PropagationConfig};
pub use error::{GenerateError, Result};
pub use format::Formatter;
pub use pipeline::GenerationReport;
pub use propagate::{COPY_BANNER, PropagationRules};

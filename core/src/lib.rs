//! Typed definitions for the model package interchange format.
//!
//! This crate is the single source of truth for the format. Every concept
//! of a model package is declared here as a plain serde data type that also
//! derives [`schemars::JsonSchema`]:
//!
//! - [`Manifest`]: top-level package descriptor.
//! - [`OpInstances`]: the operator envelope, a closed sum over the concrete
//!   operator kinds (currently [`OnnxV1`]), selected by the `op` literal.
//! - [`MetaEntry`]: a single metadata record.
//! - [`Python3CondaPip`]: an execution environment descriptor.
//! - [`PipelineVariant`] and [`PyFuncVariant`]: packaging variants.
//!
//! The `modelpack-spec-gen` crate derives schema documents from these types,
//! embeds the combined document into the runtime artifact and mirrors the
//! [`definitions`] source tree next to it.
//!
//! # Example
//!
//! ```
//! use modelpack_spec_core::*;
//!
//! let raw = r#"{
//!     "id": "model",
//!     "op": "ONNX_v1",
//!     "inputs": [],
//!     "outputs": [],
//!     "dynamic_attributes": {},
//!     "attributes": {
//!         "opsets": [{"domain": "", "version": 17}],
//!         "requires_ort_extensions": false,
//!         "has_external_data": false,
//!         "onnx_ir_version": 8
//!     }
//! }"#;
//!
//! let parsed: OpInstances = serde_json::from_str(raw).unwrap();
//! let OpInstances::OnnxV1(op) = parsed;
//! assert_eq!(op.op, OnnxV1Op::OnnxV1);
//! assert_eq!(op.instance.id, "model");
//! assert_eq!(op.attributes.opsets[0].version, 17);
//! ```

pub mod definitions;

pub use definitions::envs::{PipCondition, PipDependency, Python3CondaPip};
pub use definitions::manifest::{ContentType, Dim, DynamicAttribute, EnvVar, Manifest, PackageIo};
pub use definitions::meta::MetaEntry;
pub use definitions::op_instances::{OpInstance, OpInstances, OpIo};
pub use definitions::ops::onnx::{OnnxAttributes, OnnxV1, OnnxV1Op, Opset};
pub use definitions::variants::pipeline::{PipelineNode, PipelineVariant};
pub use definitions::variants::pyfunc::PyFuncVariant;

/// Version of the model package spec (semver).
///
/// This is the only compatibility signal consumers get. Bump it whenever a
/// definition changes shape in a way existing readers cannot accept.
pub const SPEC_VERSION: &str = "0.0.4";

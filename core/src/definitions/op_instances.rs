//! Operator envelope.
//!
//! An operator occurrence in a package is one of the concrete kinds listed
//! in [`OpInstances`]. Each kind carries a required literal `op` field that
//! is unique across the union, so a document resolves to exactly one
//! variant.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::manifest::{ContentType, Dim};
use super::ops::onnx::OnnxV1;

/// Input or output of a single operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OpIo {
    pub name: String,
    pub content_type: ContentType,
    pub dtype: String,
    pub shape: Vec<Dim>,
}

/// Fields shared by every operator kind.
///
/// Flattened into each concrete kind next to its `op` literal and its
/// kind-specific `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OpInstance {
    pub id: String,
    pub inputs: Vec<OpIo>,
    pub outputs: Vec<OpIo>,
    /// Maps operator-level attribute names to package dynamic attributes.
    pub dynamic_attributes: BTreeMap<String, String>,
}

/// Every operator kind known to this spec version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OpInstances {
    OnnxV1(OnnxV1),
}

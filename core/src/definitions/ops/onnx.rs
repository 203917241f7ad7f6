//! ONNX graph operator.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::super::op_instances::OpInstance;

/// An operator set import of an ONNX graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Opset {
    pub domain: String,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OnnxAttributes {
    pub opsets: Vec<Opset>,
    pub requires_ort_extensions: bool,
    pub has_external_data: bool,
    pub onnx_ir_version: i64,
    /// Operator names used by the graph, keyed by domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_operators: Option<BTreeMap<String, Vec<String>>>,
}

/// Discriminator literal for [`OnnxV1`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum OnnxV1Op {
    #[serde(rename = "ONNX_v1")]
    OnnxV1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(rename = "ONNX_v1")]
pub struct OnnxV1 {
    #[serde(flatten)]
    pub instance: OpInstance,
    pub op: OnnxV1Op,
    pub attributes: OnnxAttributes,
}

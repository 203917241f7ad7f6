//! Top-level package descriptor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Encoding of a package or operator input/output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ContentType {
    /// Newline-delimited JSON arrays.
    #[serde(rename = "NDJSON")]
    NdJson,
    /// A single JSON document.
    #[serde(rename = "JSON")]
    Json,
}

/// One dimension of a tensor shape: fixed size or a symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Dim {
    Fixed(i64),
    Named(String),
}

/// Input or output declared at the package boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PackageIo {
    pub name: String,
    pub content_type: ContentType,
    pub dtype: String,
    pub shape: Vec<Dim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Attribute supplied by the caller at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DynamicAttribute {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Environment variable the package expects to be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnvVar {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Descriptor stored at the root of every model package.
///
/// `variant` names the packaging variant used to run the package; it must
/// be one of the keys of the combined document's `variants` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Manifest {
    pub variant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub producer_name: String,
    pub producer_version: String,
    pub producer_tags: Vec<String>,
    pub inputs: Vec<PackageIo>,
    pub outputs: Vec<PackageIo>,
    pub dynamic_attributes: Vec<DynamicAttribute>,
    pub env_vars: Vec<EnvVar>,
}

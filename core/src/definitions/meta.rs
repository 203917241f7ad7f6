use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single metadata record attached to a package by a producer tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetaEntry {
    pub id: String,
    pub producer: String,
    pub producer_version: String,
    pub producer_tags: Vec<String>,
    pub payload: BTreeMap<String, serde_json::Value>,
}

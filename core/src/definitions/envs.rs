//! Execution environment descriptors.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Applicability filter for a [`PipDependency`].
///
/// Every filter is optional. A dependency applies when all provided filters
/// match, and a filter matches when any of its values does. Evaluating the
/// condition is up to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PipCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PipDependency {
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_pip_args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<PipCondition>,
}

/// Python 3 environment built with conda and pip.
///
/// `build_dependencies` are installed in listed order. `dependencies` maps
/// a package name to its version constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(rename = "Python3_CondaPip")]
pub struct Python3CondaPip {
    pub python_version: String,
    pub build_dependencies: Vec<String>,
    pub dependencies: BTreeMap<String, String>,
}

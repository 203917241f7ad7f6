use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Runs an embedded Python class that implements the package's logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PyFuncVariant {
    pub pyfunc_classname: String,
    pub extra_values: BTreeMap<String, serde_json::Value>,
}

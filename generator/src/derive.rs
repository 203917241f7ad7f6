//! Schema derivation from typed definitions.
//!
//! Schemas come straight from the `#[derive(JsonSchema)]` output of each
//! definition, generated with draft-07 settings and every subschema inlined,
//! so a document is self-contained. Object keys are held in serde_json's
//! ordered map, which makes serialization byte-stable across runs.
//!
//! Closed sum types (such as the operator envelope) are further rewritten
//! into a discriminated union: a `oneOf` of the branches plus a
//! `discriminator` object naming the tag field and mapping each literal to
//! its branch.
//!
//! # Examples
//!
//! ```
//! use modelpack_spec_core::{OnnxV1, OpInstances};
//! use modelpack_spec_gen::derive::{derive_schema, derive_union, discriminator_literal};
//!
//! let onnx = derive_schema::<OnnxV1>().unwrap();
//! assert_eq!(discriminator_literal(&onnx, "op"), Some("ONNX_v1"));
//!
//! let envelope = derive_union::<OpInstances>("op").unwrap();
//! assert_eq!(envelope["discriminator"]["propertyName"], "op");
//! assert!(envelope["discriminator"]["mapping"].get("ONNX_v1").is_some());
//! ```

use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde_json::{Map, Value, json};

use crate::error::{GenerateError, Result};

/// Settings shared by every derivation.
pub fn schema_settings() -> SchemaSettings {
    SchemaSettings::draft07().with(|settings| settings.inline_subschemas = true)
}

/// Derives the schema document for a single definition.
pub fn derive_schema<T: JsonSchema>() -> Result<Value> {
    let schema = schema_settings()
        .into_generator()
        .into_root_schema_for::<T>();
    Ok(serde_json::to_value(&schema)?)
}

/// Derives a closed sum type as a discriminated union on `field`.
///
/// # Errors
///
/// Returns [`NotAUnion`](GenerateError::NotAUnion) when the derived schema
/// has no branches, [`MissingDiscriminator`](GenerateError::MissingDiscriminator)
/// when a branch does not pin `field` to a single required string literal,
/// and [`DuplicateDiscriminator`](GenerateError::DuplicateDiscriminator) when
/// two branches share a literal.
pub fn derive_union<T: JsonSchema>(field: &str) -> Result<Value> {
    let schema = derive_schema::<T>()?;
    discriminated_union(schema, &T::schema_name(), field)
}

/// Rewrites a derived union schema into its discriminated form.
pub fn discriminated_union(mut schema: Value, name: &str, field: &str) -> Result<Value> {
    let object = schema
        .as_object_mut()
        .ok_or_else(|| GenerateError::NotAUnion(name.to_string()))?;

    let branches = match object.remove("anyOf").or_else(|| object.remove("oneOf")) {
        Some(Value::Array(branches)) if !branches.is_empty() => branches,
        Some(_) => return Err(GenerateError::NotAUnion(name.to_string())),
        // A single-branch union may be collapsed into the branch itself.
        None => vec![lift_single_branch(object, name, field)?],
    };

    let mut mapping = Map::new();
    for (index, branch) in branches.iter().enumerate() {
        let literal = discriminator_literal(branch, field).ok_or_else(|| {
            GenerateError::MissingDiscriminator {
                definition: branch_name(branch, name, index),
                field: field.to_string(),
            }
        })?;
        let pointer = Value::String(format!("#/oneOf/{index}"));
        if mapping.insert(literal.to_string(), pointer).is_some() {
            return Err(GenerateError::DuplicateDiscriminator {
                field: field.to_string(),
                value: literal.to_string(),
            });
        }
    }

    object.insert("oneOf".to_string(), Value::Array(branches));
    object.insert(
        "discriminator".to_string(),
        json!({ "propertyName": field, "mapping": mapping }),
    );
    Ok(schema)
}

/// Returns the literal a schema pins `field` to, if it is required and
/// constrained to exactly one string value.
pub fn discriminator_literal<'a>(schema: &'a Value, field: &str) -> Option<&'a str> {
    let required = schema.get("required")?.as_array()?;
    if !required.iter().any(|r| r.as_str() == Some(field)) {
        return None;
    }

    let property = schema.get("properties")?.get(field)?;
    if let Some(literal) = property.get("const") {
        return literal.as_str();
    }
    match property.get("enum")?.as_array()?.as_slice() {
        [Value::String(literal)] => Some(literal),
        _ => None,
    }
}

/// Literals selected by the `discriminator.mapping` of a union schema.
pub fn union_literals(schema: &Value) -> Vec<&str> {
    schema
        .get("discriminator")
        .and_then(|d| d.get("mapping"))
        .and_then(Value::as_object)
        .map(|mapping| mapping.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn lift_single_branch(object: &mut Map<String, Value>, name: &str, field: &str) -> Result<Value> {
    let metadata = ["$schema", "title", "description"];
    let branch: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| !metadata.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let branch = Value::Object(branch);
    if discriminator_literal(&branch, field).is_none() {
        return Err(GenerateError::NotAUnion(name.to_string()));
    }
    object.retain(|key, _| metadata.contains(&key.as_str()));
    Ok(branch)
}

fn branch_name(branch: &Value, union: &str, index: usize) -> String {
    branch
        .get("title")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| format!("{union}[{index}]"))
}

//! Combined schema document assembly.
//!
//! [`CombinedBuilder`] receives every top-level schema and every
//! registration up front, then [`build`](CombinedBuilder::build) validates
//! them together and returns an immutable [`CombinedDocument`]. Nothing is
//! visible until the whole set has been checked.
//!
//! # Examples
//!
//! ```
//! use modelpack_spec_gen::aggregate::{Category, CombinedBuilder, Registration};
//! use serde_json::json;
//!
//! let op = json!({"required": ["op"], "properties": {"op": {"const": "Echo_v1"}}});
//! let envelope = json!({"oneOf": [op.clone()], "discriminator": {
//!     "propertyName": "op", "mapping": {"Echo_v1": "#/oneOf/0"}
//! }});
//!
//! let doc = CombinedBuilder::new("1.0.0")
//!     .manifest(json!({"title": "Manifest"}))
//!     .ops_entries(envelope)
//!     .meta_entry(json!({"title": "MetaEntry"}))
//!     .register(Registration::new(Category::Ops, "Echo_v1", op))
//!     .register(Registration::new(Category::Variants, "pipeline", json!({})))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(doc.version(), "1.0.0");
//! assert!(doc.get(Category::Ops, "Echo_v1").is_some());
//! assert!(doc.category(Category::Envs).is_empty());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::derive::{derive_schema, discriminator_literal, union_literals};
use crate::error::{GenerateError, Result};

/// Field that selects the operator kind in the ops envelope.
pub const OP_TAG_FIELD: &str = "op";

/// Registration category of the combined document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Execution environment descriptors.
    Envs,
    /// Concrete operator kinds.
    Ops,
    /// Packaging variants.
    Variants,
}

impl Category {
    /// All categories in document order.
    pub const ALL: [Category; 3] = [Category::Envs, Category::Ops, Category::Variants];

    /// Key of the category map in the combined document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Envs => "envs",
            Category::Ops => "ops",
            Category::Variants => "variants",
        }
    }

    /// File name prefix of the per-kind schema files.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Category::Envs => "env",
            Category::Ops => "op",
            Category::Variants => "variant",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema registered under an author-chosen key.
///
/// The key is the wire name and may differ from the definition's type name.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub category: Category,
    pub key: String,
    pub schema: Value,
}

impl Registration {
    pub fn new(category: Category, key: impl Into<String>, schema: Value) -> Self {
        Self {
            category,
            key: key.into(),
            schema,
        }
    }

    /// Derives the schema of `T` and registers it under `key`.
    pub fn derive<T: JsonSchema>(category: Category, key: impl Into<String>) -> Result<Self> {
        Ok(Self::new(category, key, derive_schema::<T>()?))
    }
}

/// Every schema document of one spec version.
///
/// Serializes as `{version, manifest, ops_entries, meta_entry, envs, ops,
/// variants}` in that order; category maps are sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedDocument {
    version: String,
    manifest: Value,
    ops_entries: Value,
    meta_entry: Value,
    envs: BTreeMap<String, Value>,
    ops: BTreeMap<String, Value>,
    variants: BTreeMap<String, Value>,
}

impl CombinedDocument {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn manifest(&self) -> &Value {
        &self.manifest
    }

    /// The discriminated-union schema of the operator envelope.
    pub fn ops_entries(&self) -> &Value {
        &self.ops_entries
    }

    pub fn meta_entry(&self) -> &Value {
        &self.meta_entry
    }

    /// Returns the registered schemas of `category`, keyed by wire name.
    pub fn category(&self, category: Category) -> &BTreeMap<String, Value> {
        match category {
            Category::Envs => &self.envs,
            Category::Ops => &self.ops,
            Category::Variants => &self.variants,
        }
    }

    /// Looks up one registered schema.
    pub fn get(&self, category: Category, key: &str) -> Option<&Value> {
        self.category(category).get(key)
    }

    /// Iterates over every registration as `(category, key, schema)` in
    /// document order.
    pub fn registrations(&self) -> impl Iterator<Item = (Category, &str, &Value)> {
        Category::ALL.into_iter().flat_map(move |category| {
            self.category(category)
                .iter()
                .map(move |(key, schema)| (category, key.as_str(), schema))
        })
    }
}

/// Collects the inputs of a [`CombinedDocument`].
#[derive(Debug, Clone, Default)]
pub struct CombinedBuilder {
    version: String,
    manifest: Option<Value>,
    ops_entries: Option<Value>,
    meta_entry: Option<Value>,
    registrations: Vec<Registration>,
}

impl CombinedBuilder {
    /// Creates a builder for spec `version`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn manifest(mut self, schema: Value) -> Self {
        self.manifest = Some(schema);
        self
    }

    pub fn ops_entries(mut self, schema: Value) -> Self {
        self.ops_entries = Some(schema);
        self
    }

    pub fn meta_entry(mut self, schema: Value) -> Self {
        self.meta_entry = Some(schema);
        self
    }

    /// Adds one registration.
    pub fn register(mut self, registration: Registration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Adds a batch of registrations in order.
    pub fn register_all(mut self, registrations: impl IntoIterator<Item = Registration>) -> Self {
        self.registrations.extend(registrations);
        self
    }

    /// Validates everything collected and assembles the document.
    ///
    /// # Errors
    ///
    /// Fails on an empty version, a missing top-level schema, an empty or
    /// duplicate key within a category, an `ops` key that differs from the
    /// schema's `op` literal, and an ops envelope whose tags do not match
    /// the `ops` registrations exactly.
    pub fn build(self) -> Result<CombinedDocument> {
        if self.version.trim().is_empty() {
            return Err(GenerateError::EmptyVersion);
        }
        let manifest = self
            .manifest
            .ok_or(GenerateError::MissingTopLevel("manifest"))?;
        let ops_entries = self
            .ops_entries
            .ok_or(GenerateError::MissingTopLevel("ops_entries"))?;
        let meta_entry = self
            .meta_entry
            .ok_or(GenerateError::MissingTopLevel("meta_entry"))?;

        let mut maps: BTreeMap<Category, BTreeMap<String, Value>> = Category::ALL
            .into_iter()
            .map(|category| (category, BTreeMap::new()))
            .collect();

        for Registration {
            category,
            key,
            schema,
        } in self.registrations
        {
            if key.trim().is_empty() {
                return Err(GenerateError::EmptyKey(category));
            }
            if category == Category::Ops {
                check_op_literal(&key, &schema)?;
            }
            let map = maps.entry(category).or_default();
            if map.contains_key(&key) {
                return Err(GenerateError::DuplicateKey { category, key });
            }
            map.insert(key, schema);
        }

        let mut take = |category: Category| maps.remove(&category).unwrap_or_default();
        let envs = take(Category::Envs);
        let ops = take(Category::Ops);
        let variants = take(Category::Variants);

        check_envelope(&ops_entries, &ops)?;

        Ok(CombinedDocument {
            version: self.version,
            manifest,
            ops_entries,
            meta_entry,
            envs,
            ops,
            variants,
        })
    }
}

fn check_op_literal(key: &str, schema: &Value) -> Result<()> {
    let literal = discriminator_literal(schema, OP_TAG_FIELD).ok_or_else(|| {
        GenerateError::MissingDiscriminator {
            definition: key.to_string(),
            field: OP_TAG_FIELD.to_string(),
        }
    })?;
    if literal != key {
        return Err(GenerateError::DiscriminatorMismatch {
            key: key.to_string(),
            literal: literal.to_string(),
        });
    }
    Ok(())
}

fn check_envelope(ops_entries: &Value, ops: &BTreeMap<String, Value>) -> Result<()> {
    let tags: BTreeSet<&str> = union_literals(ops_entries).into_iter().collect();
    if let Some(tag) = tags.iter().find(|tag| !ops.contains_key(**tag)) {
        return Err(GenerateError::UnregisteredOpTag(tag.to_string()));
    }
    if let Some(key) = ops.keys().find(|key| !tags.contains(key.as_str())) {
        return Err(GenerateError::UnregisteredOpTag(key.clone()));
    }
    Ok(())
}

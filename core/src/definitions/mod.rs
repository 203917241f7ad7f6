//! Shape declarations for every concept of the model package format.
//!
//! Modules in this tree only refer to each other through `super::` paths and
//! only depend on `serde`, `serde_json` and `schemars`. The tree is mirrored
//! verbatim into the runtime artifact, so it has to compile there as well.

pub mod envs;
pub mod manifest;
pub mod meta;
pub mod op_instances;
pub mod ops;
pub mod variants;

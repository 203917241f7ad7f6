//! The explicit registration list of the current spec version.
//!
//! Every environment, operator and variant kind is listed here once under
//! its wire key. Adding a kind to the definitions without listing it here
//! leaves it out of the combined document.

use modelpack_spec_core::{
    Manifest, MetaEntry, OnnxV1, OpInstances, PipelineVariant, PyFuncVariant, Python3CondaPip,
    SPEC_VERSION,
};

use crate::aggregate::{Category, CombinedBuilder, CombinedDocument, OP_TAG_FIELD, Registration};
use crate::derive::{derive_schema, derive_union};
use crate::error::Result;

/// Returns every registration of [`SPEC_VERSION`], derived fresh.
pub fn spec_registrations() -> Result<Vec<Registration>> {
    Ok(vec![
        Registration::derive::<Python3CondaPip>(Category::Envs, "python3::conda_pip")?,
        Registration::derive::<OnnxV1>(Category::Ops, "ONNX_v1")?,
        Registration::derive::<PipelineVariant>(Category::Variants, "pipeline")?,
        Registration::derive::<PyFuncVariant>(Category::Variants, "pyfunc")?,
    ])
}

/// Builds the combined document of [`SPEC_VERSION`].
pub fn spec_document() -> Result<CombinedDocument> {
    CombinedBuilder::new(SPEC_VERSION)
        .manifest(derive_schema::<Manifest>()?)
        .ops_entries(derive_union::<OpInstances>(OP_TAG_FIELD)?)
        .meta_entry(derive_schema::<MetaEntry>()?)
        .register_all(spec_registrations()?)
        .build()
}

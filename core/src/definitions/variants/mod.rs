//! Packaging variants: the ways a package's logic can be executed.

pub mod pipeline;
pub mod pyfunc;

//! Core types shared by the validator and the signer.
//!
//! Holds the format enumeration, the static Format Registry, the
//! validation/signature value types, the canonicalizer and the
//! document template renderer.

pub mod canonical;
mod error;
pub mod registry;
mod template;
mod types;

pub use canonical::canonicalize;
pub use error::*;
pub use registry::{
    get_expected_namespaces, get_required_elements, get_schema_definition,
    get_supported_formats, is_format_supported,
};
pub use template::DocumentTemplate;
pub use types::*;

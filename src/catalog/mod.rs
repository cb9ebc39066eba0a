//! Build catalog wiring.
//!
//! A catalog declares which Ubuntu releases, compiler versions, and GPU
//! toolkit versions the image matrix covers. The catalog the CI currently
//! publishes ships embedded in the binary (`catalogs/ubuntu.json`); callers
//! can point `--catalog` at an external JSON document of the same shape.
//! Documents pass two validation layers before use: the embedded JSON Schema
//! (`schema::validate_catalog_document`) and the structural checks in
//! `Catalog::validate`. A loaded catalog is immutable for the run.

pub mod model;
pub mod schema;

pub use model::{
    CATALOG_SCHEMA_VERSION, Catalog, ClangVersion, CudaFlavor, HpcPair, MULTI_CUDA, OsRelease,
};
pub use schema::validate_catalog_document;

/// Catalog bundled into the binary; the matrix the CI currently publishes.
pub const BUILTIN_CATALOG_JSON: &str = include_str!("../../catalogs/ubuntu.json");

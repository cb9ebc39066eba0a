//! imageforge generates the Dockerfile/compose matrix for the C++ CI toolkit
//! images and drives batched `docker-compose` builds.
//!
//! The pipeline is linear: a validated [`catalog::Catalog`] expands into
//! [`matrix::BuildTarget`]s, [`emit`] renders and writes one Dockerfile per
//! target plus the compose manifest, and [`driver`] builds the services in
//! per-release category batches. No state flows backwards; the catalog is
//! immutable once loaded.

pub mod catalog;
pub mod compose;
pub mod dockerfile;
pub mod driver;
pub mod emit;
pub mod matrix;

pub use catalog::{Catalog, ClangVersion, CudaFlavor, HpcPair, OsRelease};
pub use matrix::{BuildTarget, Category, TargetKind, enumerate};

use std::env;

/// Default repository root for image tags.
pub const DEFAULT_IMAGE_REPO: &str = "cxx-toolkit/ci-images";

/// Environment override for the image repository root.
pub const IMAGE_REPO_ENV: &str = "IMAGEFORGE_REPO";

/// Resolve the image repository root: explicit override first, then the
/// environment, then the default.
pub fn image_repo(override_value: Option<&str>) -> String {
    if let Some(value) = override_value {
        if !value.is_empty() {
            return value.to_string();
        }
    }
    match env::var(IMAGE_REPO_ENV) {
        Ok(value) if !value.is_empty() => value,
        _ => DEFAULT_IMAGE_REPO.to_string(),
    }
}

//! Catalog data model and structural validation.
//!
//! Types mirror the catalog document fields. Version lists are ordered: the
//! last entry of a list is "latest" and feeds the primary image. Validation
//! is strict about duplicates and empty releases so the generator cannot
//! silently produce colliding artifact names or compiler-less images.

use crate::catalog::{BUILTIN_CATALOG_JSON, schema};
use anyhow::{Context, Result, bail};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Accepted `schema_version` for catalog documents.
pub const CATALOG_SCHEMA_VERSION: &str = "image_catalog_v1";

/// Wildcard NVHPC CUDA flavor: the base image bundling several CUDA releases.
pub const MULTI_CUDA: &str = "_multi";

/// A clang entry: a numbered release, or the upstream snapshot packages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClangVersion {
    Release(u32),
    Dev,
}

impl fmt::Display for ClangVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClangVersion::Release(v) => write!(f, "{v}"),
            ClangVersion::Dev => write!(f, "dev"),
        }
    }
}

impl Serialize for ClangVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ClangVersion::Release(v) => serializer.serialize_u32(*v),
            ClangVersion::Dev => serializer.serialize_str("dev"),
        }
    }
}

impl<'de> Deserialize<'de> for ClangVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(ClangVersion::Release(v)),
            Raw::Text(s) if s == "dev" => Ok(ClangVersion::Dev),
            Raw::Text(s) => Err(D::Error::custom(format!(
                "unknown clang version '{s}'; expected a number or \"dev\""
            ))),
        }
    }
}

/// CUDA flavor of an NVHPC base image: one pinned release or `_multi`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CudaFlavor {
    Pinned(String),
    Multi,
}

impl fmt::Display for CudaFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CudaFlavor::Pinned(v) => write!(f, "{v}"),
            CudaFlavor::Multi => write!(f, "{MULTI_CUDA}"),
        }
    }
}

impl Serialize for CudaFlavor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CudaFlavor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == MULTI_CUDA {
            Ok(CudaFlavor::Multi)
        } else if raw.is_empty() {
            Err(D::Error::custom("nvhpc cuda flavor must not be empty"))
        } else {
            Ok(CudaFlavor::Pinned(raw))
        }
    }
}

/// One NVHPC base-image coordinate.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HpcPair {
    pub hpc: String,
    pub cuda: CudaFlavor,
}

impl fmt::Display for HpcPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cuda{}-nvhpc{}", self.cuda, self.hpc)
    }
}

/// Per-release version tables.
#[derive(Clone, Debug, Deserialize)]
pub struct OsRelease {
    pub os: String,
    #[serde(default)]
    pub clang: Vec<ClangVersion>,
    #[serde(default)]
    pub gcc: Vec<u32>,
    #[serde(default)]
    pub cuda: Vec<String>,
    #[serde(default)]
    pub nvhpc: Vec<HpcPair>,
}

/// The full catalog document.
#[derive(Clone, Debug, Deserialize)]
pub struct Catalog {
    pub schema_version: String,
    pub releases: Vec<OsRelease>,
}

impl Catalog {
    /// The embedded default catalog, validated.
    pub fn builtin() -> Result<Self> {
        let document: Value =
            serde_json::from_str(BUILTIN_CATALOG_JSON).context("parsing built-in catalog")?;
        Self::from_document(document).context("validating built-in catalog")
    }

    /// Load and validate a catalog document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let document: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing catalog {}", path.display()))?;
        Self::from_document(document)
            .with_context(|| format!("validating catalog {}", path.display()))
    }

    /// Validate a raw document against the schema, then structurally.
    pub fn from_document(document: Value) -> Result<Self> {
        schema::validate_catalog_document(&document)?;
        let catalog: Catalog =
            serde_json::from_value(document).context("deserializing catalog document")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Structural checks the schema cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != CATALOG_SCHEMA_VERSION {
            bail!(
                "catalog schema_version '{}' not supported; expected {CATALOG_SCHEMA_VERSION}",
                self.schema_version
            );
        }
        if self.releases.is_empty() {
            bail!("catalog contains no releases");
        }
        let mut seen_os = BTreeSet::new();
        for release in &self.releases {
            if release.os.trim().is_empty() {
                bail!("release os must not be empty");
            }
            if !seen_os.insert(release.os.clone()) {
                bail!("duplicate release os {}", release.os);
            }
            if release.clang.is_empty() && release.gcc.is_empty() {
                bail!(
                    "release {} lists no compilers; need at least one clang or gcc version",
                    release.os
                );
            }
            // Duplicate versions would collide on derived artifact names.
            ensure_unique("clang", &release.os, &release.clang)?;
            ensure_unique("gcc", &release.os, &release.gcc)?;
            ensure_unique("cuda", &release.os, &release.cuda)?;
            ensure_unique("nvhpc", &release.os, &release.nvhpc)?;
            for pair in &release.nvhpc {
                if pair.hpc.trim().is_empty() {
                    bail!("release {} has an nvhpc entry with an empty hpc version", release.os);
                }
            }
        }
        Ok(())
    }
}

fn ensure_unique<T: Ord + fmt::Display>(field: &str, os: &str, values: &[T]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for value in values {
        if !seen.insert(value) {
            bail!("release {os} repeats {field} entry {value}");
        }
    }
    Ok(())
}

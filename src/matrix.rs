//! Matrix enumeration: catalog tables → concrete build targets.
//!
//! Enumeration is pure data expansion. Per release the order is: the primary
//! image, each clang version, then each gcc version followed by that gcc's
//! CUDA and NVHPC combinations. Every target derives its service name,
//! Dockerfile name, image tag, and base image from the same slug, so the
//! mapping from target to artifact is injective by construction.

use crate::catalog::{Catalog, ClangVersion, HpcPair, OsRelease};
use serde::Serialize;

/// Packages only the primary image carries on top of the common set.
pub const PRIMARY_EXTRA_PACKAGES: &str = "curl git cppcheck iwyu lcov";

/// What distinguishes one image from another, beyond the OS release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TargetKind {
    /// Richest image per release: latest compiler of each family plus the
    /// extra analysis tooling.
    Primary {
        #[serde(skip_serializing_if = "Option::is_none")]
        clang: Option<ClangVersion>,
        #[serde(skip_serializing_if = "Option::is_none")]
        gcc: Option<u32>,
    },
    Clang { clang: ClangVersion },
    Gcc { gcc: u32 },
    GccCuda { gcc: u32, cuda: String },
    GccNvhpc {
        gcc: u32,
        #[serde(flatten)]
        pair: HpcPair,
    },
}

/// Batch category of a target; one discriminant per `TargetKind` variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Primary,
    Clang,
    Gcc,
    GccCuda,
    GccNvhpc,
}

impl Category {
    /// Fixed build order: primary first for fail-fast feedback on the image
    /// most workflows pull, then the independent families.
    pub const ORDER: [Category; 5] = [
        Category::Primary,
        Category::Clang,
        Category::Gcc,
        Category::GccCuda,
        Category::GccNvhpc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Primary => "primary",
            Category::Clang => "clang",
            Category::Gcc => "gcc",
            Category::GccCuda => "gcc-cuda",
            Category::GccNvhpc => "gcc-nvhpc",
        }
    }
}

/// One concrete image to generate and build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    pub os: String,
    #[serde(flatten)]
    pub kind: TargetKind,
}

impl BuildTarget {
    /// Service name and filename suffix, unique across the whole matrix.
    pub fn slug(&self) -> String {
        let os = &self.os;
        match &self.kind {
            TargetKind::Primary { .. } => format!("main-ubuntu{os}"),
            TargetKind::Clang { clang } => format!("clang{clang}-ubuntu{os}"),
            TargetKind::Gcc { gcc } => format!("gcc{gcc}-ubuntu{os}"),
            TargetKind::GccCuda { gcc, cuda } => format!("gcc{gcc}-cuda{cuda}-ubuntu{os}"),
            TargetKind::GccNvhpc { gcc, pair } => {
                format!("gcc{gcc}-cuda{}-nvhpc{}-ubuntu{os}", pair.cuda, pair.hpc)
            }
        }
    }

    pub fn dockerfile_name(&self) -> String {
        format!("Dockerfile.{}", self.slug())
    }

    pub fn image_tag(&self, repo: &str) -> String {
        format!("{repo}:{}", self.slug())
    }

    /// Base image the Dockerfile starts FROM.
    pub fn base_image(&self) -> String {
        let os = &self.os;
        match &self.kind {
            TargetKind::Primary { .. } | TargetKind::Clang { .. } | TargetKind::Gcc { .. } => {
                format!("ubuntu:{os}")
            }
            TargetKind::GccCuda { cuda, .. } => format!("nvidia/cuda:{cuda}-devel-ubuntu{os}"),
            TargetKind::GccNvhpc { pair, .. } => format!(
                "nvcr.io/nvidia/nvhpc:{}-devel-cuda{}-ubuntu{os}",
                pair.hpc, pair.cuda
            ),
        }
    }

    pub fn category(&self) -> Category {
        match &self.kind {
            TargetKind::Primary { .. } => Category::Primary,
            TargetKind::Clang { .. } => Category::Clang,
            TargetKind::Gcc { .. } => Category::Gcc,
            TargetKind::GccCuda { .. } => Category::GccCuda,
            TargetKind::GccNvhpc { .. } => Category::GccNvhpc,
        }
    }
}

/// Expand the catalog into the full target list.
pub fn enumerate(catalog: &Catalog) -> Vec<BuildTarget> {
    let mut targets = Vec::new();
    for release in &catalog.releases {
        targets.push(primary_target(release));
        for clang in &release.clang {
            targets.push(BuildTarget {
                os: release.os.clone(),
                kind: TargetKind::Clang { clang: *clang },
            });
        }
        for &gcc in &release.gcc {
            targets.push(BuildTarget {
                os: release.os.clone(),
                kind: TargetKind::Gcc { gcc },
            });
            for cuda in &release.cuda {
                targets.push(BuildTarget {
                    os: release.os.clone(),
                    kind: TargetKind::GccCuda {
                        gcc,
                        cuda: cuda.clone(),
                    },
                });
            }
            for pair in &release.nvhpc {
                targets.push(BuildTarget {
                    os: release.os.clone(),
                    kind: TargetKind::GccNvhpc {
                        gcc,
                        pair: pair.clone(),
                    },
                });
            }
        }
    }
    targets
}

fn primary_target(release: &OsRelease) -> BuildTarget {
    // Version lists are ordered; the last entry is the release's latest.
    BuildTarget {
        os: release.os.clone(),
        kind: TargetKind::Primary {
            clang: release.clang.last().copied(),
            gcc: release.gcc.last().copied(),
        },
    }
}

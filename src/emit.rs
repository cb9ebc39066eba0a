//! Artifact emission: the Dockerfiles and compose manifest on disk.
//!
//! File names derive injectively from target tuples, so writes never collide
//! and a rerun overwrites the previous matrix wholesale. Each artifact goes
//! through a temp file in the output directory and is persisted over the
//! final name, so a crashed run never leaves a half-written Dockerfile.

use crate::matrix::BuildTarget;
use crate::{compose, dockerfile};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Manifest filename, fixed: the driver invokes docker-compose in the output
/// directory and relies on the default lookup.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

/// Paths written by one generation run.
pub struct EmittedMatrix {
    pub dockerfiles: Vec<PathBuf>,
    pub manifest: PathBuf,
}

/// Write every Dockerfile plus the compose manifest into `output_dir`.
pub fn emit_matrix(output_dir: &Path, targets: &[BuildTarget], repo: &str) -> Result<EmittedMatrix> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut dockerfiles = Vec::with_capacity(targets.len());
    for target in targets {
        let rendered = dockerfile::render(target)?;
        let path = output_dir.join(target.dockerfile_name());
        write_atomic(&path, &rendered)?;
        dockerfiles.push(path);
    }

    let manifest = output_dir.join(COMPOSE_FILE_NAME);
    write_atomic(&manifest, &compose::render_manifest(targets, repo))?;

    Ok(EmittedMatrix {
        dockerfiles,
        manifest,
    })
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("persisting {}", path.display()))?;
    Ok(())
}

#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use imageforge::Catalog;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Minimal single-release catalog used across the integration tests: one OS,
/// gcc 9 and 10, one CUDA toolkit, no NVHPC pairs. Expands to exactly five
/// targets: one primary, two gcc, two gcc+cuda.
pub const SMALL_CATALOG: &str = r#"{
  "schema_version": "image_catalog_v1",
  "releases": [
    {
      "os": "22.04",
      "clang": [],
      "gcc": [9, 10],
      "cuda": ["11.7.1"],
      "nvhpc": []
    }
  ]
}"#;

pub fn small_catalog() -> Catalog {
    serde_json::from_str(SMALL_CATALOG).expect("small catalog parses")
}

pub fn write_small_catalog(dir: &Path) -> Result<PathBuf> {
    let path = dir.join("catalog.json");
    fs::write(&path, SMALL_CATALOG).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Run a command, failing with full output on a non-zero exit.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute {cmd:?}"))?;
    if !output.status.success() {
        bail!(
            "command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

/// Sorted (filename, contents) snapshot of a generated output directory.
pub fn snapshot_dir(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let contents = fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        entries.push((name, contents));
    }
    entries.sort();
    Ok(entries)
}

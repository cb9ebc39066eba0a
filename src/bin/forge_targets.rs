//! Streams the enumerated build targets as NDJSON.
//!
//! One JSON object per line on stdout; CI fan-out and dashboards consume the
//! stream without re-implementing the enumeration rules.

use anyhow::Result;
use clap::Parser;
use imageforge::{Catalog, matrix};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "forge-targets")]
#[command(about = "List the enumerated build targets as NDJSON")]
struct Cli {
    /// Catalog JSON to use instead of the built-in Ubuntu catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let catalog = match cli.catalog.as_deref() {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };
    for target in matrix::enumerate(&catalog) {
        println!("{}", serde_json::to_string(&target)?);
    }
    Ok(())
}

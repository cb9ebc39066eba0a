//! Generates the full image matrix and drives the batched builds.
//!
//! Usage:
//!   imageforge                         # generate into . and build everything
//!   imageforge --generate-only         # write artifacts, skip docker-compose
//!   imageforge --dry-run               # print the planned invocations
//!   imageforge --catalog matrix.json --output build/ --repo example/ci

use anyhow::Result;
use clap::Parser;
use imageforge::driver::{self, FailurePolicy};
use imageforge::{Catalog, emit, matrix};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "imageforge")]
#[command(about = "Generate the CI image Dockerfile/compose matrix and build it")]
struct Cli {
    /// Catalog JSON to use instead of the built-in Ubuntu catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Directory receiving the Dockerfiles and compose manifest.
    #[arg(long, default_value = ".")]
    output: PathBuf,
    /// Image repository root (overrides IMAGEFORGE_REPO).
    #[arg(long)]
    repo: Option<String>,
    /// Write the artifacts and stop before invoking docker-compose.
    #[arg(long)]
    generate_only: bool,
    /// Print the planned docker-compose invocations instead of running them.
    #[arg(long)]
    dry_run: bool,
    /// Abort the whole matrix when a batch fails instead of continuing.
    #[arg(long)]
    fail_fast: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let catalog = match cli.catalog.as_deref() {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };

    let targets = matrix::enumerate(&catalog);
    let repo = imageforge::image_repo(cli.repo.as_deref());
    let emitted = emit::emit_matrix(&cli.output, &targets, &repo)?;
    eprintln!(
        "imageforge: wrote {} dockerfiles and {} under {}",
        emitted.dockerfiles.len(),
        emit::COMPOSE_FILE_NAME,
        cli.output.display()
    );

    if cli.generate_only {
        return Ok(());
    }

    let batches = driver::plan_batches(&targets);
    if cli.dry_run {
        for batch in &batches {
            println!("{}", batch.invocation().command_line());
        }
        return Ok(());
    }

    let policy = if cli.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::BestEffort
    };
    driver::run_batches(&batches, &cli.output, policy)
}

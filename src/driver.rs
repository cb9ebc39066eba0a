//! Build driver: batches targets and shells out to docker-compose.
//!
//! Batches are (release, category) groups in the fixed `Category::ORDER`;
//! each batch becomes one blocking `docker-compose build` invocation with
//! the tool's own scheduler providing intra-batch parallelism. Planning is
//! pure and separated from execution so the command shapes are testable
//! without a container engine on the host.

use crate::matrix::{BuildTarget, Category};
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;

/// External tool the driver invokes, once per batch.
pub const COMPOSE_PROGRAM: &str = "docker-compose";

/// What to do when a batch's invocation fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep building the remaining batches and fail at the end listing every
    /// failed batch.
    BestEffort,
    /// Abort the whole matrix on the first failed batch.
    FailFast,
}

/// One group of services built together in a single invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub os: String,
    pub category: Category,
    pub services: Vec<String>,
}

impl Batch {
    /// The fully-formed external invocation for this batch.
    pub fn invocation(&self) -> BatchInvocation {
        let mut args = vec![
            "build".to_string(),
            "--force-rm".to_string(),
            "--parallel".to_string(),
        ];
        args.extend(self.services.iter().cloned());
        BatchInvocation {
            program: COMPOSE_PROGRAM,
            args,
            env: vec![("DOCKER_BUILDKIT", "1")],
        }
    }

    pub fn label(&self) -> String {
        format!("{} (ubuntu {})", self.category.as_str(), self.os)
    }
}

/// Planned command line for one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchInvocation {
    pub program: &'static str,
    pub args: Vec<String>,
    pub env: Vec<(&'static str, &'static str)>,
}

impl BatchInvocation {
    /// Shell-style rendering for logs and --dry-run output.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        parts.push(self.program.to_string());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Group targets into build batches, preserving catalog release order.
///
/// Layer caches are not trusted across runs; every invocation passes
/// --force-rm. Empty (release, category) combinations produce no batch.
pub fn plan_batches(targets: &[BuildTarget]) -> Vec<Batch> {
    let mut releases: Vec<&str> = Vec::new();
    for target in targets {
        if !releases.contains(&target.os.as_str()) {
            releases.push(&target.os);
        }
    }

    let mut batches = Vec::new();
    for os in releases {
        for category in Category::ORDER {
            let services: Vec<String> = targets
                .iter()
                .filter(|target| target.os == os && target.category() == category)
                .map(|target| target.slug())
                .collect();
            if !services.is_empty() {
                batches.push(Batch {
                    os: os.to_string(),
                    category,
                    services,
                });
            }
        }
    }
    batches
}

/// Run every batch in order under the given failure policy.
pub fn run_batches(batches: &[Batch], output_dir: &Path, policy: FailurePolicy) -> Result<()> {
    let mut failures: Vec<String> = Vec::new();
    for batch in batches {
        let invocation = batch.invocation();
        eprintln!("imageforge: building {}: {}", batch.label(), invocation.command_line());
        if let Err(err) = run_invocation(&invocation, output_dir) {
            let message = format!("batch {} failed: {err:#}", batch.label());
            eprintln!("imageforge: {message}");
            match policy {
                FailurePolicy::FailFast => bail!(message),
                FailurePolicy::BestEffort => failures.push(message),
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        bail!(
            "{} batch(es) failed:\n{}",
            failures.len(),
            failures.join("\n")
        )
    }
}

fn run_invocation(invocation: &BatchInvocation, output_dir: &Path) -> Result<()> {
    let mut command = Command::new(invocation.program);
    command.args(&invocation.args).current_dir(output_dir);
    for (key, value) in &invocation.env {
        command.env(key, value);
    }
    let status = command
        .status()
        .with_context(|| format!("failed to execute {}", invocation.program))?;
    if !status.success() {
        bail!(
            "{} exited with status {}",
            invocation.program,
            status.code().unwrap_or(-1)
        );
    }
    Ok(())
}

// src/lib.rs

pub mod cli;
pub mod collect;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_with_overrides;
use crate::engine::{PlannedCandidate, RunSummary, Runner};
use crate::exec::{CommandConverter, RealKaibaBackend};
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the real filesystem, kaiba backend and converter
/// - the runner, or the dry-run plan
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_with_overrides(args.config.as_deref(), &args.overrides())?;
    debug!(?cfg, "configuration loaded");

    let converter = CommandConverter::from_config(&cfg);
    let mut runner = Runner::new(cfg, Arc::new(RealFileSystem), RealKaibaBackend::new(), converter);

    if args.dry_run {
        let plan = runner.plan()?;
        print_dry_run(&runner, &plan);
        return Ok(());
    }

    let summary = runner.run().await?;
    print_summary(&summary);

    if !summary.is_success() {
        bail!(
            "{} of {} candidates failed",
            summary.failed(),
            summary.total()
        );
    }
    Ok(())
}

fn print_dry_run<B, C>(runner: &Runner<B, C>, plan: &[PlannedCandidate])
where
    B: exec::KaibaBackend,
    C: exec::SeriesConverter,
{
    let run = runner.config().run();
    println!("kaiba-batch dry-run");
    println!("  input_path  = {}", run.input_path.display());
    println!("  prefix      = {:?}", run.prefix);
    println!("  output_path = {}", run.output_path.display());
    println!("  discovery   = {:?}", run.discovery);
    println!("  work_dir    = {}", run.work_dir.display());
    println!();

    println!("candidates ({}):", plan.len());
    for item in plan {
        println!("  - {}", item.entry.display());
        if item.needs_conversion {
            println!("      convert to: {}", item.nifti.display());
        }
        println!("      cmd: {}", item.command_line);
        println!("      destination: {}", item.destination.display());
    }

    debug!("dry-run complete (no execution)");
}

fn print_summary(summary: &RunSummary) {
    for report in summary.failures() {
        warn!(
            candidate = %report.candidate.nifti.display(),
            outcome = ?report.outcome,
            status = ?report.status,
            "candidate failed"
        );
    }

    info!(
        total = summary.total(),
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        collisions = summary.collisions(),
        "run finished"
    );

    println!(
        "processed {} candidate(s): {} succeeded, {} failed, {} artifact(s) left by collisions",
        summary.total(),
        summary.succeeded(),
        summary.failed(),
        summary.collisions()
    );
}

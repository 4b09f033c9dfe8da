// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;
use crate::types::{CollisionPolicy, DiscoveryMode};

/// Command-line arguments for `kaiba-batch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kaiba-batch",
    version,
    about = "Run kaiba over every matching NIfTI file and collect its output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Kaiba.toml` is used when present, built-in defaults
    /// otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to search for input files.
    #[arg(long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Only files whose name starts with this prefix are processed.
    #[arg(long, value_name = "STR")]
    pub prefix: Option<String>,

    /// Root of the per-file output directories.
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Directory kaiba runs in.
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Also pick up non-NIfTI entries and convert them first.
    #[arg(long)]
    pub all_files: bool,

    /// Leave artifacts in place instead of overwriting existing outputs.
    #[arg(long)]
    pub no_replace: bool,

    /// Print what would be processed, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `KAIBA_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_path: self.input.clone(),
            prefix: self.prefix.clone(),
            output_path: self.output.clone(),
            work_dir: self.work_dir.clone(),
            discovery: self.all_files.then_some(DiscoveryMode::AllFiles),
            policy: self.no_replace.then_some(CollisionPolicy::NoReplace),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

// src/exec/backend.rs

//! Pluggable kaiba invocation backend.
//!
//! The runner talks to a `KaibaBackend` instead of spawning processes
//! itself. Production uses [`RealKaibaBackend`]; tests provide a fake that
//! records invocations and drops artifacts into the working directory
//! through a `FileSystem`.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::errors::Result;

use super::process::{run_process, InvocationOutcome};

/// How to call the kaiba tool, independent of the file being processed.
#[derive(Debug, Clone)]
pub struct KaibaCommand {
    pub program: String,
    pub verbose: bool,
    pub output_name: String,
    pub timeout: Option<Duration>,
}

impl KaibaCommand {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            program: cfg.kaiba().program.clone(),
            verbose: cfg.kaiba().verbose,
            output_name: cfg.kaiba().output_name.clone(),
            timeout: cfg.timeout(),
        }
    }
}

/// One call of the tool for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub input: PathBuf,
    pub verbose: bool,
    pub output_name: String,
    /// Directory the tool runs in; its artifacts land here.
    pub work_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(command: &KaibaCommand, input: &Path, work_dir: &Path) -> Self {
        Self {
            program: command.program.clone(),
            input: input.to_path_buf(),
            verbose: command.verbose,
            output_name: command.output_name.clone(),
            work_dir: work_dir.to_path_buf(),
            timeout: command.timeout,
        }
    }

    /// `-i <input> [-v] -o <output_name>`
    pub fn args(&self) -> Vec<OsString> {
        let mut args = vec![OsString::from("-i"), self.input.clone().into_os_string()];
        if self.verbose {
            args.push(OsString::from("-v"));
        }
        args.push(OsString::from("-o"));
        args.push(OsString::from(&self.output_name));
        args
    }

    /// Printable command line, for logs and dry runs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Trait abstracting how kaiba is run for one input file.
pub trait KaibaBackend: Send {
    /// Run the tool and wait for it to finish.
    ///
    /// `Err` is reserved for backend-internal problems; a tool that fails
    /// or cannot be started is reported through [`InvocationOutcome`].
    fn invoke(
        &mut self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<InvocationOutcome>> + Send + '_>>;
}

/// Backend that spawns the real program.
#[derive(Debug, Clone, Default)]
pub struct RealKaibaBackend;

impl RealKaibaBackend {
    pub fn new() -> Self {
        Self
    }
}

impl KaibaBackend for RealKaibaBackend {
    fn invoke(
        &mut self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<InvocationOutcome>> + Send + '_>> {
        Box::pin(async move {
            let label = invocation.input.display().to_string();
            let outcome = run_process(
                &label,
                &invocation.program,
                &invocation.args(),
                &invocation.work_dir,
                invocation.timeout,
            )
            .await;
            Ok(outcome)
        })
    }
}

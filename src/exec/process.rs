// src/exec/process.rs

//! Blocking-style execution of a single external process.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Result of running one external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Success,
    /// Non-zero exit. `-1` when the process was killed by a signal.
    Failed(i32),
    /// The program could not be started at all.
    SpawnFailed(String),
    /// The configured timeout elapsed; the process was killed.
    TimedOut,
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success)
    }
}

/// Run `program args...` in `cwd` and wait until it exits and both output
/// streams are drained.
///
/// Never returns an error: every failure is folded into an
/// [`InvocationOutcome`] and logged.
pub async fn run_process(
    label: &str,
    program: &str,
    args: &[OsString],
    cwd: &Path,
    timeout: Option<Duration>,
) -> InvocationOutcome {
    match run_process_inner(label, program, args, cwd, timeout).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(label, program, error = %err, "process execution error");
            InvocationOutcome::SpawnFailed(format!("{err:#}"))
        }
    }
}

async fn run_process_inner(
    label: &str,
    program: &str,
    args: &[OsString],
    cwd: &Path,
    timeout: Option<Duration>,
) -> Result<InvocationOutcome> {
    info!(label, program, ?args, cwd = %cwd.display(), "starting process");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // Own process group, so a timeout can take down helpers the tool
    // spawned along with it.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning '{}' for {}", program, label))?;

    // Always consume both pipes so buffers don't fill; log at debug.
    let drains = [
        child.stdout.take().map(|s| drain_lines(label, "stdout", s)),
        child.stderr.take().map(|s| drain_lines(label, "stderr", s)),
    ];

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(label, program, ?limit, "process timed out; killing it");
                kill_process_tree(label, &mut child).await;
                finish_drains(label, drains).await;
                return Ok(InvocationOutcome::TimedOut);
            }
        },
        None => child.wait().await,
    }
    .with_context(|| format!("waiting for '{}' ({})", program, label))?;

    finish_drains(label, drains).await;

    let code = status.code().unwrap_or(-1);
    info!(
        label,
        program,
        exit_code = code,
        success = status.success(),
        "process exited"
    );

    Ok(if status.success() {
        InvocationOutcome::Success
    } else {
        InvocationOutcome::Failed(code)
    })
}

/// How long output readers may keep going once the process is gone.
///
/// A detached grandchild can hold the pipes open indefinitely.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Kill the child's whole process group, then the child itself.
async fn kill_process_tree(label: &str, child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        let group = format!("-{pid}");
        let killed = Command::new("kill")
            .args(["-KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match killed {
            Ok(status) if status.success() => {}
            Ok(status) => debug!(label, ?status, "kill of process group reported failure"),
            Err(e) => warn!(label, error = %e, "could not run kill for process group"),
        }
    }

    if let Err(e) = child.kill().await {
        warn!(label, error = %e, "failed to kill timed out process");
    }
}

/// Wait for the output readers, abandoning any still blocked after
/// [`DRAIN_GRACE`].
async fn finish_drains(label: &str, drains: [Option<JoinHandle<()>>; 2]) {
    for mut handle in drains.into_iter().flatten() {
        if tokio::time::timeout(DRAIN_GRACE, &mut handle).await.is_err() {
            debug!(label, "output still open after process exit; stopping reader");
            handle.abort();
        }
    }
}

fn drain_lines<R>(label: &str, stream: &'static str, reader: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let label = label.to_string();
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(label = %label, stream, "{}", line);
        }
    })
}

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use kaiba_batch::collect::nifti_stem;
use kaiba_batch::errors::Result;
use kaiba_batch::exec::{Invocation, InvocationOutcome, KaibaBackend};
use kaiba_batch::fs::FileSystem;

/// A fake kaiba that:
/// - records every invocation
/// - writes `<stem><suffix>` for each configured suffix, plus
///   `<output_name>.csv`, into the invocation's working directory
/// - reports `Failed(1)` without writing anything for inputs whose stem is
///   listed in `failing`.
pub struct FakeKaiba {
    fs: Arc<dyn FileSystem>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
    suffixes: Vec<String>,
    failing: Vec<String>,
}

impl FakeKaiba {
    pub fn new(fs: Arc<dyn FileSystem>, invocations: Arc<Mutex<Vec<Invocation>>>) -> Self {
        Self {
            fs,
            invocations,
            suffixes: vec![".csv".to_string(), ".log".to_string()],
            failing: Vec::new(),
        }
    }

    pub fn with_suffixes(mut self, suffixes: &[&str]) -> Self {
        self.suffixes = suffixes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_on(mut self, stem: &str) -> Self {
        self.failing.push(stem.to_string());
        self
    }

    /// Files this fake writes for `invocation`.
    pub fn artifacts_for(&self, invocation: &Invocation) -> Vec<PathBuf> {
        let stem = nifti_stem(&invocation.input);
        let mut files: Vec<PathBuf> = self
            .suffixes
            .iter()
            .map(|s| invocation.work_dir.join(format!("{stem}{s}")))
            .collect();
        files.push(
            invocation
                .work_dir
                .join(format!("{}.csv", invocation.output_name)),
        );
        files
    }
}

impl KaibaBackend for FakeKaiba {
    fn invoke(
        &mut self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<InvocationOutcome>> + Send + '_>> {
        Box::pin(async move {
            self.invocations.lock().unwrap().push(invocation.clone());

            if self.failing.contains(&nifti_stem(&invocation.input)) {
                return Ok(InvocationOutcome::Failed(1));
            }

            for file in self.artifacts_for(&invocation) {
                let body = format!("kaiba output for {}", invocation.input.display());
                self.fs.write(&file, body.as_bytes())?;
            }
            Ok(InvocationOutcome::Success)
        })
    }
}

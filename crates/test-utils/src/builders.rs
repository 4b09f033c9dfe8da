#![allow(dead_code)]

use std::path::Path;

use kaiba_batch::config::{ConfigFile, RawConfigFile};
use kaiba_batch::types::{ArtifactSelection, CollisionPolicy, DiscoveryMode, FailurePolicy};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults with `kaiba.verbose = false` so
/// recorded command lines stay short.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.kaiba.verbose = false;
        Self { config }
    }

    /// Shorthand for the three paths every run needs.
    pub fn with_paths(
        self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        work_dir: impl AsRef<Path>,
    ) -> Self {
        self.input(input).output(output).work_dir(work_dir)
    }

    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.config.run.input_path = path.as_ref().to_path_buf();
        self
    }

    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.config.run.output_path = path.as_ref().to_path_buf();
        self
    }

    pub fn work_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.run.work_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.run.prefix = prefix.to_string();
        self
    }

    pub fn discovery(mut self, mode: DiscoveryMode) -> Self {
        self.config.run.discovery = mode;
        self
    }

    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.config.run.on_failure = policy;
        self
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.kaiba.program = program.to_string();
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.config.kaiba.verbose = val;
        self
    }

    pub fn output_name(mut self, name: &str) -> Self {
        self.config.kaiba.output_name = name.to_string();
        self
    }

    pub fn timeout(mut self, duration: &str) -> Self {
        self.config.kaiba.timeout = Some(duration.to_string());
        self
    }

    pub fn policy(mut self, policy: CollisionPolicy) -> Self {
        self.config.collect.policy = policy;
        self
    }

    pub fn selection(mut self, selection: ArtifactSelection) -> Self {
        self.config.collect.selection = selection;
        self
    }

    pub fn dest_suffix(mut self, suffix: &str) -> Self {
        self.config.collect.dest_suffix = suffix.to_string();
        self
    }

    pub fn extra_artifact(mut self, name: &str) -> Self {
        self.config
            .collect
            .extra_artifacts
            .get_or_insert_with(Vec::new)
            .push(name.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{ArtifactSelection, CollisionPolicy, DiscoveryMode, FailurePolicy};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [run]
/// input_path = "data"
/// prefix = "sub"
/// output_path = "./processed/kaiba"
/// discovery = "nifti_only"
///
/// [kaiba]
/// program = "kaiba"
/// verbose = true
/// output_name = "foo"
///
/// [collect]
/// dest_suffix = "_kaiba"
/// policy = "replace"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub kaiba: KaibaSection,

    #[serde(default)]
    pub collect: CollectSection,

    #[serde(default)]
    pub convert: ConvertSection,
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)`, so holders
/// can rely on the invariants checked in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    run: RunSection,
    kaiba: KaibaSection,
    collect: CollectSection,
    convert: ConvertSection,
    timeout: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, timeout: Option<Duration>) -> Self {
        Self {
            run: raw.run,
            kaiba: raw.kaiba,
            collect: raw.collect,
            convert: raw.convert,
            timeout,
        }
    }

    pub fn run(&self) -> &RunSection {
        &self.run
    }

    pub fn kaiba(&self) -> &KaibaSection {
        &self.kaiba
    }

    pub fn collect(&self) -> &CollectSection {
        &self.collect
    }

    pub fn convert(&self) -> &ConvertSection {
        &self.convert
    }

    /// Parsed `[kaiba].timeout`, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Fixed artifact names collected next to the `<stem>*` matches.
    ///
    /// Defaults to `<output_name>.csv` when `[collect].extra_artifacts` is
    /// not set.
    pub fn extra_artifacts(&self) -> Vec<String> {
        match &self.collect.extra_artifacts {
            Some(names) => names.clone(),
            None => vec![format!("{}.csv", self.kaiba.output_name)],
        }
    }
}

/// `[run]` section: what to process and where results go.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Only basenames starting with this string are candidates.
    #[serde(default)]
    pub prefix: String,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default)]
    pub discovery: DiscoveryMode,

    /// Directory kaiba runs in and drops its artifacts into.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    #[serde(default)]
    pub on_failure: FailurePolicy,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./processed/kaiba")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            prefix: String::new(),
            output_path: default_output_path(),
            discovery: DiscoveryMode::default(),
            work_dir: default_work_dir(),
            on_failure: FailurePolicy::default(),
        }
    }
}

/// `[kaiba]` section: how the external tool is invoked.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KaibaSection {
    #[serde(default = "default_kaiba_program")]
    pub program: String,

    /// Pass `-v` to the tool.
    #[serde(default = "default_verbose")]
    pub verbose: bool,

    /// Value of `-o`; the tool writes `<output_name>.csv`.
    #[serde(default = "default_output_name")]
    pub output_name: String,

    /// Duration string (e.g. `"30m"`). No timeout when unset.
    #[serde(default)]
    pub timeout: Option<String>,
}

fn default_kaiba_program() -> String {
    "kaiba".to_string()
}

fn default_verbose() -> bool {
    true
}

fn default_output_name() -> String {
    "foo".to_string()
}

impl Default for KaibaSection {
    fn default() -> Self {
        Self {
            program: default_kaiba_program(),
            verbose: default_verbose(),
            output_name: default_output_name(),
            timeout: None,
        }
    }
}

/// `[collect]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectSection {
    /// Appended to the candidate stem to name its output directory.
    #[serde(default = "default_dest_suffix")]
    pub dest_suffix: String,

    #[serde(default)]
    pub policy: CollisionPolicy,

    #[serde(default)]
    pub selection: ArtifactSelection,

    /// Fixed file names collected in `stem` mode.
    #[serde(default)]
    pub extra_artifacts: Option<Vec<String>>,
}

fn default_dest_suffix() -> String {
    "_kaiba".to_string()
}

impl Default for CollectSection {
    fn default() -> Self {
        Self {
            dest_suffix: default_dest_suffix(),
            policy: CollisionPolicy::default(),
            selection: ArtifactSelection::default(),
            extra_artifacts: None,
        }
    }
}

/// `[convert]` section: the external DICOM-to-NIfTI converter used in
/// `all_files` discovery mode.
///
/// `args` may contain `{input}`, `{output}`, `{output_dir}` and
/// `{output_stem}` placeholders.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertSection {
    #[serde(default = "default_convert_program")]
    pub program: String,

    #[serde(default = "default_convert_args")]
    pub args: Vec<String>,
}

fn default_convert_program() -> String {
    "dcm2niix".to_string()
}

fn default_convert_args() -> Vec<String> {
    ["-z", "n", "-o", "{output_dir}", "-f", "{output_stem}", "{input}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ConvertSection {
    fn default() -> Self {
        Self {
            program: default_convert_program(),
            args: default_convert_args(),
        }
    }
}

// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::types::{CollisionPolicy, DiscoveryMode};

/// Values supplied on the command line that take precedence over the
/// config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_path: Option<PathBuf>,
    pub prefix: Option<String>,
    pub output_path: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub discovery: Option<DiscoveryMode>,
    pub policy: Option<CollisionPolicy>,
}

impl ConfigOverrides {
    pub fn apply(&self, raw: &mut RawConfigFile) {
        if let Some(ref p) = self.input_path {
            raw.run.input_path = p.clone();
        }
        if let Some(ref p) = self.prefix {
            raw.run.prefix = p.clone();
        }
        if let Some(ref p) = self.output_path {
            raw.run.output_path = p.clone();
        }
        if let Some(ref p) = self.work_dir {
            raw.run.work_dir = p.clone();
        }
        if let Some(mode) = self.discovery {
            raw.run.discovery = mode;
        }
        if let Some(policy) = self.policy {
            raw.collect.policy = policy;
        }
    }
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration used by a run.
///
/// - An explicitly requested file must exist.
/// - Otherwise [`default_config_path`] is read if present, and built-in
///   defaults are used if it is not.
///
/// `overrides` are applied before validation so that command-line values
/// are checked like file values.
pub fn load_with_overrides(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let mut raw = match explicit {
        Some(path) => load_from_path(path)?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_from_path(&path)?
            } else {
                debug!(path = %path.display(), "no config file found; using defaults");
                RawConfigFile::default()
            }
        }
    };

    overrides.apply(&mut raw);
    ConfigFile::try_from(raw)
}

/// `Kaiba.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Kaiba.toml")
}

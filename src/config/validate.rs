// src/config/validate.rs

use std::path::{Component, Path};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{KaibaError, Result};
use crate::exec::template::{placeholders, KNOWN_PLACEHOLDERS};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = KaibaError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let timeout = match raw.kaiba.timeout.as_deref() {
            Some(s) => Some(parse_duration(s).map_err(|e| {
                KaibaError::ConfigError(format!("[kaiba].timeout: {e}"))
            })?),
            None => None,
        };
        Ok(ConfigFile::new_unchecked(raw, timeout))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_run_section(cfg)?;
    validate_kaiba_section(cfg)?;
    validate_collect_section(cfg)?;
    validate_convert_section(cfg)?;
    Ok(())
}

fn validate_run_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.run.input_path.as_os_str().is_empty() {
        return Err(KaibaError::ConfigError(
            "[run].input_path must not be empty".to_string(),
        ));
    }
    if cfg.run.output_path.as_os_str().is_empty() {
        return Err(KaibaError::ConfigError(
            "[run].output_path must not be empty".to_string(),
        ));
    }
    if cfg.run.work_dir.as_os_str().is_empty() {
        return Err(KaibaError::ConfigError(
            "[run].work_dir must not be empty".to_string(),
        ));
    }
    if cfg.run.prefix.contains(['/', '\\']) {
        return Err(KaibaError::ConfigError(format!(
            "[run].prefix '{}' must be a plain file name prefix",
            cfg.run.prefix
        )));
    }
    Ok(())
}

fn validate_kaiba_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.kaiba.program.trim().is_empty() {
        return Err(KaibaError::ConfigError(
            "[kaiba].program must not be empty".to_string(),
        ));
    }
    if !is_plain_file_name(&cfg.kaiba.output_name) {
        return Err(KaibaError::ConfigError(format!(
            "[kaiba].output_name '{}' must be a plain file name",
            cfg.kaiba.output_name
        )));
    }
    if let Some(ref s) = cfg.kaiba.timeout {
        parse_duration(s)
            .map_err(|e| KaibaError::ConfigError(format!("[kaiba].timeout: {e}")))?;
    }
    Ok(())
}

fn validate_collect_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.collect.dest_suffix.contains(['/', '\\']) {
        return Err(KaibaError::ConfigError(format!(
            "[collect].dest_suffix '{}' must not contain path separators",
            cfg.collect.dest_suffix
        )));
    }
    if let Some(ref names) = cfg.collect.extra_artifacts {
        for name in names {
            if !is_plain_file_name(name) {
                return Err(KaibaError::ConfigError(format!(
                    "[collect].extra_artifacts entry '{}' must be a plain file name",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_convert_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.convert.program.trim().is_empty() {
        return Err(KaibaError::ConfigError(
            "[convert].program must not be empty".to_string(),
        ));
    }
    for arg in cfg.convert.args.iter() {
        for name in placeholders(arg) {
            if !KNOWN_PLACEHOLDERS.contains(&name) {
                return Err(KaibaError::ConfigError(format!(
                    "[convert].args: unknown placeholder '{{{}}}' in '{}'",
                    name, arg
                )));
            }
        }
    }
    Ok(())
}

/// Exactly one normal path component, e.g. `foo.csv`.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

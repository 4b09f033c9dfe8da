// src/config/mod.rs

//! Configuration loading and validation for kaiba-batch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and merge command-line overrides (`loader.rs`).
//! - Validate paths, names and templates (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_with_overrides, ConfigOverrides};
pub use model::{
    CollectSection, ConfigFile, ConvertSection, KaibaSection, RawConfigFile, RunSection,
};

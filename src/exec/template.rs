// src/exec/template.rs

//! `{placeholder}` expansion for converter argument templates.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Placeholders understood by [`expand`].
pub const KNOWN_PLACEHOLDERS: &[&str] = &["input", "output", "output_dir", "output_stem"];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"));

/// Names of all placeholders referenced in `template`, in order.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Replace every `{name}` with its value from `vars`.
///
/// Unknown names are left as written; config validation rejects them
/// before a template gets here.
pub fn expand(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

//! Secret references in config values.
//!
//! `client_id` and `client_secret` may point outside `config.toml`:
//!
//! - `env::NAME` reads `$NAME`
//! - `pass::entry` runs `pass show entry` and keeps the first line
//!
//! Any other value is used verbatim.

use std::process::Command;

/// Expands a possibly-prefixed config value.
pub fn resolve(value: &str) -> Result<String, String> {
    match value.split_once("::") {
        Some(("env", name)) => {
            std::env::var(name).map_err(|_| format!("environment variable `{}` is not set", name))
        }
        Some(("pass", entry)) => from_pass(entry),
        _ => Ok(value.to_string()),
    }
}

fn from_pass(entry: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .args(["show", entry])
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", entry, e))?;

    if !output.status.success() {
        return Err(format!(
            "`pass show {}` exited with {}: {}",
            entry,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` printed nothing", entry))
}

pub mod inspect;
pub mod sources;
pub mod trends;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ktima_core::PipelineConfig;

/// Read a TOML configuration file, or fall back to the built-in
/// defaults (the known Greek transaction schema).
pub(crate) fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("invalid config file '{}'", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Parse one `COLUMN=VALUE` filter argument.
pub(crate) fn parse_filter(spec: &str) -> Result<(String, String)> {
    let Some((column, value)) = spec.split_once('=') else {
        bail!("filter '{spec}' is not of the form COLUMN=VALUE");
    };
    let column = column.trim();
    let value = value.trim();
    if column.is_empty() || value.is_empty() {
        bail!("filter '{spec}' needs both a column and a value");
    }
    Ok((column.to_string(), value.to_string()))
}

//! Config and dataset loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sightid_sighting::PipelineConfig;

/// Reads a JSON or YAML file, picking the format from the extension.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let data =
        std::fs::read(path).with_context(|| format!("read {}", path.display()))?;

    let value = match ext {
        "json" => serde_json::from_slice(&data)
            .with_context(|| format!("parse {}", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_slice(&data)
            .with_context(|| format!("parse {}", path.display()))?,
        _ => anyhow::bail!(
            "unsupported file extension {:?} for {} (want json, yaml or yml)",
            ext,
            path.display()
        ),
    };
    Ok(value)
}

/// Loads the pipeline config, or the defaults when no file is given.
pub fn load_config(path: Option<&str>) -> Result<PipelineConfig> {
    match path {
        Some(p) => load_file(Path::new(p)),
        None => Ok(PipelineConfig::default()),
    }
}

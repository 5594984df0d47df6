//! Workflow document loading.
//!
//! Native Galaxy workflows (`.ga`) are JSON; gxformat2 workflows are YAML.
//! Both are read into the same `serde_json::Value` tree so the step walkers
//! do not care which format they came from.

use std::path::Path;

use serde_json::Value;
use shedmull_common::error::{Result, ShedmullError};

/// Reads and parses a workflow file.
///
/// Files ending in `.yml`/`.yaml` (or `.gxwf.yml`) are parsed as YAML,
/// everything else as JSON with a YAML fallback.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is neither valid JSON
/// nor valid YAML.
pub fn load_workflow(path: &Path) -> Result<Value> {
    tracing::info!(path = %path.display(), "loading workflow");
    let content = std::fs::read_to_string(path).map_err(|e| ShedmullError::io(path, e))?;
    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
    if is_yaml {
        parse_yaml(&content)
    } else {
        parse_workflow(&content)
    }
}

/// Parses workflow text, trying JSON first and YAML second.
///
/// # Errors
///
/// Returns an error if the text parses as neither format, or does not
/// describe an object.
pub fn parse_workflow(content: &str) -> Result<Value> {
    let value = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(json_err) => {
            tracing::debug!(error = %json_err, "workflow is not JSON, trying YAML");
            parse_yaml(content)?
        }
    };
    ensure_object(value)
}

fn parse_yaml(content: &str) -> Result<Value> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| ShedmullError::Yaml {
        message: e.to_string(),
    })?;
    ensure_object(value)
}

fn ensure_object(value: Value) -> Result<Value> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(ShedmullError::Config {
            message: "workflow document is not an object".into(),
        })
    }
}

//! Data file loader
//!
//! Reads untyped inputs (external editor data, configuration overrides,
//! editor snapshots) from JSON or YAML files. The format is picked from the
//! file extension; anything other than `.yml`/`.yaml` is read as JSON.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::data::{EditorSnapshot, ExternalEditorData};
use crate::error::BridgeResult;
use crate::shape::parse_external_data;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                DataFormat::Yaml
            }
            _ => DataFormat::Json,
        }
    }
}

/// Parse a document into an untyped value
pub fn parse_str(content: &str, format: DataFormat) -> BridgeResult<Value> {
    let value = match format {
        DataFormat::Json => serde_json::from_str(content)?,
        DataFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(value)
}

/// Load a file into an untyped value
pub fn load_value(path: impl AsRef<Path>) -> BridgeResult<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let format = DataFormat::from_path(path);
    debug!("Loading {:?} as {:?}", path, format);
    parse_str(&content, format)
}

/// Load and validate an external data bundle
pub fn load_external_data(path: impl AsRef<Path>) -> BridgeResult<ExternalEditorData> {
    let value = load_value(path)?;
    Ok(parse_external_data(&value)?)
}

/// Load an editor store snapshot; missing fields default to empty
pub fn load_snapshot(path: impl AsRef<Path>) -> BridgeResult<EditorSnapshot> {
    let value = load_value(path)?;
    Ok(serde_json::from_value(value)?)
}

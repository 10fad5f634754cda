//! The as-loaded source document
//!
//! Host and service entries stay as JSON objects until defaults have been
//! applied, so that any field a default supplies is carried over exactly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{Error, Result};

/// Hook keys with this name are notes for humans, never scripts
pub const COMMENT_KEY: &str = "--comment";

/// A source document, before compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConfig {
    pub app: RawApp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default)]
    pub defaults: RawDefaults,

    pub hosts: Vec<Map<String, Value>>,

    #[serde(default)]
    pub hooks: Map<String, Value>,
}

/// `app` section of a source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawApp {
    pub name: String,
    /// Path to the application, relative to the document's directory
    pub path: String,
}

/// `defaults` section of a source document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDefaults {
    #[serde(default)]
    pub hosts: Map<String, Value>,

    #[serde(default)]
    pub services: Map<String, Value>,
}

impl RawConfig {
    /// Parse a source document from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|source| Error::Schema {
            what: "configuration document".to_string(),
            source,
        })
    }

    /// Read and parse the source document at `path`
    ///
    /// A missing file is reported as [`Error::NotFound`], distinct from a
    /// file that exists but does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Use `environment` when the document does not name one itself
    pub fn with_fallback_environment(mut self, environment: Option<&str>) -> Self {
        if self.environment.as_deref().is_none_or(str::is_empty) {
            self.environment = environment.map(str::to_string);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_sections_default_to_empty() {
        let raw = RawConfig::from_value(json!({
            "app": { "name": "shop", "path": "../app" },
            "hosts": []
        }))
        .unwrap();

        assert!(raw.environment.is_none());
        assert!(raw.defaults.hosts.is_empty());
        assert!(raw.defaults.services.is_empty());
        assert!(raw.hooks.is_empty());
    }

    #[test]
    fn test_missing_app_is_rejected() {
        let err = RawConfig::from_value(json!({ "hosts": [] })).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_document_environment_wins_over_fallback() {
        let raw = RawConfig::from_value(json!({
            "app": { "name": "shop", "path": "." },
            "environment": "production",
            "hosts": []
        }))
        .unwrap();

        let raw = raw.with_fallback_environment(Some("staging"));
        assert_eq!(raw.environment.as_deref(), Some("production"));
    }

    #[test]
    fn test_fallback_environment_fills_gap() {
        let raw = RawConfig::from_value(json!({
            "app": { "name": "shop", "path": "." },
            "hosts": []
        }))
        .unwrap()
        .with_fallback_environment(Some("staging"));

        assert_eq!(raw.environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("staging.flotilla.json");

        let err = RawConfig::load(&path).unwrap_err();

        assert!(matches!(err, Error::NotFound { path: ref p } if *p == path));
        assert!(err.to_string().contains("flotilla init"));
    }

    #[test]
    fn test_load_malformed_file_cites_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("staging.flotilla.json");
        std::fs::write(&path, "{ \"app\": ").unwrap();

        let err = RawConfig::load(&path).unwrap_err();

        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("staging.flotilla.json"));
    }
}
